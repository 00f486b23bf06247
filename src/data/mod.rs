//! Data layer: core types, loading, and preprocessing.
//!
//! Architecture:
//! ```text
//!  text / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse rows → LoadedMatrix (malformed rows skipped)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ SampleMatrix  │  rows × columns, plus ColumnMetadata
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ transform │  transpose → smooth → downsample
//!   └───────────┘
//! ```

pub mod loader;
pub mod model;
pub mod transform;

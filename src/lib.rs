//! Plot delimited numeric text, from finite files or a live stream.
//!
//! Static mode runs [`pipeline`]: [`data::loader`] → [`data::transform`] →
//! [`layout`] → [`render`]. Rolling mode feeds raw lines straight into the
//! [`stream`] engine.

pub mod color;
pub mod data;
pub mod error;
pub mod layout;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod stream;

pub use error::{PlotError, Result};
pub use options::PlotOptions;

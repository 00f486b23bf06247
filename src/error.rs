use thiserror::Error;

/// Failures of the plotting core: loading, transforming, resolving and streaming.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    /// A row (static mode) or line (rolling mode) that did not parse.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Column count incompatible with the requested geometry.
    #[error("{mode} plot needs {requirement}, got {columns} column(s)")]
    ShapeMismatch {
        mode: &'static str,
        columns: usize,
        requirement: &'static str,
    },

    /// Smoothing or downsampling applied to data of the wrong dimensionality.
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Options that cannot be combined with rolling mode, by flag name.
    #[error("option(s) not supported for rolling plots: {}", .0.join(", "))]
    IncompatibleOptions(Vec<&'static str>),

    /// An option value outside its valid range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A time-axis value that is not a representable Unix timestamp.
    #[error("value {0} is not a valid Unix timestamp")]
    InvalidTimestamp(f64),
}

/// Type alias for Results using PlotError
pub type Result<T> = std::result::Result<T, PlotError>;

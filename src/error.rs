use std::path::PathBuf;

use thiserror::Error;

/// Error types for the lcfit-rs library.
#[derive(Error, Debug)]
pub enum LcFitError {
    /// Time, flux and uncertainty arrays of a light curve disagree in length.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A value assigned to a parameter set cannot be normalized into a parameter.
    #[error("Cannot set {name}: {message}")]
    ParameterType { name: String, message: String },

    /// A parameter file exists but cannot be parsed.
    #[error("Invalid parameter file {}: {message}", path.display())]
    FileFormat { path: PathBuf, message: String },

    /// No fitter is registered under the requested name.
    #[error("Unsupported fitter '{name}' (registered: {available})")]
    UnsupportedFitter { name: String, available: String },

    /// A single fit unit failed.
    #[error("Fit failed for {unit}: {message}")]
    FitFailure { unit: String, message: String },

    /// A result table column that is not part of the schema.
    #[error("Unknown result column '{0}'")]
    ColumnNotFound(String),

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error for boundary constraint violations.
    #[error("Bounds error: {0}")]
    BoundsError(#[from] crate::parameters::bounds::BoundsError),

    /// Error indicating optimization failed.
    #[error("Optimization failed: {0}")]
    OptimizationFailure(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

impl LcFitError {
    /// Shorthand for a [`LcFitError::ParameterType`] error.
    pub fn parameter_type(name: &str, message: impl Into<String>) -> Self {
        LcFitError::ParameterType {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`LcFitError::FileFormat`] error.
    pub fn file_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LcFitError::FileFormat {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for lcfit-rs operations.
pub type Result<T> = std::result::Result<T, LcFitError>;

/// Extensions for converting from other error types.
impl From<String> for LcFitError {
    fn from(s: String) -> Self {
        LcFitError::Other(s)
    }
}

impl From<&str> for LcFitError {
    fn from(s: &str) -> Self {
        LcFitError::Other(s.to_string())
    }
}

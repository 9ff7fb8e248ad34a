use std::fmt;

use crate::core::types::PointId;

/// Errors raised by index construction, distance computation, and ingestion.
#[derive(Debug)]
pub enum KnnError {
    Io(std::io::Error),
    /// Operands (points, bounds, descriptors) of differing dimensionality.
    DimensionMismatch { dim1: usize, dim2: usize },
    /// A query by id referenced a point that is not stored in the index.
    UnknownId(PointId),
    /// No local PCA descriptor is associated with the point.
    MissingAssociation(PointId),
    /// Two points handed to the index share one id.
    DuplicateId(PointId),
    InvalidInput { message: String },
    /// A field could not be read as a number.
    NumberFormat(String),
    Configuration(String),
}

impl fmt::Display for KnnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO Error: {}", e),
            Self::DimensionMismatch { dim1, dim2 } => {
                write!(f, "Dimension mismatch: dim1 = {}, dim2 = {}", dim1, dim2)
            }
            Self::UnknownId(id) => write!(f, "Unknown point id: {}", id),
            Self::MissingAssociation(id) => {
                write!(f, "No local PCA associated with point id {}", id)
            }
            Self::DuplicateId(id) => write!(f, "Duplicate point id: {}", id),
            Self::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            Self::NumberFormat(s) => write!(f, "Number format error: {}", s),
            Self::Configuration(s) => write!(f, "Configuration error: {}", s),
        }
    }
}

impl std::error::Error for KnnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KnnError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for KnnError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl KnnError {
    /// Shorthand for [`KnnError::InvalidInput`].
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Fails with `DimensionMismatch` unless both dimensionalities agree.
    pub const fn check_dimensions(dim1: usize, dim2: usize) -> Result<(), Self> {
        if dim1 == dim2 {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { dim1, dim2 })
        }
    }
}

// Domain errors for the recommendation operations.
//
// Three outcomes reach the caller as errors: bad client input, a correctly
// resolved lookup that found nothing, and a store that could not answer.
// "No matches" (empty viewport, no usable vectors) is NOT an error; those
// paths return empty results.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Unrecognized category: {0}")]
    UnknownCategory(String),

    #[error("Unrecognized region name: {0}")]
    UnknownRegion(String),

    #[error("Viewport bound {field} is not a finite number: {value}")]
    InvalidViewportBound { field: &'static str, value: String },

    #[error("No hashtags found for region {name} (code {code})")]
    RegionNotFound { name: String, code: u16 },

    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    #[error("Place store unavailable: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Coarse classification used by the CLI and HTTP layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    NotFound,
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadInput => "bad_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

impl RecommendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendError::UnknownCategory(_)
            | RecommendError::UnknownRegion(_)
            | RecommendError::InvalidViewportBound { .. } => ErrorKind::BadInput,
            RecommendError::RegionNotFound { .. } | RecommendError::PlaceNotFound(_) => {
                ErrorKind::NotFound
            }
            RecommendError::Store(_) => ErrorKind::Unavailable,
        }
    }
}

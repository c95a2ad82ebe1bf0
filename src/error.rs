//! Unified error type.

use std::fmt;

/// Faults surfaced by [`ResponseBuilder::finalize`](crate::ResponseBuilder::finalize).
///
/// Application-level errors ("invalid id", "not found") belong in the
/// envelope via [`set_error`](crate::ResponseBuilder::set_error), not here.
/// This type reports the two ways delivering the envelope itself can go wrong.
#[derive(Debug)]
pub enum Error {
    /// The sink refused the body, e.g. the client hung up.
    Io(std::io::Error),
    /// The envelope could not be serialized. The fallback body has already
    /// been handed to the sink when this is returned.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)   => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e)   => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

//! Error types for hotcache

use std::collections::TryReserveError;
use std::fmt;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction and insertion
#[derive(Debug)]
pub enum Error {
    /// Capacity of zero requested at construction
    ZeroCapacity,

    /// Could not reserve space for the requested capacity
    OutOfMemory(TryReserveError),

    /// Key is already present in the cache
    KeyExists,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be greater than 0"),
            Error::OutOfMemory(e) => write!(f, "Cannot reserve cache space: {}", e),
            Error::KeyExists => write!(f, "Key is already present"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OutOfMemory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::OutOfMemory(err)
    }
}

//! Error types for the cache
//!
//! Get and Set never fail; these errors only cover the cleaner's runtime
//! plumbing, which is logged rather than surfaced to callers.

use thiserror::Error;

// == Cache Error Enum ==
/// Failures that can occur while bringing up the background cleaner.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The dedicated cleaner thread could not be spawned
    #[error("failed to spawn cleaner thread: {0}")]
    CleanerSpawn(#[source] std::io::Error),

    /// The fallback runtime for the cleaner thread could not be built
    #[error("failed to build cleaner runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display_and_source() {
        let err = CacheError::CleanerSpawn(io::Error::new(io::ErrorKind::Other, "no threads"));
        assert_eq!(err.to_string(), "failed to spawn cleaner thread: no threads");
        assert!(err.source().is_some());

        let err = CacheError::Runtime(io::Error::new(io::ErrorKind::Other, "no timer"));
        assert!(err.to_string().starts_with("failed to build cleaner runtime"));
    }
}

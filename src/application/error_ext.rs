//! Error conversion helpers for record fetching
//!
//! Provides an extension trait for cleaner error handling with location context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::is_remote;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add source location context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// source.fetch(&location)
    ///     .with_source_context(&location)?;
    /// ```
    fn with_source_context(self, location: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_source_context(self, location: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Fetch {
            location: location.to_string(),
            remote: is_remote(location),
            source: e,
        })
    }
}

//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add file-open context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use multilookup::base::context::IoResultExt;
    ///
    /// let file = File::open(path).open_context(path)?;
    /// // Error: "Failed to open hosts.txt: No such file or directory"
    /// ```
    fn open_context(self, path: &Path) -> Result<T, NetError>;

    /// Add read context to an IO error.
    fn read_context(self, path: &Path) -> Result<T, NetError>;

    /// Add output-write context to an IO error.
    fn write_context(self) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn open_context(self, path: &Path) -> Result<T, NetError> {
        self.map_err(|e| NetError::open_failed(path, e))
    }

    fn read_context(self, path: &Path) -> Result<T, NetError> {
        self.map_err(|e| NetError::read_failed(path, e))
    }

    fn write_context(self) -> Result<T, NetError> {
        self.map_err(NetError::write_failed)
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}

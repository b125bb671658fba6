//! Error conversion helpers for file and JSON operations
//!
//! Attach the path being processed to errors coming out of std and serde_json.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// std::fs::read_to_string(&path)
    ///     .with_path_context("read ontology", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait turning JSON errors into dataset errors for a file.
pub trait JsonResultExt<T> {
    fn in_dataset(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> JsonResultExt<T> for serde_json::Result<T> {
    fn in_dataset(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Dataset {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

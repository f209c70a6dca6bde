//! Error types for BookmarkUp.
//!
//! Library crates use [`BookmarkUpError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all BookmarkUp operations.
#[derive(Debug, thiserror::Error)]
pub enum BookmarkUpError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A node in the bookmark tree does not have the expected shape.
    #[error("malformed bookmark tree at {path}: {message}")]
    MalformedTree { path: String, message: String },

    /// The store contained no bookmarks to reorganize.
    #[error("no bookmarks found to reorganize")]
    EmptyInput,

    /// JSON parsing or serialization error.
    #[error("json error: {message}")]
    Json { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (lost records, invalid options, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The browser owning the store is still running.
    #[error("{name} is still running")]
    BrowserRunning { name: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BookmarkUpError>;

impl BookmarkUpError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-tree error for the node at `path`.
    pub fn malformed(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MalformedTree {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a JSON error from any displayable message.
    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for BookmarkUpError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BookmarkUpError::config("missing bookmarks path");
        assert_eq!(err.to_string(), "config error: missing bookmarks path");

        let err = BookmarkUpError::malformed("/roots/other/children/2", "missing `type`");
        assert_eq!(
            err.to_string(),
            "malformed bookmark tree at /roots/other/children/2: missing `type`"
        );

        let err = BookmarkUpError::BrowserRunning {
            name: "Brave".into(),
        };
        assert!(err.to_string().contains("Brave"));
    }

    #[test]
    fn json_errors_convert() {
        let err: BookmarkUpError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, BookmarkUpError::Json { .. }));
    }
}

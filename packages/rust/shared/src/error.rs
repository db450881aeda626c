//! Error types for docconf.
//!
//! Library crates use [`DocConfError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every variant is an authoring error in the bundle or its inputs. None of
//! them are retried; the bundle has to be corrected and the build re-run.

use std::path::PathBuf;

/// Top-level error type for all docconf operations.
#[derive(Debug, thiserror::Error)]
pub enum DocConfError {
    /// No link template is registered under this name.
    #[error("unknown link template '{name}'")]
    UnknownTemplate { name: String },

    /// No version entry is registered for this library.
    #[error("unknown library '{library}'")]
    UnknownLibrary { library: String },

    /// A link template does not contain exactly one `%s` slot.
    #[error("malformed link template '{name}': pattern {pattern:?} must contain exactly one %s")]
    MalformedTemplate { name: String, pattern: String },

    /// The detected toolchain version falls outside the accepted range.
    #[error("toolchain version {detected} is outside the supported range [{min}, {max}]")]
    ToolchainVersionOutOfRange {
        detected: String,
        min: String,
        max: String,
    },

    /// A library version still holds a build-time placeholder token.
    #[error("library '{library}' still has unresolved placeholder {token}")]
    UnresolvedPlaceholder { library: String, token: String },

    /// Application config loading error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Bundle source parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Data validation error (bad version string, reversed range, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocConfError>;

impl DocConfError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    pub fn unknown_template(name: impl Into<String>) -> Self {
        Self::UnknownTemplate { name: name.into() }
    }

    pub fn unknown_library(library: impl Into<String>) -> Self {
        Self::UnknownLibrary {
            library: library.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocConfError::unknown_template("ghc-bug");
        assert_eq!(err.to_string(), "unknown link template 'ghc-bug'");

        let err = DocConfError::ToolchainVersionOutOfRange {
            detected: "15.0.7".into(),
            min: "10".into(),
            max: "14".into(),
        };
        assert_eq!(
            err.to_string(),
            "toolchain version 15.0.7 is outside the supported range [10, 14]"
        );

        let err = DocConfError::validation("llvm range reversed");
        assert!(err.to_string().contains("reversed"));
    }

    #[test]
    fn malformed_template_mentions_pattern() {
        let err = DocConfError::MalformedTemplate {
            name: "ghc-wiki".into(),
            pattern: "https://example.com/wiki".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ghc-wiki"));
        assert!(msg.contains("https://example.com/wiki"));
    }
}

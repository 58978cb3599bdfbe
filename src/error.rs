//! Typed failures raised during configuration discovery.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or patching a configuration.
///
/// Absence of a source (missing file, unset environment variable, empty
/// document) is never an error; it is modeled as an empty document and the
/// chain moves on to the next candidate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file has no extension, or one outside the built-in set, and no
    /// custom parser was supplied.
    #[error(
        "cannot select a parser for {path}: only .json, .yaml and .yml are \
         parsed natively, pass a custom parser for other formats"
    )]
    UnknownFileFormat {
        /// Path of the file that could not be dispatched.
        path: PathBuf,
    },

    /// The selected parser rejected the file content.
    #[error("failed to parse {path}: {message}")]
    ParseFailure {
        /// Path of the file that failed to parse.
        path: PathBuf,
        /// The parser's own failure description.
        message: String,
    },

    /// `get()` or `then_patch_with()` was invoked while no source in the
    /// chain had been satisfied.
    #[error("no configuration found in the source chain")]
    NoConfigFound,

    /// The file exists but its content could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The resolved document did not match the requested type.
    #[error("configuration does not match the requested type: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Result type for configuration discovery operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

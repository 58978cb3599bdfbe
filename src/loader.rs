//! Configuration file loading.
//!
//! Files are parsed by extension, with JSON and YAML built in. A missing file
//! is not an error here: it loads as an empty document, which a source chain
//! treats as "no match".

use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::{BoxError, Document};

/// File formats with built-in parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Selects a format from a bare extension.
    ///
    /// Matching is exact: `json` selects JSON, `yaml` and `yml` select YAML,
    /// anything else (including different casing) selects nothing.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Selects a format from a path's extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ConfigError::UnknownFileFormat {
                path: path.to_path_buf(),
            })
    }

    fn parse(self, text: &str) -> Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|error| error.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|error| error.to_string()),
        }
    }
}

/// Load a configuration document from `path`.
///
/// A missing file yields an empty document rather than an error, so a
/// candidate path that does not exist simply fails to match in a source
/// chain. For files that do exist, the parser is selected by extension via
/// [`FileFormat::from_path`].
pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<Document> {
    load(path.as_ref(), None)
}

/// Load a configuration document from `path` using a custom parser.
///
/// The parser receives the raw file contents and its result is used directly,
/// without consulting the extension, so any format can be handled. A parser
/// error surfaces as [`ConfigError::ParseFailure`] wrapping its message. A
/// missing file still yields an empty document without invoking the parser.
pub fn load_file_with<P>(path: impl AsRef<Path>, parser: P) -> ConfigResult<Document>
where
    P: Fn(&str) -> Result<Document, BoxError> + Send + Sync,
{
    load(path.as_ref(), Some(&parser))
}

fn load(
    path: &Path,
    parser: Option<&(dyn Fn(&str) -> Result<Document, BoxError> + Send + Sync)>,
) -> ConfigResult<Document> {
    if !path.exists() {
        return Ok(Document::new());
    }
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    match parser {
        Some(parse) => parse(&text).map_err(|error| ConfigError::ParseFailure {
            path: path.to_path_buf(),
            message: error.to_string(),
        }),
        None => {
            let value = FileFormat::from_path(path)?
                .parse(&text)
                .map_err(|message| ConfigError::ParseFailure {
                    path: path.to_path_buf(),
                    message,
                })?;
            into_document(value, path)
        }
    }
}

/// Coerce a parsed top-level value into a document.
///
/// Null is treated as an empty document, matching an empty YAML file. Any
/// other non-mapping top level is a parse failure.
fn into_document(value: Value, path: &Path) -> ConfigResult<Document> {
    match value {
        Value::Object(document) => Ok(document),
        Value::Null => Ok(Document::new()),
        other => Err(ConfigError::ParseFailure {
            path: path.to_path_buf(),
            message: format!("top level must be a mapping, found {}", value_kind(&other)),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

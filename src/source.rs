//! Configuration source descriptions.
//!
//! A [`Source`] names where a document comes from without reading anything;
//! resolution happens in one place so chain and patch phases treat files,
//! environment prototypes and inline objects uniformly.

use std::fmt;
use std::path::PathBuf;

use crate::env::{EnvReader, Prototype, project, prototype_json};
use crate::error::ConfigResult;
use crate::loader::{load_file, load_file_with};
use crate::{BoxedParser, Document};

/// One candidate origin for configuration data.
pub enum Source {
    /// A file on disk, optionally paired with a custom parser.
    File {
        path: PathBuf,
        parser: Option<BoxedParser>,
    },
    /// An environment prototype, projected at resolution time.
    Env(Prototype),
    /// An inline document, used as-is.
    Object(Document),
}

impl Source {
    /// A file parsed by extension.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            parser: None,
        }
    }

    /// A file parsed with `parser`, regardless of extension.
    pub fn file_with<P>(path: impl Into<PathBuf>, parser: P) -> Self
    where
        P: Fn(&str) -> Result<Document, crate::BoxError> + Send + Sync + 'static,
    {
        Self::File {
            path: path.into(),
            parser: Some(Box::new(parser)),
        }
    }

    /// An environment prototype.
    pub fn env(prototype: Prototype) -> Self {
        Self::Env(prototype)
    }

    /// An inline document.
    pub fn object(document: Document) -> Self {
        Self::Object(document)
    }

    /// Resolve this source into a document.
    ///
    /// Missing files and unsatisfied prototypes resolve to an empty document;
    /// only file access and parsing can fail.
    pub fn resolve(self, env: &dyn EnvReader) -> ConfigResult<Document> {
        match self {
            Self::File { path, parser: None } => load_file(path),
            Self::File {
                path,
                parser: Some(parser),
            } => load_file_with(path, parser),
            Self::Env(prototype) => Ok(project(&prototype, env)),
            Self::Object(document) => Ok(document),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, parser: None } => write!(f, "file {}", path.display()),
            Self::File {
                path,
                parser: Some(_),
            } => write!(f, "file {} (custom parser)", path.display()),
            Self::Env(prototype) => {
                write!(f, "environment prototype {}", prototype_json(prototype))
            }
            Self::Object(_) => write!(f, "config object"),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, parser } => f
                .debug_struct("File")
                .field("path", path)
                .field("parser", &parser.as_ref().map(|_| "<custom>"))
                .finish(),
            Self::Env(prototype) => f.debug_tuple("Env").field(prototype).finish(),
            Self::Object(document) => f.debug_tuple("Object").field(document).finish(),
        }
    }
}

//! Patch application phase.
//!
//! After a chain commits, patches layer on top of the committed document.
//! Unlike chain candidates there is no first-match short circuit: every
//! non-empty patch merges in call order, later patches winning per key.

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::env::{EnvReader, Prototype, project, prototype_json};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::source::Source;
use crate::{BoxError, Document, LogSink};

/// Applies overriding layers to a committed configuration document.
///
/// Obtained from [`SourceChain::then_patch_with`](crate::SourceChain::then_patch_with),
/// which guarantees a base document exists before any patch lands.
pub struct Patcher {
    document: Document,
    sink: LogSink,
    env: Box<dyn EnvReader>,
}

impl Patcher {
    pub(crate) fn new(document: Document, sink: LogSink, env: Box<dyn EnvReader>) -> Self {
        Self {
            document,
            sink,
            env,
        }
    }

    /// Patches with a file.
    ///
    /// A missing file contributes nothing; loader errors propagate.
    pub fn config_file(self, path: impl Into<PathBuf>) -> ConfigResult<Self> {
        self.apply(Source::file(path))
    }

    /// Patches with a custom-parsed file.
    pub fn config_file_with<P>(self, path: impl Into<PathBuf>, parser: P) -> ConfigResult<Self>
    where
        P: Fn(&str) -> Result<Document, BoxError> + Send + Sync + 'static,
    {
        self.apply(Source::file_with(path, parser))
    }

    /// Patches with an environment prototype.
    ///
    /// An unsatisfied prototype contributes nothing; this can never fail.
    pub fn env(mut self, prototype: Prototype) -> Self {
        let message = format!(
            "patched with environment prototype {}",
            prototype_json(&prototype)
        );
        let document = project(&prototype, self.env.as_ref());
        self.merge_if_non_empty(document, &message);
        self
    }

    #[deprecated(since = "0.3.0", note = "renamed to `env`")]
    pub fn patch_with_env(self, prototype: Prototype) -> Self {
        self.env(prototype)
    }

    /// Patches with an inline document.
    pub fn object(mut self, document: Document) -> Self {
        self.merge_if_non_empty(document, "patched with config object");
        self
    }

    /// Patches with an arbitrary [`Source`].
    pub fn apply(mut self, source: Source) -> ConfigResult<Self> {
        // Formatted up front: resolution consumes the source.
        let message = format!("patched with {source}");
        let document = source.resolve(self.env.as_ref())?;
        self.merge_if_non_empty(document, &message);
        Ok(self)
    }

    /// Borrows the document in its current patched state.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the patched document. Applying zero patches is valid.
    pub fn get(self) -> Document {
        self.document
    }

    /// Deserializes the patched document into `T`.
    pub fn get_as<T: DeserializeOwned>(self) -> ConfigResult<T> {
        serde_json::from_value(Value::Object(self.document)).map_err(ConfigError::Deserialize)
    }

    fn merge_if_non_empty(&mut self, document: Document, message: &str) {
        if document.is_empty() {
            return;
        }
        deep_merge(&mut self.document, document);
        (self.sink)(message);
    }
}

impl fmt::Debug for Patcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patcher")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

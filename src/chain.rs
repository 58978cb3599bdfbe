//! Source resolution chain.
//!
//! A chain tries candidate sources in order and commits the first one that
//! yields a non-empty document. Candidates after the commit are ignored
//! without being read, so unreadable fallback paths cost nothing once a
//! source has matched.

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::env::{EnvReader, ProcessEnv, Prototype, project, prototype_json};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::patch::Patcher;
use crate::source::Source;
use crate::{BoxError, Document, LogSink};

/// Entry point for configuration discovery.
///
/// Holds the collaborators every chain needs: a log sink and an environment
/// reader. The defaults log through [`tracing::debug!`] and read the process
/// environment; both can be replaced before the first candidate is tried.
///
/// ```no_run
/// use config_discovery::Discovery;
/// use serde_json::json;
///
/// let defaults = json!({"retries": 3}).as_object().cloned().unwrap();
/// let config = Discovery::new()
///     .from_file("missing.yaml")?
///     .or_object(defaults)
///     .get()?;
/// assert_eq!(config["retries"], 3);
/// # Ok::<(), config_discovery::ConfigError>(())
/// ```
pub struct Discovery {
    sink: LogSink,
    env: Box<dyn EnvReader>,
}

impl Discovery {
    /// Creates an entry with the default sink and the process environment.
    pub fn new() -> Self {
        Self {
            sink: Box::new(|message: &str| tracing::debug!("{}", message)),
            env: Box::new(ProcessEnv),
        }
    }

    /// Replaces the log sink invoked on commits and applied patches.
    pub fn with_logger(mut self, logger: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sink = Box::new(logger);
        self
    }

    /// Replaces the environment reader used for prototype projection.
    pub fn with_env(mut self, env: impl EnvReader + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Starts a chain with a file candidate.
    pub fn from_file(self, path: impl Into<PathBuf>) -> ConfigResult<SourceChain> {
        self.into_chain().or_file(path)
    }

    /// Starts a chain with a custom-parsed file candidate.
    pub fn from_file_with<P>(self, path: impl Into<PathBuf>, parser: P) -> ConfigResult<SourceChain>
    where
        P: Fn(&str) -> Result<Document, BoxError> + Send + Sync + 'static,
    {
        self.into_chain().or_file_with(path, parser)
    }

    /// Starts a chain with an environment prototype candidate.
    pub fn from_env(self, prototype: Prototype) -> SourceChain {
        self.into_chain().or_env(prototype)
    }

    /// Starts a chain with an inline document candidate.
    pub fn from_object(self, document: Document) -> SourceChain {
        self.into_chain().or_object(document)
    }

    /// Starts a chain with an arbitrary [`Source`] candidate.
    pub fn from_source(self, source: Source) -> ConfigResult<SourceChain> {
        self.into_chain().or_source(source)
    }

    fn into_chain(self) -> SourceChain {
        SourceChain {
            document: Document::new(),
            committed: false,
            sink: self.sink,
            env: self.env,
        }
    }
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery").finish_non_exhaustive()
    }
}

/// An in-progress resolution over ordered candidate sources.
///
/// While seeking, each `or_*` call resolves its source; the first non-empty
/// document commits the chain. Afterwards every `or_*` call returns the chain
/// unchanged without touching the filesystem or the environment.
pub struct SourceChain {
    document: Document,
    committed: bool,
    sink: LogSink,
    env: Box<dyn EnvReader>,
}

impl SourceChain {
    /// Tries a file as the next candidate.
    ///
    /// A missing file simply does not match. Loader errors (unknown format,
    /// unreadable or malformed contents) propagate while the chain is still
    /// seeking.
    pub fn or_file(self, path: impl Into<PathBuf>) -> ConfigResult<Self> {
        self.or_source(Source::file(path))
    }

    /// Tries a custom-parsed file as the next candidate.
    pub fn or_file_with<P>(self, path: impl Into<PathBuf>, parser: P) -> ConfigResult<Self>
    where
        P: Fn(&str) -> Result<Document, BoxError> + Send + Sync + 'static,
    {
        self.or_source(Source::file_with(path, parser))
    }

    #[deprecated(since = "0.3.0", note = "renamed to `or_file`")]
    pub fn or(self, path: impl Into<PathBuf>) -> ConfigResult<Self> {
        self.or_file(path)
    }

    /// Tries an environment prototype as the next candidate.
    ///
    /// An unsatisfied prototype projects to an empty document and does not
    /// match; this can never fail.
    pub fn or_env(mut self, prototype: Prototype) -> Self {
        if self.committed {
            return self;
        }
        let message = found_message(format!(
            "environment prototype {}",
            prototype_json(&prototype)
        ));
        let document = project(&prototype, self.env.as_ref());
        self.commit_if_non_empty(document, &message);
        self
    }

    /// Tries an inline document as the next candidate.
    ///
    /// Commits unless the document is empty; this can never fail.
    pub fn or_object(mut self, document: Document) -> Self {
        if self.committed {
            return self;
        }
        let message = found_message("config object");
        self.commit_if_non_empty(document, &message);
        self
    }

    /// Tries an arbitrary [`Source`] as the next candidate.
    pub fn or_source(mut self, source: Source) -> ConfigResult<Self> {
        if self.committed {
            return Ok(self);
        }
        // Formatted up front: resolution consumes the source.
        let message = found_message(&source);
        let document = source.resolve(self.env.as_ref())?;
        self.commit_if_non_empty(document, &message);
        Ok(self)
    }

    /// Whether a candidate has matched yet.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Moves into the patch phase.
    ///
    /// Fails with [`ConfigError::NoConfigFound`] if no candidate matched.
    pub fn then_patch_with(self) -> ConfigResult<Patcher> {
        if !self.committed {
            return Err(ConfigError::NoConfigFound);
        }
        Ok(Patcher::new(self.document, self.sink, self.env))
    }

    /// Returns the committed document.
    ///
    /// Fails with [`ConfigError::NoConfigFound`] if no candidate matched; use
    /// [`get_or_default`](Self::get_or_default) to fall back to an empty
    /// document instead.
    pub fn get(self) -> ConfigResult<Document> {
        if !self.committed {
            return Err(ConfigError::NoConfigFound);
        }
        Ok(self.document)
    }

    /// Returns the committed document, or an empty one if nothing matched.
    pub fn get_or_default(self) -> Document {
        self.document
    }

    /// Deserializes the committed document into `T`.
    pub fn get_as<T: DeserializeOwned>(self) -> ConfigResult<T> {
        let document = self.get()?;
        serde_json::from_value(Value::Object(document)).map_err(ConfigError::Deserialize)
    }

    fn commit_if_non_empty(&mut self, document: Document, message: &str) {
        if document.is_empty() {
            return;
        }
        deep_merge(&mut self.document, document);
        self.committed = true;
        (self.sink)(message);
    }
}

impl fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceChain")
            .field("document", &self.document)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}

fn found_message(what: impl fmt::Display) -> String {
    format!("{what} found first, will use as configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct FakeEnv(HashMap<String, String>);

    impl EnvReader for FakeEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    fn fake_env(pairs: &[(&str, &str)]) -> FakeEnv {
        FakeEnv(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn prototype(value: Value) -> Prototype {
        serde_json::from_value(value).unwrap()
    }

    fn capture() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&log);
        (log, move |message: &str| {
            writer.lock().unwrap().push(message.to_string());
        })
    }

    #[test]
    fn test_first_non_empty_candidate_wins() {
        let config = Discovery::new()
            .from_object(Document::new())
            .or_object(doc(json!({"winner": 1})))
            .or_object(doc(json!({"winner": 2, "extra": true})))
            .get()
            .unwrap();
        assert_eq!(config, doc(json!({"winner": 1})));
    }

    #[test]
    fn test_empty_object_does_not_commit() {
        let chain = Discovery::new().from_object(Document::new());
        assert!(!chain.is_committed());
    }

    #[test]
    fn test_satisfied_prototype_commits() {
        let chain = Discovery::new()
            .with_env(fake_env(&[("APP_PORT", "8080")]))
            .from_env(prototype(json!({"port": "APP_PORT"})));
        assert!(chain.is_committed());
        assert_eq!(chain.get().unwrap(), doc(json!({"port": "8080"})));
    }

    #[test]
    fn test_unsatisfied_prototype_falls_through() {
        let config = Discovery::new()
            .with_env(fake_env(&[]))
            .from_env(prototype(json!({"port": "APP_PORT"})))
            .or_object(doc(json!({"port": 3000})))
            .get()
            .unwrap();
        assert_eq!(config, doc(json!({"port": 3000})));
    }

    #[test]
    fn test_strict_get_fails_while_seeking() {
        let result = Discovery::new().from_object(Document::new()).get();
        assert!(matches!(result, Err(ConfigError::NoConfigFound)));
    }

    #[test]
    fn test_get_or_default_yields_empty_while_seeking() {
        let config = Discovery::new()
            .from_object(Document::new())
            .get_or_default();
        assert!(config.is_empty());
    }

    #[test]
    fn test_then_patch_with_fails_while_seeking() {
        let result = Discovery::new()
            .from_object(Document::new())
            .then_patch_with();
        assert!(matches!(result, Err(ConfigError::NoConfigFound)));
    }

    #[test]
    fn test_commit_emits_one_message() {
        let (log, sink) = capture();
        let _ = Discovery::new()
            .with_logger(sink)
            .from_object(doc(json!({"a": 1})))
            .or_object(doc(json!({"b": 2})));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["config object found first, will use as configuration".to_string()]
        );
    }

    #[test]
    fn test_env_commit_message_names_prototype() {
        let (log, sink) = capture();
        let _ = Discovery::new()
            .with_logger(sink)
            .with_env(fake_env(&[("APP_PORT", "8080")]))
            .from_env(prototype(json!({"port": "APP_PORT"})));
        let messages = log.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(r#"environment prototype {"port":"APP_PORT"}"#));
    }

    #[test]
    fn test_get_as_deserializes_committed_document() {
        #[derive(serde::Deserialize)]
        struct Server {
            host: String,
            port: u16,
        }

        let server: Server = Discovery::new()
            .from_object(doc(json!({"host": "localhost", "port": 8080})))
            .get_as()
            .unwrap();
        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_get_as_reports_shape_mismatch() {
        #[derive(serde::Deserialize)]
        struct Server {
            #[allow(dead_code)]
            port: u16,
        }

        let result: ConfigResult<Server> = Discovery::new()
            .from_object(doc(json!({"port": "not a number"})))
            .get_as();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }
}

//! Environment prototype projection.
//!
//! A prototype mirrors the shape of the configuration document, with leaves
//! naming the environment variables that supply each field. Projection reads
//! those variables through an [`EnvReader`] and produces a document with the
//! same shape, or an empty one if any variable is unsatisfied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Document;

/// Source of environment variables for prototype projection.
///
/// The readers are injected rather than read from ambient process state, so
/// tests and embedders can supply a fixed environment.
pub trait EnvReader: Send + Sync {
    /// Returns the value of `name`, or `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads variables from the process environment via [`std::env::var`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Shape template for an environment-sourced document.
///
/// Keys are the field names of the resulting document. A `BTreeMap` keeps the
/// serialized form stable, so log messages mentioning a prototype are
/// deterministic.
pub type Prototype = BTreeMap<String, PrototypeNode>;

/// One field of a [`Prototype`]: either a variable name or a nested prototype.
///
/// Serializes untagged, so prototypes read naturally from JSON or YAML:
///
/// ```
/// use config_discovery::Prototype;
///
/// let prototype: Prototype = serde_json::from_value(serde_json::json!({
///     "host": "APP_HOST",
///     "db": { "user": "APP_DB_USER" }
/// }))?;
/// assert_eq!(prototype.len(), 2);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrototypeNode {
    /// Name of the environment variable supplying this field.
    Var(String),
    /// Nested prototype, projected into a nested object.
    Branch(Prototype),
}

/// Project a prototype against an environment, all-or-nothing.
///
/// Each leaf is satisfied only by a set, non-empty variable; each branch only
/// by a non-empty projection of its nested prototype. The first unsatisfied
/// field short-circuits the level, and an empty nested result propagates
/// upward, so one missing variable anywhere yields an empty document overall.
pub fn project(prototype: &Prototype, env: &dyn EnvReader) -> Document {
    let mut result = Document::new();
    for (key, node) in prototype {
        let value = match node {
            PrototypeNode::Var(name) => env
                .var(name)
                .filter(|value| !value.is_empty())
                .map(Value::String),
            PrototypeNode::Branch(branch) => {
                let projected = project(branch, env);
                if projected.is_empty() {
                    None
                } else {
                    Some(Value::Object(projected))
                }
            }
        };
        match value {
            Some(value) => {
                result.insert(key.clone(), value);
            }
            // One unsatisfied field makes the whole level unsatisfied.
            None => return Document::new(),
        }
    }
    result
}

/// Compact JSON rendering of a prototype for log messages.
pub(crate) fn prototype_json(prototype: &Prototype) -> String {
    serde_json::to_string(prototype).unwrap_or_else(|_| "<prototype>".into())
}

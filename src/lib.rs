//! First-match configuration discovery with deep-merge patch layering.
//!
//! Configuration is assembled in two phases. A [`SourceChain`] walks candidate
//! sources in order (files, environment prototypes, inline objects) and
//! commits the first one that yields a non-empty document; later candidates
//! are then ignored without being read. A [`Patcher`] layers overriding
//! patches on top, every non-empty patch applying in call order.
//!
//! ```no_run
//! use config_discovery::Discovery;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), config_discovery::ConfigError> {
//! let defaults = json!({"log_level": "info", "port": 3000})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//!
//! let config = Discovery::new()
//!     .from_file("config.local.yaml")?
//!     .or_file("config.yaml")?
//!     .or_object(defaults)
//!     .then_patch_with()?
//!     .config_file("overrides.json")?
//!     .get();
//!
//! assert!(config.contains_key("port"));
//! # Ok(())
//! # }
//! ```
//!
//! Environment-sourced documents use a [`Prototype`]: a shape template whose
//! leaves name environment variables. Projection is all-or-nothing, so a
//! partially satisfied prototype contributes nothing instead of a partial
//! document:
//!
//! ```
//! use config_discovery::{Discovery, EnvReader, Prototype};
//!
//! struct StaticEnv;
//!
//! impl EnvReader for StaticEnv {
//!     fn var(&self, name: &str) -> Option<String> {
//!         (name == "APP_HOST").then(|| "db.internal".to_string())
//!     }
//! }
//!
//! let prototype: Prototype = serde_json::from_value(serde_json::json!({
//!     "host": "APP_HOST"
//! }))?;
//!
//! let config = Discovery::new()
//!     .with_env(StaticEnv)
//!     .from_env(prototype)
//!     .get()?;
//! assert_eq!(config["host"], "db.internal");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chain;
pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod patch;
pub mod source;

pub use chain::{Discovery, SourceChain};
pub use env::{EnvReader, ProcessEnv, Prototype, PrototypeNode, project};
pub use error::{ConfigError, ConfigResult};
pub use loader::{FileFormat, load_file, load_file_with};
pub use merge::deep_merge;
pub use patch::Patcher;
pub use source::Source;

use serde_json::Value;

/// A configuration document: a JSON object mapping keys to arbitrary values.
pub type Document = serde_json::Map<String, Value>;

/// Boxed error type accepted from custom parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A stored custom parser, as held by [`Source::file_with`].
pub type BoxedParser = Box<dyn Fn(&str) -> Result<Document, BoxError> + Send + Sync>;

/// Receiver for the one-line messages emitted on commits and applied patches.
pub type LogSink = Box<dyn Fn(&str) + Send + Sync>;

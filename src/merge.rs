//! Deep merge engine for configuration documents.
//!
//! Implements field-by-field merging where the source layer overrides the
//! target. Arrays are replaced entirely, not concatenated.

use crate::Document;
use serde_json::Value;
use serde_json::map::Entry;

/// Deep-merge `source` into `target`, in place.
///
/// - Object values merge recursively: keys in `source` override keys in `target`
/// - Arrays, strings, numbers, booleans and nulls replace the target value entirely
/// - Keys missing from `target`, or holding null there, are overwritten directly
///
/// There are no error conditions; the merge always succeeds structurally.
///
/// # Example
/// ```
/// use serde_json::json;
/// use config_discovery::{Document, deep_merge};
///
/// fn doc(value: serde_json::Value) -> Document {
///     value.as_object().cloned().unwrap()
/// }
///
/// let mut base = doc(json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// }));
/// let overlay = doc(json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// }));
/// deep_merge(&mut base, overlay);
/// assert_eq!(base, doc(json!({
///     "server": { "port": 9000, "host": "localhost" },
///     "features": ["c"]
/// })));
/// ```
pub fn deep_merge(target: &mut Document, source: Document) {
    for (key, incoming) in source {
        match target.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                // Both sides are objects: merge recursively.
                (Value::Object(existing), Value::Object(overlay)) => {
                    deep_merge(existing, overlay);
                }
                // Any other collision: the source value replaces the target's.
                (existing, incoming) => {
                    *existing = incoming;
                }
            },
        }
    }
}

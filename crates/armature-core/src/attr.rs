//! Rendering attribute maps.

use indexmap::IndexMap;

/// Insertion-ordered map of rendering attributes.
///
/// Iteration order is the order keys were first inserted, which keeps the
/// emitted graph description stable across identical builds.
pub type AttrMap = IndexMap<String, String>;

/// Builds an [`AttrMap`] from static key-value pairs.
pub fn from_pairs(pairs: &[(&str, &str)]) -> AttrMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Copies every entry of `overlay` into `base`. Explicit values win
/// key-by-key over whatever `base` already holds.
pub fn merge(base: &mut AttrMap, overlay: &AttrMap) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

//! Path-addressed rewriting of request and response bodies.
//!
//! Every node in a body is addressed by a dot-joined path built from the
//! caller's root prefix: object members contribute their key, array elements
//! their zero-based index. Rules are keyed by those paths:
//!
//! - `replacements["root.properties.sku"] = "Standard"` replaces the string
//!   found at that path.
//! - `replacements["key:root.properties.sku"] = "skuName"` renames the member
//!   key `sku` of the object at `root.properties`.
//! - `removes = ["root.properties.sku"]` drops the string at that path.
//!
//! Paths of descendants are always derived from the original keys and the
//! original array indices, never from renamed keys or compacted positions.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CoreResult;

/// Marker prefixed to a member path to address its key rather than its value.
pub const KEY_RULE_PREFIX: &str = "key:";

/// Replacement and removal rules for [`transform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRules {
    /// Value replacements by path, and key renames by `key:`-prefixed path
    #[serde(default)]
    pub replacements: HashMap<String, String>,
    /// Paths whose string value is dropped from the output
    #[serde(default)]
    pub removes: HashSet<String>,
}

impl TransformRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a YAML (or JSON) file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let rules: Self = serde_yaml::from_str(&content)?;
        debug!(
            "Loaded {} replacement and {} removal rules from {:?}",
            rules.replacements.len(),
            rules.removes.len(),
            path
        );
        Ok(rules)
    }

    /// Replace the string value at `path`.
    pub fn replace(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.replacements.insert(path.into(), value.into());
        self
    }

    /// Rename the member key addressed by `path` (parent path + "." + key).
    pub fn rename_key(mut self, path: impl AsRef<str>, new_key: impl Into<String>) -> Self {
        self.replacements
            .insert(format!("{}{}", KEY_RULE_PREFIX, path.as_ref()), new_key.into());
        self
    }

    /// Drop the string value at `path`.
    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.removes.insert(path.into());
        self
    }

    /// Layer `other` on top of these rules; its replacements win on conflict.
    pub fn merge(&mut self, other: TransformRules) {
        self.replacements.extend(other.replacements);
        self.removes.extend(other.removes);
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.removes.is_empty()
    }

    fn value_rule(&self, path: &str) -> Option<&str> {
        self.replacements.get(path).map(String::as_str)
    }

    /// An empty rename target leaves the key as is.
    fn key_rule(&self, path: &str) -> Option<&str> {
        self.replacements
            .get(&format!("{}{}", KEY_RULE_PREFIX, path))
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }

    fn is_removed(&self, path: &str) -> bool {
        self.removes.contains(path)
    }
}

/// Rewrite `value` located at `path` according to `rules`.
///
/// Returns `None` when the value itself is removed. With no rules at all the
/// input is handed back borrowed, without copying. Otherwise a fresh tree is
/// built; the input is never modified.
pub fn transform<'a>(value: &'a Value, rules: &TransformRules, path: &str) -> Option<Cow<'a, Value>> {
    if rules.is_empty() {
        return Some(Cow::Borrowed(value));
    }
    rewrite(value, rules, path).map(Cow::Owned)
}

/// Owned variant of [`transform`].
pub fn transform_owned(value: Value, rules: &TransformRules, path: &str) -> Option<Value> {
    if rules.is_empty() {
        return Some(value);
    }
    rewrite(&value, rules, path)
}

fn rewrite(value: &Value, rules: &TransformRules, path: &str) -> Option<Value> {
    match value {
        Value::Object(members) => {
            let mut rewritten = Map::new();
            for (key, member) in members {
                let member_path = format!("{}.{}", path, key);
                let Some(member) = rewrite(member, rules, &member_path) else {
                    continue;
                };
                let key = rules.key_rule(&member_path).unwrap_or(key);
                rewritten.insert(key.to_string(), member);
            }
            Some(Value::Object(rewritten))
        }
        Value::Array(elements) => {
            let rewritten = elements
                .iter()
                .enumerate()
                .filter_map(|(index, element)| {
                    rewrite(element, rules, &format!("{}.{}", path, index))
                })
                .collect();
            Some(Value::Array(rewritten))
        }
        Value::String(_) => {
            if let Some(replacement) = rules.value_rule(path) {
                return Some(Value::String(replacement.to_string()));
            }
            if rules.is_removed(path) {
                debug!("Removing value at {}", path);
                return None;
            }
            Some(value.clone())
        }
        // Numbers, booleans and null are never addressed by rules.
        other => Some(other.clone()),
    }
}

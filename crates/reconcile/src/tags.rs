//! Tag set reconciliation
//!
//! Computes which tags must be written and which must be removed to turn the
//! tags currently on an environment into the desired set. Keys owned by the
//! provider platform (the reserved prefix) are stripped from the current set
//! up front, skipped in the desired set, and never show up in either result.

use crate::types::Tags;
use std::collections::BTreeSet;

/// Prefix of tag keys owned by the provider platform
pub const RESERVED_TAG_PREFIX: &str = "aws:";

/// Copy of `tags` without keys starting with `prefix`
pub fn strip_reserved(tags: Option<&Tags>, prefix: &str) -> Tags {
    tags.map(|t| {
        t.iter()
            .filter(|(key, _)| !key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    })
    .unwrap_or_default()
}

/// Delta between current and desired tags
///
/// A key whose value changed appears only in `to_add`: the provider's tag
/// call overwrites existing keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub to_add: Tags,
    pub to_remove: BTreeSet<String>,
}

impl TagDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Reconciles a fixed current tag set against desired sets
#[derive(Debug, Clone)]
pub struct TagReconciler {
    current: Tags,
    prefix: String,
}

impl TagReconciler {
    /// Create a reconciler, stripping the default reserved prefix
    pub fn new(current: Option<&Tags>) -> Self {
        Self::with_prefix(current, RESERVED_TAG_PREFIX)
    }

    /// Create a reconciler, stripping keys that start with `prefix`
    pub fn with_prefix(current: Option<&Tags>, prefix: &str) -> Self {
        Self {
            current: strip_reserved(current, prefix),
            prefix: prefix.to_string(),
        }
    }

    /// Current tags after stripping
    pub fn current(&self) -> &Tags {
        &self.current
    }

    /// Tags to write: new keys plus keys whose value differs
    ///
    /// Values compare as equal when both are absent. Reserved keys are skipped.
    pub fn tags_to_add(&self, desired: Option<&Tags>) -> Tags {
        let Some(desired) = desired.filter(|d| !d.is_empty()) else {
            return Tags::new();
        };

        desired
            .iter()
            .filter(|(key, _)| !key.starts_with(&self.prefix))
            .filter(|(key, value)| self.current.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Keys to remove: present now, absent from `desired`
    ///
    /// Removal is driven by key presence only. A key present on both sides
    /// is kept even if one side's value is absent.
    pub fn tags_to_remove(&self, desired: Option<&Tags>) -> BTreeSet<String> {
        match desired {
            Some(desired) if !desired.is_empty() => self
                .current
                .keys()
                .filter(|key| !desired.contains_key(*key))
                .cloned()
                .collect(),
            _ => self.current.keys().cloned().collect(),
        }
    }

    /// Both halves of the delta
    pub fn delta(&self, desired: Option<&Tags>) -> TagDelta {
        TagDelta {
            to_add: self.tags_to_add(desired),
            to_remove: self.tags_to_remove(desired),
        }
    }
}

/// Render tags for logs as `{a="1", b=null}`
pub fn format_tags(tags: &Tags) -> String {
    let pairs: Vec<String> = tags
        .iter()
        .map(|(key, value)| match value {
            Some(v) => format!("{key}=\"{v}\""),
            None => format!("{key}=null"),
        })
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

/// Render keys for logs as `["a", "b"]`
pub fn format_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> String {
    let mut quoted: Vec<String> = keys.into_iter().map(|k| format!("\"{k}\"")).collect();
    quoted.sort();
    format!("[{}]", quoted.join(", "))
}

//! Comparing two snapshots into a key-level change set.
//!
//! [`diff`] is a pure function over two [`Snapshot`]s. Removals are marked
//! with an explicit [`Change::Removed`] sentinel rather than a null value,
//! so a key that legitimately holds `null` can still be distinguished from
//! one that disappeared.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::extract::Snapshot;

/// What happened to a single key between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Change {
    /// The key was added, or its value changed; carries the new value.
    Set(Value),
    /// The key was present before and is gone after.
    Removed,
}

/// The keys whose resolved value differed between two snapshots.
///
/// Produced once per refresh cycle, handed to listeners, and discarded.
/// Iteration order is the key order; only the key set is significant.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::collections::HashMap;
/// use strata::{diff, Change};
///
/// let before = HashMap::from([("a".to_string(), json!(1))]);
/// let after = HashMap::from([("a".to_string(), json!(2))]);
///
/// let changes = diff(&before, &after);
/// assert_eq!(changes.get("a"), Some(&Change::Set(json!(2))));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    changes: BTreeMap<String, Change>,
}

impl ChangeSet {
    /// Returns the change recorded for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.changes.get(key)
    }

    /// Returns true if the key changed in either direction.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    /// Returns the set of changed key names.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<String> {
        self.changes.keys().cloned().collect()
    }

    /// Returns the number of changed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if no key changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates changes in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Change> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a String, &'a Change);
    type IntoIter = btree_map::Iter<'a, String, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Computes the key-level difference between two snapshots.
///
/// - a key present only in `before` yields [`Change::Removed`];
/// - a key present in both with unequal values yields [`Change::Set`] with
///   the after value (`Value` equality is null-safe: two nulls are equal);
/// - a key present only in `after` yields [`Change::Set`];
/// - unchanged keys are absent from the result.
#[must_use]
pub fn diff(before: &Snapshot, after: &Snapshot) -> ChangeSet {
    let mut changes = BTreeMap::new();

    for (key, old_value) in before {
        match after.get(key) {
            None => {
                changes.insert(key.clone(), Change::Removed);
            }
            Some(new_value) if new_value != old_value => {
                changes.insert(key.clone(), Change::Set(new_value.clone()));
            }
            Some(_) => {}
        }
    }

    for (key, new_value) in after {
        if !before.contains_key(key) {
            changes.insert(key.clone(), Change::Set(new_value.clone()));
        }
    }

    ChangeSet { changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(pairs: &[(&str, Value)]) -> Snapshot {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_identical_snapshots_yield_empty_diff() {
        let a = snapshot(&[("a", json!(1)), ("b", json!("two"))]);
        let changes = diff(&a, &a.clone());
        assert!(changes.is_empty());
        assert_eq!(changes.len(), 0);
    }

    #[test]
    fn test_addition_and_removal() {
        let before = snapshot(&[("a", json!(1)), ("b", json!(2))]);
        let after = snapshot(&[("a", json!(1)), ("c", json!(3))]);

        let changes = diff(&before, &after);
        assert_eq!(changes.get("b"), Some(&Change::Removed));
        assert_eq!(changes.get("c"), Some(&Change::Set(json!(3))));
        assert!(!changes.contains("a"));
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_value_change_detection() {
        let before = snapshot(&[("a", json!(1))]);
        let after = snapshot(&[("a", json!(2))]);

        let changes = diff(&before, &after);
        assert_eq!(changes.get("a"), Some(&Change::Set(json!(2))));
    }

    #[test]
    fn test_null_safe_equality() {
        let both_null = diff(
            &snapshot(&[("a", Value::Null)]),
            &snapshot(&[("a", Value::Null)]),
        );
        assert!(both_null.is_empty());

        let null_to_value = diff(
            &snapshot(&[("a", Value::Null)]),
            &snapshot(&[("a", json!(1))]),
        );
        assert_eq!(null_to_value.get("a"), Some(&Change::Set(json!(1))));

        let value_to_null = diff(
            &snapshot(&[("a", json!(1))]),
            &snapshot(&[("a", Value::Null)]),
        );
        assert_eq!(value_to_null.get("a"), Some(&Change::Set(Value::Null)));
    }

    #[test]
    fn test_removed_is_distinct_from_set_null() {
        let removed = diff(&snapshot(&[("a", Value::Null)]), &snapshot(&[]));
        assert_eq!(removed.get("a"), Some(&Change::Removed));
        assert_ne!(removed.get("a"), Some(&Change::Set(Value::Null)));
    }

    #[test]
    fn test_structured_values_compared_by_equality() {
        let before = snapshot(&[("list", json!([1, 2, 3]))]);
        let same = diff(&before, &snapshot(&[("list", json!([1, 2, 3]))]));
        assert!(same.is_empty());

        let changed = diff(&before, &snapshot(&[("list", json!([1, 2]))]));
        assert_eq!(changed.get("list"), Some(&Change::Set(json!([1, 2]))));
    }

    #[test]
    fn test_keys_returns_sorted_set() {
        let changes = diff(
            &snapshot(&[("z", json!(1)), ("a", json!(1))]),
            &snapshot(&[]),
        );
        let keys: Vec<String> = changes.keys().into_iter().collect();
        assert_eq!(keys, vec!["a".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_changeset_serializes() {
        let changes = diff(
            &snapshot(&[("gone", json!(1))]),
            &snapshot(&[("added", json!(2))]),
        );
        let payload = serde_json::to_string(&changes).unwrap();
        assert!(payload.contains("gone"));
        assert!(payload.contains("removed"));
        assert!(payload.contains("added"));
    }
}

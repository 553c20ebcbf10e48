//! Flattening a layered source list into a single snapshot.
//!
//! Extraction walks the source list in reverse iteration order (lowest
//! declared precedence first), so a plain last-write-wins map insert leaves
//! the highest-precedence value in place. Composites recurse with the same
//! reversed rule over their children, which preserves precedence
//! transitively through nesting.
//!
//! Extraction is best-effort by design: a dynamic source that cannot
//! enumerate its entries is skipped rather than failing the walk, at the
//! cost of under-reporting changes hidden in such a source.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::source::{is_standard, PropertySource, SourceKind};
use crate::sources::PropertySources;

/// A fully resolved key-to-value view of a source list at one point in time.
///
/// Snapshots are materialized on demand for diffing and never persisted.
pub type Snapshot = HashMap<String, Value>;

/// Flattens the source list into a snapshot honoring precedence.
///
/// Sources named in the standard substrate are excluded entirely: their
/// keys appear in no snapshot regardless of value. The substrate check
/// applies to the top-level list only; a nested child of a composite
/// contributes whatever its name.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::{extract, PropertySource, PropertySources};
///
/// let mut sources = PropertySources::new();
/// sources.add_last(PropertySource::map("overrides", [("a", json!(1))])).unwrap();
/// sources.add_last(PropertySource::map("defaults", [("a", json!(9)), ("b", json!(2))])).unwrap();
///
/// let snapshot = extract(&sources);
/// assert_eq!(snapshot["a"], json!(1)); // earlier source wins
/// assert_eq!(snapshot["b"], json!(2));
/// ```
#[must_use]
pub fn extract(sources: &PropertySources) -> Snapshot {
    let mut result = Snapshot::new();
    for source in sources.iter().rev() {
        if is_standard(source.name()) {
            continue;
        }
        fold_source(source, &mut result);
    }
    result
}

/// Folds one top-level source into the snapshot, swallowing enumeration
/// failures.
fn fold_source(source: &PropertySource, result: &mut Snapshot) {
    match source.kind() {
        SourceKind::Map(entries) => {
            for (key, value) in entries {
                result.insert(key.clone(), value.clone());
            }
        }
        SourceKind::Dynamic(dynamic) => match dynamic.entries() {
            Ok(entries) => result.extend(entries),
            Err(err) => {
                log::debug!("skipping source '{}' during extraction: {err}", source.name());
            }
        },
        SourceKind::Composite(children) => {
            if let Err(err) = fold_composite(children, result) {
                log::debug!(
                    "aborting composite '{}' during extraction: {err}",
                    source.name()
                );
            }
        }
    }
}

/// Folds a composite's children, reversed so earlier children win.
///
/// A child enumeration failure aborts the remainder of this composite's
/// walk; entries already folded stay in the snapshot. A nested composite
/// swallows its own failures and never aborts its parent.
fn fold_composite(children: &[PropertySource], result: &mut Snapshot) -> Result<()> {
    for child in children.iter().rev() {
        match child.kind() {
            SourceKind::Map(entries) => {
                for (key, value) in entries {
                    result.insert(key.clone(), value.clone());
                }
            }
            SourceKind::Dynamic(dynamic) => result.extend(dynamic.entries()?),
            SourceKind::Composite(grandchildren) => {
                if let Err(err) = fold_composite(grandchildren, result) {
                    log::debug!("aborting nested composite '{}': {err}", child.name());
                }
            }
        }
    }
    Ok(())
}

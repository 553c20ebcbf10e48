//! Merging a freshly built source list into the live one.
//!
//! The reconciler edits the live list in place: it replaces sources whose
//! names already exist (keeping their position), inserts genuinely new
//! sources next to the most recently matched anchor so the relative
//! precedence established at boot survives the merge, and never copies or
//! disturbs standard-substrate sources.

use crate::error::Result;
use crate::source::{is_standard, DEFAULT_PROPERTIES};
use crate::sources::PropertySources;

/// Merges `incoming` into `live` in place, preserving precedence.
///
/// Incoming sources are processed in declared order while tracking the last
/// name that matched an existing live source:
///
/// 1. a standard-substrate name is never copied; if the live list already
///    contains it, it still becomes the anchor for subsequent inserts;
/// 2. a name present in `live` is replaced in place and becomes the anchor;
/// 3. a new name is inserted immediately after the anchor, or before the
///    `default-properties` catch-all when no anchor exists yet, or appended
///    last when neither is present.
///
/// The anchor only advances on a match, never on an insertion, so a run of
/// consecutive brand-new sources lands in reverse declared order after the
/// anchor. That quirk is part of the observable contract and is preserved
/// deliberately.
///
/// # Errors
///
/// Never fails for any input this algorithm can produce against a live list
/// that upholds its own name-uniqueness invariant; an error here indicates
/// a programming-contract violation and is propagated as such.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::{reconcile, PropertySource, PropertySources};
///
/// let mut live: PropertySources = vec![
///     PropertySource::map("app-config", [("x", json!(1))]),
///     PropertySource::map("default-properties", [("z", json!(3))]),
/// ]
/// .into_iter()
/// .collect();
///
/// let incoming: PropertySources = vec![
///     PropertySource::map("app-config", [("x", json!(2))]),
///     PropertySource::map("feature-flags", [("f", json!(true))]),
/// ]
/// .into_iter()
/// .collect();
///
/// reconcile(&mut live, incoming).unwrap();
/// assert_eq!(live.names(), vec!["app-config", "feature-flags", "default-properties"]);
/// ```
pub fn reconcile(live: &mut PropertySources, incoming: PropertySources) -> Result<()> {
    let mut anchor: Option<String> = None;

    for source in incoming {
        let name = source.name().to_string();

        if is_standard(&name) {
            // Never copied, but a substrate source already present in the
            // live list still anchors subsequent inserts.
            if live.contains(&name) {
                anchor = Some(name);
            }
            continue;
        }

        if live.contains(&name) {
            live.replace(&name, source)?;
            anchor = Some(name);
        } else if let Some(anchor_name) = anchor.as_deref() {
            live.add_after(anchor_name, source)?;
        } else if live.contains(DEFAULT_PROPERTIES) {
            live.add_before(DEFAULT_PROPERTIES, source)?;
        } else {
            live.add_last(source)?;
        }
    }

    Ok(())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::source::PropertySource;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn arb_names() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::btree_set("[a-h]", 0..6)
            .prop_map(|set| set.into_iter().collect())
    }

    fn build(names: &[String]) -> PropertySources {
        names
            .iter()
            .map(|name| PropertySource::map(name.clone(), [("n", json!(name.clone()))]))
            .collect()
    }

    // The proptest! macro does not support doc comments on its tests, so
    // plain comments describe each property instead.
    proptest! {
        // Merging the same incoming list twice leaves the live name set
        // unchanged in size after the first merge.
        #[test]
        fn prop_second_merge_adds_nothing(
            live_names in arb_names(),
            incoming_names in arb_names(),
        ) {
            let mut live = build(&live_names);
            let incoming = build(&incoming_names);

            reconcile(&mut live, incoming.clone()).unwrap();
            let after_first: BTreeSet<String> =
                live.names().iter().map(ToString::to_string).collect();

            reconcile(&mut live, incoming).unwrap();
            let after_second: BTreeSet<String> =
                live.names().iter().map(ToString::to_string).collect();

            prop_assert_eq!(after_first, after_second);
        }

        // Every non-substrate incoming name is present after the merge and
        // every pre-existing live name survives it.
        #[test]
        fn prop_merge_is_total_and_preserving(
            live_names in arb_names(),
            incoming_names in arb_names(),
        ) {
            let mut live = build(&live_names);
            reconcile(&mut live, build(&incoming_names)).unwrap();

            for name in &incoming_names {
                if !crate::source::is_standard(name) {
                    prop_assert!(live.contains(name));
                }
            }
            for name in &live_names {
                prop_assert!(live.contains(name));
            }
        }
    }
}

//! The ordered, name-addressable list of property sources.
//!
//! [`PropertySources`] is the live model backing a running process's
//! configuration lookups: earlier entries take precedence over later ones.
//! Every mutation is positional and name-based (replace, insert before or
//! after a named anchor, append) and upholds a single invariant: no two
//! sources in the list share a name.
//!
//! The list is a plain vector with linear name lookups. The lists involved
//! hold a handful of sources, and a vector keeps the positional operations
//! trivial to reason about and test.

use std::slice::Iter;

use crate::error::{Error, Result};
use crate::source::PropertySource;

/// An ordered list of uniquely named property sources.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::{PropertySource, PropertySources};
///
/// let mut sources = PropertySources::new();
/// sources.add_last(PropertySource::map("defaults", [("a", json!(1))])).unwrap();
/// sources.add_first(PropertySource::map("overrides", [("a", json!(2))])).unwrap();
///
/// assert_eq!(sources.names(), vec!["overrides", "defaults"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertySources {
    sources: Vec<PropertySource>,
}

impl PropertySources {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sources in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if the list holds no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns true if a source with the given name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the source with the given name, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertySource> {
        self.position(name).map(|index| &self.sources[index])
    }

    /// Iterates the sources in precedence order (highest first).
    pub fn iter(&self) -> Iter<'_, PropertySource> {
        self.sources.iter()
    }

    /// Returns the source names in precedence order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(PropertySource::name).collect()
    }

    /// Inserts a source at the highest-precedence position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSource`] if the name is already present.
    pub fn add_first(&mut self, source: PropertySource) -> Result<()> {
        self.ensure_absent(source.name())?;
        self.sources.insert(0, source);
        Ok(())
    }

    /// Appends a source at the lowest-precedence position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSource`] if the name is already present.
    pub fn add_last(&mut self, source: PropertySource) -> Result<()> {
        self.ensure_absent(source.name())?;
        self.sources.push(source);
        Ok(())
    }

    /// Inserts a source immediately before the named anchor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceNotFound`] if the anchor is absent, or
    /// [`Error::DuplicateSource`] if the new name is already present.
    pub fn add_before(&mut self, anchor: &str, source: PropertySource) -> Result<()> {
        self.ensure_absent(source.name())?;
        let index = self.require_position(anchor)?;
        self.sources.insert(index, source);
        Ok(())
    }

    /// Inserts a source immediately after the named anchor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceNotFound`] if the anchor is absent, or
    /// [`Error::DuplicateSource`] if the new name is already present.
    pub fn add_after(&mut self, anchor: &str, source: PropertySource) -> Result<()> {
        self.ensure_absent(source.name())?;
        let index = self.require_position(anchor)?;
        self.sources.insert(index + 1, source);
        Ok(())
    }

    /// Replaces the named source in place, preserving its position.
    ///
    /// The replacement may carry a different name, as long as that name is
    /// not already taken by another source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceNotFound`] if `name` is absent, or
    /// [`Error::DuplicateSource`] if the replacement's name collides with a
    /// different existing source.
    pub fn replace(&mut self, name: &str, source: PropertySource) -> Result<()> {
        let index = self.require_position(name)?;
        if source.name() != name && self.contains(source.name()) {
            return Err(Error::DuplicateSource {
                name: source.name().to_string(),
            });
        }
        self.sources[index] = source;
        Ok(())
    }

    /// Removes and returns the named source, or `None` if absent.
    pub fn remove(&mut self, name: &str) -> Option<PropertySource> {
        let index = self.position(name)?;
        Some(self.sources.remove(index))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|source| source.name() == name)
    }

    fn require_position(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| Error::SourceNotFound {
            name: name.to_string(),
        })
    }

    fn ensure_absent(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            return Err(Error::DuplicateSource {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PropertySources {
    type Item = &'a PropertySource;
    type IntoIter = Iter<'a, PropertySource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

impl IntoIterator for PropertySources {
    type Item = PropertySource;
    type IntoIter = std::vec::IntoIter<PropertySource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

impl FromIterator<PropertySource> for PropertySources {
    /// Collects sources in precedence order.
    ///
    /// Duplicate names keep the first occurrence, matching the precedence
    /// rule that the earlier source wins.
    fn from_iter<I: IntoIterator<Item = PropertySource>>(iter: I) -> Self {
        let mut sources = Self::new();
        for source in iter {
            // First occurrence wins; later duplicates are dropped.
            let _ = sources.add_last(source);
        }
        sources
    }
}

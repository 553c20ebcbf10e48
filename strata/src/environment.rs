//! The live environment: property sources plus profile markers.
//!
//! Exactly one [`Environment`] backs a running process. It owns the ordered
//! source list and the active/default profile names, and answers ordinary
//! property lookups. The refresh machinery edits the source list in place
//! through [`Environment::sources_mut`]; it never swaps the environment for
//! a new object, because other components hold handles into it.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::source::PropertySource;
use crate::sources::PropertySources;

/// The process-wide shared handle to the live environment.
///
/// Ordinary readers take the lock briefly per lookup; they are intentionally
/// not serialized against a refresh in progress and may observe a partially
/// merged source list. That relaxed contract is deliberate; see
/// [`Refresher`](crate::refresh::Refresher).
pub type SharedEnvironment = Arc<RwLock<Environment>>;

/// A layered configuration environment.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::{Environment, PropertySource};
///
/// let mut env = Environment::new();
/// env.sources_mut()
///     .add_last(PropertySource::map("app-config", [("server.port", json!(8080))]))
///     .unwrap();
///
/// assert_eq!(env.get_property("server.port"), Some(json!(8080)));
/// assert_eq!(env.default_profiles(), ["default"]);
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    sources: PropertySources,
    active_profiles: Vec<String>,
    default_profiles: Vec<String>,
}

impl Environment {
    /// Creates an empty environment with the standard `default` profile.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sources(PropertySources::new())
    }

    /// Creates an environment around an existing source list.
    #[must_use]
    pub fn with_sources(sources: PropertySources) -> Self {
        Self {
            sources,
            active_profiles: Vec::new(),
            default_profiles: vec!["default".to_string()],
        }
    }

    /// Wraps this environment in the process-wide shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedEnvironment {
        Arc::new(RwLock::new(self))
    }

    /// Returns the ordered source list.
    #[must_use]
    pub fn sources(&self) -> &PropertySources {
        &self.sources
    }

    /// Returns the ordered source list for in-place mutation.
    pub fn sources_mut(&mut self) -> &mut PropertySources {
        &mut self.sources
    }

    /// Returns the active profile names.
    #[must_use]
    pub fn active_profiles(&self) -> &[String] {
        &self.active_profiles
    }

    /// Replaces the active profile names.
    pub fn set_active_profiles<I, S>(&mut self, profiles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_profiles = profiles.into_iter().map(Into::into).collect();
    }

    /// Returns the default profile names.
    #[must_use]
    pub fn default_profiles(&self) -> &[String] {
        &self.default_profiles
    }

    /// Replaces the default profile names.
    pub fn set_default_profiles<I, S>(&mut self, profiles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_profiles = profiles.into_iter().map(Into::into).collect();
    }

    /// Resolves a property against the source list, first match wins.
    ///
    /// Unlike extraction, ordinary lookups consult every source including
    /// the standard substrate; substrate exclusion applies to diffing only.
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<Value> {
        self.sources
            .iter()
            .find_map(|source: &PropertySource| source.get(key))
    }

    /// Returns true if the property resolves to some value.
    #[must_use]
    pub fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SYSTEM_PROPERTIES;
    use serde_json::json;

    fn sample_environment() -> Environment {
        let mut env = Environment::new();
        env.sources_mut()
            .add_last(PropertySource::map("overrides", [("a", json!("high"))]))
            .unwrap();
        env.sources_mut()
            .add_last(PropertySource::map(
                "defaults",
                [("a", json!("low")), ("b", json!("only-defaults"))],
            ))
            .unwrap();
        env
    }

    #[test]
    fn test_lookup_first_match_wins() {
        let env = sample_environment();
        assert_eq!(env.get_property("a"), Some(json!("high")));
        assert_eq!(env.get_property("b"), Some(json!("only-defaults")));
        assert_eq!(env.get_property("c"), None);
    }

    #[test]
    fn test_contains_property() {
        let env = sample_environment();
        assert!(env.contains_property("a"));
        assert!(!env.contains_property("missing"));
    }

    #[test]
    fn test_lookup_includes_standard_substrate() {
        let mut env = Environment::new();
        env.sources_mut()
            .add_last(PropertySource::map(
                SYSTEM_PROPERTIES,
                [("os.name", json!("linux"))],
            ))
            .unwrap();

        // Substrate sources answer ordinary lookups; they are only excluded
        // from diffing.
        assert_eq!(env.get_property("os.name"), Some(json!("linux")));
    }

    #[test]
    fn test_profiles() {
        let mut env = Environment::new();
        assert_eq!(env.default_profiles(), ["default"]);
        assert!(env.active_profiles().is_empty());

        env.set_active_profiles(["staging", "eu-west"]);
        env.set_default_profiles(["fallback"]);
        assert_eq!(env.active_profiles(), ["staging", "eu-west"]);
        assert_eq!(env.default_profiles(), ["fallback"]);
    }

    #[test]
    fn test_shared_handle() {
        let shared = sample_environment().into_shared();
        let value = shared
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get_property("a");
        assert_eq!(value, Some(json!("high")));
    }
}

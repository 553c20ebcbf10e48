//! Common test utilities for integration tests.
//!
//! This module provides fixture builders and stub collaborators for
//! exercising the refresh pipeline end to end.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;
use strata::source::DEFAULT_PROPERTIES;
use strata::{
    Bootstrap, BootstrapContext, BootstrapFailure, BootstrapOutcome, Environment, PropertySource,
    PropertySources, RefreshScope, SharedEnvironment,
};

/// Builds a mapping source from borrowed pairs.
pub fn map_source(name: &str, pairs: &[(&str, Value)]) -> PropertySource {
    PropertySource::map(name, pairs.iter().map(|(k, v)| (*k, v.clone())))
}

/// Builds a shared environment from an ordered list of sources.
pub fn shared_environment(sources: Vec<PropertySource>) -> SharedEnvironment {
    let sources: PropertySources = sources.into_iter().collect();
    Environment::with_sources(sources).into_shared()
}

/// A refresh scope that only counts how often it was asked to refresh.
#[derive(Default)]
pub struct CountingScope {
    refreshed: AtomicUsize,
}

impl CountingScope {
    pub fn count(&self) -> usize {
        self.refreshed.load(Ordering::SeqCst)
    }
}

/// Newtype over `Arc<CountingScope>` so the test crate can implement the
/// foreign `RefreshScope` trait without tripping the orphan rule.
pub struct CountingScopeHandle(pub Arc<CountingScope>);

impl RefreshScope for CountingScopeHandle {
    fn refresh_all(&self) {
        self.0.refreshed.fetch_add(1, Ordering::SeqCst);
    }
}

/// A bootstrap collaborator that re-reads one YAML file into a named
/// source on every call, overlaying it on the handed-in layers, the
/// shape of a real file-backed loader.
pub struct YamlFileBootstrap {
    pub source_name: String,
    pub path: PathBuf,
}

impl Bootstrap for YamlFileBootstrap {
    fn bootstrap(
        &self,
        context: BootstrapContext,
    ) -> std::result::Result<BootstrapOutcome, BootstrapFailure> {
        let yaml = std::fs::read_to_string(&self.path)
            .map_err(|err| BootstrapFailure::new(err.into()))?;
        let fresh = PropertySource::map_from_yaml(self.source_name.clone(), &yaml)
            .map_err(BootstrapFailure::new)?;

        let mut sources = context.sources;
        let result = if sources.contains(&self.source_name) {
            sources.replace(&self.source_name, fresh)
        } else if sources.contains(DEFAULT_PROPERTIES) {
            // Real file-backed loaders slot fresh sources above the
            // catch-all defaults rather than appending below them.
            sources.add_before(DEFAULT_PROPERTIES, fresh)
        } else {
            sources.add_last(fresh)
        };
        result.map_err(BootstrapFailure::new)?;

        Ok(BootstrapOutcome {
            sources,
            resources: None,
        })
    }
}

//! The refresh orchestrator.
//!
//! [`Refresher::refresh`] is the single externally callable operation: it
//! snapshots the live environment, asks the bootstrap collaborator for a
//! fresh source list built from the same inputs, merges that list into the
//! live environment in place, and reports exactly which keys resolved
//! differently afterwards.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError, RwLock};

use crate::bootstrap::{release_chain, Bootstrap, BootstrapContext, BootstrapOutcome};
use crate::diff::diff;
use crate::environment::SharedEnvironment;
use crate::error::Result;
use crate::extract::extract;
use crate::reconcile::reconcile;
use crate::source::REFRESH_ARGS;

/// Reacts to a completed refresh by discarding refresh-sensitive component
/// instances so they are lazily rebuilt against the new configuration.
pub trait RefreshScope: Send + Sync {
    /// Discards all refresh-sensitive instances.
    fn refresh_all(&self);
}

/// Receives the set of changed keys after each refresh.
///
/// Delivery is fire-and-forget from the refresher's perspective; listeners
/// run on the refreshing thread and should hand off any heavy work.
pub trait EnvironmentChangeListener: Send + Sync {
    /// Called once per refresh with the keys whose resolved value changed.
    fn on_environment_change(&self, keys: &BTreeSet<String>);
}

/// Coordinates a configuration refresh against the live environment.
///
/// At most one refresh is in flight per refresher: the whole sequence runs
/// under a dedicated mutex. Ordinary environment readers are deliberately
/// *not* serialized against it: they take the environment lock briefly per
/// lookup and may observe the source list between the before-snapshot and
/// the merge. That relaxed contract matches the behavior dependent systems
/// were built against; widening the lock would change it.
pub struct Refresher {
    environment: SharedEnvironment,
    bootstrap: Box<dyn Bootstrap>,
    scope: Box<dyn RefreshScope>,
    listeners: RwLock<Vec<Box<dyn EnvironmentChangeListener>>>,
    refresh_lock: Mutex<()>,
}

impl Refresher {
    /// Creates a refresher around the live environment and its
    /// collaborators.
    #[must_use]
    pub fn new(
        environment: SharedEnvironment,
        bootstrap: Box<dyn Bootstrap>,
        scope: Box<dyn RefreshScope>,
    ) -> Self {
        Self {
            environment,
            bootstrap,
            scope,
            listeners: RwLock::new(Vec::new()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the shared handle to the live environment.
    #[must_use]
    pub fn environment(&self) -> SharedEnvironment {
        SharedEnvironment::clone(&self.environment)
    }

    /// Registers a listener for change notifications.
    pub fn add_listener(&self, listener: Box<dyn EnvironmentChangeListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Reloads the external configuration and returns the changed keys.
    ///
    /// The sequence: snapshot the flattened view, bootstrap a fresh source
    /// list from the current layers and profiles (with the transient
    /// `refresh-args` marker at highest precedence), strip the marker,
    /// reconcile the fresh list into the live one, release every resource
    /// the collaborator acquired, snapshot again, diff, notify listeners,
    /// and signal the refresh scope.
    ///
    /// An empty set means no external configuration drift was detected;
    /// there is no partial-success return value.
    ///
    /// # Errors
    ///
    /// Propagates the bootstrap collaborator's failure after releasing any
    /// partially acquired resources; no partial merge occurs in that case.
    pub fn refresh(&self) -> Result<BTreeSet<String>> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (before, context) = {
            let environment = self
                .environment
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            (
                extract(environment.sources()),
                BootstrapContext::from_environment(&environment)?,
            )
        };

        let outcome = match self.bootstrap.bootstrap(context) {
            Ok(outcome) => outcome,
            Err(failure) => {
                // The bootstrap error wins; releasing is best-effort.
                release_chain(failure.resources);
                return Err(failure.error);
            }
        };
        let BootstrapOutcome {
            sources: mut incoming,
            resources,
        } = outcome;

        incoming.remove(REFRESH_ARGS);

        let merged = {
            let mut environment = self
                .environment
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            reconcile(environment.sources_mut(), incoming)
        };
        release_chain(resources);
        merged?;

        let after = {
            let environment = self
                .environment
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            extract(environment.sources())
        };

        let changes = diff(&before, &after);
        let keys = changes.keys();
        log::debug!("refresh complete, {} key(s) changed", keys.len());

        for listener in self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            listener.on_environment_change(&keys);
        }
        self.scope.refresh_all();

        Ok(keys)
    }
}

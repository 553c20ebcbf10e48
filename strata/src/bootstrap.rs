//! The bootstrap collaborator contract.
//!
//! A refresh does not load configuration itself. It hands the current
//! environment's layers and profiles to an external [`Bootstrap`]
//! collaborator, which re-runs whatever loading pipeline built the process's
//! configuration in the first place and returns a fresh source list, plus
//! any process resources it had to allocate along the way. Those resources
//! form a parent chain of [`Closable`] handles that the orchestrator
//! releases once the merge is done, or once the bootstrap has failed.

use serde_json::json;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::source::{PropertySource, REFRESH_ARGS};
use crate::sources::PropertySources;

/// Marker key telling the bootstrapped instance to keep side-effecting
/// subsystems (listeners, schedulers, exporters) disabled.
pub const SIDE_EFFECTS_KEY: &str = "strata.bootstrap.side-effects-enabled";

/// Marker key telling the bootstrapped instance not to pull in any sources
/// beyond those the live environment already knows about.
pub const ADDITIONAL_SOURCES_KEY: &str = "strata.bootstrap.additional-sources";

/// The input handed to the bootstrap collaborator.
///
/// Carries a copy of the live environment's layers with the transient
/// `refresh-args` marker prepended at highest precedence, plus the profile
/// name lists, so the fresh snapshot reflects the same logical environment
/// the process booted in rather than a blank one.
#[derive(Debug, Clone)]
pub struct BootstrapContext {
    /// Copy of the live source list, marker source first.
    pub sources: PropertySources,
    /// Active profile names of the live environment.
    pub active_profiles: Vec<String>,
    /// Default profile names of the live environment.
    pub default_profiles: Vec<String>,
}

impl BootstrapContext {
    /// Builds a context from the live environment.
    ///
    /// The layers are copied one by one rather than merged, so clashing
    /// source names cannot arise, and the `refresh-args` marker map is
    /// inserted at the highest-precedence position.
    ///
    /// # Errors
    ///
    /// Returns an error only if the live list already carries a source
    /// named `refresh-args`, which would be a leftover from a broken
    /// earlier refresh.
    pub fn from_environment(environment: &Environment) -> Result<Self> {
        let mut sources = environment.sources().clone();
        sources.add_first(PropertySource::map(
            REFRESH_ARGS,
            [
                (SIDE_EFFECTS_KEY, json!(false)),
                (ADDITIONAL_SOURCES_KEY, json!("")),
            ],
        ))?;

        Ok(Self {
            sources,
            active_profiles: environment.active_profiles().to_vec(),
            default_profiles: environment.default_profiles().to_vec(),
        })
    }
}

/// A fresh source list plus the resources acquired while building it.
pub struct BootstrapOutcome {
    /// The freshly built source list, still carrying the `refresh-args`
    /// marker if the collaborator did not strip it.
    pub sources: PropertySources,
    /// Head of the resource chain to release after the merge, if any.
    pub resources: Option<Box<dyn Closable>>,
}

/// A failed bootstrap, together with whatever resources were acquired
/// before the failure.
///
/// The orchestrator releases the partial chain and then propagates
/// `error`; a release failure never masks the bootstrap error.
pub struct BootstrapFailure {
    /// Why the bootstrap failed.
    pub error: Error,
    /// Head of the partially acquired resource chain, if any.
    pub resources: Option<Box<dyn Closable>>,
}

impl BootstrapFailure {
    /// Creates a failure with no resources to release.
    #[must_use]
    pub fn new(error: Error) -> Self {
        Self {
            error,
            resources: None,
        }
    }

    /// Attaches a partially acquired resource chain.
    #[must_use]
    pub fn with_resources(mut self, resources: Box<dyn Closable>) -> Self {
        self.resources = Some(resources);
        self
    }
}

/// Rebuilds a layered configuration from the same inputs the process booted
/// from.
///
/// Implementations typically spin up an isolated secondary instance of the
/// application's configuration pipeline. The call is expected to be slow
/// (file and network I/O); the orchestrator makes it while holding only the
/// refresh mutex, never a lock ordinary readers depend on.
pub trait Bootstrap: Send + Sync {
    /// Produces a fresh source list for the given context.
    ///
    /// # Errors
    ///
    /// On failure, returns the error together with any resources acquired
    /// before failing so the caller can release them.
    fn bootstrap(
        &self,
        context: BootstrapContext,
    ) -> std::result::Result<BootstrapOutcome, BootstrapFailure>;
}

/// A releasable process resource acquired during bootstrap.
///
/// Resources may be chained through a parent relationship (an isolated
/// instance created from another instance keeps a handle to its parent);
/// releasing walks the chain explicitly rather than relying on drop order.
pub trait Closable: Send {
    /// Releases this resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource could not be released. The chain
    /// walk logs the error and continues with the parent.
    fn close(&mut self) -> Result<()>;

    /// Consumes this handle and yields its parent, if any.
    fn into_parent(self: Box<Self>) -> Option<Box<dyn Closable>>;
}

/// Releases every resource in the chain, walking up through parents.
///
/// Best-effort: a failed [`Closable::close`] is logged at warn level and
/// the walk continues, so one stubborn handle cannot leak the rest of the
/// chain or mask an in-flight bootstrap error.
pub fn release_chain(mut handle: Option<Box<dyn Closable>>) {
    while let Some(mut current) = handle {
        if let Err(err) = current.close() {
            log::warn!("failed to release bootstrap resource: {err}");
        }
        handle = current.into_parent();
    }
}

#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # strata
//!
//! A library for refreshing a long-running process's layered configuration
//! in place, without a restart.
//!
//! A process boots with an ordered list of named property sources (files,
//! remote config servers, environment data) where earlier sources take
//! precedence. `strata` rebuilds that list from the same inputs on demand,
//! merges the fresh list into the live one without breaking precedence or
//! duplicating sources, and reports exactly which keys resolved differently
//! afterwards so dependent components can reinitialize.
//!
//! ## Core Types
//!
//! - [`PropertySource`] and [`PropertySources`]: named configuration layers
//!   and the ordered, name-addressable list holding them
//! - [`Environment`]: the live model (sources plus profile markers)
//! - [`extract`] and [`diff`]: flatten a source list into a [`Snapshot`]
//!   and compare two snapshots into a [`ChangeSet`]
//! - [`reconcile`]: merge a fresh source list into the live one in place
//! - [`Refresher`]: the orchestrator tying it all together behind a single
//!   `refresh()` entry point
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use strata::{diff, extract, Change, PropertySource, PropertySources};
//!
//! let mut sources = PropertySources::new();
//! sources
//!     .add_last(PropertySource::map("app-config", [("server.port", json!(8080))]))
//!     .unwrap();
//!
//! let before = extract(&sources);
//! sources
//!     .replace(
//!         "app-config",
//!         PropertySource::map("app-config", [("server.port", json!(9090))]),
//!     )
//!     .unwrap();
//! let after = extract(&sources);
//!
//! let changes = diff(&before, &after);
//! assert_eq!(changes.get("server.port"), Some(&Change::Set(json!(9090))));
//! ```

pub mod bootstrap;
pub mod diff;
pub mod environment;
pub mod error;
pub mod extract;
pub mod reconcile;
pub mod refresh;
pub mod source;
pub mod sources;

// Re-export key types at crate root for convenience
pub use bootstrap::{
    release_chain, Bootstrap, BootstrapContext, BootstrapFailure, BootstrapOutcome, Closable,
};
pub use diff::{diff, Change, ChangeSet};
pub use environment::{Environment, SharedEnvironment};
pub use error::{Error, Result};
pub use extract::{extract, Snapshot};
pub use reconcile::reconcile;
pub use refresh::{EnvironmentChangeListener, RefreshScope, Refresher};
pub use source::{EnumerableSource, PropertySource, SourceKind};
pub use sources::PropertySources;

//! Property source types.
//!
//! A [`PropertySource`] is one named layer of configuration: either a plain
//! mapping of keys to values, a composite of nested sources with its own
//! child precedence order, or a dynamic source that enumerates its entries
//! on demand (and may fail to do so).
//!
//! Values are [`serde_json::Value`], so a property can be any opaque scalar
//! or structured unit compared by value equality.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Name of the source backing process-global system properties.
pub const SYSTEM_PROPERTIES: &str = "system-properties";

/// Name of the source backing the process environment (environment
/// variables).
pub const PROCESS_ENVIRONMENT: &str = "process-environment";

/// Name of the source backing command-line arguments.
///
/// Argv is immutable for the lifetime of the process, so there is nothing
/// to refresh.
pub const COMMAND_LINE_ARGS: &str = "command-line-args";

/// Name of the lowest-precedence catch-all source of built-in defaults.
///
/// When the reconciler has no better anchor, brand-new sources are inserted
/// immediately before this one so they still override the defaults.
pub const DEFAULT_PROPERTIES: &str = "default-properties";

/// Name of the transient marker source prepended to a bootstrap context.
///
/// It exists only for the duration of the bootstrap call and is stripped
/// from the returned sources before merging.
pub const REFRESH_ARGS: &str = "refresh-args";

/// The standard substrate: source names that are never replaced or
/// repositioned by a refresh and are excluded from diffing.
///
/// These sources are either re-read live on every lookup or immutable for
/// the process's lifetime, so "refreshing" them is meaningless.
pub const STANDARD_SOURCES: &[&str] = &[SYSTEM_PROPERTIES, PROCESS_ENVIRONMENT, COMMAND_LINE_ARGS];

/// Returns true if `name` belongs to the standard substrate.
///
/// # Examples
///
/// ```
/// use strata::source::{is_standard, PROCESS_ENVIRONMENT};
///
/// assert!(is_standard(PROCESS_ENVIRONMENT));
/// assert!(!is_standard("app-config"));
/// ```
#[must_use]
pub fn is_standard(name: &str) -> bool {
    STANDARD_SOURCES.contains(&name)
}

/// A source whose entries are enumerated on demand.
///
/// Implementations back sources whose contents are not held in memory, such
/// as an external secrets store. Enumeration may fail; extraction treats
/// that as non-fatal and skips the source.
pub trait EnumerableSource: Send + Sync {
    /// Enumerates all entries of this source.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be listed. During extraction
    /// the error is logged and the source's contribution is skipped.
    fn entries(&self) -> Result<BTreeMap<String, Value>>;

    /// Looks up a single key.
    ///
    /// The default implementation enumerates all entries; implementations
    /// with a cheaper point lookup should override it.
    fn get(&self, key: &str) -> Option<Value> {
        self.entries().ok()?.remove(key)
    }
}

/// The shape of a property source.
#[derive(Clone)]
pub enum SourceKind {
    /// A plain mapping of keys to values. Keys are unique within the map.
    Map(BTreeMap<String, Value>),
    /// An ordered list of nested sources; earlier children take precedence.
    Composite(Vec<PropertySource>),
    /// Entries are produced on demand and enumeration may fail.
    Dynamic(Arc<dyn EnumerableSource>),
}

impl fmt::Debug for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Composite(children) => f.debug_tuple("Composite").field(children).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").field(&"..").finish(),
        }
    }
}

/// A named layer of configuration.
///
/// Names are unique within any ordered list a source belongs to; the list
/// type ([`PropertySources`]) enforces that invariant on every mutation.
///
/// [`PropertySources`]: crate::sources::PropertySources
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::PropertySource;
///
/// let source = PropertySource::map("app-config", [("server.port", json!(8080))]);
/// assert_eq!(source.name(), "app-config");
/// assert_eq!(source.get("server.port"), Some(json!(8080)));
/// ```
#[derive(Debug, Clone)]
pub struct PropertySource {
    name: String,
    kind: SourceKind,
}

impl PropertySource {
    /// Creates a mapping source from key/value pairs.
    ///
    /// Later pairs with the same key overwrite earlier ones, mirroring map
    /// insertion.
    pub fn map<N, K, I>(name: N, entries: I) -> Self
    where
        N: Into<String>,
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            name: name.into(),
            kind: SourceKind::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value))
                    .collect(),
            ),
        }
    }

    /// Creates a composite source from an ordered list of children.
    ///
    /// Earlier children take precedence over later ones, both for lookup
    /// and for extraction.
    pub fn composite<N>(name: N, children: Vec<PropertySource>) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            kind: SourceKind::Composite(children),
        }
    }

    /// Creates a dynamic source backed by an [`EnumerableSource`].
    pub fn dynamic<N>(name: N, source: Arc<dyn EnumerableSource>) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            kind: SourceKind::Dynamic(source),
        }
    }

    /// Creates a mapping source by parsing a YAML mapping document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or is not a
    /// mapping at the top level.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::PropertySource;
    ///
    /// let source = PropertySource::map_from_yaml("file", "server.port: 8080\n").unwrap();
    /// assert_eq!(source.get("server.port"), Some(json!(8080)));
    /// ```
    pub fn map_from_yaml<N>(name: N, yaml: &str) -> Result<Self>
    where
        N: Into<String>,
    {
        let entries: BTreeMap<String, Value> = serde_yaml::from_str(yaml)?;
        Ok(Self {
            name: name.into(),
            kind: SourceKind::Map(entries),
        })
    }

    /// Returns the source's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source's shape.
    #[must_use]
    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// Returns true if this source is a composite of nested sources.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, SourceKind::Composite(_))
    }

    /// Looks up a single key in this source.
    ///
    /// For composites the children are consulted in declared order and the
    /// first match wins. A dynamic source that fails to enumerate yields
    /// `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match &self.kind {
            SourceKind::Map(entries) => entries.get(key).cloned(),
            SourceKind::Composite(children) => {
                children.iter().find_map(|child| child.get(key))
            }
            SourceKind::Dynamic(source) => source.get(key),
        }
    }
}

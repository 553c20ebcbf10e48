//! Error types for the strata library.
//!
//! This module provides the error hierarchy for all operations in the
//! strata library, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with a strata error.
///
/// # Examples
///
/// ```
/// use strata::{Error, Result};
///
/// fn example_operation() -> Result<&'static str> {
///     Ok("application-config")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the strata library.
///
/// This enum encompasses all possible error conditions that can occur
/// while maintaining, merging, or refreshing property sources.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation would have introduced a second source with an existing
    /// name into the same ordered list.
    #[error("duplicate property source '{name}'")]
    DuplicateSource {
        /// The name that already exists in the list.
        name: String,
    },

    /// A positional operation referenced a source name that is not present.
    #[error("property source not found: '{name}'")]
    SourceNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A dynamic source could not enumerate its entries.
    ///
    /// During extraction this condition is non-fatal and the source is
    /// skipped; the variant exists so that [`EnumerableSource`]
    /// implementations have a concrete error to return.
    ///
    /// [`EnumerableSource`]: crate::source::EnumerableSource
    #[error("source '{name}' could not enumerate its entries: {reason}")]
    Enumeration {
        /// The name of the source that failed.
        name: String,
        /// Why enumeration failed.
        reason: String,
    },

    /// The bootstrap collaborator failed to produce a fresh environment.
    #[error("bootstrap failed: {source}")]
    Bootstrap {
        /// The underlying collaborator error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A YAML document could not be parsed into a mapping source.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a bootstrap error from any underlying collaborator error.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Error;
    ///
    /// let err = Error::bootstrap(std::io::Error::new(
    ///     std::io::ErrorKind::ConnectionRefused,
    ///     "config server unreachable",
    /// ));
    /// assert!(format!("{err}").contains("bootstrap failed"));
    /// ```
    pub fn bootstrap<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Bootstrap {
            source: Box::new(source),
        }
    }

    /// Check if error indicates a source name was not found.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Error;
    ///
    /// let err = Error::SourceNotFound { name: "missing".to_string() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }

    /// Check if error indicates a violated ordered-list invariant.
    ///
    /// These errors are programming-contract violations rather than
    /// recoverable runtime conditions: the merge algorithm never produces
    /// them when the live list upholds its own uniqueness invariant.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSource { .. } | Self::SourceNotFound { .. }
        )
    }
}

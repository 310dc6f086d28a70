//! Error types for the MCell simulation core.
//!
//! Organized by subsystem: stores (registration), release firing,
//! the injected random source, and the iteration observer. Errors that
//! depend on engine configuration live in `mcell-engine`.

use std::error::Error;
use std::fmt;

/// Errors from [`KeyedStore`](crate::store::KeyedStore) insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The key is already present. The existing entry is left untouched.
    DuplicateKey {
        /// The rejected key.
        key: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { key } => write!(f, "duplicate key '{key}'"),
        }
    }
}

impl Error for StoreError {}

/// Per-site failures while firing release sites.
///
/// These are non-fatal: the failing site contributes zero molecules and
/// the remaining sites still fire. Each one is surfaced in the run report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReleaseError {
    /// The site targets a species that is not registered.
    UnknownSpecies {
        /// Index of the site in the release-site sequence.
        site: usize,
        /// The species name the site asked for.
        species: String,
    },
    /// The target species was never bound to a [`SpeciesId`](crate::SpeciesId),
    /// so instances cannot carry a back-reference to it.
    UnboundSpecies {
        /// Name of the unbound species.
        species: String,
    },
    /// The species' instance list could not grow by the requested count.
    CapacityExceeded {
        /// Name of the target species.
        species: String,
        /// Instances the site tried to create.
        requested: usize,
    },
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSpecies { site, species } => {
                write!(f, "release site {site} targets unknown species '{species}'")
            }
            Self::UnboundSpecies { species } => {
                write!(f, "species '{species}' is not registered with an engine")
            }
            Self::CapacityExceeded { species, requested } => {
                write!(f, "cannot allocate {requested} more instances of '{species}'")
            }
        }
    }
}

impl Error for ReleaseError {}

/// Failures of the injected [`RandomSource`](crate::traits::RandomSource).
///
/// Always fatal to a run: no further step can be computed deterministically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RandomError {
    /// The source has no more deviates to hand out.
    Exhausted,
    /// The source failed for another reason.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for RandomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "random source exhausted"),
            Self::Failed { reason } => write!(f, "random source failed: {reason}"),
        }
    }
}

impl Error for RandomError {}

/// Failure reported by an [`IterationObserver`](crate::traits::IterationObserver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObserverError {
    /// Human-readable description of the failure.
    pub reason: String,
}

impl ObserverError {
    /// Build an observer error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer failed: {}", self.reason)
    }
}

impl Error for ObserverError {}

//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] holds the run parameters. [`validate()`](SimulationConfig::validate)
//! checks the scalar invariants when a [`Simulation`](crate::Simulation) is
//! constructed; the registered species and release sites are checked by
//! [`validate_model`] right before a run starts.

use std::error::Error;
use std::fmt;

use mcell_core::{KeyedStore, MoleculeSpecies, ReleaseSite, SequentialStore};

// ── DiffusionSchedule ─────────────────────────────────────────────

/// How the per-iteration diffusion step walks the population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffusionSchedule {
    /// One pass in species-registration order then instance order, drawing
    /// every deviate from the simulation's injected random source.
    #[default]
    Sequential,
    /// Each species' instances are split into fixed-size chunks, and each
    /// chunk draws from its own stream derived from the seed, the
    /// iteration, the species index, and the chunk index. Chunks may run
    /// on a worker pool; results do not depend on execution order.
    Chunked {
        /// Instances per chunk. Must be at least 1.
        chunk_size: usize,
    },
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a simulation before it runs.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// time_step is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// A chunked schedule was configured with `chunk_size == 0`.
    InvalidChunkSize,
    /// A registered species failed validation.
    InvalidSpecies {
        /// Name of the offending species.
        name: String,
        /// Description of the validation failure.
        reason: String,
    },
    /// A release site failed validation.
    InvalidReleaseSite {
        /// Index of the site in the release-site sequence.
        index: usize,
        /// Description of the validation failure.
        reason: String,
    },
    /// A release site targets a species that is not registered
    /// (only raised when `strict_release_sites` is set).
    UnknownReleaseSpecies {
        /// Index of the site in the release-site sequence.
        site: usize,
        /// The species name the site asked for.
        species: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeStep { value } => {
                write!(f, "time_step must be finite and positive, got {value}")
            }
            Self::InvalidChunkSize => write!(f, "chunk_size must be at least 1"),
            Self::InvalidSpecies { name, reason } => {
                write!(f, "invalid species '{name}': {reason}")
            }
            Self::InvalidReleaseSite { index, reason } => {
                write!(f, "invalid release site {index}: {reason}")
            }
            Self::UnknownReleaseSpecies { site, species } => {
                write!(f, "release site {site} targets unknown species '{species}'")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SimulationConfig ───────────────────────────────────────────────

/// Run parameters for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Number of diffusion iterations to run. Zero fires release sites only.
    pub num_iterations: u64,
    /// Simulation time step Δt, in seconds. Default: 1e-6.
    pub time_step: f64,
    /// Seed for the default random source and for chunk streams. Default: 1.
    pub seed: u64,
    /// Diffusion traversal schedule.
    pub schedule: DiffusionSchedule,
    /// Reject release sites targeting unregistered species at validation
    /// time instead of skipping them when they fire. Default: false.
    pub strict_release_sites: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_iterations: 0,
            time_step: 1e-6,
            seed: 1,
            schedule: DiffusionSchedule::Sequential,
            strict_release_sites: false,
        }
    }
}

impl SimulationConfig {
    /// Config with the given iteration count and time step, defaults elsewhere.
    pub fn new(num_iterations: u64, time_step: f64) -> Self {
        Self {
            num_iterations,
            time_step,
            ..Self::default()
        }
    }

    /// Validate scalar invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. time_step must be finite and positive.
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        // 2. Chunked schedules need a non-empty chunk.
        if let DiffusionSchedule::Chunked { chunk_size: 0 } = self.schedule {
            return Err(ConfigError::InvalidChunkSize);
        }
        Ok(())
    }
}

/// Validate the config together with the registered model.
///
/// Checks the scalar config, every species, and every release site. Pure:
/// nothing is mutated, so a failure here leaves the simulation untouched.
pub fn validate_model(
    config: &SimulationConfig,
    species: &KeyedStore<MoleculeSpecies>,
    sites: &SequentialStore<ReleaseSite>,
) -> Result<(), ConfigError> {
    config.validate()?;

    for s in species.values() {
        s.validate().map_err(|reason| ConfigError::InvalidSpecies {
            name: s.name().to_string(),
            reason,
        })?;
    }

    for (index, site) in sites.iter().enumerate() {
        site.validate()
            .map_err(|reason| ConfigError::InvalidReleaseSite { index, reason })?;
        if config.strict_release_sites && !species.contains(&site.species) {
            return Err(ConfigError::UnknownReleaseSpecies {
                site: index,
                species: site.species.clone(),
            });
        }
    }

    Ok(())
}

//! Live-engine bookkeeping.
//!
//! [`EngineRegistry`] counts the simulations it created that are still
//! alive. It is an ordinary value owned by whoever manages engine
//! lifetimes (an application, a batch driver, a test), so separate
//! registries never interfere with each other.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use mcell_core::RandomSource;

use crate::config::{ConfigError, SimulationConfig};
use crate::simulation::Simulation;

#[derive(Debug, Default)]
struct Counters {
    live: AtomicUsize,
    created: AtomicU64,
}

/// Factory that tracks how many of its simulations are alive.
///
/// Clones share the same counters.
#[derive(Clone, Debug, Default)]
pub struct EngineRegistry {
    counters: Arc<Counters>,
}

/// Held by a [`Simulation`] created through an [`EngineRegistry`];
/// releases its slot when dropped.
#[derive(Debug)]
pub struct EngineLease {
    counters: Arc<Counters>,
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl EngineRegistry {
    /// A registry with no engines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracked simulation seeded from `config.seed`.
    pub fn create(&self, config: SimulationConfig) -> Result<Simulation, ConfigError> {
        let mut sim = Simulation::new(config)?;
        sim.attach(self.lease());
        Ok(sim)
    }

    /// Create a tracked simulation drawing from `rng`.
    pub fn create_with_source(
        &self,
        config: SimulationConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Simulation, ConfigError> {
        let mut sim = Simulation::with_random_source(config, rng)?;
        sim.attach(self.lease());
        Ok(sim)
    }

    /// Simulations created here that have not been dropped.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::Acquire)
    }

    /// Simulations ever created here.
    pub fn total_created(&self) -> u64 {
        self.counters.created.load(Ordering::Acquire)
    }

    fn lease(&self) -> EngineLease {
        self.counters.live.fetch_add(1, Ordering::AcqRel);
        self.counters.created.fetch_add(1, Ordering::AcqRel);
        EngineLease {
            counters: Arc::clone(&self.counters),
        }
    }
}

//! Per-run performance metrics for the simulation engine.
//!
//! [`RunMetrics`] captures timing and work counters for one call to
//! [`run_simulation`](crate::Simulation::run_simulation).

/// Timing and work counters collected during a run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Wall-clock time for the entire run, in microseconds.
    pub total_us: u64,
    /// Time spent firing release sites, in microseconds.
    pub release_us: u64,
    /// Time spent in diffusion steps, summed over iterations, in microseconds.
    pub diffusion_us: u64,
    /// Normal deviates consumed by diffusion.
    pub displacement_draws: u64,
    /// Instance displacements applied (instances with σ > 0, per iteration).
    pub instance_moves: u64,
}

impl RunMetrics {
    /// Mean diffusion time per iteration, in microseconds.
    pub fn mean_iteration_us(&self, iterations: u64) -> f64 {
        if iterations == 0 {
            return 0.0;
        }
        self.diffusion_us as f64 / iterations as f64
    }
}

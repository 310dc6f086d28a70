//! Collaborator traits: where randomness comes from and who watches a run.
//!
//! The core never generates random numbers or touches the filesystem
//! itself. Both concerns are injected through the traits below.

use std::path::Path;

use crate::error::{ObserverError, RandomError};
use crate::population::PopulationView;

/// Supplier of random deviates.
///
/// Implementations must be deterministic for a given construction (seed,
/// script, ...) so that identical configurations yield identical runs.
/// Errors are fatal to the run that requested the draw.
pub trait RandomSource: Send {
    /// A uniform deviate in `[0, 1)`.
    fn uniform(&mut self) -> Result<f64, RandomError>;

    /// A standard normal deviate, `N(0, 1)`.
    fn normal(&mut self) -> Result<f64, RandomError>;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        (**self).uniform()
    }

    fn normal(&mut self) -> Result<f64, RandomError> {
        (**self).normal()
    }
}

/// Receives the population state at iteration boundaries.
///
/// This is the seam for output writers (visualization dumps, reaction
/// data, ...). Iteration 0 is reported once after release sites have
/// fired, then every completed iteration `1..=num_iterations` follows.
pub trait IterationObserver {
    /// Called once before release sites fire, with the project path the
    /// run was started with. The engine never interprets the path.
    fn begin(&mut self, project_path: &Path) -> Result<(), ObserverError> {
        let _ = project_path;
        Ok(())
    }

    /// Called after release (iteration 0) and after every iteration.
    fn on_iteration(
        &mut self,
        iteration: u64,
        population: &PopulationView<'_>,
    ) -> Result<(), ObserverError>;

    /// Called once when the run stops, with the number of iterations
    /// that completed.
    fn finish(&mut self, iterations_completed: u64) -> Result<(), ObserverError> {
        let _ = iterations_completed;
        Ok(())
    }
}

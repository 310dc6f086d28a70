//! What a run did: release outcomes, non-fatal errors, final counts.

use mcell_core::ReleaseError;

use crate::metrics::RunMetrics;
use crate::simulation::RunState;

/// Result of firing one release site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Index of the site in the release-site sequence.
    pub site: usize,
    /// Site label.
    pub name: String,
    /// Target species name.
    pub species: String,
    /// Whether the site passed its release-probability check and spawned.
    pub fired: bool,
    /// Number of instances created.
    pub created: usize,
}

/// Summary returned by [`Simulation::run_simulation`](crate::Simulation::run_simulation).
///
/// Non-fatal per-site failures are collected in `release_errors`; they
/// never abort the run but are never dropped either.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Terminal state: `Completed` or `Cancelled`.
    pub state: RunState,
    /// Diffusion iterations that ran to completion.
    pub iterations_completed: u64,
    /// One entry per site processed without error, in firing order. Sites
    /// that failed appear only in `release_errors`.
    pub releases: Vec<ReleaseOutcome>,
    /// Sites that contributed nothing because of an error.
    pub release_errors: Vec<ReleaseError>,
    /// `(species name, live instances)` at the end of the run, in
    /// registration order.
    pub population: Vec<(String, usize)>,
    /// Timing and work counters.
    pub metrics: RunMetrics,
}

impl RunReport {
    /// Total instances created by all release sites.
    pub fn total_released(&self) -> usize {
        self.releases.iter().map(|r| r.created).sum()
    }

    /// Final instance count for `species`, if registered.
    pub fn population_of(&self, species: &str) -> Option<usize> {
        self.population
            .iter()
            .find(|(name, _)| name == species)
            .map(|&(_, n)| n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_lookup() {
        let report = RunReport {
            state: RunState::Completed,
            iterations_completed: 0,
            releases: vec![
                ReleaseOutcome {
                    site: 0,
                    name: "a".into(),
                    species: "A".into(),
                    fired: true,
                    created: 3,
                },
                ReleaseOutcome {
                    site: 1,
                    name: "b".into(),
                    species: "A".into(),
                    fired: false,
                    created: 0,
                },
            ],
            release_errors: vec![],
            population: vec![("A".into(), 3), ("B".into(), 0)],
            metrics: RunMetrics::default(),
        };
        assert_eq!(report.total_released(), 3);
        assert_eq!(report.population_of("A"), Some(3));
        assert_eq!(report.population_of("B"), Some(0));
        assert_eq!(report.population_of("C"), None);
    }
}

//! The simulation engine.
//!
//! [`Simulation`] owns the species store and the release-site sequence,
//! fires release sites once, and then runs the fixed-step diffusion
//! loop. It moves through a small state machine:
//!
//! ```text
//! Configured ──run──▶ Running ──▶ Completed
//!                        │   └──▶ Cancelled   (cancel token, checked between iterations)
//!                        └──────▶ Failed      (invalid config, random source, observer)
//! ```
//!
//! Species and release sites can only be registered while `Configured`.
//! [`reset()`](Simulation::reset) clears every instance and returns the
//! engine to `Configured` so the same model can be run again.
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] but all mutation goes through `&mut self`,
//! so the stores are never observed mid-update. Observers receive a
//! [`PopulationView`] borrowed from the engine between iterations.

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use mcell_core::{
    IterationObserver, KeyedStore, MoleculeSpecies, ObserverError, PopulationView, RandomError,
    RandomSource, ReleaseSite, SequentialStore, SpeciesId, StoreError,
};

use crate::cancel::CancelToken;
use crate::config::{validate_model, ConfigError, DiffusionSchedule, SimulationConfig};
use crate::diffusion::{diffuse_chunked, diffuse_sequential};
use crate::metrics::RunMetrics;
use crate::registry::EngineLease;
use crate::release::fire_release_sites;
use crate::report::RunReport;
use crate::rng::{ChaChaSource, ChunkStreams};

// Compile-time assertion: Simulation is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

// ── RunState ─────────────────────────────────────────────────────

/// Lifecycle state of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Accepting species and release sites.
    Configured,
    /// Inside `run_simulation`.
    Running,
    /// The loop ran all `num_iterations`.
    Completed,
    /// Stopped at an iteration boundary by the cancel token.
    Cancelled,
    /// Validation or a fatal runtime error stopped the run.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ── RegistrationError ────────────────────────────────────────────

/// Errors from [`Simulation::add_molecule_species`] and
/// [`Simulation::add_molecule_release_site`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// A species with the same name is already registered.
    Duplicate(StoreError),
    /// Registration is only allowed in [`RunState::Configured`].
    NotConfigured {
        /// The state the engine was in.
        state: RunState,
    },
    /// More species than a [`SpeciesId`] can address.
    TooManySpecies,
    /// The species already holds instances. Instances are only created
    /// by release sites of the engine the species is registered with.
    PreloadedInstances {
        /// Name of the rejected species.
        name: String,
        /// Instances it carried.
        count: usize,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(e) => write!(f, "species registration: {e}"),
            Self::NotConfigured { state } => {
                write!(f, "cannot register while simulation is {state}")
            }
            Self::TooManySpecies => write!(f, "species count exceeds u32::MAX"),
            Self::PreloadedInstances { name, count } => {
                write!(f, "species '{name}' already holds {count} instances")
            }
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Duplicate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        Self::Duplicate(e)
    }
}

// ── RunError ─────────────────────────────────────────────────────

/// Fatal errors from [`Simulation::run_simulation`].
#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    /// Validation failed before anything was mutated.
    Config(ConfigError),
    /// The random source failed; the run cannot continue deterministically.
    Random(RandomError),
    /// The iteration observer failed.
    Observer(ObserverError),
    /// A run can only start from [`RunState::Configured`].
    InvalidState {
        /// The state the engine was in.
        state: RunState,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Random(e) => write!(f, "{e}"),
            Self::Observer(e) => write!(f, "{e}"),
            Self::InvalidState { state } => {
                write!(f, "cannot start a run while simulation is {state}")
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Random(e) => Some(e),
            Self::Observer(e) => Some(e),
            Self::InvalidState { .. } => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RandomError> for RunError {
    fn from(e: RandomError) -> Self {
        Self::Random(e)
    }
}

impl From<ObserverError> for RunError {
    fn from(e: ObserverError) -> Self {
        Self::Observer(e)
    }
}

// ── Simulation ───────────────────────────────────────────────────

/// A particle diffusion simulation.
///
/// # Example
///
/// ```ignore
/// let mut sim = Simulation::new(SimulationConfig::new(100, 1e-6))?;
/// sim.add_molecule_species(MoleculeSpecies::volume("A", 1e-6))?;
/// sim.add_molecule_release_site(ReleaseSite::new("origin", "A", Vec3::ZERO, 1000.0))?;
/// let report = sim.run()?;
/// ```
pub struct Simulation {
    config: SimulationConfig,
    species: KeyedStore<MoleculeSpecies>,
    release_sites: SequentialStore<ReleaseSite>,
    rng: Box<dyn RandomSource>,
    state: RunState,
    cancel: CancelToken,
    lease: Option<EngineLease>,
}

impl Simulation {
    /// Create a simulation that draws from a [`ChaChaSource`] seeded with
    /// `config.seed`.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let rng = Box::new(ChaChaSource::new(config.seed));
        Self::with_random_source(config, rng)
    }

    /// Create a simulation that draws from an injected random source.
    ///
    /// The source feeds release firing and the sequential diffusion
    /// schedule. The chunked schedule derives its own per-chunk streams
    /// from `config.seed`.
    pub fn with_random_source(
        config: SimulationConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            species: KeyedStore::new(),
            release_sites: SequentialStore::new(),
            rng,
            state: RunState::Configured,
            cancel: CancelToken::new(),
            lease: None,
        })
    }

    pub(crate) fn attach(&mut self, lease: EngineLease) {
        self.lease = Some(lease);
    }

    /// Register a species under its name.
    ///
    /// Fails with [`RegistrationError::Duplicate`] if the name is taken;
    /// the previously registered species is left untouched.
    /// A species that already holds instances is rejected with
    /// [`RegistrationError::PreloadedInstances`].
    pub fn add_molecule_species(
        &mut self,
        mut species: MoleculeSpecies,
    ) -> Result<SpeciesId, RegistrationError> {
        self.ensure_configured()?;
        if species.num_instances() > 0 {
            return Err(RegistrationError::PreloadedInstances {
                name: species.name().to_string(),
                count: species.num_instances(),
            });
        }
        let id = u32::try_from(self.species.len())
            .map(SpeciesId)
            .map_err(|_| RegistrationError::TooManySpecies)?;
        species.bind(id);
        let name = species.name().to_string();
        self.species.insert(name, species)?;
        Ok(id)
    }

    /// Append a release site. No uniqueness check; returns its position.
    pub fn add_molecule_release_site(
        &mut self,
        site: ReleaseSite,
    ) -> Result<usize, RegistrationError> {
        self.ensure_configured()?;
        Ok(self.release_sites.append(site))
    }

    /// Look up a species by name. Available in every state.
    pub fn get_molecule_species_by_name(&self, name: &str) -> Option<&MoleculeSpecies> {
        self.species.lookup(name)
    }

    /// The species store.
    pub fn species(&self) -> &KeyedStore<MoleculeSpecies> {
        &self.species
    }

    /// The release-site sequence.
    pub fn release_sites(&self) -> &SequentialStore<ReleaseSite> {
        &self.release_sites
    }

    /// Read-only view of the current population.
    pub fn population(&self) -> PopulationView<'_> {
        PopulationView::new(&self.species)
    }

    /// The run configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// A handle that cancels this simulation at the next iteration boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Validate the config and the registered model without running.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_model(&self.config, &self.species, &self.release_sites)
    }

    /// Run without an observer.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        self.run_simulation(Path::new(""), None)
    }

    /// Fire release sites, then run `num_iterations` diffusion steps.
    ///
    /// `project_path` is handed unchanged to the observer's
    /// [`begin`](IterationObserver::begin); the engine itself never
    /// touches the filesystem. The observer sees iteration 0 right after
    /// release and every completed iteration after that.
    ///
    /// # Errors
    ///
    /// - [`RunError::InvalidState`] unless the engine is `Configured`.
    /// - [`RunError::Config`] if validation fails. Nothing is mutated.
    /// - [`RunError::Random`] / [`RunError::Observer`] on fatal runtime
    ///   failures. Release sites may already have fired.
    ///
    /// In every error case except `InvalidState`, the engine ends up `Failed`.
    pub fn run_simulation(
        &mut self,
        project_path: &Path,
        observer: Option<&mut dyn IterationObserver>,
    ) -> Result<RunReport, RunError> {
        if self.state != RunState::Configured {
            return Err(RunError::InvalidState { state: self.state });
        }
        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "simulation config rejected");
            self.state = RunState::Failed;
            return Err(e.into());
        }

        tracing::info!(
            species = self.species.len(),
            release_sites = self.release_sites.len(),
            iterations = self.config.num_iterations,
            time_step = self.config.time_step,
            schedule = ?self.config.schedule,
            "starting simulation run"
        );

        self.state = RunState::Running;
        match self.execute(project_path, observer) {
            Ok(report) => {
                self.state = report.state;
                tracing::info!(
                    state = %report.state,
                    iterations = report.iterations_completed,
                    released = report.total_released(),
                    skipped_sites = report.release_errors.len(),
                    total_us = report.metrics.total_us,
                    "simulation run finished"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "simulation run failed");
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        project_path: &Path,
        mut observer: Option<&mut dyn IterationObserver>,
    ) -> Result<RunReport, RunError> {
        let run_start = Instant::now();
        let mut metrics = RunMetrics::default();

        if let Some(obs) = observer.as_mut() {
            obs.begin(project_path)?;
        }

        // 1. Release phase: every site fires once, in insertion order.
        let release_start = Instant::now();
        let phase = fire_release_sites(&mut self.species, &self.release_sites, &mut *self.rng)?;
        metrics.release_us = release_start.elapsed().as_micros() as u64;

        if let Some(obs) = observer.as_mut() {
            obs.on_iteration(0, &PopulationView::new(&self.species))?;
        }

        // 2. Diffusion loop. Cancellation is only honoured between iterations.
        let streams = ChunkStreams::new(self.config.seed);
        let time_step = self.config.time_step;
        let mut state = RunState::Completed;
        let mut completed = 0;

        for iteration in 1..=self.config.num_iterations {
            if self.cancel.is_cancelled() {
                tracing::info!(iteration, "simulation cancelled");
                state = RunState::Cancelled;
                break;
            }

            let step_start = Instant::now();
            let tally = match self.config.schedule {
                DiffusionSchedule::Sequential => {
                    diffuse_sequential(&mut self.species, time_step, &mut *self.rng)?
                }
                DiffusionSchedule::Chunked { chunk_size } => {
                    diffuse_chunked(&mut self.species, time_step, &streams, iteration, chunk_size)?
                }
            };
            metrics.diffusion_us += step_start.elapsed().as_micros() as u64;
            metrics.displacement_draws += tally.draws;
            metrics.instance_moves += tally.moves;
            completed = iteration;
            tracing::trace!(iteration, moves = tally.moves, "iteration complete");

            if let Some(obs) = observer.as_mut() {
                obs.on_iteration(iteration, &PopulationView::new(&self.species))?;
            }
        }

        if let Some(obs) = observer.as_mut() {
            obs.finish(completed)?;
        }

        metrics.total_us = run_start.elapsed().as_micros() as u64;

        Ok(RunReport {
            state,
            iterations_completed: completed,
            releases: phase.outcomes,
            release_errors: phase.errors,
            population: self
                .species
                .iter()
                .map(|(name, s)| (name.to_string(), s.num_instances()))
                .collect(),
            metrics,
        })
    }

    /// Clear every instance and return to `Configured`, reseeding the
    /// random source with a fresh [`ChaChaSource`] for `seed`.
    ///
    /// Registered species and release sites are kept. A pending
    /// cancellation is cleared.
    pub fn reset(&mut self, seed: u64) {
        self.reset_with_source(seed, Box::new(ChaChaSource::new(seed)));
    }

    /// Like [`reset()`](Self::reset) but with an injected random source.
    /// `seed` still drives the chunked schedule's streams.
    pub fn reset_with_source(&mut self, seed: u64, rng: Box<dyn RandomSource>) {
        for s in self.species.values_mut() {
            s.clear_instances();
        }
        self.config.seed = seed;
        self.rng = rng;
        self.cancel.clear();
        self.state = RunState::Configured;
    }

    fn ensure_configured(&self) -> Result<(), RegistrationError> {
        if self.state == RunState::Configured {
            Ok(())
        } else {
            Err(RegistrationError::NotConfigured { state: self.state })
        }
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("species", &self.species.len())
            .field("release_sites", &self.release_sites.len())
            .field("instances", &self.population().total_instances())
            .field("tracked", &self.lease.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcell_core::Vec3;
    use mcell_test_utils::{ConstantSource, RecordingObserver, ScriptedSource};

    fn sim(iterations: u64) -> Simulation {
        Simulation::new(SimulationConfig::new(iterations, 1e-3)).unwrap()
    }

    #[test]
    fn new_rejects_bad_time_step() {
        match Simulation::new(SimulationConfig::new(1, 0.0)) {
            Err(ConfigError::InvalidTimeStep { .. }) => {}
            other => panic!("expected InvalidTimeStep, got {other:?}"),
        }
    }

    #[test]
    fn species_get_sequential_ids() {
        let mut s = sim(0);
        assert_eq!(
            s.add_molecule_species(MoleculeSpecies::volume("A", 1.0)),
            Ok(SpeciesId(0))
        );
        assert_eq!(
            s.add_molecule_species(MoleculeSpecies::surface("B", 1.0)),
            Ok(SpeciesId(1))
        );
        assert_eq!(
            s.get_molecule_species_by_name("B").and_then(|sp| sp.id()),
            Some(SpeciesId(1))
        );
    }

    #[test]
    fn duplicate_species_keeps_original() {
        let mut s = sim(0);
        s.add_molecule_species(MoleculeSpecies::volume("A", 1.0))
            .unwrap();
        let err = s
            .add_molecule_species(MoleculeSpecies::surface("A", 9.0))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Duplicate(StoreError::DuplicateKey { key: "A".into() })
        );
        let a = s.get_molecule_species_by_name("A").unwrap();
        assert_eq!(a.diffusion_constant(), 1.0);
        assert_eq!(a.id(), Some(SpeciesId(0)));
        assert_eq!(s.species().len(), 1);
    }

    #[test]
    fn species_with_instances_is_rejected() {
        let mut s = sim(0);
        let mut preloaded = MoleculeSpecies::volume("A", 1.0);
        preloaded.bind(SpeciesId(42));
        preloaded.spawn(Vec3::ZERO, 2).unwrap();

        assert_eq!(
            s.add_molecule_species(preloaded),
            Err(RegistrationError::PreloadedInstances {
                name: "A".into(),
                count: 2
            })
        );
        assert!(s.get_molecule_species_by_name("A").is_none());
        assert_eq!(s.population().total_instances(), 0);
    }

    #[test]
    fn rebinding_before_registration_is_overwritten() {
        let mut s = sim(0);
        let mut pre = MoleculeSpecies::volume("A", 1.0);
        pre.bind(SpeciesId(42));
        assert_eq!(s.add_molecule_species(pre), Ok(SpeciesId(0)));
        s.add_molecule_release_site(ReleaseSite::new("s", "A", Vec3::ZERO, 3.0))
            .unwrap();
        s.run().unwrap();
        let a = s.get_molecule_species_by_name("A").unwrap();
        assert!(a.instances().iter().all(|m| m.species == SpeciesId(0)));
    }

    #[test]
    fn unknown_lookup_is_none() {
        let s = sim(0);
        assert!(s.get_molecule_species_by_name("nope").is_none());
    }

    #[test]
    fn registration_closed_after_run() {
        let mut s = sim(0);
        s.run().unwrap();
        assert_eq!(s.state(), RunState::Completed);
        assert_eq!(
            s.add_molecule_species(MoleculeSpecies::volume("A", 1.0)),
            Err(RegistrationError::NotConfigured {
                state: RunState::Completed
            })
        );
        assert!(s
            .add_molecule_release_site(ReleaseSite::new("x", "A", Vec3::ZERO, 1.0))
            .is_err());
    }

    #[test]
    fn second_run_requires_reset() {
        let mut s = sim(1);
        s.run().unwrap();
        assert_eq!(
            s.run(),
            Err(RunError::InvalidState {
                state: RunState::Completed
            })
        );
        s.reset(7);
        assert_eq!(s.state(), RunState::Configured);
        assert!(s.run().is_ok());
    }

    #[test]
    fn invalid_model_fails_without_firing() {
        let mut s = sim(3);
        s.add_molecule_species(MoleculeSpecies::volume("A", 1.0))
            .unwrap();
        s.add_molecule_species(MoleculeSpecies::volume("bad", -1.0))
            .unwrap();
        s.add_molecule_release_site(ReleaseSite::new("s", "A", Vec3::ZERO, 5.0))
            .unwrap();
        match s.run() {
            Err(RunError::Config(ConfigError::InvalidSpecies { name, .. })) => {
                assert_eq!(name, "bad")
            }
            other => panic!("expected InvalidSpecies, got {other:?}"),
        }
        assert_eq!(s.state(), RunState::Failed);
        assert_eq!(s.population().total_instances(), 0);
    }

    #[test]
    fn random_failure_is_fatal() {
        let mut s = Simulation::with_random_source(
            SimulationConfig::new(2, 1.0),
            Box::new(ScriptedSource::new(vec![], vec![0.1, 0.2])),
        )
        .unwrap();
        s.add_molecule_species(MoleculeSpecies::volume("A", 1.0))
            .unwrap();
        s.add_molecule_release_site(ReleaseSite::new("s", "A", Vec3::ZERO, 1.0))
            .unwrap();
        assert_eq!(s.run(), Err(RunError::Random(RandomError::Exhausted)));
        assert_eq!(s.state(), RunState::Failed);
    }

    #[test]
    fn observer_sees_release_and_every_iteration() {
        let mut s = sim(3);
        s.add_molecule_species(MoleculeSpecies::volume("A", 1.0))
            .unwrap();
        s.add_molecule_release_site(ReleaseSite::new("s", "A", Vec3::ZERO, 2.0))
            .unwrap();
        let mut obs = RecordingObserver::new();
        s.run_simulation(Path::new("/tmp/project"), Some(&mut obs))
            .unwrap();

        assert_eq!(obs.project_path(), Some(Path::new("/tmp/project")));
        assert_eq!(obs.iterations(), vec![0, 1, 2, 3]);
        assert_eq!(obs.finished(), Some(3));
        assert!(obs.frames()[0]
            .positions
            .iter()
            .all(|(_, p)| *p == Vec3::ZERO));
    }

    #[test]
    fn observer_failure_is_fatal() {
        let mut s = sim(5);
        let mut obs = RecordingObserver::failing_at(2);
        match s.run_simulation(Path::new(""), Some(&mut obs)) {
            Err(RunError::Observer(_)) => {}
            other => panic!("expected Observer error, got {other:?}"),
        }
        assert_eq!(s.state(), RunState::Failed);
    }

    #[test]
    fn cancellation_stops_at_iteration_boundary() {
        let mut s = Simulation::with_random_source(
            SimulationConfig::new(10, 1.0),
            Box::new(ConstantSource::new(0.5, 1.0)),
        )
        .unwrap();
        s.add_molecule_species(MoleculeSpecies::surface("A", 0.5))
            .unwrap();
        s.add_molecule_release_site(ReleaseSite::new("s", "A", Vec3::ZERO, 1.0))
            .unwrap();

        let token = s.cancel_token();
        let mut obs = RecordingObserver::new().on_reaching(4, move || token.cancel());
        let report = s
            .run_simulation(Path::new(""), Some(&mut obs))
            .unwrap();

        assert_eq!(report.state, RunState::Cancelled);
        assert_eq!(report.iterations_completed, 4);
        assert_eq!(s.state(), RunState::Cancelled);
        // sigma = 1, each iteration adds 1.0 to x and y
        let p = s.get_molecule_species_by_name("A").unwrap().instances()[0].position;
        assert_eq!(p, Vec3::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn reset_clears_instances_and_cancellation() {
        let mut s = sim(1);
        s.add_molecule_species(MoleculeSpecies::volume("A", 1.0))
            .unwrap();
        s.add_molecule_release_site(ReleaseSite::new("s", "A", Vec3::ZERO, 3.0))
            .unwrap();
        s.cancel_token().cancel();
        let report = s.run().unwrap();
        assert_eq!(report.state, RunState::Cancelled);
        assert_eq!(report.population_of("A"), Some(3));

        s.reset(2);
        assert_eq!(s.population().total_instances(), 0);
        assert_eq!(s.config().seed, 2);
        let report = s.run().unwrap();
        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.population_of("A"), Some(3));
    }

    #[test]
    fn debug_output_summarizes() {
        let s = sim(0);
        let dbg = format!("{s:?}");
        assert!(dbg.contains("Simulation"));
        assert!(dbg.contains("Configured"));
    }
}

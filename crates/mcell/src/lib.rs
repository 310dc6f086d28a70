//! MCell: a stochastic, particle-based diffusion simulation core.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the MCell sub-crates. For most users, adding `mcell` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use mcell::prelude::*;
//!
//! let mut sim = Simulation::new(SimulationConfig::new(10, 1e-6)).unwrap();
//! sim.add_molecule_species(MoleculeSpecies::volume("A", 1e-6)).unwrap();
//! sim.add_molecule_species(MoleculeSpecies::surface("R", 1e-7)).unwrap();
//! sim.add_molecule_release_site(ReleaseSite::new("origin", "A", Vec3::ZERO, 100.0))
//!     .unwrap();
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.state, RunState::Completed);
//! assert_eq!(report.population_of("A"), Some(100));
//! assert_eq!(sim.get_molecule_species_by_name("R").unwrap().num_instances(), 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `mcell-core` | Species, instances, release sites, stores, errors, traits |
//! | [`engine`] | `mcell-engine` | Simulation, config, random sources, run reports |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core data model and collaborator traits (`mcell-core`).
///
/// Contains [`types::MoleculeSpecies`], [`types::ReleaseSite`], the
/// [`types::KeyedStore`] and [`types::SequentialStore`] containers, and
/// the [`types::RandomSource`] / [`types::IterationObserver`] traits.
pub use mcell_core as types;

/// Simulation engine (`mcell-engine`).
///
/// [`engine::Simulation`] drives release and diffusion;
/// [`engine::EngineRegistry`] tracks live engines.
pub use mcell_engine as engine;

/// Common imports for typical MCell usage.
///
/// ```rust
/// use mcell::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use mcell_core::{
        IterationObserver, KineticType, MoleculeInstance, MoleculeSpecies, PopulationView,
        QuantityType, RandomSource, ReleaseSite, SpeciesId, Vec3,
    };

    // Errors
    pub use mcell_core::{ObserverError, RandomError, ReleaseError, StoreError};

    // Engine
    pub use mcell_engine::{
        CancelToken, ConfigError, DiffusionSchedule, RegistrationError, RunError, RunReport,
        RunState, Simulation, SimulationConfig,
    };
}

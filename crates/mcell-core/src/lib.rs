//! Core types and traits for the MCell particle simulation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the data model shared by the rest of the workspace: species and
//! their molecule instances, release sites, the keyed and sequential
//! stores that index them, the error taxonomy, and the traits at which
//! collaborators plug in (random source, iteration observer).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod population;
pub mod release;
pub mod species;
pub mod store;
pub mod traits;

pub use error::{ObserverError, RandomError, ReleaseError, StoreError};
pub use id::{SpeciesId, Vec3};
pub use population::PopulationView;
pub use release::{QuantityType, ReleaseSite, MAX_RELEASE_QUANTITY};
pub use species::{KineticType, MoleculeInstance, MoleculeSpecies};
pub use store::{KeyedStore, SequentialStore};
pub use traits::{IterationObserver, RandomSource};

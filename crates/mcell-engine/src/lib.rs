//! Simulation engine for MCell particle diffusion.
//!
//! Provides the [`Simulation`] that owns the species and release-site
//! stores, fires release sites once at the start of a run, and advances
//! every molecule instance by Brownian displacement for a fixed number
//! of iterations. Runs are reproducible for a given seed under both the
//! sequential and the chunked (rayon-parallel) diffusion schedule.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod config;
pub mod diffusion;
pub mod metrics;
pub mod registry;
pub mod release;
pub mod report;
pub mod rng;
pub mod simulation;

pub use cancel::CancelToken;
pub use config::{validate_model, ConfigError, DiffusionSchedule, SimulationConfig};
pub use diffusion::displacement_scale;
pub use metrics::RunMetrics;
pub use registry::{EngineLease, EngineRegistry};
pub use release::release_count;
pub use report::{ReleaseOutcome, RunReport};
pub use rng::{ChaChaSource, ChunkStreams};
pub use simulation::{RegistrationError, RunError, RunState, Simulation};

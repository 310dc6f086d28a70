//! MCell Quickstart: a complete, minimal diffusion run from scratch.
//!
//! Demonstrates:
//!   1. Configuring a run (iterations, time step, seed, schedule)
//!   2. Registering a volume and a surface species
//!   3. Adding release sites, including a fractional and a Gaussian one
//!   4. Watching the run through an `IterationObserver`
//!   5. Reading the `RunReport` and resetting for a second seed
//!
//! Run with:
//!   RUST_LOG=mcell_engine=debug cargo run --example quickstart

use std::path::Path;

use mcell_core::{
    IterationObserver, MoleculeSpecies, ObserverError, PopulationView, QuantityType, ReleaseSite,
    Vec3,
};
use mcell_engine::{DiffusionSchedule, RunError, Simulation, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ─── Observer: print the centroid of each species ───────────────

struct CentroidPrinter {
    every: u64,
}

impl IterationObserver for CentroidPrinter {
    fn begin(&mut self, project_path: &Path) -> Result<(), ObserverError> {
        println!("project: {}", project_path.display());
        Ok(())
    }

    fn on_iteration(
        &mut self,
        iteration: u64,
        population: &PopulationView<'_>,
    ) -> Result<(), ObserverError> {
        if iteration % self.every != 0 {
            return Ok(());
        }
        for species in population.species() {
            let n = species.num_instances();
            if n == 0 {
                continue;
            }
            let mut sum = Vec3::ZERO;
            for m in species.instances() {
                sum += m.position;
            }
            let c = Vec3::new(sum.x / n as f64, sum.y / n as f64, sum.z / n as f64);
            println!("  iter {iteration:>4}  {:<4} n={n:<5} centroid={c}", species.name());
        }
        Ok(())
    }

    fn finish(&mut self, iterations_completed: u64) -> Result<(), ObserverError> {
        println!("finished after {iterations_completed} iterations");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mcell_engine=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulationConfig {
        num_iterations: 100,
        time_step: 1e-6,
        seed: 42,
        schedule: DiffusionSchedule::Chunked { chunk_size: 256 },
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(config)?;

    sim.add_molecule_species(MoleculeSpecies::volume("A", 1e-6))?;
    sim.add_molecule_species(MoleculeSpecies::surface("R", 1e-7))?;

    sim.add_molecule_release_site(ReleaseSite::new("A_center", "A", Vec3::ZERO, 1000.5))?;
    sim.add_molecule_release_site(
        ReleaseSite::new("R_patch", "R", Vec3::new(1e-6, 0.0, 0.0), 200.0)
            .with_quantity_type(QuantityType::Gaussian { stddev: 20.0 }),
    )?;

    let mut printer = CentroidPrinter { every: 25 };
    let report = sim.run_simulation(Path::new("quickstart"), Some(&mut printer))?;
    println!(
        "state={} released={} mean_iteration={:.1}us",
        report.state,
        report.total_released(),
        report.metrics.mean_iteration_us(report.iterations_completed)
    );

    // Same model, different seed.
    sim.reset(7);
    match sim.run() {
        Ok(report) => println!("seed 7: {:?}", report.population),
        Err(RunError::Config(e)) => eprintln!("bad model: {e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

//! Benchmark profiles and utilities for the MCell simulation engine.
//!
//! Provides pre-built simulations for benchmarking and examples:
//!
//! - [`reference_profile`]: 10K volume + 2K surface molecules
//! - [`stress_profile`]: ~100K volume + 20K surface molecules
//! - [`prepare`]: a profile with release sites already fired

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mcell_core::{MoleculeSpecies, ReleaseSite, Vec3};
use mcell_engine::{DiffusionSchedule, Simulation, SimulationConfig};

/// Build the reference benchmark profile.
///
/// Species: `A` (volume, D=1e-6), `R` (surface, D=1e-7), `C` (volume, D=0).
/// Releases 10K `A`, 2K `R` and 1K immobile `C` at three sites.
pub fn reference_profile(
    seed: u64,
    iterations: u64,
    schedule: DiffusionSchedule,
) -> Simulation {
    build(seed, iterations, schedule, 1)
}

/// Build a stress profile: the reference model at 10x the molecule count.
pub fn stress_profile(seed: u64, iterations: u64, schedule: DiffusionSchedule) -> Simulation {
    build(seed, iterations, schedule, 10)
}

/// Build a profile with zero iterations and run it, leaving every release
/// site fired. Useful as a starting population for diffusion-only benches.
pub fn prepare(seed: u64, scale: u32) -> Simulation {
    let mut sim = build(seed, 0, DiffusionSchedule::Sequential, scale);
    // Profiles are statically valid; a failure here is a bug in `build`.
    if let Err(e) = sim.run() {
        panic!("benchmark profile failed to release: {e}");
    }
    sim
}

fn build(seed: u64, iterations: u64, schedule: DiffusionSchedule, scale: u32) -> Simulation {
    let config = SimulationConfig {
        num_iterations: iterations,
        time_step: 1e-6,
        seed,
        schedule,
        ..SimulationConfig::default()
    };
    let n = f64::from(scale);
    let result = (|| -> Result<Simulation, Box<dyn std::error::Error>> {
        let mut sim = Simulation::new(config)?;
        sim.add_molecule_species(MoleculeSpecies::volume("A", 1e-6))?;
        sim.add_molecule_species(MoleculeSpecies::surface("R", 1e-7))?;
        sim.add_molecule_species(MoleculeSpecies::volume("C", 0.0))?;
        sim.add_molecule_release_site(ReleaseSite::new("A_src", "A", Vec3::ZERO, 10_000.0 * n))?;
        sim.add_molecule_release_site(ReleaseSite::new(
            "R_src",
            "R",
            Vec3::new(1e-6, 0.0, 0.0),
            2_000.0 * n,
        ))?;
        sim.add_molecule_release_site(ReleaseSite::new(
            "C_src",
            "C",
            Vec3::new(0.0, 1e-6, 0.0),
            1_000.0 * n,
        ))?;
        Ok(sim)
    })();
    match result {
        Ok(sim) => sim,
        Err(e) => panic!("invalid benchmark profile: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_releases_expected_counts() {
        let sim = prepare(1, 1);
        let pop = sim.population();
        assert_eq!(pop.get("A").map(|s| s.num_instances()), Some(10_000));
        assert_eq!(pop.get("R").map(|s| s.num_instances()), Some(2_000));
        assert_eq!(pop.total_instances(), 13_000);
    }

    #[test]
    fn profiles_validate() {
        assert!(reference_profile(1, 10, DiffusionSchedule::Sequential)
            .validate()
            .is_ok());
        assert!(stress_profile(1, 10, DiffusionSchedule::Chunked { chunk_size: 1024 })
            .validate()
            .is_ok());
    }
}

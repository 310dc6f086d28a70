//! Brownian displacement of molecule instances.
//!
//! Each iteration moves every instance by `σ · N(0,1)` along each of its
//! diffusing axes, with `σ = sqrt(2 · D · Δt)`. Volume species move in
//! x, y, z; surface species in x and y only. A species with `σ == 0`
//! is skipped without drawing anything.

use mcell_core::{
    KeyedStore, KineticType, MoleculeInstance, MoleculeSpecies, RandomError, RandomSource,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::rng::ChunkStreams;

/// Work done by one diffusion pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StepTally {
    pub(crate) draws: u64,
    pub(crate) moves: u64,
}

impl std::ops::Add for StepTally {
    type Output = StepTally;

    fn add(self, rhs: StepTally) -> StepTally {
        StepTally {
            draws: self.draws + rhs.draws,
            moves: self.moves + rhs.moves,
        }
    }
}

/// Per-axis RMS displacement for diffusion constant `d` over time step `dt`.
pub fn displacement_scale(d: f64, dt: f64) -> f64 {
    (2.0 * d * dt).sqrt()
}

/// Displace a run of instances sharing one kinetic type and scale.
fn displace_all<R: RandomSource + ?Sized>(
    instances: &mut [MoleculeInstance],
    kinetic: KineticType,
    sigma: f64,
    rng: &mut R,
) -> Result<StepTally, RandomError> {
    for m in instances.iter_mut() {
        m.position.x += sigma * rng.normal()?;
        m.position.y += sigma * rng.normal()?;
        if kinetic == KineticType::Volume {
            m.position.z += sigma * rng.normal()?;
        }
    }
    let moves = instances.len() as u64;
    Ok(StepTally {
        draws: moves * kinetic.diffusing_axes() as u64,
        moves,
    })
}

/// One sequential diffusion pass over every species, in registration
/// order, drawing from `rng`.
pub(crate) fn diffuse_sequential<R: RandomSource + ?Sized>(
    species: &mut KeyedStore<MoleculeSpecies>,
    time_step: f64,
    rng: &mut R,
) -> Result<StepTally, RandomError> {
    let mut tally = StepTally::default();
    for s in species.values_mut() {
        let sigma = displacement_scale(s.diffusion_constant(), time_step);
        if sigma == 0.0 {
            continue;
        }
        let kinetic = s.kinetic_type();
        tally = tally + displace_all(s.instances_mut(), kinetic, sigma, rng)?;
    }
    Ok(tally)
}

/// One chunked diffusion pass. Chunk `c` of species `i` draws from
/// `streams.source(iteration, i, c)`; chunks run on the rayon pool when
/// the `parallel` feature is enabled.
pub(crate) fn diffuse_chunked(
    species: &mut KeyedStore<MoleculeSpecies>,
    time_step: f64,
    streams: &ChunkStreams,
    iteration: u64,
    chunk_size: usize,
) -> Result<StepTally, RandomError> {
    let mut tally = StepTally::default();
    for (index, s) in species.values_mut().enumerate() {
        let sigma = displacement_scale(s.diffusion_constant(), time_step);
        if sigma == 0.0 {
            continue;
        }
        let kinetic = s.kinetic_type();
        let species_index = index as u32;
        let run_chunk = |(chunk, instances): (usize, &mut [MoleculeInstance])| {
            let mut rng = streams.source(iteration, species_index, chunk as u64);
            displace_all(instances, kinetic, sigma, &mut rng)
        };

        #[cfg(feature = "parallel")]
        let chunks: Vec<StepTally> = s
            .instances_mut()
            .par_chunks_mut(chunk_size)
            .enumerate()
            .map(run_chunk)
            .collect::<Result<_, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let chunks: Vec<StepTally> = s
            .instances_mut()
            .chunks_mut(chunk_size)
            .enumerate()
            .map(run_chunk)
            .collect::<Result<_, _>>()?;

        tally = chunks.into_iter().fold(tally, |acc, t| acc + t);
    }
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcell_core::{SpeciesId, Vec3};
    use mcell_test_utils::{ConstantSource, ScriptedSource};

    fn store(species: Vec<MoleculeSpecies>, count: usize) -> KeyedStore<MoleculeSpecies> {
        let mut store = KeyedStore::new();
        for (i, mut s) in species.into_iter().enumerate() {
            s.bind(SpeciesId(i as u32));
            s.spawn(Vec3::ZERO, count).unwrap();
            let name = s.name().to_string();
            store.insert(name, s).unwrap();
        }
        store
    }

    #[test]
    fn scale_matches_brownian_rms() {
        assert_eq!(displacement_scale(0.0, 1.0), 0.0);
        assert!((displacement_scale(2.0, 0.25) - 1.0).abs() < 1e-15);
        assert!((displacement_scale(1e-6, 1e-6) - (2e-12f64).sqrt()).abs() < 1e-20);
    }

    #[test]
    fn volume_moves_all_three_axes() {
        // sigma = sqrt(2 * 0.5 * 1.0) = 1
        let mut species = store(vec![MoleculeSpecies::volume("A", 0.5)], 1);
        let mut rng = ScriptedSource::new(vec![], vec![1.0, -2.0, 3.0]);
        let tally = diffuse_sequential(&mut species, 1.0, &mut rng).unwrap();
        assert_eq!(tally, StepTally { draws: 3, moves: 1 });
        let p = species.lookup("A").unwrap().instances()[0].position;
        assert_eq!(p, Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn surface_keeps_z_fixed() {
        let mut species = store(vec![MoleculeSpecies::surface("S", 0.5)], 2);
        let mut rng = ScriptedSource::new(vec![], vec![1.0, 1.0, 2.0, 2.0]);
        let tally = diffuse_sequential(&mut species, 1.0, &mut rng).unwrap();
        assert_eq!(tally.draws, 4);
        let s = species.lookup("S").unwrap();
        assert_eq!(s.instances()[0].position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(s.instances()[1].position, Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn immobile_species_consumes_no_entropy() {
        let mut species = store(
            vec![
                MoleculeSpecies::volume("still", 0.0),
                MoleculeSpecies::volume("moving", 0.5),
            ],
            3,
        );
        let mut rng = ConstantSource::new(0.5, 1.0);
        let tally = diffuse_sequential(&mut species, 1.0, &mut rng).unwrap();
        assert_eq!(rng.normal_draws(), 9);
        assert_eq!(tally, StepTally { draws: 9, moves: 3 });
        assert!(species
            .lookup("still")
            .unwrap()
            .instances()
            .iter()
            .all(|m| m.position == Vec3::ZERO));
    }

    #[test]
    fn traversal_is_registration_then_instance_order() {
        let mut species = store(
            vec![
                MoleculeSpecies::surface("B", 0.5),
                MoleculeSpecies::surface("A", 0.5),
            ],
            2,
        );
        let normals = (1..=8).map(f64::from).collect();
        let mut rng = ScriptedSource::new(vec![], normals);
        diffuse_sequential(&mut species, 1.0, &mut rng).unwrap();
        let xs: Vec<f64> = species
            .values()
            .flat_map(|s| s.instances().iter().map(|m| m.position.x))
            .collect();
        assert_eq!(xs, vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut species = store(vec![MoleculeSpecies::volume("A", 0.5)], 1);
        let mut rng = ScriptedSource::new(vec![], vec![1.0]);
        assert_eq!(
            diffuse_sequential(&mut species, 1.0, &mut rng),
            Err(RandomError::Exhausted)
        );
    }

    #[test]
    fn chunked_is_reproducible() {
        let build = || {
            store(
                vec![
                    MoleculeSpecies::volume("A", 1.0),
                    MoleculeSpecies::surface("B", 0.3),
                ],
                257,
            )
        };
        let streams = ChunkStreams::new(5);

        let mut a = build();
        let mut b = build();
        for iteration in 1..=3 {
            diffuse_chunked(&mut a, 1e-3, &streams, iteration, 16).unwrap();
            diffuse_chunked(&mut b, 1e-3, &streams, iteration, 16).unwrap();
        }
        assert_eq!(a.lookup("A").unwrap(), b.lookup("A").unwrap());
        assert_eq!(a.lookup("B").unwrap(), b.lookup("B").unwrap());
        assert!(b
            .lookup("B")
            .unwrap()
            .instances()
            .iter()
            .all(|m| m.position.z == 0.0));
    }

    #[test]
    fn chunked_tally_counts_every_instance() {
        let mut species = store(vec![MoleculeSpecies::volume("A", 1.0)], 100);
        let tally = diffuse_chunked(&mut species, 1.0, &ChunkStreams::new(1), 1, 7).unwrap();
        assert_eq!(tally, StepTally { draws: 300, moves: 100 });
    }

    #[test]
    fn chunked_matches_manual_stream_replay() {
        let mut species = store(vec![MoleculeSpecies::volume("A", 0.5)], 5);
        let streams = ChunkStreams::new(77);
        diffuse_chunked(&mut species, 1.0, &streams, 4, 2).unwrap();

        // Chunks of 2: [0,1], [2,3], [4]; sigma = 1.
        let mut expected = Vec::new();
        for (chunk, len) in [(0u64, 2), (1, 2), (2, 1)] {
            let mut rng = streams.source(4, 0, chunk);
            for _ in 0..len {
                let x = rng.normal().unwrap();
                let y = rng.normal().unwrap();
                let z = rng.normal().unwrap();
                expected.push(Vec3::new(x, y, z));
            }
        }
        let got: Vec<Vec3> = species
            .lookup("A")
            .unwrap()
            .instances()
            .iter()
            .map(|m| m.position)
            .collect();
        assert_eq!(got, expected);
    }
}

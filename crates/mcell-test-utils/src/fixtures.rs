//! Reusable model fixtures.
//!
//! Small, named models for engine and integration tests:
//!
//! - [`two_species`]: a volume species `"A"` and a surface species `"S"`.
//! - [`point_release`]: a constant release at the origin.
//! - [`populated_store`]: a bound species store with instances already spawned.

use mcell_core::{KeyedStore, MoleculeSpecies, ReleaseSite, SpeciesId, Vec3};

/// Volume species `"A"` (D = 1e-6) and surface species `"S"` (D = 5e-7).
pub fn two_species() -> Vec<MoleculeSpecies> {
    vec![
        MoleculeSpecies::volume("A", 1e-6),
        MoleculeSpecies::surface("S", 5e-7),
    ]
}

/// A constant release of `quantity` molecules of `species` at the origin.
pub fn point_release(species: &str, quantity: f64) -> ReleaseSite {
    ReleaseSite::new(format!("{species}_origin"), species, Vec3::ZERO, quantity)
}

/// Bind each species in order and spawn `count` instances at the origin.
pub fn populated_store(species: Vec<MoleculeSpecies>, count: usize) -> KeyedStore<MoleculeSpecies> {
    let mut store = KeyedStore::new();
    for (i, mut s) in species.into_iter().enumerate() {
        s.bind(SpeciesId(i as u32));
        s.spawn(Vec3::ZERO, count)
            .unwrap_or_else(|e| panic!("fixture spawn failed: {e}"));
        let name = s.name().to_string();
        store
            .insert(name, s)
            .unwrap_or_else(|e| panic!("fixture insert failed: {e}"));
    }
    store
}

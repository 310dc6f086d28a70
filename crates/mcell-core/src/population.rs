//! Read-only view over the live population.

use crate::id::Vec3;
use crate::species::MoleculeSpecies;
use crate::store::KeyedStore;

/// Borrowed, read-only view of every species and its instances.
///
/// Handed to observers at iteration boundaries. Species are yielded in
/// registration order, instances in creation order.
#[derive(Clone, Copy, Debug)]
pub struct PopulationView<'a> {
    species: &'a KeyedStore<MoleculeSpecies>,
}

impl<'a> PopulationView<'a> {
    /// Wrap a species store.
    pub fn new(species: &'a KeyedStore<MoleculeSpecies>) -> Self {
        Self { species }
    }

    /// Species in registration order.
    pub fn species(&self) -> impl Iterator<Item = &'a MoleculeSpecies> + 'a {
        self.species.values()
    }

    /// Look up one species by name.
    pub fn get(&self, name: &str) -> Option<&'a MoleculeSpecies> {
        self.species.lookup(name)
    }

    /// Total live instances across all species.
    pub fn total_instances(&self) -> usize {
        self.species.values().map(MoleculeSpecies::num_instances).sum()
    }

    /// Every `(species name, position)` pair, species-major.
    pub fn positions(&self) -> impl Iterator<Item = (&'a str, Vec3)> + 'a {
        self.species.values().flat_map(|s| {
            let name = s.name();
            s.instances().iter().map(move |m| (name, m.position))
        })
    }
}

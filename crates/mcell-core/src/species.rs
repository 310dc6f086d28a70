//! Molecule species and the instances they own.

use std::fmt;

use crate::error::ReleaseError;
use crate::id::{SpeciesId, Vec3};

/// How a species moves through space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KineticType {
    /// Diffuses freely in all three axes.
    #[default]
    Volume,
    /// Bound to a surface: diffuses in x and y, z stays fixed.
    Surface,
}

impl KineticType {
    /// Parse a legacy single-character type code.
    ///
    /// Accepts `'v'`/`'3'` for volume and `'s'`/`'2'` for surface
    /// (case-insensitive). Returns `None` for anything else.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'v' | '3' => Some(Self::Volume),
            's' | '2' => Some(Self::Surface),
            _ => None,
        }
    }

    /// The canonical single-character code for this type.
    pub fn code(self) -> char {
        match self {
            Self::Volume => 'v',
            Self::Surface => 's',
        }
    }

    /// Number of axes a molecule of this type diffuses along.
    pub fn diffusing_axes(self) -> usize {
        match self {
            Self::Volume => 3,
            Self::Surface => 2,
        }
    }
}

impl fmt::Display for KineticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volume => write!(f, "volume"),
            Self::Surface => write!(f, "surface"),
        }
    }
}

/// One physical molecule: a position plus the species it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoleculeInstance {
    /// Current position.
    pub position: Vec3,
    /// The species that owns this instance.
    pub species: SpeciesId,
}

/// A chemical species and the live list of its instances.
///
/// The instance list is a contiguous vector: indices are stable for the
/// lifetime of a run because instances are only ever appended.
#[derive(Clone, Debug, PartialEq)]
pub struct MoleculeSpecies {
    name: String,
    kinetic_type: KineticType,
    diffusion_constant: f64,
    id: Option<SpeciesId>,
    instances: Vec<MoleculeInstance>,
}

impl MoleculeSpecies {
    /// Create an unregistered species with no instances.
    pub fn new(
        name: impl Into<String>,
        kinetic_type: KineticType,
        diffusion_constant: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kinetic_type,
            diffusion_constant,
            id: None,
            instances: Vec::new(),
        }
    }

    /// Shorthand for a [`KineticType::Volume`] species.
    pub fn volume(name: impl Into<String>, diffusion_constant: f64) -> Self {
        Self::new(name, KineticType::Volume, diffusion_constant)
    }

    /// Shorthand for a [`KineticType::Surface`] species.
    pub fn surface(name: impl Into<String>, diffusion_constant: f64) -> Self {
        Self::new(name, KineticType::Surface, diffusion_constant)
    }

    /// Species name, unique within a simulation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Volume or surface kinetics.
    pub fn kinetic_type(&self) -> KineticType {
        self.kinetic_type
    }

    /// Diffusion constant D (length²/time).
    pub fn diffusion_constant(&self) -> f64 {
        self.diffusion_constant
    }

    /// ID assigned at registration, or `None` before that.
    pub fn id(&self) -> Option<SpeciesId> {
        self.id
    }

    /// Attach the registration ID. Called by the engine when the species
    /// is added to its store; every instance spawned afterwards carries it.
    #[doc(hidden)]
    pub fn bind(&mut self, id: SpeciesId) {
        self.id = Some(id);
    }

    /// Check structural invariants: non-empty name, finite non-negative D.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("species name must not be empty".to_string());
        }
        if !self.diffusion_constant.is_finite() || self.diffusion_constant < 0.0 {
            return Err(format!(
                "diffusion_constant must be finite and >= 0, got {}",
                self.diffusion_constant
            ));
        }
        Ok(())
    }

    /// Number of live instances. O(1).
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// Live instances in creation order.
    pub fn instances(&self) -> &[MoleculeInstance] {
        &self.instances
    }

    /// Mutable access to the live instances, for displacement.
    pub fn instances_mut(&mut self) -> &mut [MoleculeInstance] {
        &mut self.instances
    }

    /// Create `count` instances at `position`, returning the index of the
    /// first new one.
    ///
    /// Fails with [`ReleaseError::UnboundSpecies`] if the species has not
    /// been registered, since the instances would have no back-reference,
    /// and with [`ReleaseError::CapacityExceeded`] if the list cannot grow
    /// by `count`. Nothing is created on failure.
    pub fn spawn(&mut self, position: Vec3, count: usize) -> Result<usize, ReleaseError> {
        let species = self.id.ok_or_else(|| ReleaseError::UnboundSpecies {
            species: self.name.clone(),
        })?;
        let first = self.instances.len();
        self.instances
            .try_reserve(count)
            .map_err(|_| ReleaseError::CapacityExceeded {
                species: self.name.clone(),
                requested: count,
            })?;
        self.instances.extend(
            std::iter::repeat(MoleculeInstance { position, species }).take(count),
        );
        Ok(first)
    }

    /// Drop every instance, keeping the registration.
    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }
}

//! Point release sites.
//!
//! A [`ReleaseSite`] creates instances of one species at one location
//! when it fires. How many it creates is governed by its `quantity`,
//! its [`QuantityType`], and its release `probability`; the firing
//! policy itself lives in the engine.

use crate::id::Vec3;

/// Largest quantity a single site may release in one firing.
///
/// Also caps Gaussian samples, so no firing ever asks for more.
pub const MAX_RELEASE_QUANTITY: f64 = 1e8;

/// How a site's quantity is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum QuantityType {
    /// Release exactly `quantity` molecules (fractional part resolved
    /// by a single Bernoulli trial).
    #[default]
    Constant,
    /// Release a normally distributed number of molecules with mean
    /// `quantity` and the given standard deviation, clamped at zero.
    Gaussian {
        /// Standard deviation of the release count.
        stddev: f64,
    },
}

/// A configured point source of molecules.
#[derive(Clone, Debug, PartialEq)]
pub struct ReleaseSite {
    /// Label for logs and reports. Not required to be unique.
    pub name: String,
    /// Name of the target species.
    pub species: String,
    /// Where new instances are placed.
    pub location: Vec3,
    /// Number of molecules to release (mean for Gaussian releases).
    pub quantity: f64,
    /// Interpretation of `quantity`.
    pub quantity_type: QuantityType,
    /// Chance the site fires at all, in `[0, 1]`.
    pub probability: f64,
}

impl ReleaseSite {
    /// A constant-quantity site that always fires.
    pub fn new(
        name: impl Into<String>,
        species: impl Into<String>,
        location: Vec3,
        quantity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            location,
            quantity,
            quantity_type: QuantityType::Constant,
            probability: 1.0,
        }
    }

    /// Set the quantity type.
    pub fn with_quantity_type(mut self, quantity_type: QuantityType) -> Self {
        self.quantity_type = quantity_type;
        self
    }

    /// Set the release probability.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Check structural invariants on location, quantity, and probability.
    pub fn validate(&self) -> Result<(), String> {
        if !self.location.is_finite() {
            return Err(format!("location must be finite, got {}", self.location));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(format!(
                "quantity must be finite and >= 0, got {}",
                self.quantity
            ));
        }
        if self.quantity > MAX_RELEASE_QUANTITY {
            return Err(format!(
                "quantity must be <= {MAX_RELEASE_QUANTITY}, got {}",
                self.quantity
            ));
        }
        if let QuantityType::Gaussian { stddev } = self.quantity_type {
            if !stddev.is_finite() || stddev < 0.0 {
                return Err(format!("stddev must be finite and >= 0, got {stddev}"));
            }
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(format!(
                "probability must be in [0.0, 1.0], got {}",
                self.probability
            ));
        }
        Ok(())
    }
}

//! Release-site firing.
//!
//! Every site fires once, at the start of a run, in insertion order.
//! For an effective quantity `q`, `floor(q)` molecules are always created
//! and the remainder `q - floor(q)` is the probability of one more
//! (a single Bernoulli trial). Gaussian sites first sample `q` around
//! their mean; sites with `probability < 1` first decide whether to fire
//! at all. Draws are only taken when they can change the outcome, so a
//! constant, integral, always-firing site consumes no randomness.

use mcell_core::{
    KeyedStore, MoleculeSpecies, QuantityType, RandomError, RandomSource, ReleaseError,
    ReleaseSite, SequentialStore, MAX_RELEASE_QUANTITY,
};

use crate::report::ReleaseOutcome;

/// Outcome of firing every site once.
#[derive(Debug, Default)]
pub(crate) struct ReleasePhase {
    pub(crate) outcomes: Vec<ReleaseOutcome>,
    pub(crate) errors: Vec<ReleaseError>,
}

/// Decide how many molecules `site` releases.
///
/// Returns `Ok(None)` when the site's release probability says it does
/// not fire this run.
pub fn release_count<R: RandomSource + ?Sized>(
    site: &ReleaseSite,
    rng: &mut R,
) -> Result<Option<usize>, RandomError> {
    if site.probability < 1.0 && rng.uniform()? >= site.probability {
        return Ok(None);
    }

    let quantity = match site.quantity_type {
        QuantityType::Constant => site.quantity,
        QuantityType::Gaussian { stddev } if stddev > 0.0 => {
            (site.quantity + stddev * rng.normal()?).clamp(0.0, MAX_RELEASE_QUANTITY)
        }
        QuantityType::Gaussian { .. } => site.quantity,
    };

    let whole = quantity.floor();
    let remainder = quantity - whole;
    let mut count = whole as usize;
    if remainder > 0.0 && rng.uniform()? < remainder {
        count += 1;
    }
    Ok(Some(count))
}

/// Fire every site in insertion order.
///
/// Per-site problems (unknown or unbound species, allocation failure) are
/// recorded as errors and the site gets no outcome entry; only a
/// random-source failure aborts.
pub(crate) fn fire_release_sites<R: RandomSource + ?Sized>(
    species: &mut KeyedStore<MoleculeSpecies>,
    sites: &SequentialStore<ReleaseSite>,
    rng: &mut R,
) -> Result<ReleasePhase, RandomError> {
    let mut phase = ReleasePhase::default();

    for (index, site) in sites.iter().enumerate() {
        let Some(target) = species.lookup_mut(&site.species) else {
            let err = ReleaseError::UnknownSpecies {
                site: index,
                species: site.species.clone(),
            };
            tracing::warn!(site = index, name = %site.name, error = %err, "release site skipped");
            phase.errors.push(err);
            continue;
        };

        let mut outcome = ReleaseOutcome {
            site: index,
            name: site.name.clone(),
            species: site.species.clone(),
            fired: false,
            created: 0,
        };

        if let Some(count) = release_count(site, rng)? {
            if let Err(err) = target.spawn(site.location, count) {
                tracing::warn!(
                    site = index,
                    name = %site.name,
                    error = %err,
                    "release site failed"
                );
                phase.errors.push(err);
                continue;
            }
            outcome.fired = true;
            outcome.created = count;
        }

        tracing::debug!(
            site = index,
            name = %site.name,
            species = %site.species,
            fired = outcome.fired,
            created = outcome.created,
            "release site processed"
        );
        phase.outcomes.push(outcome);
    }

    Ok(phase)
}

//! First-occurrence distribution derived from a hazard sequence.
use bigdecimal::BigDecimal;
use num_traits::One;

use crate::EngineError;
use crate::hazard::HazardSequence;
use crate::numbers::{Precision, to_f64_lossy};
use crate::pmf::Pmf;

/// PMF over the draw index of the first rare occurrence in a pool cycle.
pub type OccurrenceDistribution = Pmf;

/// Survival reduction: `O[i] = H[i] × m`, then `m ← m − O[i]`, starting from `m = 1`.
///
/// # Errors
///
/// Returns [`EngineError::Allocation`] when the distribution cannot be allocated.
pub fn first_occurrence(
    hazards: &HazardSequence,
    precision: Precision,
) -> Result<OccurrenceDistribution, EngineError> {
    let mut out = Pmf::zeroed(hazards.len())?;
    let mut remaining = BigDecimal::one();
    for (slot, hazard) in out.values_mut().iter_mut().zip(hazards.iter()) {
        let hit = precision.round(hazard * &remaining);
        remaining = precision.round(&remaining - &hit);
        *slot = hit;
    }
    log::trace!(
        "first-occurrence over {} draws leaves residual mass {:e}",
        hazards.len(),
        to_f64_lossy(&remaining)
    );
    Ok(out)
}

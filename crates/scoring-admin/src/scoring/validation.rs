//! Save-time validation shared by the panel and the service.
//!
//! The panel runs these checks before a request leaves the process; the
//! service runs the structural ones again so the API holds the same line
//! regardless of caller. Messages stay in the operators' language because
//! they surface verbatim in notifications and API error bodies.

use super::domain::Criterion;
use super::rates::round_to;

pub const WEIGHT_SUM_TARGET: f64 = 100.0;
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.1;

/// Raised when criterion weights do not total 100 within the tolerance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Los pesos deben sumar 100%. Actualmente suman {sum:.1}%")]
pub struct WeightSumError {
    pub sum: f64,
}

/// Raised when a save or delete would leave a line without risk tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Debe mantener al menos un nivel de riesgo.")]
pub struct LastTierError;

/// Arithmetic sum of the weights. Weights that fail numeric coercion in
/// the panel arrive as NaN and count as zero, same as an empty field.
pub fn weight_sum(criteria: &[Criterion]) -> f64 {
    criteria
        .iter()
        .map(|c| if c.weight.is_finite() { c.weight } else { 0.0 })
        .sum()
}

/// Weight sum as shown in the section badge, rounded to one decimal.
pub fn displayed_weight_sum(criteria: &[Criterion]) -> f64 {
    round_to(weight_sum(criteria), 1)
}

/// Save gate for the criteria section.
pub fn check_weight_sum(criteria: &[Criterion]) -> Result<f64, WeightSumError> {
    let sum = weight_sum(criteria);
    if (sum - WEIGHT_SUM_TARGET).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(WeightSumError { sum });
    }
    Ok(sum)
}

/// Guard for removing a tier from a list of `count` tiers.
pub fn check_tier_removal(count: usize) -> Result<(), LastTierError> {
    if count <= 1 {
        return Err(LastTierError);
    }
    Ok(())
}

/// Guard for storing a tier list: a line never goes back below one tier.
pub fn check_tier_list(count: usize) -> Result<(), LastTierError> {
    if count == 0 {
        return Err(LastTierError);
    }
    Ok(())
}

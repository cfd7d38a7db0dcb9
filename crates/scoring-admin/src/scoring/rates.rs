//! Interest-rate derivation for risk tiers.

/// Converts an annual effective rate (percent) to the equivalent nominal
/// monthly rate (percent), rounded to 4 decimals.
///
/// This is the only derived field in a tier: the panel recomputes it every
/// time the annual rate changes, and it is never edited directly.
pub fn monthly_nominal_rate(annual_effective_pct: f64) -> f64 {
    let monthly = ((1.0 + annual_effective_pct / 100.0).powf(1.0 / 12.0) - 1.0) * 100.0;
    round_to(monthly, 4)
}

/// Rounds to a fixed number of decimals, half away from zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

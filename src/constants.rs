// =============================================================================
// Shared constants for the benchmark toolkit
// =============================================================================

/// Maximum number of leaf components allowed in a predictive distribution,
/// nested mixtures fully expanded. Keeps CRPS evaluation fast and memory
/// bounded; may be raised in the future.
pub const MAX_DISTRIBUTION_COMPONENTS: usize = 10;

/// Base step, in seconds, of the CRPS integration grid.
///
/// CRPS = ∫ (F(z) - 1[z ≥ x])² dz over z ∈ [t_min, t_max].
pub const CRPS_BASE_STEP: i64 = 300;

/// Base CRPS integration half-width for `asset` at horizon "t".
///
/// The value is a reference maximum price-move scale for the asset — a
/// truncation range wide enough to cover meaningful mass in the integral.
/// Returns `None` for assets without a calibrated bound.
pub fn crps_half_width(asset: &str) -> Option<f64> {
    match asset {
        "BTC" => Some(1500.0),
        "SOL" => Some(4.0),
        "ETH" => Some(80.0),
        "XAU" => Some(28.0),
        _ => None,
    }
}

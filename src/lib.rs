// =============================================================================
// quantbench — forecasting-benchmark toolkit core
// =============================================================================
//
// The heart of the crate is [`store::PriceStore`], a per-asset, time-ordered
// price cache. Benchmark trackers ingest ticks into it and pull resampled
// history back out to fit density forecasts, which are validated against the
// predictive-distribution schema in [`distribution`].
// =============================================================================

pub mod config;
pub mod constants;
pub mod distribution;
pub mod stats;
pub mod store;
pub mod tracker;

pub use config::BenchConfig;
pub use distribution::{Density, Forecast, MixtureComponent};
pub use store::{ConflictPolicy, PricePoint, PriceStore};
pub use tracker::{GaussianStepTracker, Tracker};

// =============================================================================
// Forecast trackers
// =============================================================================
//
// A tracker owns a price cache, ingests ticks through `tick`, and answers
// `predict` with a density forecast per future step. The Gaussian step
// tracker is the reference benchmark model: it fits N(mu, sigma) to the
// log-returns of recent resampled history and forecasts that same density
// for every step of the horizon.
// =============================================================================

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::distribution::{Density, Forecast};
use crate::stats::{log_returns, mean, std_dev};
use crate::store::{PricePoint, PriceStore};

/// Days of history the Gaussian tracker fits its return distribution on.
const FIT_WINDOW_DAYS: i64 = 5;

/// A forecasting model driven by the benchmark loop.
///
/// `tick` has a default implementation that feeds the batch straight into the
/// tracker's price cache; override it for models that need custom update
/// logic.
pub trait Tracker {
    /// The tracker's price cache.
    fn prices(&self) -> &PriceStore;

    /// Mutable access to the tracker's price cache.
    fn prices_mut(&mut self) -> &mut PriceStore;

    /// Ingest a per-asset batch of new ticks.
    fn tick(&mut self, data: &HashMap<String, Vec<PricePoint>>) {
        self.prices_mut().add_bulk(data);
    }

    /// Forecast densities for each step of the horizon, both in seconds.
    ///
    /// Returns one [`Forecast`] per step `k * step <= horizon`, or an empty
    /// vector when the model cannot produce a usable fit.
    fn predict(&self, asset: &str, horizon: i64, step: i64) -> Vec<Forecast>;
}

/// Benchmark tracker modelling *future log-returns* as Gaussian.
///
/// For each forecast step the tracker returns N(mu, sigma) where mu and
/// sigma are the mean and standard deviation of historical log-returns
/// sampled at the prediction step. This is a distribution over log-returns
/// between consecutive steps, not over prices.
pub struct GaussianStepTracker {
    prices: PriceStore,
}

impl GaussianStepTracker {
    /// Build the tracker around an explicitly constructed price cache.
    pub fn new(prices: PriceStore) -> Self {
        Self { prices }
    }
}

impl Tracker for GaussianStepTracker {
    fn prices(&self) -> &PriceStore {
        &self.prices
    }

    fn prices_mut(&mut self) -> &mut PriceStore {
        &mut self.prices
    }

    fn predict(&self, asset: &str, horizon: i64, step: i64) -> Vec<Forecast> {
        if step <= 0 {
            warn!(asset, step, "non-positive prediction step");
            return Vec::new();
        }

        // Past prices resampled at the prediction step.
        let pairs = self.prices.get_prices(asset, Some(FIT_WINDOW_DAYS), step);
        if pairs.len() < 3 {
            debug!(asset, samples = pairs.len(), "not enough history to fit");
            return Vec::new();
        }

        let past_prices: Vec<f64> = pairs.iter().map(|p| p.price).collect();
        let returns = log_returns(&past_prices);

        // Drift and volatility of the step-to-step log-returns.
        let mu = mean(&returns);
        let sigma = std_dev(&returns);

        if sigma <= 0.0 {
            debug!(asset, "zero return volatility, no usable fit");
            return Vec::new();
        }

        let num_segments = horizon / step;
        (1..=num_segments)
            .map(|k| Forecast {
                step: k * step,
                density: Density::singleton_mixture(Density::normal(mu, sigma)),
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    /// A price path whose log-returns alternate +r, -r: mu = 0, sigma = r.
    fn zigzag_tracker(n: usize, r: f64) -> GaussianStepTracker {
        let mut store = PriceStore::new(30);
        let base_ts = 1_700_000_000;
        let mut price = 100.0f64;
        let mut points = vec![PricePoint::new(base_ts, price)];
        for i in 1..n {
            let ret = if i % 2 == 1 { r } else { -r };
            price *= ret.exp();
            points.push(PricePoint::new(base_ts + i as i64 * 300, price));
        }
        store.add_prices("BTC", &points);
        GaussianStepTracker::new(store)
    }

    #[test]
    fn unknown_asset_predicts_nothing() {
        let tracker = GaussianStepTracker::new(PriceStore::new(30));
        assert!(tracker.predict("BTC", 86_400, 300).is_empty());
    }

    #[test]
    fn too_little_history_predicts_nothing() {
        let mut store = PriceStore::new(30);
        store.add_prices(
            "BTC",
            &[
                PricePoint::new(1_700_000_000, 100.0),
                PricePoint::new(1_700_000_300, 101.0),
            ],
        );
        let tracker = GaussianStepTracker::new(store);
        assert!(tracker.predict("BTC", 86_400, 300).is_empty());
    }

    #[test]
    fn flat_prices_have_no_volatility() {
        let mut store = PriceStore::new(30);
        let points: Vec<PricePoint> = (0..20)
            .map(|i| PricePoint::new(1_700_000_000 + i * 300, 100.0))
            .collect();
        store.add_prices("BTC", &points);
        let tracker = GaussianStepTracker::new(store);
        assert!(tracker.predict("BTC", 86_400, 300).is_empty());
    }

    #[test]
    fn forecast_count_matches_horizon_over_step() {
        let tracker = zigzag_tracker(50, 0.01);
        let forecasts = tracker.predict("BTC", 3_600, 300);
        assert_eq!(forecasts.len(), 12);
        for (i, f) in forecasts.iter().enumerate() {
            assert_eq!(f.step, (i as i64 + 1) * 300);
        }
    }

    #[test]
    fn fitted_density_matches_return_moments() {
        let tracker = zigzag_tracker(41, 0.02);
        let forecasts = tracker.predict("BTC", 600, 300);
        assert_eq!(forecasts.len(), 2);

        // 40 alternating returns: mu = 0, sigma = 0.02 exactly.
        let Density::Mixture { components } = &forecasts[0].density else {
            panic!("expected a mixture");
        };
        assert_eq!(components.len(), 1);
        assert!((components[0].weight - 1.0).abs() < EPS);
        let Density::Builtin { name, params } = &components[0].density else {
            panic!("expected a builtin leaf");
        };
        assert_eq!(name, "norm");
        assert!(params["loc"].as_f64().unwrap().abs() < EPS);
        assert!((params["scale"].as_f64().unwrap() - 0.02).abs() < EPS);
    }

    #[test]
    fn emitted_densities_pass_validation() {
        let tracker = zigzag_tracker(50, 0.01);
        for forecast in tracker.predict("BTC", 3_600, 300) {
            forecast.density.validate().unwrap();
        }
    }

    #[test]
    fn non_positive_step_predicts_nothing() {
        let tracker = zigzag_tracker(50, 0.01);
        assert!(tracker.predict("BTC", 3_600, 0).is_empty());
    }

    #[test]
    fn default_tick_feeds_the_cache() {
        let mut tracker = GaussianStepTracker::new(PriceStore::new(30));
        let mut batch = HashMap::new();
        batch.insert(
            "ETH".to_string(),
            vec![
                PricePoint::new(1_700_000_000, 10.0),
                PricePoint::new(1_700_000_060, 10.5),
            ],
        );
        tracker.tick(&batch);
        assert_eq!(tracker.prices().len("ETH"), 2);
        assert_eq!(
            tracker.prices().get_last_price("ETH"),
            Some(PricePoint::new(1_700_000_060, 10.5))
        );
    }
}

// =============================================================================
// quantbench — Benchmark Demo Driver
// =============================================================================
//
// Replays a synthetic random-walk tick stream through the full pipeline:
// price cache -> Gaussian step tracker -> density forecasts -> schema
// validation. Useful as a smoke test and as a template for wiring real
// trackers into the benchmark loop.
// =============================================================================

use std::collections::HashMap;

use anyhow::Result;
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quantbench::constants::{crps_half_width, CRPS_BASE_STEP};
use quantbench::{BenchConfig, GaussianStepTracker, PricePoint, PriceStore, Tracker};

/// Days of synthetic warm-up history fed to the tracker before the replay.
const WARMUP_DAYS: i64 = 5;
/// Days of synthetic ticks replayed through the benchmark loop.
const REPLAY_DAYS: i64 = 2;

fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("quantbench demo driver starting");

    let mut config = BenchConfig::load("bench_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        BenchConfig::default()
    });

    // Override assets from env if available.
    if let Ok(assets) = std::env::var("QUANTBENCH_ASSETS") {
        config.apply_assets_env(&assets);
    }
    if config.assets.is_empty() {
        config.assets = vec!["BTC".into(), "ETH".into()];
    }

    info!(assets = ?config.assets, window_days = config.window_days, "benchmark configured");

    // ── 2. Build tracker around an injected price cache ──────────────────
    let store = PriceStore::with_policy(config.window_days, config.conflict_policy);
    let mut tracker = GaussianStepTracker::new(store);

    let now = chrono::Utc::now().timestamp();
    let replay_start = now - REPLAY_DAYS * 86_400;
    let warmup_start = replay_start - WARMUP_DAYS * 86_400;

    // ── 3. Warm-up: seed each asset with minute-resolution history ───────
    let mut walks: HashMap<String, f64> = HashMap::new();
    let mut warmup: HashMap<String, Vec<PricePoint>> = HashMap::new();
    for asset in &config.assets {
        let mut price = starting_price(asset);
        let history = random_walk(&mut price, warmup_start, replay_start, config.resolution_secs);
        walks.insert(asset.clone(), price);
        warmup.insert(asset.clone(), history);
    }
    tracker.tick(&warmup);
    info!(
        points_per_asset = WARMUP_DAYS * 86_400 / config.resolution_secs,
        "warm-up history loaded"
    );

    // ── 4. Replay loop: tick every point, predict every eval interval ────
    let mut predictions = 0usize;
    let mut forecasts_emitted = 0usize;

    let mut ts = replay_start;
    let mut next_eval = replay_start;
    while ts < now {
        let mut batch: HashMap<String, Vec<PricePoint>> = HashMap::new();
        for asset in &config.assets {
            let price = walks.get_mut(asset).expect("walk seeded in warm-up");
            *price *= step_return().exp();
            batch.insert(asset.clone(), vec![PricePoint::new(ts, *price)]);
        }
        tracker.tick(&batch);

        if ts >= next_eval {
            next_eval = ts + config.eval_interval_secs;
            for asset in &config.assets {
                let forecasts = tracker.predict(asset, config.horizon_secs, config.step_secs);
                for forecast in &forecasts {
                    forecast.density.validate()?;
                }
                if !forecasts.is_empty() {
                    predictions += 1;
                    forecasts_emitted += forecasts.len();
                }
            }
        }

        ts += config.resolution_secs;
    }

    // ── 5. Summary ───────────────────────────────────────────────────────
    for asset in &config.assets {
        let last = tracker.prices().get_last_price(asset);
        info!(
            asset = %asset,
            stored_points = tracker.prices().len(asset),
            last_price = last.map(|p| p.price),
            crps_half_width = crps_half_width(asset),
            "replay finished"
        );
    }
    info!(
        predictions,
        forecasts_emitted,
        retention_days = tracker.prices().window_days(),
        crps_base_step = CRPS_BASE_STEP,
        "benchmark demo complete"
    );

    Ok(())
}

/// Rough per-asset price level so the synthetic walks look plausible.
fn starting_price(asset: &str) -> f64 {
    match asset {
        "BTC" => 60_000.0,
        "ETH" => 2_500.0,
        "SOL" => 150.0,
        "XAU" => 1_900.0,
        _ => 100.0,
    }
}

/// One random log-return for a single resolution step.
fn step_return() -> f64 {
    rand::thread_rng().gen_range(-0.002..0.002)
}

/// Multiplicative random walk from `from` (inclusive) to `to` (exclusive),
/// one point per `resolution` seconds, advancing `price` in place.
fn random_walk(price: &mut f64, from: i64, to: i64, resolution: i64) -> Vec<PricePoint> {
    let mut points = Vec::with_capacity(((to - from) / resolution).max(0) as usize);
    let mut ts = from;
    while ts < to {
        *price *= step_return().exp();
        points.push(PricePoint::new(ts, *price));
        ts += resolution;
    }
    points
}

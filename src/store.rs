// =============================================================================
// PriceStore — bounded, deduplicated, time-ordered price history per asset
// =============================================================================
//
// One ordered series of (timestamp, price) points per asset. Ingestion feeds
// push batches in (pre-sorted ascending by timestamp); trackers and evaluators
// pull history back out via range / resampling / nearest-neighbor queries.
//
// Series invariants:
//   - timestamps are strictly increasing (no duplicates);
//   - the series is sorted ascending at all times;
//   - eviction only ever removes a contiguous prefix (oldest points).
//
// Single-writer contract: mutators take `&mut self` and the store holds no
// locks. Embedders that need shared access wrap the store themselves.
// =============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Duration};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard-coded prefix-eviction horizon, in days.
///
/// Note: the eviction cutoff is anchored to the *oldest* stored timestamp
/// (see [`PriceStore::prune`]), so the prefix search always lands at index 0
/// and no data is evicted in practice. Kept verbatim for parity with the
/// reference data; readers bound their own view via `get_prices(days, ..)`.
const PRUNE_HORIZON_DAYS: i64 = 5;

/// A single (timestamp, price) observation. Timestamps are integer seconds
/// since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(ts: i64, price: f64) -> Self {
        Self { ts, price }
    }
}

/// How an incoming point whose timestamp collides with the series' current
/// last timestamp is resolved.
///
/// Points strictly older than the last stored timestamp are dropped under
/// every policy; out-of-order arrivals from noisy feeds are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Equal timestamp overwrites the price of the existing last point
    /// (late correction wins). The default.
    #[default]
    OverwriteLast,
    /// Equal timestamp keeps the stored price (first write wins).
    KeepExisting,
}

/// In-memory price cache keyed by asset identifier.
///
/// Assets are opaque non-empty strings; a series is created lazily on the
/// first write and absent assets read as empty.
pub struct PriceStore {
    series: HashMap<String, Vec<PricePoint>>,
    window_days: i64,
    policy: ConflictPolicy,
}

impl PriceStore {
    /// Create a store with the given retention window (days) and the default
    /// conflict policy.
    pub fn new(window_days: i64) -> Self {
        Self {
            series: HashMap::new(),
            window_days,
            policy: ConflictPolicy::default(),
        }
    }

    /// Create a store with an explicit insert-conflict policy.
    pub fn with_policy(window_days: i64, policy: ConflictPolicy) -> Self {
        Self {
            series: HashMap::new(),
            window_days,
            policy,
        }
    }

    /// Configured retention window, in days. Consulted by readers that bound
    /// their queries; see [`PriceStore::prune`] for what eviction actually does.
    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Insert a single observation for `asset`.
    pub fn add_price(&mut self, asset: &str, price: f64, timestamp: i64) {
        self.add_prices(asset, &[PricePoint::new(timestamp, price)]);
    }

    /// Insert a batch of observations for a single asset.
    ///
    /// `points` must be pre-sorted ascending by timestamp (the caller's
    /// responsibility; the store does not re-sort). Empty batches are a no-op.
    ///
    /// If every incoming timestamp is strictly newer than the stored series
    /// the whole batch is appended in one go. Otherwise the batch is walked
    /// in order: strictly newer points are appended, an equal timestamp is
    /// resolved per [`ConflictPolicy`], and strictly older points are dropped.
    pub fn add_prices(&mut self, asset: &str, points: &[PricePoint]) {
        if points.is_empty() {
            return;
        }

        let series = self.series.entry(asset.to_string()).or_default();

        // Fast path: all new data lands strictly after the stored series.
        if series.last().map_or(true, |last| points[0].ts > last.ts) {
            series.extend_from_slice(points);
        } else {
            let mut last_ts = series.last().map(|p| p.ts);
            let mut dropped = 0usize;

            for point in points {
                match last_ts {
                    Some(t) if point.ts == t => match self.policy {
                        ConflictPolicy::OverwriteLast => {
                            // Correct the existing last point in place.
                            if let Some(last) = series.last_mut() {
                                last.price = point.price;
                            }
                        }
                        ConflictPolicy::KeepExisting => {}
                    },
                    Some(t) if point.ts < t => dropped += 1,
                    _ => {
                        series.push(*point);
                        last_ts = Some(point.ts);
                    }
                }
            }

            if dropped > 0 {
                debug!(asset, dropped, "dropped out-of-order points from batch");
            }
        }

        Self::prune(series);
    }

    /// Insert batches for several assets at once. Each asset is handled
    /// independently; no cross-asset atomicity is implied.
    pub fn add_bulk(&mut self, data: &HashMap<String, Vec<PricePoint>>) {
        for (asset, points) in data {
            self.add_prices(asset, points);
        }
    }

    /// Drop stored points older than the eviction cutoff.
    ///
    /// The cutoff is the *oldest* stored timestamp minus [`PRUNE_HORIZON_DAYS`].
    /// Anchored that way, the cutoff precedes every stored point, the prefix
    /// search returns index 0, and nothing is removed. Reproduced verbatim
    /// from the reference behavior; the configured retention window is not
    /// consulted here.
    fn prune(series: &mut Vec<PricePoint>) {
        let Some(oldest) = series.first() else {
            return;
        };
        let Some(cutoff) = day_cutoff(oldest.ts, PRUNE_HORIZON_DAYS) else {
            return;
        };

        let idx = series.partition_point(|p| p.ts < cutoff);
        if idx > 0 {
            series.drain(..idx);
        }
    }

    /// Resampled history for `asset`, spaced by at least `resolution` seconds.
    ///
    /// With `days = Some(n)` the range starts at the first point within `n`
    /// days of the series' newest timestamp; otherwise at the beginning.
    ///
    /// Selection is greedy: the first in-range point is always emitted, then
    /// each subsequent point whose timestamp is at least `resolution` seconds
    /// past the previously emitted one. Spacing is therefore `>= resolution`
    /// but drifts with the underlying sample times; this is not a fixed-grid
    /// resample.
    pub fn get_prices(&self, asset: &str, days: Option<i64>, resolution: i64) -> Vec<PricePoint> {
        let Some(series) = self.series.get(asset) else {
            return Vec::new();
        };
        let Some(last) = series.last() else {
            return Vec::new();
        };

        let start_idx = match days.and_then(|d| day_cutoff(last.ts, d)) {
            Some(cutoff) => series.partition_point(|p| p.ts < cutoff),
            None => 0,
        };
        if start_idx >= series.len() {
            return Vec::new();
        }

        let mut result = vec![series[start_idx]];
        let mut target_next = series[start_idx].ts + resolution;

        for point in &series[start_idx + 1..] {
            if point.ts >= target_next {
                result.push(*point);
                target_next = point.ts + resolution;
            }
        }

        result
    }

    /// The newest stored point for `asset`, or `None` when there is no data.
    pub fn get_last_price(&self, asset: &str) -> Option<PricePoint> {
        self.series.get(asset).and_then(|s| s.last()).copied()
    }

    /// The stored point whose timestamp is closest to `time`, or `None` when
    /// there is no data. Ties in absolute distance resolve to the earlier
    /// point.
    pub fn get_closest_price(&self, asset: &str, time: i64) -> Option<PricePoint> {
        let series = self.series.get(asset)?;
        if series.is_empty() {
            return None;
        }

        let pos = series.partition_point(|p| p.ts < time);
        if pos == 0 {
            return series.first().copied();
        }
        if pos == series.len() {
            return series.last().copied();
        }

        let before = series[pos - 1];
        let after = series[pos];
        if time - before.ts <= after.ts - time {
            Some(before)
        } else {
            Some(after)
        }
    }

    /// Number of stored points for `asset` (0 when unknown).
    pub fn len(&self, asset: &str) -> usize {
        self.series.get(asset).map_or(0, Vec::len)
    }

    /// True when no asset holds any data.
    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }
}

/// Timestamp `days` days before `ts`, in epoch seconds (UTC day arithmetic).
/// `None` when `ts` is outside chrono's representable range.
fn day_cutoff(ts: i64, days: i64) -> Option<i64> {
    let dt = DateTime::from_timestamp(ts, 0)?;
    Some((dt - Duration::days(days)).timestamp())
}

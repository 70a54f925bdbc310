// =============================================================================
// Benchmark Configuration — JSON settings with atomic save
// =============================================================================
//
// Every tunable parameter of a benchmark run lives here: the tracked assets,
// the price-cache retention window, and the forecast horizon/step/cadence.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::ConflictPolicy;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_assets() -> Vec<String> {
    vec![
        "BTC".to_string(),
        "ETH".to_string(),
        "SOL".to_string(),
        "XAU".to_string(),
    ]
}

fn default_window_days() -> i64 {
    30
}

fn default_resolution_secs() -> i64 {
    60
}

fn default_horizon_secs() -> i64 {
    86_400
}

fn default_step_secs() -> i64 {
    300
}

fn default_eval_interval_secs() -> i64 {
    3_600
}

// =============================================================================
// BenchConfig
// =============================================================================

/// Top-level configuration for a benchmark run.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Assets fed to the price cache and forecast by the trackers.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Price-cache retention window, in days.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// How an insert whose timestamp collides with the stored last point is
    /// resolved.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Granularity of stored ticks, in seconds.
    #[serde(default = "default_resolution_secs")]
    pub resolution_secs: i64,

    /// Forecast horizon, in seconds (how far ahead each prediction reaches).
    #[serde(default = "default_horizon_secs")]
    pub horizon_secs: i64,

    /// Forecast step, in seconds (spacing between forecast targets within
    /// the horizon).
    #[serde(default = "default_step_secs")]
    pub step_secs: i64,

    /// How often the tracker is asked to predict, in seconds.
    #[serde(default = "default_eval_interval_secs")]
    pub eval_interval_secs: i64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            assets: default_assets(),
            window_days: default_window_days(),
            conflict_policy: ConflictPolicy::default(),
            resolution_secs: default_resolution_secs(),
            horizon_secs: default_horizon_secs(),
            step_secs: default_step_secs(),
            eval_interval_secs: default_eval_interval_secs(),
        }
    }
}

impl BenchConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bench config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse bench config from {}", path.display()))?;

        info!(
            path = %path.display(),
            assets = ?config.assets,
            window_days = config.window_days,
            "bench config loaded"
        );

        Ok(config)
    }

    /// Override the asset list from a comma-separated environment value.
    ///
    /// Entries are trimmed and upper-cased; empty entries are ignored. A
    /// value with no usable entries leaves the configured assets unchanged.
    pub fn apply_assets_env(&mut self, raw: &str) {
        let assets: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if !assets.is_empty() {
            self.assets = assets;
        }
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise bench config")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "bench config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = BenchConfig::default();
        assert_eq!(cfg.assets, vec!["BTC", "ETH", "SOL", "XAU"]);
        assert_eq!(cfg.window_days, 30);
        assert_eq!(cfg.conflict_policy, ConflictPolicy::OverwriteLast);
        assert_eq!(cfg.resolution_secs, 60);
        assert_eq!(cfg.horizon_secs, 86_400);
        assert_eq!(cfg.step_secs, 300);
        assert_eq!(cfg.eval_interval_secs, 3_600);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: BenchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.window_days, 30);
        assert_eq!(cfg.assets.len(), 4);
        assert_eq!(cfg.conflict_policy, ConflictPolicy::OverwriteLast);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "assets": ["BTC"], "conflict_policy": "keep_existing" }"#;
        let cfg: BenchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.assets, vec!["BTC"]);
        assert_eq!(cfg.conflict_policy, ConflictPolicy::KeepExisting);
        assert_eq!(cfg.step_secs, 300);
    }

    #[test]
    fn assets_env_trims_uppercases_and_filters() {
        let mut cfg = BenchConfig::default();
        cfg.apply_assets_env(" btc , eth,, SOL ,");
        assert_eq!(cfg.assets, vec!["BTC", "ETH", "SOL"]);
    }

    #[test]
    fn assets_env_empty_value_keeps_configured_assets() {
        let mut cfg = BenchConfig::default();
        cfg.apply_assets_env("");
        assert_eq!(cfg.assets, default_assets());

        cfg.apply_assets_env(" , ,");
        assert_eq!(cfg.assets, default_assets());
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = BenchConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: BenchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.assets, cfg2.assets);
        assert_eq!(cfg.window_days, cfg2.window_days);
        assert_eq!(cfg.conflict_policy, cfg2.conflict_policy);
    }
}

// =============================================================================
// Predictive-distribution schema and structural validation
// =============================================================================
//
// Trackers describe each forecast as a density: either a builtin parametric
// density referenced by name (e.g. "norm" with loc/scale), or a mixture of
// weighted component densities. Mixtures nest arbitrarily; validation bounds
// the total number of leaf components so downstream CRPS evaluation stays
// cheap.
//
// The JSON wire shape is tagged by "type":
//
//   { "type": "builtin", "name": "norm", "params": { "loc": 0.0, "scale": 1.0 } }
//   { "type": "mixture", "components": [ { "density": { ... }, "weight": 1.0 } ] }
// =============================================================================

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::MAX_DISTRIBUTION_COMPONENTS;

/// A predictive density over a scalar outcome (price or log-return).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Density {
    /// A named parametric density from the evaluator's builtin library.
    Builtin {
        name: String,
        params: Map<String, Value>,
    },
    /// A weighted mixture of component densities.
    Mixture { components: Vec<MixtureComponent> },
}

/// One weighted leaf (or sub-mixture) of a mixture density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixtureComponent {
    pub density: Density,
    pub weight: f64,
}

impl Density {
    /// Builtin normal density with the given location and scale.
    pub fn normal(loc: f64, scale: f64) -> Self {
        let mut params = Map::new();
        params.insert("loc".to_string(), loc.into());
        params.insert("scale".to_string(), scale.into());
        Density::Builtin {
            name: "norm".to_string(),
            params,
        }
    }

    /// Single-component mixture wrapping `density` with weight 1.
    pub fn singleton_mixture(density: Density) -> Self {
        Density::Mixture {
            components: vec![MixtureComponent {
                density,
                weight: 1.0,
            }],
        }
    }

    /// Number of leaf components, nested mixtures fully expanded.
    /// A non-mixture density counts as one component.
    pub fn count_components(&self) -> usize {
        match self {
            Density::Builtin { .. } => 1,
            Density::Mixture { components } => components
                .iter()
                .map(|c| c.density.count_components())
                .sum(),
        }
    }

    /// Validate structural constraints: the total leaf-component count must
    /// not exceed [`MAX_DISTRIBUTION_COMPONENTS`].
    pub fn validate(&self) -> Result<()> {
        let n = self.count_components();
        if n > MAX_DISTRIBUTION_COMPONENTS {
            bail!(
                "distribution contains {n} total components (including nested \
                 mixtures), but the maximum allowed is {MAX_DISTRIBUTION_COMPONENTS}"
            );
        }
        Ok(())
    }
}

/// One forecast step emitted by a tracker: a density over the outcome
/// `step` seconds ahead of the prediction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Offset of the forecast target from the prediction time, in seconds.
    pub step: i64,
    #[serde(flatten)]
    pub density: Density,
}

//! Strategy-scored model selection

use serde::{Deserialize, Serialize};

use super::ModelRegistry;
use crate::config::ModelConfig;

/// Weighting scheme used to rank candidate models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Cost,
    Speed,
    Quality,
    #[default]
    Balanced,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Self::Cost, Self::Speed, Self::Quality, Self::Balanced];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cost => write!(f, "cost"),
            Self::Speed => write!(f, "speed"),
            Self::Quality => write!(f, "quality"),
            Self::Balanced => write!(f, "balanced"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cost" => Ok(Self::Cost),
            "speed" => Ok(Self::Speed),
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// Inverse cost score in (0, 1]; cheaper models score higher.
///
/// Costs are scaled to USD per million tokens so that realistic prices
/// spread across the range instead of collapsing near 1.
pub fn inverse_cost_score(model: &ModelConfig) -> f64 {
    let per_million = (model.cost_per_1k_input + model.cost_per_1k_output) * 1000.0;
    1.0 / (1.0 + per_million)
}

fn rating(value: u8) -> f64 {
    value as f64 / 10.0
}

/// Score a model under a strategy
pub fn score(model: &ModelConfig, strategy: Strategy) -> f64 {
    let cost = inverse_cost_score(model);
    let speed = rating(model.speed_rating);
    let quality = rating(model.quality_rating);

    match strategy {
        Strategy::Cost => 0.7 * cost + 0.3 * quality,
        Strategy::Speed => 0.7 * speed + 0.3 * quality,
        Strategy::Quality => 0.7 * quality + 0.3 * speed,
        Strategy::Balanced => 0.3 * cost + 0.3 * speed + 0.4 * quality,
    }
}

/// Picks the best enabled registry entry for a strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSelector;

impl ModelSelector {
    /// Select the top-scoring enabled model, or `None` if nothing is enabled
    pub fn select(registry: &ModelRegistry, strategy: Strategy) -> Option<String> {
        Self::select_excluding(registry, strategy, &[])
    }

    /// Select the top-scoring enabled model that is not in `excluded`.
    ///
    /// Ties keep the entry that appears first in the registry.
    pub fn select_excluding(
        registry: &ModelRegistry,
        strategy: Strategy,
        excluded: &[&str],
    ) -> Option<String> {
        let mut best: Option<(&str, f64)> = None;

        for (key, model) in registry.enabled() {
            if excluded.contains(&key) {
                continue;
            }
            let candidate = score(model, strategy);
            match best {
                Some((_, top)) if candidate <= top => {}
                _ => best = Some((key, candidate)),
            }
        }

        best.map(|(key, _)| key.to_string())
    }

    /// All enabled models ordered by descending score
    pub fn ranking(registry: &ModelRegistry, strategy: Strategy) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = registry
            .enabled()
            .map(|(key, model)| (key.to_string(), score(model, strategy)))
            .collect();
        // stable sort keeps registry order for equal scores
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

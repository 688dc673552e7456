//! Property-based tests for model selection

use proptest::prelude::*;

use model_integrator::Strategy as SelectionStrategy;
use model_integrator::{ModelConfig, ModelRegistry, ModelSelector, Provider};

fn arb_strategy() -> impl Strategy<Value = SelectionStrategy> {
    prop_oneof![
        Just(SelectionStrategy::Cost),
        Just(SelectionStrategy::Speed),
        Just(SelectionStrategy::Quality),
        Just(SelectionStrategy::Balanced),
    ]
}

/// (cost_in, cost_out, speed, quality, enabled)
fn arb_model() -> impl Strategy<Value = (f64, f64, u8, u8, bool)> {
    (0.0f64..0.05, 0.0f64..0.1, 1u8..=10, 1u8..=10, any::<bool>())
}

fn registry_from(specs: &[(f64, f64, u8, u8, bool)]) -> ModelRegistry {
    ModelRegistry::from_models(specs.iter().enumerate().map(|(i, &(cin, cout, speed, quality, enabled))| {
        let model = ModelConfig::new(Provider::ALL[i % 4], format!("model-{}", i))
            .with_costs(cin, cout)
            .with_ratings(speed, quality);
        if enabled {
            model
        } else {
            model.disabled()
        }
    }))
}

proptest! {
    /// Same registry and strategy always pick the same key
    #[test]
    fn test_selection_is_deterministic(
        specs in prop::collection::vec(arb_model(), 0..12),
        strategy in arb_strategy(),
    ) {
        let registry = registry_from(&specs);
        let first = ModelSelector::select(&registry, strategy);
        for _ in 0..5 {
            prop_assert_eq!(&ModelSelector::select(&registry, strategy), &first);
        }

        // A rebuilt registry with the same entries agrees too
        let rebuilt = registry_from(&specs);
        prop_assert_eq!(ModelSelector::select(&rebuilt, strategy), first);
    }

    /// The pick is an enabled entry whenever one exists
    #[test]
    fn test_selection_picks_enabled(
        specs in prop::collection::vec(arb_model(), 0..12),
        strategy in arb_strategy(),
    ) {
        let registry = registry_from(&specs);
        match ModelSelector::select(&registry, strategy) {
            Some(key) => prop_assert!(registry.get(&key).unwrap().enabled),
            None => prop_assert!(specs.iter().all(|s| !s.4)),
        }
    }

    /// Cost strategy never prefers the pricier of two otherwise identical models
    #[test]
    fn test_cost_monotonicity(
        cheap_in in 0.0f64..0.05,
        extra in 0.000_001f64..0.05,
        cost_out in 0.0f64..0.05,
        speed in 1u8..=10,
        quality in 1u8..=10,
        pricier_first in any::<bool>(),
    ) {
        let cheap = ModelConfig::new(Provider::OpenAI, "cheap")
            .with_costs(cheap_in, cost_out)
            .with_ratings(speed, quality);
        let pricey = ModelConfig::new(Provider::Groq, "pricey")
            .with_costs(cheap_in + extra, cost_out)
            .with_ratings(speed, quality);

        let registry = if pricier_first {
            ModelRegistry::from_models([pricey, cheap])
        } else {
            ModelRegistry::from_models([cheap, pricey])
        };

        let chosen = ModelSelector::select(&registry, SelectionStrategy::Cost);
        prop_assert_eq!(chosen.as_deref(), Some("openai_cheap"));
    }

    /// Excluding the winner yields the runner-up of the ranking
    #[test]
    fn test_exclusion_matches_ranking(
        specs in prop::collection::vec(arb_model(), 2..10),
        strategy in arb_strategy(),
    ) {
        let registry = registry_from(&specs);
        let ranking = ModelSelector::ranking(&registry, strategy);
        prop_assume!(ranking.len() >= 2);
        prop_assume!(ranking[0].1 > ranking[1].1);

        let winner = ModelSelector::select(&registry, strategy).unwrap();
        prop_assert_eq!(&winner, &ranking[0].0);

        let runner_up = ModelSelector::select_excluding(&registry, strategy, &[winner.as_str()]);
        prop_assert_eq!(runner_up.as_deref(), Some(ranking[1].0.as_str()));
    }
}

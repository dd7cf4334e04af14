use proptest::prelude::*;
use sdc_rules::{ContributorData, ProtectionRuleConfig, RuleEvaluator, Verdict};

fn evaluator(min: u32, k: f64) -> RuleEvaluator {
    RuleEvaluator::new(ProtectionRuleConfig {
        min_contributors: min,
        dominance_n: 1,
        dominance_k: k,
        p_percent: 10.0,
    })
    .unwrap()
}

proptest! {
    #[test]
    fn fewer_contributors_than_minimum_always_flagged(
        values in prop::collection::vec(1.0f64..1_000.0, 0..6),
        min in 1u32..8,
    ) {
        let total: f64 = values.iter().sum::<f64>() + 1.0;
        let verdict = evaluator(min, 80.0).evaluate(total, &ContributorData::Values(values.clone()), None);
        if values.len() < min as usize {
            let is_few = matches!(verdict, Verdict::FewContributors { .. });
            prop_assert!(is_few);
        } else {
            let is_few = matches!(verdict, Verdict::FewContributors { .. });
            prop_assert!(!is_few);
        }
    }

    #[test]
    fn raising_k_never_adds_dominance(
        values in prop::collection::vec(1.0f64..1_000.0, 1..8),
        k in 1.0f64..99.0,
    ) {
        let total: f64 = values.iter().sum();
        let strict = evaluator(1, k).check_dominance(total, &values);
        let lenient = evaluator(1, (k + 1.0).min(100.0)).check_dominance(total, &values);
        if strict.is_none() {
            prop_assert!(lenient.is_none());
        }
    }
}

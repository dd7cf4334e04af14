use sdc_rules::{
    AprioriStatus, ConfidentialityFlag, ContributorData, ProtectionRuleConfig, RuleEvaluator,
    Verdict,
};

fn evaluator(min: u32, n: u32, k: f64, p: f64) -> RuleEvaluator {
    RuleEvaluator::new(ProtectionRuleConfig {
        min_contributors: min,
        dominance_n: n,
        dominance_k: k,
        p_percent: p,
    })
    .unwrap()
}

#[test]
fn threshold_runs_before_dominance() {
    let eval = evaluator(3, 1, 50.0, 10.0);
    let verdict = eval.evaluate(10.0, &ContributorData::Values(vec![10.0]), None);
    assert_eq!(
        verdict,
        Verdict::FewContributors {
            count: 1,
            minimum: 3
        }
    );
    assert_eq!(verdict.reason(), "Too few contributors (1 < 3)");
}

#[test]
fn zero_contributors_always_violate() {
    let eval = evaluator(0, 1, 80.0, 10.0);
    let verdict = eval.evaluate(5.0, &ContributorData::Values(Vec::new()), None);
    assert_eq!(verdict.flag(), ConfidentialityFlag::FewContributors);
}

#[test]
fn single_unit_dominance() {
    let eval = evaluator(3, 1, 80.0, 10.0);
    let verdict = eval.evaluate(100.0, &ContributorData::Values(vec![90.0, 5.0, 5.0]), None);
    match verdict {
        Verdict::DominanceOne { share, k } => {
            assert!((share - 90.0).abs() < 1e-9);
            assert_eq!(k, 80.0);
        }
        other => panic!("unexpected verdict: {other:?}"),
    }
}

#[test]
fn dominance_flavour_follows_n() {
    let values = ContributorData::Values(vec![45.0, 45.0, 5.0, 5.0]);
    let two = evaluator(3, 2, 80.0, 10.0).evaluate(100.0, &values, None);
    assert_eq!(two.flag(), ConfidentialityFlag::DominanceTwo);
    let three = evaluator(3, 3, 80.0, 10.0).evaluate(100.0, &values, None);
    assert_eq!(three.flag(), ConfidentialityFlag::DominanceGeneral);
    assert_eq!(three.reason(), "Dominance by 3 units (95.0% > 80%)");
}

#[test]
fn exactly_k_percent_passes_dominance() {
    let eval = evaluator(3, 1, 80.0, 10.0);
    assert!(eval.check_dominance(100.0, &[80.0, 10.0, 10.0]).is_none());
    assert!(eval.check_dominance(100.0, &[80.5, 10.0, 9.5]).is_some());
}

#[test]
fn p_percent_exact_estimate() {
    let eval = evaluator(3, 1, 80.0, 10.0);
    let verdict = eval.evaluate(100.0, &ContributorData::Values(vec![60.0, 39.0, 1.0]), None);
    match verdict {
        Verdict::PPercentRisk { error, p } => {
            assert_eq!(error, 0.0);
            assert_eq!(p, 10.0);
        }
        other => panic!("unexpected verdict: {other:?}"),
    }
}

#[test]
fn p_percent_passes_when_estimate_is_far_off() {
    let eval = evaluator(2, 1, 80.0, 10.0);
    // Partial knowledge: the total includes 30 units from unlisted contributors.
    let verdict = eval.evaluate(100.0, &ContributorData::Values(vec![40.0, 20.0, 10.0]), None);
    assert_eq!(verdict, Verdict::Free);
}

#[test]
fn p_percent_needs_positive_second_largest() {
    let eval = evaluator(2, 1, 80.0, 10.0);
    assert!(eval.check_p_percent(50.0, &[50.0, 0.0]).is_none());
    assert!(eval.check_p_percent(50.0, &[50.0]).is_none());
}

#[test]
fn count_only_data_skips_magnitude_rules() {
    let eval = evaluator(3, 1, 50.0, 10.0);
    assert_eq!(eval.evaluate(120.0, &ContributorData::Count(120), None), Verdict::Free);
    assert_eq!(
        eval.evaluate(2.0, &ContributorData::Count(2), None).flag(),
        ConfidentialityFlag::FewContributors
    );
}

#[test]
fn apriori_status_short_circuits() {
    let eval = evaluator(3, 1, 80.0, 10.0);
    let risky = ContributorData::Values(vec![99.0]);
    assert_eq!(
        eval.evaluate(99.0, &risky, Some(AprioriStatus::Safe)),
        Verdict::Free
    );
    let forced = eval.evaluate(
        500.0,
        &ContributorData::Count(50),
        Some(AprioriStatus::Protected),
    );
    assert_eq!(forced.flag(), ConfidentialityFlag::Confidential);
    assert_eq!(forced.flag().code(), 'C');
    assert!(forced.is_confidential());
}

use sdc_core::SdcError;
use sdc_rules::{AprioriStatus, ProtectionRuleConfig, RuleEvaluator};

fn config_code(config: ProtectionRuleConfig) -> String {
    match RuleEvaluator::new(config).unwrap_err() {
        SdcError::Configuration(info) => info.code,
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn defaults_are_valid() {
    let config = ProtectionRuleConfig::default();
    assert_eq!(config.min_contributors, 3);
    assert_eq!(config.dominance_n, 1);
    assert_eq!(config.dominance_k, 80.0);
    assert_eq!(config.p_percent, 10.0);
    assert!(config.validate().is_ok());
}

#[test]
fn out_of_range_thresholds_are_rejected() {
    let base = ProtectionRuleConfig::default();
    assert_eq!(
        config_code(ProtectionRuleConfig {
            dominance_n: 0,
            ..base
        }),
        "dominance-n-zero"
    );
    assert_eq!(
        config_code(ProtectionRuleConfig {
            dominance_k: 0.0,
            ..base
        }),
        "dominance-k-range"
    );
    assert_eq!(
        config_code(ProtectionRuleConfig {
            dominance_k: 100.5,
            ..base
        }),
        "dominance-k-range"
    );
    assert_eq!(
        config_code(ProtectionRuleConfig {
            p_percent: -1.0,
            ..base
        }),
        "p-percent-range"
    );
    assert_eq!(
        config_code(ProtectionRuleConfig {
            p_percent: f64::NAN,
            ..base
        }),
        "non-finite-threshold"
    );
}

#[test]
fn upper_bound_is_inclusive() {
    let config = ProtectionRuleConfig {
        dominance_k: 100.0,
        p_percent: 100.0,
        ..ProtectionRuleConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn explicit_thresholds_win_over_embedded() {
    let explicit = ProtectionRuleConfig {
        min_contributors: 5,
        ..ProtectionRuleConfig::default()
    };
    let embedded = ProtectionRuleConfig {
        min_contributors: 10,
        dominance_k: 85.0,
        ..ProtectionRuleConfig::default()
    };
    assert_eq!(
        ProtectionRuleConfig::resolve(Some(explicit), Some(embedded)),
        explicit
    );
    assert_eq!(ProtectionRuleConfig::resolve(None, Some(embedded)), embedded);
    assert_eq!(
        ProtectionRuleConfig::resolve(None, None),
        ProtectionRuleConfig::default()
    );
}

#[test]
fn yaml_fills_missing_fields_with_defaults() {
    let config: ProtectionRuleConfig = serde_yaml::from_str("min_contributors: 4\n").unwrap();
    assert_eq!(config.min_contributors, 4);
    assert_eq!(config.dominance_k, 80.0);
}

#[test]
fn apriori_codes_parse() {
    assert_eq!(AprioriStatus::from_code("u").unwrap(), AprioriStatus::Unsafe);
    assert_eq!(AprioriStatus::from_code(" S ").unwrap(), AprioriStatus::Safe);
    assert_eq!(
        AprioriStatus::from_code("protected").unwrap(),
        AprioriStatus::Protected
    );
    assert!(AprioriStatus::from_code("x").is_err());
}

use std::fs;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

const INCOME_CSV: &str = "region,low,medium,high\n\
north,45,120,67\n\
east,2,8,15\n\
south,12,23,15\n\
west,78,145,92\n\
centre,34,89,56\n";

fn sdc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sdc"))
}

#[test]
fn suppress_writes_a_plan() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("income.csv");
    let out = dir.path().join("plan.json");
    fs::write(&table, INCOME_CSV).unwrap();

    let status = sdc()
        .args(["suppress", "--explanatory", "region", "--table"])
        .arg(&table)
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let plan: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(plan["primary"], serde_json::json!([{"row": 1, "column": 0}]));
    assert_eq!(plan["statistics"]["secondary_suppressions"], 4);
    assert_eq!(plan["value_columns"], serde_json::json!(["low", "medium", "high"]));
}

#[test]
fn overrides_and_config_are_applied() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("income.csv");
    let config = dir.path().join("run.yaml");
    let overrides = dir.path().join("overrides.yaml");
    fs::write(&table, INCOME_CSV).unwrap();
    fs::write(&config, "solver:\n  backend: none\n").unwrap();
    fs::write(
        &overrides,
        "apriori:\n  - { row: 1, column: 0, status: s }\n  - { row: 0, column: 2, status: u }\n",
    )
    .unwrap();

    let output = sdc()
        .args(["suppress", "--explanatory", "region", "--table"])
        .arg(&table)
        .arg("--config")
        .arg(&config)
        .arg("--overrides")
        .arg(&overrides)
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["primary"], serde_json::json!([{"row": 0, "column": 2}]));
    assert_eq!(plan["statistics"]["strategy"], "heuristic");
    assert_eq!(plan["statistics"]["solver_failure"]["kind"], "unavailable");
}

#[test]
fn contributor_values_require_the_supplied_resolver() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("income.csv");
    let overrides = dir.path().join("overrides.yaml");
    let config = dir.path().join("run.yaml");
    fs::write(&table, INCOME_CSV).unwrap();
    fs::write(
        &overrides,
        "contributors:\n  - { row: 0, column: 0, values: [40.0, 5.0] }\n",
    )
    .unwrap();

    let output = sdc()
        .args(["suppress", "--explanatory", "region", "--table"])
        .arg(&table)
        .arg("--overrides")
        .arg(&overrides)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("supplied-contributors-unused"));

    fs::write(&config, "resolver:\n  kind: supplied\n").unwrap();
    let output = sdc()
        .args(["suppress", "--explanatory", "region", "--table"])
        .arg(&table)
        .arg("--config")
        .arg(&config)
        .arg("--overrides")
        .arg(&overrides)
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn non_numeric_values_fail() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("bad.csv");
    fs::write(&table, "region,count\nnorth,many\n").unwrap();

    let output = sdc()
        .args(["suppress", "--explanatory", "region", "--table"])
        .arg(&table)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unparseable-value"));
}

#[test]
fn check_config_fills_defaults() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("run.yaml");
    fs::write(&config, "rules:\n  min_contributors: 4\n").unwrap();

    let output = sdc().arg("check-config").arg("--config").arg(&config).output().unwrap();
    assert!(output.status.success());
    let echoed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(echoed["rules"]["min_contributors"], 4);
    assert_eq!(echoed["rules"]["dominance_k"], 80.0);
    assert_eq!(echoed["resolver"]["kind"], "count-proxy");

    fs::write(&config, "rules:\n  dominance_k: 0\n").unwrap();
    let output = sdc().arg("check-config").arg("--config").arg(&config).output().unwrap();
    assert!(!output.status.success());
}

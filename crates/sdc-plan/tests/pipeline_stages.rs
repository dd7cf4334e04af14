use std::sync::Arc;

use sdc_core::Table;
use sdc_plan::{SuppressionConfig, SuppressionSession};
use sdc_rules::CountProxy;

fn table() -> Table {
    Table::from_grid(
        &["a", "b", "c"],
        vec![
            vec![Some(1.0), Some(40.0), Some(50.0)],
            vec![Some(30.0), Some(60.0), Some(70.0)],
        ],
    )
    .unwrap()
}

fn session(table: &Table) -> SuppressionSession<'_> {
    SuppressionSession::new(table, SuppressionConfig::default(), Arc::new(CountProxy)).unwrap()
}

#[test]
fn solving_before_the_graph_is_a_pipeline_error() {
    let table = table();
    let mut session = session(&table);
    let err = session.solve_secondary().unwrap_err();
    assert_eq!(err.info().code, "graph-not-built");

    session.primary_pass().unwrap();
    let err = session.solve_secondary().unwrap_err();
    assert_eq!(err.info().code, "graph-not-built");
}

#[test]
fn graph_needs_the_primary_pass() {
    let table = table();
    let mut session = session(&table);
    let err = session.build_graph().unwrap_err();
    assert_eq!(err.info().code, "primary-pass-missing");
}

#[test]
fn finish_needs_every_stage() {
    let table = table();
    let mut session = session(&table);
    session.primary_pass().unwrap();
    session.build_graph().unwrap();
    let err = session.finish().unwrap_err();
    assert_eq!(err.info().code, "secondary-missing");
}

#[test]
fn rerunning_the_primary_pass_discards_later_stages() {
    let table = table();
    let mut session = session(&table);
    session.primary_pass().unwrap();
    session.build_graph().unwrap();
    session.primary_pass().unwrap();
    let err = session.solve_secondary().unwrap_err();
    assert_eq!(err.info().code, "graph-not-built");
}

#[test]
fn stages_expose_their_outputs() {
    let table = table();
    let mut session = session(&table);
    assert_eq!(session.primary_pass().unwrap().primary.len(), 1);
    assert_eq!(session.build_graph().unwrap().constraints().len(), 5);
    assert_eq!(session.solve_secondary().unwrap().secondary.len(), 3);
    let plan = session.finish().unwrap();
    assert_eq!(plan.statistics().total_suppressions, 4);
}

#[test]
fn invalid_thresholds_are_rejected_before_any_cell() {
    let table = table();
    let mut config = SuppressionConfig::default();
    config.rules.dominance_k = 0.0;
    let err = SuppressionSession::new(&table, config, Arc::new(CountProxy)).unwrap_err();
    assert_eq!(err.info().code, "dominance-k-range");
}

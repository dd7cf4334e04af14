use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_core::CellRef;

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("row", "1")
        .with_context("column", "income")
}

#[test]
fn configuration_error_surface() {
    let err = SdcError::Configuration(sample_info("dominance-k-range", "k out of range"));
    assert_eq!(err.info().code, "dominance-k-range");
    assert!(err.info().context.contains_key("row"));
}

#[test]
fn data_error_surface() {
    let err = SdcError::Data(sample_info("unknown-column", "no such column"));
    assert_eq!(err.info().code, "unknown-column");
    assert!(err.to_string().starts_with("data error: [unknown-column] no such column"));
}

#[test]
fn pipeline_error_surface() {
    let err = SdcError::graph_not_built();
    assert_eq!(err.info().code, "graph-not-built");
    assert!(err.info().hint.is_some());
}

#[test]
fn display_lists_context_and_hint() {
    let info = sample_info("unknown-column", "no such column").with_hint("check the header row");
    assert_eq!(
        info.to_string(),
        "[unknown-column] no such column; column=income, row=1; hint: check the header row"
    );
    assert_eq!(
        ErrorInfo::new("graph-not-built", "no graph").to_string(),
        "[graph-not-built] no graph"
    );
}

#[test]
fn cell_context_uses_cell_labels() {
    let info = ErrorInfo::new("primary-unknown-cell", "outside the table")
        .with_cell(CellRef::new(4, 2));
    assert_eq!(info.context["cell"], "cell_4_2");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = SdcError::Serde(sample_info("json_write", "disk full"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Serde");
    assert_eq!(json["detail"]["code"], "json_write");
    let restored: SdcError = serde_json::from_value(json).unwrap();
    assert_eq!(restored, err);
}

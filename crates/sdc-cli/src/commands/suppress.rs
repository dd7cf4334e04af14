use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_core::{CellRef, Table};
use sdc_graph::MarginSpec;
use sdc_plan::{from_yaml_slice, load_config, to_canonical_json_bytes, SuppressionSession};
use sdc_rules::{AprioriOverrides, AprioriStatus, SuppliedContributors};
use serde::Deserialize;
use tracing::info;

#[derive(Args, Debug)]
pub struct SuppressArgs {
    /// CSV table with a header row.
    #[arg(long)]
    pub table: PathBuf,
    /// YAML run configuration; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Non-numeric label columns; every other column holds values.
    #[arg(long, value_delimiter = ',')]
    pub explanatory: Vec<String>,
    /// YAML file with a-priori statuses, margins, sensitivity levels and contributor values.
    #[arg(long)]
    pub overrides: Option<PathBuf>,
    /// Where to write the plan JSON; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct Overrides {
    #[serde(default)]
    apriori: Vec<AprioriEntry>,
    #[serde(default)]
    margins: Vec<MarginSpec>,
    #[serde(default)]
    sensitivity: Vec<SensitivityEntry>,
    #[serde(default)]
    contributors: Vec<ContributorEntry>,
}

#[derive(Debug, Deserialize)]
struct AprioriEntry {
    row: usize,
    column: usize,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SensitivityEntry {
    row: usize,
    column: usize,
    level: f64,
}

#[derive(Debug, Deserialize)]
struct ContributorEntry {
    row: usize,
    column: usize,
    values: Vec<f64>,
}

pub fn run(args: &SuppressArgs) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Default::default(),
    };
    let table = load_table(&args.table, &args.explanatory)?;
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "table loaded"
    );
    let overrides = match &args.overrides {
        Some(path) => load_overrides(path)?,
        None => Overrides::default(),
    };

    let apriori = overrides
        .apriori
        .iter()
        .map(|entry| {
            AprioriStatus::from_code(&entry.status)
                .map(|status| (CellRef::new(entry.row, entry.column), status))
        })
        .collect::<Result<AprioriOverrides, SdcError>>()?;
    let supplied = if overrides.contributors.is_empty() {
        None
    } else {
        let values = overrides
            .contributors
            .into_iter()
            .map(|entry| (CellRef::new(entry.row, entry.column), entry.values))
            .collect::<BTreeMap<_, _>>();
        Some(SuppliedContributors::new(values)?)
    };
    let resolver = config.resolver.build(supplied)?;

    let plan = SuppressionSession::new(&table, config, resolver)?
        .with_apriori(apriori)
        .with_margins(overrides.margins)
        .with_sensitivity(
            overrides
                .sensitivity
                .iter()
                .map(|entry| (CellRef::new(entry.row, entry.column), entry.level)),
        )
        .run()?;

    let json = to_canonical_json_bytes(&plan)?;
    match &args.out {
        Some(path) => fs::write(path, &json)?,
        None => println!("{}", String::from_utf8(json)?),
    }
    Ok(())
}

fn data_error(code: &str, message: impl Into<String>, path: &Path) -> SdcError {
    SdcError::Data(ErrorInfo::new(code, message).with_context("path", path.display().to_string()))
}

/// Reads a CSV table. Empty fields and `-` are missing values.
fn load_table(path: &Path, explanatory: &[String]) -> Result<Table, SdcError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|err| SdcError::Serde(ErrorInfo::new("table-read", err.to_string())))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| data_error("table-header", err.to_string(), path))?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let known: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    if let Some(missing) = explanatory.iter().find(|name| !known.contains(name.as_str())) {
        return Err(data_error(
            "unknown-column",
            format!("explanatory column {missing} is not in the header"),
            path,
        ));
    }
    let value_columns: Vec<String> = headers
        .iter()
        .filter(|name| !explanatory.contains(name))
        .cloned()
        .collect();
    let mut table = Table::new(explanatory.to_vec(), value_columns)?;

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|err| data_error("malformed-row", err.to_string(), path))?;
        let mut labels = BTreeMap::new();
        let mut values = BTreeMap::new();
        for (name, field) in headers.iter().zip(record.iter()) {
            let field = field.trim();
            if explanatory.contains(name) {
                labels.insert(name.clone(), field.to_string());
            } else if field.is_empty() || field == "-" {
                values.insert(name.clone(), None);
            } else {
                let value = field.parse::<f64>().map_err(|_| {
                    SdcError::Data(
                        ErrorInfo::new("unparseable-value", "value is not a number")
                            .with_context("row", index.to_string())
                            .with_context("column", name.clone())
                            .with_context("field", field),
                    )
                })?;
                values.insert(name.clone(), Some(value));
            }
        }
        table.push_row(labels, values)?;
    }
    Ok(table)
}

fn load_overrides(path: &Path) -> Result<Overrides, SdcError> {
    let bytes = fs::read(path).map_err(|err| {
        SdcError::Serde(
            ErrorInfo::new("overrides-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    from_yaml_slice(&bytes)
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rayon::prelude::*;
use sdc_core::{CellRef, SdcError, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::apriori::AprioriOverrides;
use crate::config::ProtectionRuleConfig;
use crate::contributors::{ContributorData, ContributorResolver, ContributorSource};
use crate::evaluator::RuleEvaluator;
use crate::verdict::{ConfidentialityFlag, Verdict};

/// Audit record for one primary-suppressed cell.
///
/// This is the only place the true value of a suppressed cell survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Cell coordinates.
    pub cell: CellRef,
    /// True (unpublished) value.
    pub value: f64,
    /// SDMX flag of the verdict.
    pub flag: ConfidentialityFlag,
    /// Full verdict with its numbers.
    pub verdict: Verdict,
    /// Human readable reason.
    pub reason: String,
    /// Provenance of the contributor data used.
    pub source: ContributorSource,
}

/// Counts produced by the primary pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimarySummary {
    /// Value cells in the table, present or missing.
    pub total_cells: usize,
    /// Cells that went through rule evaluation.
    pub examined_cells: usize,
    /// Cells marked primary-suppressed.
    pub suppressed: usize,
    /// `suppressed / total_cells`, zero for an empty table.
    pub suppression_rate: f64,
    /// Examined cells per verdict flag (including `Free`).
    pub by_flag: BTreeMap<ConfidentialityFlag, usize>,
    /// Examined cells per contributor source.
    pub by_source: BTreeMap<ContributorSource, usize>,
}

/// Result of the primary pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryOutcome {
    /// Primary-suppressed cells.
    pub primary: BTreeSet<CellRef>,
    /// Audit log in row-major order.
    pub audit: Vec<AuditEntry>,
    /// Summary counts.
    pub summary: PrimarySummary,
    /// Output view: table values with primary cells replaced by missing.
    pub published: Vec<Vec<Option<f64>>>,
}

struct CellEvaluation {
    cell: CellRef,
    value: f64,
    verdict: Verdict,
    source: ContributorSource,
}

/// Applies the [`RuleEvaluator`] to every cell of a table.
pub struct PrimarySuppressionEngine {
    evaluator: RuleEvaluator,
    resolver: Arc<dyn ContributorResolver>,
    apriori: AprioriOverrides,
}

impl std::fmt::Debug for PrimarySuppressionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimarySuppressionEngine")
            .field("evaluator", &self.evaluator)
            .field("apriori", &self.apriori.len())
            .finish_non_exhaustive()
    }
}

impl PrimarySuppressionEngine {
    /// Creates an engine; fails on invalid thresholds.
    pub fn new(
        config: ProtectionRuleConfig,
        resolver: Arc<dyn ContributorResolver>,
    ) -> Result<Self, SdcError> {
        Ok(Self {
            evaluator: RuleEvaluator::new(config)?,
            resolver,
            apriori: AprioriOverrides::new(),
        })
    }

    /// Attaches a-priori statuses honoured before the rules run.
    pub fn with_apriori(mut self, apriori: AprioriOverrides) -> Self {
        self.apriori = apriori;
        self
    }

    /// Evaluates every present cell.
    ///
    /// Cells with an a-priori status are always decided by it. Other cells
    /// are evaluated only when their value is non-zero. Rows are processed in
    /// parallel and merged in row order.
    pub fn run(&self, table: &Table) -> Result<PrimaryOutcome, SdcError> {
        for (cell, _) in self.apriori.iter() {
            if !table.contains(cell) {
                return Err(SdcError::data(
                    "apriori-unknown-cell",
                    format!("a-priori status targets {cell} outside the table"),
                ));
            }
        }

        let evaluations: Vec<CellEvaluation> = table
            .rows()
            .par_iter()
            .enumerate()
            .map(|(row, record)| {
                record
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(column, value)| {
                        value.and_then(|v| self.evaluate_cell(CellRef::new(row, column), v))
                    })
                    .collect::<Vec<_>>()
            })
            .flatten()
            .collect();

        let mut primary = BTreeSet::new();
        let mut audit = Vec::new();
        let mut by_flag = BTreeMap::new();
        let mut by_source = BTreeMap::new();
        for evaluation in &evaluations {
            *by_flag.entry(evaluation.verdict.flag()).or_insert(0) += 1;
            *by_source.entry(evaluation.source).or_insert(0) += 1;
            if evaluation.verdict.is_confidential() {
                debug!(
                    cell = %evaluation.cell,
                    flag = %evaluation.verdict.flag(),
                    "primary suppression"
                );
                primary.insert(evaluation.cell);
                audit.push(AuditEntry {
                    cell: evaluation.cell,
                    value: evaluation.value,
                    flag: evaluation.verdict.flag(),
                    verdict: evaluation.verdict.clone(),
                    reason: evaluation.verdict.reason(),
                    source: evaluation.source,
                });
            }
        }

        if let Some(synthetic) = by_source.get(&ContributorSource::Synthetic) {
            warn!(
                cells = synthetic,
                "synthetic contributor data used; results are for demonstration only"
            );
        }

        let published = table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record
                    .values
                    .iter()
                    .enumerate()
                    .map(|(column, value)| {
                        if primary.contains(&CellRef::new(row, column)) {
                            None
                        } else {
                            *value
                        }
                    })
                    .collect()
            })
            .collect();

        let total_cells = table.total_cells();
        let summary = PrimarySummary {
            total_cells,
            examined_cells: evaluations.len(),
            suppressed: primary.len(),
            suppression_rate: rate(primary.len(), total_cells),
            by_flag,
            by_source,
        };
        info!(
            examined = summary.examined_cells,
            suppressed = summary.suppressed,
            "primary pass complete"
        );
        Ok(PrimaryOutcome {
            primary,
            audit,
            summary,
            published,
        })
    }

    fn evaluate_cell(&self, cell: CellRef, value: f64) -> Option<CellEvaluation> {
        if let Some(status) = self.apriori.get(cell) {
            let verdict = self
                .evaluator
                .evaluate(value, &ContributorData::Count(0), Some(status));
            return Some(CellEvaluation {
                cell,
                value,
                verdict,
                source: ContributorSource::Apriori,
            });
        }
        if value == 0.0 {
            return None;
        }
        let contributors = self.resolver.resolve(cell, value);
        let verdict = self.evaluator.evaluate(value, &contributors.data, None);
        Some(CellEvaluation {
            cell,
            value,
            verdict,
            source: contributors.source,
        })
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_core::{CellRef, Table};
use sdc_graph::{ConstraintGraph, ConstraintGraphBuilder, MarginSpec};
use sdc_rules::{
    AprioriOverrides, ContributorResolver, PrimaryOutcome, PrimarySuppressionEngine,
    SuppliedContributors,
};
use sdc_solve::{SecondaryOutcome, SecondarySuppressionSolver};
use tracing::info;

use crate::config::SuppressionConfig;
use crate::plan::SuppressionPlan;
use crate::stats::{rate, SuppressionStatistics};

/// Drives one suppression run through its stages.
///
/// Stages run strictly in order: [`primary_pass`](Self::primary_pass),
/// [`build_graph`](Self::build_graph), [`solve_secondary`](Self::solve_secondary),
/// [`finish`](Self::finish). Each stage consumes the complete output of the
/// previous one; calling a stage early is a [`SdcError::Pipeline`] error.
/// Rerunning an earlier stage discards everything after it.
pub struct SuppressionSession<'a> {
    table: &'a Table,
    config: SuppressionConfig,
    engine: PrimarySuppressionEngine,
    solver: SecondarySuppressionSolver,
    margins: Vec<MarginSpec>,
    sensitivity: BTreeMap<CellRef, f64>,
    primary: Option<PrimaryOutcome>,
    graph: Option<ConstraintGraph>,
    secondary: Option<SecondaryOutcome>,
}

impl std::fmt::Debug for SuppressionSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuppressionSession")
            .field("config", &self.config)
            .field("margins", &self.margins.len())
            .field("primary_done", &self.primary.is_some())
            .field("graph_done", &self.graph.is_some())
            .field("secondary_done", &self.secondary.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> SuppressionSession<'a> {
    /// Validates the configuration and prepares a run over `table`.
    pub fn new(
        table: &'a Table,
        config: SuppressionConfig,
        resolver: Arc<dyn ContributorResolver>,
    ) -> Result<Self, SdcError> {
        config.validate()?;
        Ok(Self {
            table,
            config,
            engine: PrimarySuppressionEngine::new(config.rules, resolver)?,
            solver: SecondarySuppressionSolver::from_config(&config.solver)?,
            margins: Vec::new(),
            sensitivity: BTreeMap::new(),
            primary: None,
            graph: None,
            secondary: None,
        })
    }

    /// Adds externally supplied margin constraints.
    pub fn with_margins(mut self, margins: impl IntoIterator<Item = MarginSpec>) -> Self {
        self.margins.extend(margins);
        self
    }

    /// Attaches a-priori statuses.
    pub fn with_apriori(mut self, apriori: AprioriOverrides) -> Self {
        self.engine = self.engine.with_apriori(apriori);
        self
    }

    /// Sets per-cell sensitivity multipliers for the suppression cost.
    pub fn with_sensitivity(mut self, levels: impl IntoIterator<Item = (CellRef, f64)>) -> Self {
        self.sensitivity.extend(levels);
        self
    }

    /// Replaces the configured secondary solver.
    pub fn with_solver(mut self, solver: SecondarySuppressionSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Runs the confidentiality rules over every cell.
    pub fn primary_pass(&mut self) -> Result<&PrimaryOutcome, SdcError> {
        self.graph = None;
        self.secondary = None;
        let outcome = self.engine.run(self.table)?;
        Ok(&*self.primary.insert(outcome))
    }

    /// Builds the constraint graph around the primary set.
    pub fn build_graph(&mut self) -> Result<&ConstraintGraph, SdcError> {
        let primary = self.primary.as_ref().ok_or_else(SdcError::primary_pass_missing)?;
        self.secondary = None;
        let mut builder =
            ConstraintGraphBuilder::new(self.table).with_margins(self.margins.iter().cloned());
        for (cell, level) in &self.sensitivity {
            builder = builder.with_sensitivity(*cell, *level);
        }
        let graph = builder.build(&primary.primary)?;
        Ok(&*self.graph.insert(graph))
    }

    /// Selects the secondary set. Requires a built graph.
    pub fn solve_secondary(&mut self) -> Result<&SecondaryOutcome, SdcError> {
        let graph = self.graph.as_ref().ok_or_else(SdcError::graph_not_built)?;
        let outcome = self.solver.solve(graph);
        Ok(&*self.secondary.insert(outcome))
    }

    /// Assembles the plan from the completed stages.
    pub fn finish(self) -> Result<SuppressionPlan, SdcError> {
        let primary = self.primary.ok_or_else(SdcError::primary_pass_missing)?;
        if self.graph.is_none() {
            return Err(SdcError::graph_not_built());
        }
        let secondary = self.secondary.ok_or_else(|| {
            SdcError::Pipeline(
                ErrorInfo::new("secondary-missing", "secondary suppression has not run")
                    .with_hint("call solve_secondary before finish"),
            )
        })?;

        let mut published = primary.published;
        for cell in &secondary.secondary {
            published[cell.row][cell.column] = None;
        }

        let total_cells = self.table.total_cells();
        let total_suppressions = primary.primary.len() + secondary.secondary.len();
        let statistics = SuppressionStatistics {
            total_cells,
            primary_suppressions: primary.primary.len(),
            secondary_suppressions: secondary.secondary.len(),
            total_suppressions,
            suppression_rate: rate(total_suppressions, total_cells),
            method: "hypercube".to_string(),
            protection_rules: self.config.rules,
            primary_cells: primary.primary.iter().copied().collect(),
            secondary_cells: secondary.secondary.iter().copied().collect(),
            by_flag: primary.summary.by_flag,
            by_source: primary.summary.by_source,
            strategy: secondary.strategy,
            solver_failure: secondary.failure,
            backend: secondary.backend,
            objective_cost: secondary.objective_cost,
            unmet_constraints: secondary.unmet_constraints,
        };
        info!(
            primary = statistics.primary_suppressions,
            secondary = statistics.secondary_suppressions,
            rate = statistics.suppression_rate,
            strategy = statistics.strategy.as_str(),
            "suppression plan ready"
        );
        Ok(SuppressionPlan::new(
            self.table.value_columns().to_vec(),
            primary.primary,
            secondary.secondary,
            primary.audit,
            published,
            statistics,
        ))
    }

    /// Runs every stage and returns the plan.
    pub fn run(mut self) -> Result<SuppressionPlan, SdcError> {
        self.primary_pass()?;
        self.build_graph()?;
        self.solve_secondary()?;
        self.finish()
    }
}

/// One-call pipeline: resolver from `config`, every stage, the plan.
///
/// `supplied` must be given exactly when the configured resolver is `supplied`.
pub fn suppress(
    table: &Table,
    config: &SuppressionConfig,
    supplied: Option<SuppliedContributors>,
) -> Result<SuppressionPlan, SdcError> {
    let resolver = config.resolver.build(supplied)?;
    SuppressionSession::new(table, *config, resolver)?.run()
}

use std::collections::BTreeSet;

use proptest::prelude::*;
use sdc_core::{CellRef, Table};
use sdc_graph::ConstraintGraphBuilder;
use sdc_plan::{suppress, SuppressionConfig};
use sdc_solve::heuristic::CELLS_PER_ROW;
use sdc_solve::{required_secondary, SolveMode, SolveStrategy, SolverConfig};

fn grid_strategy() -> impl Strategy<Value = Vec<Vec<Option<f64>>>> {
    (2usize..6, 2usize..6).prop_flat_map(|(rows, columns)| {
        prop::collection::vec(
            prop::collection::vec(prop::option::weighted(0.9, 0u32..40), columns),
            rows,
        )
        .prop_map(|grid| {
            grid.into_iter()
                .map(|row| row.into_iter().map(|v| v.map(f64::from)).collect())
                .collect()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn protected_constraints_hide_enough_cells(
        grid in grid_strategy(),
        heuristic in any::<bool>(),
    ) {
        let columns: Vec<String> = (0..grid[0].len()).map(|c| format!("v{c}")).collect();
        let table = Table::from_grid(&columns, grid).unwrap();
        let config = SuppressionConfig {
            solver: SolverConfig {
                mode: if heuristic { SolveMode::Heuristic } else { SolveMode::Optimizer },
                ..SolverConfig::default()
            },
            ..SuppressionConfig::default()
        };
        let plan = suppress(&table, &config, None).unwrap();
        prop_assert!(plan.primary().is_disjoint(plan.secondary()));

        let graph = ConstraintGraphBuilder::new(&table).build(plan.primary()).unwrap();
        for constraint in graph.constraints() {
            let primary = graph.primary_count(constraint);
            let available: Vec<CellRef> = graph
                .available_members(constraint)
                .map(|index| graph.cell(index).unwrap().cell)
                .collect();
            let hidden = available
                .iter()
                .filter(|cell| plan.secondary().contains(*cell))
                .count();
            let required = required_secondary(primary, available.len());
            match plan.strategy() {
                SolveStrategy::Optimizer => prop_assert!(hidden >= required),
                SolveStrategy::Heuristic => prop_assert!(hidden >= required.min(CELLS_PER_ROW)),
            }
        }
        let published: BTreeSet<CellRef> = table
            .cells()
            .map(|(cell, _)| cell)
            .filter(|cell| plan.published()[cell.row][cell.column].is_some())
            .collect();
        prop_assert!(published.iter().all(|cell| !plan.is_suppressed(*cell)));
    }
}

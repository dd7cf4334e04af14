use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sdc_core::Table;
use sdc_plan::{suppress, SuppressionConfig};
use sdc_solve::{SolveMode, SolverConfig};

fn frequency_table(rows: usize, columns: usize) -> Table {
    let names: Vec<String> = (0..columns).map(|c| format!("v{c}")).collect();
    let grid = (0..rows)
        .map(|row| {
            (0..columns)
                .map(|column| Some(((row * 13 + column * 7) % 41) as f64))
                .collect()
        })
        .collect();
    Table::from_grid(&names, grid).unwrap()
}

fn pipeline_bench(c: &mut Criterion) {
    let table = frequency_table(30, 8);
    let optimizer = SuppressionConfig::default();
    let heuristic = SuppressionConfig {
        solver: SolverConfig {
            mode: SolveMode::Heuristic,
            ..SolverConfig::default()
        },
        ..SuppressionConfig::default()
    };

    c.bench_function("pipeline_optimizer_30x8", |b| {
        b.iter(|| black_box(suppress(&table, &optimizer, None).unwrap()));
    });
    c.bench_function("pipeline_heuristic_30x8", |b| {
        b.iter(|| black_box(suppress(&table, &heuristic, None).unwrap()));
    });
}

criterion_group!(benches, pipeline_bench);
criterion_main!(benches);

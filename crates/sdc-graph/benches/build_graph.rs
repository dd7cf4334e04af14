use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sdc_core::{CellRef, Table};
use sdc_graph::ConstraintGraphBuilder;

fn build_graph_bench(c: &mut Criterion) {
    let columns: Vec<String> = (0..40).map(|c| format!("v{c}")).collect();
    let grid = (0..500)
        .map(|row| {
            (0..40)
                .map(|column| Some(((row * 31 + column * 17) % 97) as f64))
                .collect()
        })
        .collect();
    let table = Table::from_grid(&columns, grid).unwrap();
    let primary: BTreeSet<_> = (0..500).step_by(7).map(|row| CellRef::new(row, row % 40)).collect();

    c.bench_function("build_graph_500x40", |b| {
        b.iter(|| {
            let graph = ConstraintGraphBuilder::new(&table).build(&primary).unwrap();
            black_box(graph);
        });
    });
}

criterion_group!(benches, build_graph_bench);
criterion_main!(benches);

use sha2::{Digest, Sha256};

use crate::graph::ConstraintGraph;

/// Computes a structural SHA256 hash of the graph.
///
/// Covers cell coordinates, values, primary marks, costs and every
/// constraint's kind, label and member list.
pub fn canonical_hash(graph: &ConstraintGraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update((graph.cells().len() as u64).to_le_bytes());
    for node in graph.cells() {
        hasher.update((node.cell.row as u64).to_le_bytes());
        hasher.update((node.cell.column as u64).to_le_bytes());
        hasher.update(node.value.to_bits().to_le_bytes());
        hasher.update([u8::from(node.is_primary)]);
        hasher.update(node.suppression_cost.to_bits().to_le_bytes());
    }
    hasher.update((graph.constraints().len() as u64).to_le_bytes());
    for constraint in graph.constraints() {
        hasher.update(constraint.kind.as_str().as_bytes());
        update_str(&constraint.label, &mut hasher);
        hasher.update((constraint.members.len() as u64).to_le_bytes());
        for member in &constraint.members {
            hasher.update((*member as u64).to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}

fn update_str(value: &str, hasher: &mut Sha256) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

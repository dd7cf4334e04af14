#![deny(missing_docs)]
#![doc = "Additive constraint graph over the value cells of a table."]

//! Cells and constraints live in flat indexed arrays. Co-membership edges are
//! answered from per-constraint member lists instead of being materialized,
//! which keeps construction linear in the number of cells.

mod builder;
mod graph;
mod hash;
mod ids;

pub use builder::{suppression_cost, ConstraintGraphBuilder, MarginSpec};
pub use graph::{CellNode, CoMembershipEdge, Constraint, ConstraintGraph, ConstraintKind};
pub use hash::canonical_hash;
pub use ids::ConstraintId;

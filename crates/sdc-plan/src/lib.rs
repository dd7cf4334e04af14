#![deny(missing_docs)]
#![doc = "Suppression pipeline: primary pass, constraint graph, secondary solve, plan."]

/// YAML run configuration.
pub mod config;
/// Canonical hashing helpers.
pub mod hash;
/// Staged pipeline driver.
pub mod orchestrator;
/// The immutable suppression plan.
pub mod plan;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Plan statistics.
pub mod stats;

pub use config::{load_config, ResolverConfig, SuppressionConfig};
pub use hash::stable_hash_string;
pub use orchestrator::{suppress, SuppressionSession};
pub use plan::{CellStatus, SuppressionPlan};
pub use crate::serde::{
    from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string,
};
pub use stats::SuppressionStatistics;

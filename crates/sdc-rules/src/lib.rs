#![deny(missing_docs)]
#![doc = "Cell level confidentiality rules and the primary suppression pass."]

/// A-priori forced statuses supplied by an external collaborator.
pub mod apriori;
/// Protection rule thresholds and their validation.
pub mod config;
/// Contributor data model and pluggable resolvers.
pub mod contributors;
/// Rule evaluation in fixed priority order.
pub mod evaluator;
/// Primary suppression over a whole table.
pub mod primary;
/// Verdicts and SDMX confidentiality flags.
pub mod verdict;

pub use apriori::{AprioriOverrides, AprioriStatus};
pub use config::ProtectionRuleConfig;
pub use contributors::{
    ContributorData, ContributorResolver, ContributorSource, Contributors, CountProxy,
    SuppliedContributors, SyntheticContributors,
};
pub use evaluator::RuleEvaluator;
pub use primary::{AuditEntry, PrimaryOutcome, PrimarySummary, PrimarySuppressionEngine};
pub use verdict::{ConfidentialityFlag, Verdict};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::apriori::AprioriStatus;

/// SDMX confidentiality flag attached to every evaluated cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidentialityFlag {
    /// `F`: free for publication.
    Free,
    /// `A`: too few contributors.
    FewContributors,
    /// `O`: dominated by one unit.
    DominanceOne,
    /// `T`: dominated by two units.
    DominanceTwo,
    /// `G`: dominated by the configured number of units.
    DominanceGeneral,
    /// `M`: p-percent or concentration risk.
    PPercent,
    /// `C`: confidential by a-priori status.
    Confidential,
}

impl ConfidentialityFlag {
    /// One-letter SDMX code.
    pub fn code(&self) -> char {
        match self {
            ConfidentialityFlag::Free => 'F',
            ConfidentialityFlag::FewContributors => 'A',
            ConfidentialityFlag::DominanceOne => 'O',
            ConfidentialityFlag::DominanceTwo => 'T',
            ConfidentialityFlag::DominanceGeneral => 'G',
            ConfidentialityFlag::PPercent => 'M',
            ConfidentialityFlag::Confidential => 'C',
        }
    }
}

impl fmt::Display for ConfidentialityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Outcome of evaluating one cell, carrying the numbers behind the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum Verdict {
    /// No rule is violated.
    Free,
    /// Fewer contributors than the threshold (zero contributors always lands here).
    FewContributors {
        /// Contributors found for the cell.
        count: usize,
        /// Configured minimum.
        minimum: u32,
    },
    /// The single largest contributor dominates the cell.
    DominanceOne {
        /// Share of the largest contributor in percent.
        share: f64,
        /// Configured k.
        k: f64,
    },
    /// The two largest contributors dominate the cell.
    DominanceTwo {
        /// Share of the top two contributors in percent.
        share: f64,
        /// Configured k.
        k: f64,
    },
    /// The top `n` contributors dominate the cell, `n > 2`.
    DominanceGeneral {
        /// Configured n.
        n: u32,
        /// Share of the top `n` contributors in percent.
        share: f64,
        /// Configured k.
        k: f64,
    },
    /// The largest contributor can estimate the second largest within p percent.
    PPercentRisk {
        /// Relative estimation error in percent.
        error: f64,
        /// Configured p.
        p: f64,
    },
    /// Suppressed because an a-priori status forces it.
    Forced {
        /// The forcing status (`unsafe` or `protected`).
        status: AprioriStatus,
    },
}

impl Verdict {
    /// SDMX flag for the verdict.
    pub fn flag(&self) -> ConfidentialityFlag {
        match self {
            Verdict::Free => ConfidentialityFlag::Free,
            Verdict::FewContributors { .. } => ConfidentialityFlag::FewContributors,
            Verdict::DominanceOne { .. } => ConfidentialityFlag::DominanceOne,
            Verdict::DominanceTwo { .. } => ConfidentialityFlag::DominanceTwo,
            Verdict::DominanceGeneral { .. } => ConfidentialityFlag::DominanceGeneral,
            Verdict::PPercentRisk { .. } => ConfidentialityFlag::PPercent,
            Verdict::Forced { .. } => ConfidentialityFlag::Confidential,
        }
    }

    /// Whether the cell must be primary-suppressed.
    pub fn is_confidential(&self) -> bool {
        !matches!(self, Verdict::Free)
    }

    /// Human readable reason recorded in the audit log.
    pub fn reason(&self) -> String {
        match self {
            Verdict::Free => "No rule violated".to_string(),
            Verdict::FewContributors { count, minimum } => {
                format!("Too few contributors ({count} < {minimum})")
            }
            Verdict::DominanceOne { share, k } => {
                format!("Dominance by 1 unit ({share:.1}% > {k}%)")
            }
            Verdict::DominanceTwo { share, k } => {
                format!("Dominance by 2 units ({share:.1}% > {k}%)")
            }
            Verdict::DominanceGeneral { n, share, k } => {
                format!("Dominance by {n} units ({share:.1}% > {k}%)")
            }
            Verdict::PPercentRisk { error, p } => {
                format!("P-percent rule violated (estimation error {error:.1}% <= {p}%)")
            }
            Verdict::Forced { status } => {
                format!("Forced {} by a-priori status", status.as_str())
            }
        }
    }
}

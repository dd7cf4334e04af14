use std::collections::BTreeMap;

use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_core::CellRef;
use serde::{Deserialize, Serialize};

/// Status forced onto a cell before any rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AprioriStatus {
    /// Publish regardless of the rules.
    Safe,
    /// Suppress regardless of the rules.
    Unsafe,
    /// Manually protected; suppressed like `Unsafe`.
    Protected,
}

impl AprioriStatus {
    /// Parses the one-letter codes used by a-priori files (`s`, `u`, `p`).
    pub fn from_code(code: &str) -> Result<Self, SdcError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "s" | "safe" => Ok(AprioriStatus::Safe),
            "u" | "unsafe" => Ok(AprioriStatus::Unsafe),
            "p" | "protected" => Ok(AprioriStatus::Protected),
            other => Err(SdcError::Data(
                ErrorInfo::new("apriori-status", "unknown a-priori status code")
                    .with_context("code", other)
                    .with_hint("use s, u or p"),
            )),
        }
    }

    /// Whether the status forces suppression.
    pub fn forces_suppression(&self) -> bool {
        matches!(self, AprioriStatus::Unsafe | AprioriStatus::Protected)
    }

    /// Lower-case label used in reasons and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            AprioriStatus::Safe => "safe",
            AprioriStatus::Unsafe => "unsafe",
            AprioriStatus::Protected => "protected",
        }
    }
}

/// Per-cell forced statuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AprioriOverrides {
    statuses: BTreeMap<CellRef, AprioriStatus>,
}

impl AprioriOverrides {
    /// Creates an empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces `status` onto `cell`, replacing any earlier entry.
    pub fn insert(&mut self, cell: CellRef, status: AprioriStatus) {
        self.statuses.insert(cell, status);
    }

    /// Builder form of [`AprioriOverrides::insert`].
    pub fn with(mut self, cell: CellRef, status: AprioriStatus) -> Self {
        self.insert(cell, status);
        self
    }

    /// Forced status for `cell`, if any.
    pub fn get(&self, cell: CellRef) -> Option<AprioriStatus> {
        self.statuses.get(&cell).copied()
    }

    /// Number of forced cells.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether no cell is forced.
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Iterates over forced cells in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (CellRef, AprioriStatus)> + '_ {
        self.statuses.iter().map(|(cell, status)| (*cell, *status))
    }
}

impl FromIterator<(CellRef, AprioriStatus)> for AprioriOverrides {
    fn from_iter<I: IntoIterator<Item = (CellRef, AprioriStatus)>>(iter: I) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}

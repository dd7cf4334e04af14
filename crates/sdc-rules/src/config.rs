use sdc_core::errors::{ErrorInfo, SdcError};
use serde::{Deserialize, Serialize};

/// Thresholds for the threshold, n,k-dominance and p-percent rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtectionRuleConfig {
    /// Minimum number of contributors a publishable cell needs.
    #[serde(default = "default_min_contributors")]
    pub min_contributors: u32,
    /// Number of largest contributors summed by the dominance rule.
    #[serde(default = "default_dominance_n")]
    pub dominance_n: u32,
    /// Dominance share (percent) that the top contributors may not exceed.
    #[serde(default = "default_dominance_k")]
    pub dominance_k: f64,
    /// Estimation error (percent) below which the p-percent rule triggers.
    #[serde(default = "default_p_percent")]
    pub p_percent: f64,
}

fn default_min_contributors() -> u32 {
    3
}

fn default_dominance_n() -> u32 {
    1
}

fn default_dominance_k() -> f64 {
    80.0
}

fn default_p_percent() -> f64 {
    10.0
}

impl Default for ProtectionRuleConfig {
    fn default() -> Self {
        Self {
            min_contributors: default_min_contributors(),
            dominance_n: default_dominance_n(),
            dominance_k: default_dominance_k(),
            p_percent: default_p_percent(),
        }
    }
}

fn percentage_error(code: &str, name: &str, value: f64) -> SdcError {
    SdcError::Configuration(
        ErrorInfo::new(code, format!("{name} must lie in (0, 100]"))
            .with_context(name, value.to_string()),
    )
}

impl ProtectionRuleConfig {
    /// Rejects out-of-range thresholds before any cell is processed.
    pub fn validate(&self) -> Result<(), SdcError> {
        if self.dominance_n == 0 {
            return Err(SdcError::Configuration(
                ErrorInfo::new("dominance-n-zero", "dominance_n must be at least 1")
                    .with_context("dominance_n", "0"),
            ));
        }
        for (name, value) in [("dominance_k", self.dominance_k), ("p_percent", self.p_percent)] {
            if !value.is_finite() {
                return Err(SdcError::Configuration(
                    ErrorInfo::new("non-finite-threshold", format!("{name} must be finite"))
                        .with_context(name, value.to_string()),
                ));
            }
        }
        if self.dominance_k <= 0.0 || self.dominance_k > 100.0 {
            return Err(percentage_error(
                "dominance-k-range",
                "dominance_k",
                self.dominance_k,
            ));
        }
        if self.p_percent <= 0.0 || self.p_percent > 100.0 {
            return Err(percentage_error(
                "p-percent-range",
                "p_percent",
                self.p_percent,
            ));
        }
        Ok(())
    }

    /// Picks the thresholds for a run.
    ///
    /// Explicitly configured thresholds always win over thresholds embedded
    /// in an externally parsed batch file; the defaults apply when neither
    /// is present.
    pub fn resolve(explicit: Option<Self>, embedded: Option<Self>) -> Self {
        explicit.or(embedded).unwrap_or_default()
    }
}

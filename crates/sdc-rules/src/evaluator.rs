use sdc_core::SdcError;

use crate::apriori::AprioriStatus;
use crate::config::ProtectionRuleConfig;
use crate::contributors::ContributorData;
use crate::verdict::Verdict;

/// Evaluates the confidentiality rules for single cells.
///
/// Rules run in fixed priority order (a-priori status, threshold, dominance,
/// p-percent) and evaluation stops at the first violation.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    config: ProtectionRuleConfig,
}

impl RuleEvaluator {
    /// Creates an evaluator after validating the thresholds.
    pub fn new(config: ProtectionRuleConfig) -> Result<Self, SdcError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Thresholds in use.
    pub fn config(&self) -> &ProtectionRuleConfig {
        &self.config
    }

    /// Returns the first violated rule for a cell with published `total`.
    pub fn evaluate(
        &self,
        total: f64,
        contributors: &ContributorData,
        apriori: Option<AprioriStatus>,
    ) -> Verdict {
        match apriori {
            Some(AprioriStatus::Safe) => return Verdict::Free,
            Some(status) => return Verdict::Forced { status },
            None => {}
        }
        if let Some(verdict) = self.check_threshold(contributors.count()) {
            return verdict;
        }
        let Some(values) = contributors.values() else {
            return Verdict::Free;
        };
        if let Some(verdict) = self.check_dominance(total, values) {
            return verdict;
        }
        self.check_p_percent(total, values).unwrap_or(Verdict::Free)
    }

    /// Threshold rule: too few contributors. Zero contributors always violates.
    pub fn check_threshold(&self, count: usize) -> Option<Verdict> {
        if count == 0 || count < self.config.min_contributors as usize {
            Some(Verdict::FewContributors {
                count,
                minimum: self.config.min_contributors,
            })
        } else {
            None
        }
    }

    /// n,k-dominance rule. Skipped for non-positive totals; exactly k percent passes.
    pub fn check_dominance(&self, total: f64, values: &[f64]) -> Option<Verdict> {
        if values.is_empty() || total <= 0.0 {
            return None;
        }
        let sorted = sorted_descending(values);
        let n = self.config.dominance_n;
        let top_sum: f64 = sorted.iter().take(n as usize).sum();
        let share = top_sum / total * 100.0;
        if share <= self.config.dominance_k {
            return None;
        }
        let k = self.config.dominance_k;
        Some(match n {
            1 => Verdict::DominanceOne { share, k },
            2 => Verdict::DominanceTwo { share, k },
            _ => Verdict::DominanceGeneral { n, share, k },
        })
    }

    /// p-percent rule.
    ///
    /// The largest contributor estimates the second largest as
    /// `total - largest - sum(remaining)`. When the values are known exactly
    /// and sum to the total the estimate is exact, so the rule fires for any
    /// cell with two or more positive contributors.
    pub fn check_p_percent(&self, total: f64, values: &[f64]) -> Option<Verdict> {
        if values.len() < 2 || total == 0.0 {
            return None;
        }
        let sorted = sorted_descending(values);
        let largest = sorted[0];
        let second = sorted[1];
        if second <= 0.0 {
            return None;
        }
        let others: f64 = sorted[2..].iter().sum();
        let estimate = total - largest - others;
        let error = (estimate - second).abs() / second * 100.0;
        if error <= self.config.p_percent {
            Some(Verdict::PPercentRisk {
                error,
                p: self.config.p_percent,
            })
        } else {
            None
        }
    }
}

fn sorted_descending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
}

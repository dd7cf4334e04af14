use std::collections::BTreeMap;

use rand::Rng;
use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_core::{CellRef, RngHandle};
use serde::{Deserialize, Serialize};

/// Contributor level knowledge about one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum ContributorData {
    /// Individual contributor values; enables all three rules.
    Values(Vec<f64>),
    /// Only the number of contributors is known; only the threshold rule applies.
    Count(usize),
}

impl ContributorData {
    /// Number of contributors.
    pub fn count(&self) -> usize {
        match self {
            ContributorData::Values(values) => values.len(),
            ContributorData::Count(count) => *count,
        }
    }

    /// Contributor values, when known.
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            ContributorData::Values(values) => Some(values),
            ContributorData::Count(_) => None,
        }
    }
}

/// Where the contributor data for a cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributorSource {
    /// Real contributor values supplied by the caller.
    Supplied,
    /// The raw cell value is used as the contributor count.
    CountProxy,
    /// Randomly generated demonstration data; never use for publication.
    Synthetic,
    /// The resolver had nothing for the cell; treated as zero contributors.
    Missing,
    /// Not consulted because an a-priori status decided the cell.
    Apriori,
}

/// Contributor data plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributors {
    /// The contributor data.
    pub data: ContributorData,
    /// Provenance of `data`.
    pub source: ContributorSource,
}

/// Strategy that supplies contributor data for a cell.
pub trait ContributorResolver: Send + Sync {
    /// Returns the contributors behind `cell`, whose published value is `value`.
    fn resolve(&self, cell: CellRef, value: f64) -> Contributors;
}

/// Contributor values supplied directly, e.g. aggregated from microdata.
#[derive(Debug, Clone, Default)]
pub struct SuppliedContributors {
    values: BTreeMap<CellRef, Vec<f64>>,
}

impl SuppliedContributors {
    /// Wraps supplied values after checking that every value is finite.
    pub fn new(values: BTreeMap<CellRef, Vec<f64>>) -> Result<Self, SdcError> {
        for (cell, list) in &values {
            if list.iter().any(|value| !value.is_finite()) {
                return Err(SdcError::Data(
                    ErrorInfo::new("non-finite-contributor", "contributor values must be finite")
                        .with_cell(*cell),
                ));
            }
        }
        Ok(Self { values })
    }
}

impl ContributorResolver for SuppliedContributors {
    fn resolve(&self, cell: CellRef, _value: f64) -> Contributors {
        match self.values.get(&cell) {
            Some(list) => Contributors {
                data: ContributorData::Values(list.clone()),
                source: ContributorSource::Supplied,
            },
            None => Contributors {
                data: ContributorData::Values(Vec::new()),
                source: ContributorSource::Missing,
            },
        }
    }
}

/// Treats the raw cell value of a frequency table as its contributor count.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountProxy;

impl ContributorResolver for CountProxy {
    fn resolve(&self, _cell: CellRef, value: f64) -> Contributors {
        let count = if value > 0.0 { value.round() as usize } else { 0 };
        Contributors {
            data: ContributorData::Count(count),
            source: ContributorSource::CountProxy,
        }
    }
}

/// Demonstration resolver producing a concentrated, Pareto shaped split of
/// each cell value.
///
/// Output is deterministic for a given seed and cell, and every result is
/// tagged [`ContributorSource::Synthetic`].
#[derive(Debug, Clone, Copy)]
pub struct SyntheticContributors {
    seed: u64,
}

const PARETO_ALPHA: f64 = 1.5;

impl SyntheticContributors {
    /// Creates the resolver with a master seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn contributor_count(value: f64, rng: &mut RngHandle) -> usize {
        let draw: f64 = rng.gen();
        if value < 10.0 {
            match draw {
                d if d < 0.4 => 1,
                d if d < 0.8 => 2,
                _ => 3,
            }
        } else if value < 50.0 {
            match draw {
                d if d < 0.3 => 2,
                d if d < 0.6 => 3,
                d if d < 0.8 => 4,
                _ => 5,
            }
        } else {
            rng.gen_range(3..8)
        }
    }
}

impl ContributorResolver for SyntheticContributors {
    fn resolve(&self, cell: CellRef, value: f64) -> Contributors {
        let mut rng = RngHandle::for_cell(self.seed, cell);
        let count = Self::contributor_count(value, &mut rng);
        let values = if count == 1 {
            vec![value]
        } else {
            let raw: Vec<f64> = (0..count)
                .map(|_| {
                    let u: f64 = rng.gen();
                    (1.0 - u).powf(-1.0 / PARETO_ALPHA)
                })
                .collect();
            let sum: f64 = raw.iter().sum();
            raw.into_iter().map(|r| r / sum * value).collect()
        };
        Contributors {
            data: ContributorData::Values(values),
            source: ContributorSource::Synthetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_split_sums_to_value() {
        let resolver = SyntheticContributors::new(11);
        for (row, value) in [3.0, 27.0, 140.0].into_iter().enumerate() {
            let contributors = resolver.resolve(CellRef::new(row, 0), value);
            let values = contributors.data.values().unwrap();
            let sum: f64 = values.iter().sum();
            assert!((sum - value).abs() < 1e-9);
            assert_eq!(contributors.source, ContributorSource::Synthetic);
        }
    }

    #[test]
    fn count_proxy_never_goes_negative() {
        let contributors = CountProxy.resolve(CellRef::new(0, 0), -4.0);
        assert_eq!(contributors.data, ContributorData::Count(0));
    }
}

use std::fs;
use std::path::Path;
use std::sync::Arc;

use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_rules::{
    ContributorResolver, CountProxy, ProtectionRuleConfig, SuppliedContributors,
    SyntheticContributors,
};
use sdc_solve::SolverConfig;
use serde::{Deserialize, Serialize};

use crate::serde::from_yaml_slice;

/// Where contributor data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResolverConfig {
    /// Contributor values handed to the run by the caller.
    Supplied,
    /// The raw cell value is the contributor count (frequency tables).
    #[default]
    CountProxy,
    /// Seeded synthetic contributors, for demonstrations only.
    Synthetic {
        /// Master seed for the per-cell substreams.
        seed: u64,
    },
}

impl ResolverConfig {
    /// Instantiates the resolver.
    ///
    /// `supplied` is required by [`ResolverConfig::Supplied`] and rejected by
    /// every other kind, which would otherwise ignore it.
    pub fn build(
        &self,
        supplied: Option<SuppliedContributors>,
    ) -> Result<Arc<dyn ContributorResolver>, SdcError> {
        match (self, supplied) {
            (ResolverConfig::Supplied, Some(contributors)) => Ok(Arc::new(contributors)),
            (ResolverConfig::Supplied, None) => Err(SdcError::Configuration(
                ErrorInfo::new(
                    "supplied-contributors-missing",
                    "resolver kind 'supplied' needs contributor data",
                )
                .with_hint("pass contributor values or switch to count-proxy"),
            )),
            (other, Some(_)) => Err(SdcError::Configuration(
                ErrorInfo::new(
                    "supplied-contributors-unused",
                    "contributor values were given but the resolver does not read them",
                )
                .with_context("resolver", other.kind())
                .with_hint("set resolver kind to 'supplied' or drop the contributor values"),
            )),
            (ResolverConfig::CountProxy, None) => Ok(Arc::new(CountProxy)),
            (ResolverConfig::Synthetic { seed }, None) => {
                Ok(Arc::new(SyntheticContributors::new(*seed)))
            }
        }
    }

    /// Kebab-case tag used in configuration files.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverConfig::Supplied => "supplied",
            ResolverConfig::CountProxy => "count-proxy",
            ResolverConfig::Synthetic { .. } => "synthetic",
        }
    }
}

/// Full configuration of one suppression run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SuppressionConfig {
    /// Confidentiality thresholds.
    #[serde(default)]
    pub rules: ProtectionRuleConfig,
    /// Secondary suppression settings.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Contributor data source.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl SuppressionConfig {
    /// Validates every section.
    pub fn validate(&self) -> Result<(), SdcError> {
        self.rules.validate()?;
        self.solver.validate()
    }
}

/// Loads and validates a YAML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SuppressionConfig, SdcError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        SdcError::Serde(
            ErrorInfo::new("config-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let config: SuppressionConfig = from_yaml_slice(&bytes)?;
    config.validate()?;
    Ok(config)
}

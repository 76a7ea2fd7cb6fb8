//! Run configuration, loaded once from JSON and passed down by reference.
//!
//! Numeric thresholds have no defaults so that a missing threshold is reported as a
//! fatal error naming the field.

use std::path::Path;

use crate::{common::open_read_maybe_gz, err::ConfigError};

/// Prefilters applied before classification.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Records with ExAC or gnomAD allele frequency at or above this value are dropped.
    pub af_semi_rare: f64,
    /// Consequence terms that are not of interest.
    #[serde(default)]
    pub useless_csq: Vec<String>,
}

/// Thresholds for the in-silico predictors.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct InSilicoConfig {
    /// Minimal CADD PHRED score (exclusive).
    pub cadd: f64,
    /// Minimal REVEL score (exclusive).
    pub revel: f64,
    /// Maximal SIFT score (exclusive), lower is more damaging.
    pub sift: f64,
    /// Minimal PolyPhen score (exclusive).
    pub polyphen: f64,
    /// Minimal GERP RS score (inclusive).
    pub gerp: f64,
    /// Minimal Eigen PHRED score (exclusive).
    pub eigen: f64,
}

/// Settings of the classification engine.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClassificationConfig {
    /// Consequence terms considered critical, e.g., `stop_gained`.
    pub critical_csq: Vec<String>,
    /// In-silico thresholds.
    pub in_silico: InSilicoConfig,
}

/// Settings of the inheritance tests.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct MoiTestsConfig {
    /// Maximal population allele frequency for dominant models.
    pub gnomad_dominant: f64,
    /// Maximal population allele count for dominant models.
    pub gnomad_max_ac_dominant: i64,
    /// Maximal number of population homozygotes for dominant models.
    pub gnomad_max_homs_dominant: i64,
    /// Maximal number of population homozygotes for recessive models.
    pub gnomad_max_homs_recessive: i64,
    /// Only retain Class2 for genes that are new on the panel.
    #[serde(default)]
    pub class_2_new_only: bool,
}

/// The complete run configuration.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional prefilters, none are applied if absent.
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    pub classification: ClassificationConfig,
    pub moi_tests: MoiTestsConfig,
}

impl Config {
    /// Load configuration from JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not open config file {:?}: {}", path.as_ref(), e)
        })?;
        let config: Config = serde_json::from_reader(reader).map_err(|e| {
            ConfigError::InvalidConfig(format!("{:?}: {}", path.as_ref(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds are usable numbers.
    fn validate(&self) -> Result<(), ConfigError> {
        let in_silico = &self.classification.in_silico;
        let thresholds = [
            ("classification.in_silico.cadd", in_silico.cadd),
            ("classification.in_silico.revel", in_silico.revel),
            ("classification.in_silico.sift", in_silico.sift),
            ("classification.in_silico.polyphen", in_silico.polyphen),
            ("classification.in_silico.gerp", in_silico.gerp),
            ("classification.in_silico.eigen", in_silico.eigen),
            ("moi_tests.gnomad_dominant", self.moi_tests.gnomad_dominant),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(ConfigError::InvalidConfig(format!(
                    "threshold {} is not a finite number",
                    name
                )));
            }
        }
        if let Some(filter) = &self.filter {
            if !filter.af_semi_rare.is_finite() {
                return Err(ConfigError::InvalidConfig(
                    "threshold filter.af_semi_rare is not a finite number".into(),
                ));
            }
        }
        Ok(())
    }
}

//! Per-sample and per-class summary of the findings.

use std::collections::HashSet;

use enum_map::EnumMap;
use indexmap::IndexMap;

use crate::{ped::Pedigree, results::ReportedVariant};

/// Category of findings that is counted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    enum_map::Enum,
    strum::Display,
)]
pub enum Category {
    #[serde(rename = "total")]
    #[strum(serialize = "total")]
    Total,
    #[serde(rename = "class_1")]
    #[strum(serialize = "class_1")]
    Class1,
    #[serde(rename = "class_2")]
    #[strum(serialize = "class_2")]
    Class2,
    #[serde(rename = "class_3")]
    #[strum(serialize = "class_3")]
    Class3,
}

impl Category {
    fn matches(&self, finding: &ReportedVariant) -> bool {
        match self {
            Category::Total => true,
            Category::Class1 => finding.classes.class_1,
            Category::Class2 => finding.classes.class_2,
            Category::Class3 => finding.classes.class_3,
        }
    }
}

/// Aggregate statistics of one category over all affected samples.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategoryStats {
    /// Number of findings over all samples.
    pub total: usize,
    /// Number of distinct variants.
    pub unique: usize,
    /// Largest number of findings in one sample.
    pub peak: usize,
    /// Mean number of findings per affected sample.
    pub mean: f64,
}

/// Summary of a run.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    /// Counts per affected sample.
    pub per_sample: IndexMap<String, EnumMap<Category, usize>>,
    /// Statistics per category.
    pub categories: EnumMap<Category, CategoryStats>,
    /// Affected samples without any finding.
    pub samples_without_findings: Vec<String>,
}

impl Summary {
    /// Compute summary over the affected samples of `pedigree`.
    pub fn new(findings: &[ReportedVariant], pedigree: &Pedigree) -> Self {
        let mut per_sample: IndexMap<String, EnumMap<Category, usize>> = pedigree
            .affected()
            .map(|person| (person.sample_id.clone(), EnumMap::default()))
            .collect();
        let mut unique: EnumMap<Category, HashSet<String>> = EnumMap::default();

        for finding in findings {
            let Some(counts) = per_sample.get_mut(&finding.sample) else {
                continue;
            };
            for (category, count) in counts.iter_mut() {
                if category.matches(finding) {
                    *count += 1;
                    unique[category].insert(finding.variant.string());
                }
            }
        }

        let mut categories: EnumMap<Category, CategoryStats> = EnumMap::default();
        for (category, stats) in categories.iter_mut() {
            let counts = per_sample.values().map(|counts| counts[category]);
            stats.total = counts.clone().sum();
            stats.peak = counts.max().unwrap_or(0);
            stats.unique = unique[category].len();
            stats.mean = if per_sample.is_empty() {
                0.0
            } else {
                stats.total as f64 / per_sample.len() as f64
            };
        }

        let samples_without_findings = per_sample
            .iter()
            .filter(|(_, counts)| counts[Category::Total] == 0)
            .map(|(sample, _)| sample.clone())
            .collect();

        Self {
            per_sample,
            categories,
            samples_without_findings,
        }
    }

    /// Write the summary to the log.
    pub fn log(&self) {
        for (category, stats) in &self.categories {
            tracing::info!(
                "{}: {} findings, {} unique variants, peak {} per sample, mean {:.2}",
                category,
                stats.total,
                stats.unique,
                stats.peak,
                stats.mean
            );
        }
        if !self.samples_without_findings.is_empty() {
            tracing::info!(
                "affected samples without findings: {}",
                self.samples_without_findings.join(", ")
            );
        }
    }
}

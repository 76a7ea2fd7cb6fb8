//! Findings of the inheritance tests and their de-duplication.

pub mod output;
pub mod summary;

use std::{collections::BTreeSet, sync::Arc};

use indexmap::IndexMap;

use crate::variant::{Classes, VariantRecord};

/// Literal used in the de-duplication key for findings without support variant.
pub const UNSUPPORTED: &str = "Unsupported";

/// One finding of an inheritance test for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedVariant {
    pub sample: String,
    pub gene_id: String,
    pub variant: Arc<VariantRecord>,
    /// Names of the matched inheritance patterns.
    pub reasons: BTreeSet<String>,
    /// Whether a compound-het partner supports the finding.
    pub supported: bool,
    pub support_variant: Option<Arc<VariantRecord>>,
    /// The effective classes, initialized from the variant.
    pub classes: Classes,
}

impl ReportedVariant {
    /// Finding that needs no second variant.
    pub fn unsupported(
        sample: &str,
        gene_id: &str,
        variant: &Arc<VariantRecord>,
        reason: &str,
    ) -> Self {
        Self {
            sample: sample.to_string(),
            gene_id: gene_id.to_string(),
            variant: variant.clone(),
            reasons: BTreeSet::from([reason.to_string()]),
            supported: false,
            support_variant: None,
            classes: variant.classes,
        }
    }

    /// Finding supported by compound-het `partner`.
    pub fn supported(
        sample: &str,
        gene_id: &str,
        variant: &Arc<VariantRecord>,
        reason: &str,
        partner: &Arc<VariantRecord>,
    ) -> Self {
        Self {
            supported: true,
            support_variant: Some(partner.clone()),
            ..Self::unsupported(sample, gene_id, variant, reason)
        }
    }

    /// Key `variant__gene__support` identifying a finding within one sample.
    pub fn dedup_key(&self) -> String {
        let support = match &self.support_variant {
            Some(partner) if self.supported => partner.string(),
            _ => UNSUPPORTED.to_string(),
        };
        format!("{}__{}__{}", self.variant.string(), &self.gene_id, support)
    }
}

/// Merges findings per sample and de-duplication key, unioning the reasons.
///
/// Samples and findings keep the order in which they were first seen.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    samples: IndexMap<String, IndexMap<String, ReportedVariant>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one finding; on collision only the reasons are merged into the first one.
    pub fn add(&mut self, finding: ReportedVariant) {
        let per_sample = self.samples.entry(finding.sample.clone()).or_default();
        match per_sample.entry(finding.dedup_key()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.get_mut().reasons.extend(finding.reasons);
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(finding);
            }
        }
    }

    /// Number of de-duplicated findings.
    pub fn len(&self) -> usize {
        self.samples.values().map(|per_sample| per_sample.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate findings ordered by sample, then first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &ReportedVariant> {
        self.samples.values().flat_map(|per_sample| per_sample.values())
    }

    /// Consume into findings ordered by sample, then first appearance.
    pub fn into_results(self) -> Vec<ReportedVariant> {
        self.samples
            .into_values()
            .flat_map(|per_sample| per_sample.into_values())
            .collect()
    }
}

impl Extend<ReportedVariant> for Aggregator {
    fn extend<T: IntoIterator<Item = ReportedVariant>>(&mut self, iter: T) {
        for finding in iter {
            self.add(finding);
        }
    }
}

impl FromIterator<ReportedVariant> for Aggregator {
    fn from_iter<T: IntoIterator<Item = ReportedVariant>>(iter: T) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

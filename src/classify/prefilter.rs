//! Prefilters applied before classification.

use crate::{conf::FilterConfig, panel::PanelRegistry, variant::VariantRecord};

/// Both ExAC and gnomAD allele frequencies are below the semi-rare threshold.
pub fn passes_rarity(record: &VariantRecord, filter: &FilterConfig) -> bool {
    record.annotations.float("exac_af") < filter.af_semi_rare
        && record.annotations.float("gnomad_af") < filter.af_semi_rare
}

/// ClinVar reports the variant as benign with at least one star.
pub fn is_benign(record: &VariantRecord) -> bool {
    record.annotations.int("clinvar_stars") > 0
        && record
            .annotations
            .string("clinvar_sig")
            .to_lowercase()
            .contains("benign")
}

/// Restrict transcript consequences to the record's gene and to those with at least one
/// term of interest.  Returns whether any consequence is left.
pub fn restrict_consequences(record: &mut VariantRecord, filter: &FilterConfig) -> bool {
    let gene_id = record.gene_id.clone();
    record.transcript_consequences.retain(|tx| {
        tx.gene_id == gene_id
            && tx
                .consequence_terms
                .iter()
                .any(|term| !filter.useless_csq.contains(term))
    });
    !record.transcript_consequences.is_empty()
}

/// Counters of records removed by each filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub not_rare: usize,
    pub benign: usize,
    pub not_green: usize,
    pub no_consequence: usize,
}

/// Apply all prefilters to `records`.
pub fn apply(
    records: Vec<VariantRecord>,
    filter: &FilterConfig,
    panel: &PanelRegistry,
) -> (Vec<VariantRecord>, Stats) {
    let mut stats = Stats::default();
    let result = records
        .into_iter()
        .filter_map(|mut record| {
            if !passes_rarity(&record, filter) {
                tracing::trace!("{} fails rarity filter", record.string());
                stats.not_rare += 1;
                None
            } else if is_benign(&record) {
                tracing::trace!("{} is benign in ClinVar", record.string());
                stats.benign += 1;
                None
            } else if !panel.contains(&record.gene_id) {
                tracing::trace!("{} is not in a green gene", record.string());
                stats.not_green += 1;
                None
            } else if !restrict_consequences(&mut record, filter) {
                tracing::trace!("{} has no consequence of interest", record.string());
                stats.no_consequence += 1;
                None
            } else {
                Some(record)
            }
        })
        .collect();
    (result, stats)
}

//! Autosomal dominant and recessive inheritance.

use std::sync::Arc;

use super::{
    affected_among, passes_dominant_frequency, passes_hom_count, InheritanceTest,
};
use crate::{
    comphet::CompoundHetIndex, conf::MoiTestsConfig, ped::Pedigree, results::ReportedVariant,
    variant::VariantRecord,
};

pub const REASON_DOMINANT: &str = "Autosomal Dominant";
pub const REASON_RECESSIVE_HOM: &str = "Autosomal Recessive Homozygous";
pub const REASON_RECESSIVE_COMP_HET: &str = "Autosomal Recessive Compound-Het";

/// Affected heterozygous carriers of rare variants, no support required.
#[derive(Debug)]
pub struct DominantAutosomal {
    pedigree: Arc<Pedigree>,
    config: MoiTestsConfig,
}

impl DominantAutosomal {
    pub fn new(pedigree: Arc<Pedigree>, config: MoiTestsConfig) -> Self {
        Self { pedigree, config }
    }
}

impl InheritanceTest for DominantAutosomal {
    fn name(&self) -> &'static str {
        "DominantAutosomal"
    }

    fn run(
        &self,
        principal: &Arc<VariantRecord>,
        _comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant> {
        if !passes_dominant_frequency(principal, &self.config)
            || !passes_hom_count(principal, self.config.gnomad_max_homs_dominant)
        {
            return Vec::new();
        }

        affected_among(&self.pedigree, &principal.het_samples, principal)
            .into_iter()
            .map(|person| {
                ReportedVariant::unsupported(&person.sample_id, gene_id, principal, REASON_DOMINANT)
            })
            .collect()
    }
}

/// Affected homozygous carriers, and heterozygous carriers with a compound-het partner.
#[derive(Debug)]
pub struct RecessiveAutosomal {
    pedigree: Arc<Pedigree>,
    config: MoiTestsConfig,
}

impl RecessiveAutosomal {
    pub fn new(pedigree: Arc<Pedigree>, config: MoiTestsConfig) -> Self {
        Self { pedigree, config }
    }
}

impl InheritanceTest for RecessiveAutosomal {
    fn name(&self) -> &'static str {
        "RecessiveAutosomal"
    }

    fn run(
        &self,
        principal: &Arc<VariantRecord>,
        comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant> {
        if !passes_hom_count(principal, self.config.gnomad_max_homs_recessive) {
            return Vec::new();
        }

        let mut result: Vec<_> = affected_among(&self.pedigree, &principal.hom_samples, principal)
            .into_iter()
            .map(|person| {
                ReportedVariant::unsupported(
                    &person.sample_id,
                    gene_id,
                    principal,
                    REASON_RECESSIVE_HOM,
                )
            })
            .collect();

        for person in affected_among(&self.pedigree, &principal.het_samples, principal) {
            for partner in comp_het.partners(&person.sample_id, principal, gene_id) {
                result.push(ReportedVariant::supported(
                    &person.sample_id,
                    gene_id,
                    principal,
                    REASON_RECESSIVE_COMP_HET,
                    partner,
                ));
            }
        }

        result
    }
}

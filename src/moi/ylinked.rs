//! Y-linked hemizygous inheritance.

use std::sync::Arc;

use super::{known_among, passes_dominant_frequency, InheritanceTest};
use crate::{
    comphet::CompoundHetIndex, conf::MoiTestsConfig, ped::Pedigree, results::ReportedVariant,
    variant::VariantRecord,
};

pub const REASON_Y_HEMI: &str = "Y_Hemi";

/// Carriers of rare variants on Y.
///
/// Hom. calls and female carriers are not expected; they are logged but still reported.
#[derive(Debug)]
pub struct YHemi {
    pedigree: Arc<Pedigree>,
    config: MoiTestsConfig,
}

impl YHemi {
    pub fn new(pedigree: Arc<Pedigree>, config: MoiTestsConfig) -> Self {
        Self { pedigree, config }
    }
}

impl InheritanceTest for YHemi {
    fn name(&self) -> &'static str {
        "YHemi"
    }

    fn run(
        &self,
        principal: &Arc<VariantRecord>,
        _comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant> {
        if !passes_dominant_frequency(principal, &self.config) {
            return Vec::new();
        }

        for sample in &principal.hom_samples {
            tracing::warn!(
                "sample {} has a hom. call on Y at {}",
                sample,
                principal.string()
            );
        }

        known_among(&self.pedigree, principal.called_samples(), principal)
            .into_iter()
            .map(|person| {
                if !person.is_male {
                    tracing::error!(
                        "sample {} is female with a call on Y at {}",
                        &person.sample_id,
                        principal.string()
                    );
                }
                ReportedVariant::unsupported(&person.sample_id, gene_id, principal, REASON_Y_HEMI)
            })
            .collect()
    }
}

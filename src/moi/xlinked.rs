//! X-linked dominant and recessive inheritance.
//!
//! Callers commonly report hemizygous male calls as homozygous, so males count as
//! carriers with either het. or hom. call.

use std::sync::Arc;

use super::{known_among, passes_dominant_frequency, passes_hom_count, InheritanceTest};
use crate::{
    common::Chrom,
    comphet::CompoundHetIndex,
    conf::MoiTestsConfig,
    ped::{PedPerson, Pedigree},
    results::ReportedVariant,
    variant::VariantRecord,
};

pub const REASON_X_DOMINANT_MALE: &str = "X_Dominant Male";
pub const REASON_X_DOMINANT_FEMALE: &str = "X_Dominant Female";
pub const REASON_X_RECESSIVE_MALE: &str = "X_Recessive Male";
pub const REASON_X_RECESSIVE_FEMALE: &str = "X_Recessive Female";
pub const REASON_X_RECESSIVE_COMP_HET: &str = "X_Recessive Compound-Het Female";

fn warn_if_not_on_x(principal: &VariantRecord) {
    if principal.chrom_kind() != Chrom::X {
        tracing::error!(
            "X-linked MOI given for variant {} on {}",
            principal.string(),
            &principal.chrom
        );
    }
}

/// Males with any call, in sorted order.
fn males<'a>(pedigree: &'a Pedigree, principal: &VariantRecord) -> Vec<&'a PedPerson> {
    known_among(pedigree, principal.called_samples(), principal)
        .into_iter()
        .filter(|person| person.is_male)
        .collect()
}

/// Females among `samples`.
fn females<'a, 'b>(
    pedigree: &'a Pedigree,
    samples: impl IntoIterator<Item = &'b String>,
    principal: &VariantRecord,
) -> Vec<&'a PedPerson> {
    known_among(pedigree, samples, principal)
        .into_iter()
        .filter(|person| !person.is_male)
        .collect()
}

/// Males with any call, and het. females.
#[derive(Debug)]
pub struct XDominant {
    pedigree: Arc<Pedigree>,
    config: MoiTestsConfig,
}

impl XDominant {
    pub fn new(pedigree: Arc<Pedigree>, config: MoiTestsConfig) -> Self {
        Self { pedigree, config }
    }
}

impl InheritanceTest for XDominant {
    fn name(&self) -> &'static str {
        "XDominant"
    }

    fn run(
        &self,
        principal: &Arc<VariantRecord>,
        _comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant> {
        warn_if_not_on_x(principal);

        if !passes_dominant_frequency(principal, &self.config)
            || !passes_hom_count(principal, self.config.gnomad_max_homs_dominant)
        {
            return Vec::new();
        }

        let males = males(&self.pedigree, principal)
            .into_iter()
            .map(|person| (person, REASON_X_DOMINANT_MALE));
        let het_females = females(&self.pedigree, &principal.het_samples, principal)
            .into_iter()
            .map(|person| (person, REASON_X_DOMINANT_FEMALE));

        males
            .chain(het_females)
            .map(|(person, reason)| {
                ReportedVariant::unsupported(&person.sample_id, gene_id, principal, reason)
            })
            .collect()
    }
}

/// Het. females with compound-het partner, males with any call, and hom. females.
#[derive(Debug)]
pub struct XRecessive {
    pedigree: Arc<Pedigree>,
    config: MoiTestsConfig,
}

impl XRecessive {
    pub fn new(pedigree: Arc<Pedigree>, config: MoiTestsConfig) -> Self {
        Self { pedigree, config }
    }
}

impl InheritanceTest for XRecessive {
    fn name(&self) -> &'static str {
        "XRecessive"
    }

    fn run(
        &self,
        principal: &Arc<VariantRecord>,
        comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant> {
        warn_if_not_on_x(principal);

        if !passes_hom_count(principal, self.config.gnomad_max_homs_dominant) {
            return Vec::new();
        }

        let mut result = Vec::new();
        for person in females(&self.pedigree, &principal.het_samples, principal) {
            for partner in comp_het.partners(&person.sample_id, principal, gene_id) {
                result.push(ReportedVariant::supported(
                    &person.sample_id,
                    gene_id,
                    principal,
                    REASON_X_RECESSIVE_COMP_HET,
                    partner,
                ));
            }
        }

        // Only compound-het support is reported beyond the recessive hom. gate.
        if !passes_hom_count(principal, self.config.gnomad_max_homs_recessive) {
            return result;
        }

        let males = males(&self.pedigree, principal)
            .into_iter()
            .map(|person| (person, REASON_X_RECESSIVE_MALE));
        let hom_females = females(&self.pedigree, &principal.hom_samples, principal)
            .into_iter()
            .map(|person| (person, REASON_X_RECESSIVE_FEMALE));
        result.extend(males.chain(hom_females).map(|(person, reason)| {
            ReportedVariant::unsupported(&person.sample_id, gene_id, principal, reason)
        }));

        result
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{XDominant, XRecessive};
    use crate::{
        comphet::CompoundHetIndex,
        moi::{
            test::{config, pedigree, record, CLASS_4},
            InheritanceTest,
        },
        results::ReportedVariant,
    };

    fn condense(findings: &[ReportedVariant]) -> Vec<(String, String, bool)> {
        findings
            .iter()
            .map(|f| {
                (
                    f.sample.clone(),
                    f.reasons.iter().cloned().collect::<Vec<_>>().join(","),
                    f.supported,
                )
            })
            .collect()
    }

    #[test]
    fn x_dominant() {
        let principal = Arc::new(record(
            "chrX",
            100,
            &["female_aff", "male_unaff"],
            &["male_aff", "female_unaff"],
        ));
        let test = XDominant::new(pedigree(), config());

        let findings = test.run(&principal, &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(
            condense(&findings),
            vec![
                ("male_aff".into(), "X_Dominant Male".into(), false),
                ("male_unaff".into(), "X_Dominant Male".into(), false),
                ("female_aff".into(), "X_Dominant Female".into(), false),
            ]
        );
    }

    #[test]
    fn x_dominant_hom_female_not_reported() {
        let principal = Arc::new(record("chrX", 100, &[], &["female_aff"]));
        let test = XDominant::new(pedigree(), config());

        let findings = test.run(&principal, &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(findings.len(), 0);
    }

    #[rstest::rstest]
    #[case("gnomad_af", serde_json::json!(0.5))]
    #[case("gnomad_ac", serde_json::json!(20))]
    #[case("gnomad_hom", serde_json::json!(1))]
    fn x_dominant_frequency_gate(#[case] key: &str, #[case] value: serde_json::Value) {
        let mut principal = record("chrX", 100, &["female_aff"], &["male_aff"]);
        principal.annotations.insert(key, value);
        let test = XDominant::new(pedigree(), config());

        let findings = test.run(&Arc::new(principal), &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(findings.len(), 0);
    }

    #[test]
    fn x_recessive() {
        let principal = Arc::new(record(
            "chrX",
            100,
            &["female_aff", "male_aff"],
            &["female_unaff"],
        ));
        let test = XRecessive::new(pedigree(), config());

        let findings = test.run(&principal, &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(
            condense(&findings),
            vec![
                ("male_aff".into(), "X_Recessive Male".into(), false),
                ("female_unaff".into(), "X_Recessive Female".into(), false),
            ]
        );
    }

    #[test]
    fn unaffected_carriers_are_reported() {
        let principal = Arc::new(record("chrX", 100, &["female_unaff"], &["male_unaff"]));
        let dominant = XDominant::new(pedigree(), config());
        let recessive = XRecessive::new(pedigree(), config());

        let dominant_findings = dominant.run(&principal, &CompoundHetIndex::default(), "ENSG1");
        let recessive_findings = recessive.run(&principal, &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(
            condense(&dominant_findings),
            vec![
                ("male_unaff".into(), "X_Dominant Male".into(), false),
                ("female_unaff".into(), "X_Dominant Female".into(), false),
            ]
        );
        assert_eq!(
            condense(&recessive_findings),
            vec![("male_unaff".into(), "X_Recessive Male".into(), false)]
        );
    }

    #[test]
    fn x_recessive_compound_het_unaffected_female() {
        let v1 = Arc::new(record("chrX", 100, &["female_unaff"], &[]));
        let v2 = Arc::new(record("chrX", 200, &["female_unaff"], &[]));
        let index = CompoundHetIndex::build(&[v1.clone(), v2.clone()]);
        let test = XRecessive::new(pedigree(), config());

        let findings = test.run(&v1, &index, "ENSG1");

        assert_eq!(
            condense(&findings),
            vec![(
                "female_unaff".into(),
                "X_Recessive Compound-Het Female".into(),
                true
            )]
        );
    }

    #[test]
    fn x_recessive_hom_female() {
        let principal = Arc::new(record("X", 100, &[], &["female_aff"]));
        let test = XRecessive::new(pedigree(), config());

        let findings = test.run(&principal, &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(
            condense(&findings),
            vec![("female_aff".into(), "X_Recessive Female".into(), false)]
        );
    }

    #[test]
    fn x_recessive_compound_het_female() {
        let v1 = Arc::new(record("chrX", 100, &["female_aff"], &[]));
        let mut v2 = record("chrX", 200, &["female_aff"], &[]);
        v2.classes = CLASS_4;
        let v2 = Arc::new(v2);
        let index = CompoundHetIndex::build(&[v1.clone(), v2.clone()]);
        let test = XRecessive::new(pedigree(), config());

        let findings = test.run(&v1, &index, "ENSG1");

        assert_eq!(
            condense(&findings),
            vec![(
                "female_aff".into(),
                "X_Recessive Compound-Het Female".into(),
                true
            )]
        );
        assert_eq!(
            findings[0].support_variant.as_ref().map(|v| v.string()),
            Some("X-200-A-C".into())
        );
    }

    #[test]
    fn x_recessive_dominant_hom_gate() {
        let mut principal = record("chrX", 100, &[], &["male_aff"]);
        principal.annotations.insert("gnomad_ex_hom", 1);
        let test = XRecessive::new(pedigree(), config());

        let findings = test.run(&Arc::new(principal), &CompoundHetIndex::default(), "ENSG1");

        assert_eq!(findings.len(), 0);
    }
}

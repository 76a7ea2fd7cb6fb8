//! Mode of inheritance tests and their per-MOI runners.
//!
//! Each simplified MOI label selects a fixed list of tests.  Runners are set up once per
//! label observed on the panel and then shared read-only between worker threads.

pub mod autosomal;
pub mod xlinked;
pub mod ylinked;

use std::sync::Arc;

use enum_map::EnumMap;

use crate::{
    comphet::CompoundHetIndex,
    conf::MoiTestsConfig,
    err::{ConfigError, DataError},
    panel::{PanelRegistry, SimplifiedMoi},
    ped::{PedPerson, Pedigree},
    results::ReportedVariant,
    variant::VariantRecord,
};

/// Population homozygote count annotations, all of them are checked.
pub const HOM_KEYS: &[&str] = &["gnomad_hom", "gnomad_ex_hom", "exac_ac_hom"];

/// One inheritance pattern, evaluated on a principal variant.
pub trait InheritanceTest: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Return the findings of this pattern for `principal` in `gene_id`.
    fn run(
        &self,
        principal: &Arc<VariantRecord>,
        comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant>;
}

/// Largest homozygote count over all population annotations.
pub fn max_hom_count(record: &VariantRecord) -> i64 {
    HOM_KEYS
        .iter()
        .map(|key| record.annotations.int(key))
        .max()
        .unwrap_or(0)
}

/// Frequency gate of the dominant models; `true` if the variant is rare enough.
pub fn passes_dominant_frequency(record: &VariantRecord, config: &MoiTestsConfig) -> bool {
    let af = record.annotations.float("gnomad_af");
    let ac = record.annotations.int("gnomad_ac");
    if af > config.gnomad_dominant || ac > config.gnomad_max_ac_dominant {
        tracing::trace!(
            "{} too common for dominant model (AF={}, AC={})",
            record.string(),
            af,
            ac
        );
        false
    } else {
        true
    }
}

/// Homozygote count gate with the given maximal count.
pub fn passes_hom_count(record: &VariantRecord, max_homs: i64) -> bool {
    max_hom_count(record) <= max_homs
}

/// Look up `sample` in the pedigree, logging samples that are unknown.
fn lookup_sample<'a>(
    pedigree: &'a Pedigree,
    sample: &str,
    record: &VariantRecord,
) -> Option<&'a PedPerson> {
    let person = pedigree.get(sample);
    if person.is_none() {
        tracing::error!(
            "{}",
            DataError::UnknownSample {
                sample: sample.to_string(),
                variant: record.string(),
            }
        );
    }
    person
}

/// Individuals among `samples` that are in the pedigree, in the given order.
pub fn known_among<'a, 'b>(
    pedigree: &'a Pedigree,
    samples: impl IntoIterator<Item = &'b String>,
    record: &VariantRecord,
) -> Vec<&'a PedPerson> {
    samples
        .into_iter()
        .filter_map(|sample| lookup_sample(pedigree, sample, record))
        .collect()
}

/// Affected individuals among `samples`, in the given order.
pub fn affected_among<'a, 'b>(
    pedigree: &'a Pedigree,
    samples: impl IntoIterator<Item = &'b String>,
    record: &VariantRecord,
) -> Vec<&'a PedPerson> {
    known_among(pedigree, samples, record)
        .into_iter()
        .filter(|person| person.affected)
        .collect()
}

/// Applies the inheritance tests of one simplified MOI.
#[derive(Debug)]
pub struct MoiRunner {
    moi: SimplifiedMoi,
    tests: Vec<Box<dyn InheritanceTest>>,
}

impl MoiRunner {
    /// Select the tests for `moi`.
    pub fn new(moi: SimplifiedMoi, pedigree: &Arc<Pedigree>, config: &MoiTestsConfig) -> Self {
        use autosomal::{DominantAutosomal, RecessiveAutosomal};
        use xlinked::{XDominant, XRecessive};
        use ylinked::YHemi;

        let dominant = || -> Box<dyn InheritanceTest> {
            Box::new(DominantAutosomal::new(pedigree.clone(), config.clone()))
        };
        let recessive = || -> Box<dyn InheritanceTest> {
            Box::new(RecessiveAutosomal::new(pedigree.clone(), config.clone()))
        };
        let x_dominant = || -> Box<dyn InheritanceTest> {
            Box::new(XDominant::new(pedigree.clone(), config.clone()))
        };
        let x_recessive = || -> Box<dyn InheritanceTest> {
            Box::new(XRecessive::new(pedigree.clone(), config.clone()))
        };
        let y_hemi = || -> Box<dyn InheritanceTest> {
            Box::new(YHemi::new(pedigree.clone(), config.clone()))
        };

        let tests = match moi {
            SimplifiedMoi::Monoallelic => vec![dominant()],
            SimplifiedMoi::Biallelic => vec![recessive()],
            SimplifiedMoi::MonoAndBiallelic | SimplifiedMoi::Unknown => {
                vec![dominant(), recessive()]
            }
            SimplifiedMoi::HemiMonoInFemale => vec![x_recessive(), x_dominant()],
            SimplifiedMoi::HemiBiInFemale => vec![x_recessive()],
            SimplifiedMoi::YChromVariant => vec![y_hemi()],
        };

        Self { moi, tests }
    }

    pub fn moi(&self) -> SimplifiedMoi {
        self.moi
    }

    /// Names of the selected tests, in order of application.
    pub fn test_names(&self) -> Vec<&'static str> {
        self.tests.iter().map(|test| test.name()).collect()
    }

    /// Run all tests for the MOI and concatenate their findings.
    pub fn run(
        &self,
        principal: &Arc<VariantRecord>,
        comp_het: &CompoundHetIndex,
        gene_id: &str,
    ) -> Vec<ReportedVariant> {
        self.tests
            .iter()
            .flat_map(|test| test.run(principal, comp_het, gene_id))
            .collect()
    }
}

/// Runners for all MOIs used on the panel, set up once.
#[derive(Debug, Default)]
pub struct MoiRegistry {
    runners: EnumMap<SimplifiedMoi, Option<MoiRunner>>,
}

impl MoiRegistry {
    /// Set up one runner for each current and previous MOI of the panel.
    pub fn new(panel: &PanelRegistry, pedigree: &Arc<Pedigree>, config: &MoiTestsConfig) -> Self {
        let mut runners: EnumMap<SimplifiedMoi, Option<MoiRunner>> = EnumMap::default();
        for moi in panel.moi_labels() {
            let runner = MoiRunner::new(moi, pedigree, config);
            tracing::debug!("MOI {} uses tests {:?}", moi, runner.test_names());
            runners[moi] = Some(runner);
        }
        Self { runners }
    }

    /// Runner for `moi`; a missing runner is a configuration error.
    pub fn get(&self, moi: SimplifiedMoi) -> Result<&MoiRunner, ConfigError> {
        self.runners[moi]
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRunner(moi.to_string()))
    }

    /// Number of runners set up.
    pub fn len(&self) -> usize {
        self.runners.values().filter(|runner| runner.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

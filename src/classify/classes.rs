//! Evaluation of the Class1 to Class4 rules on a single record.
//!
//! All functions are pure, missing annotations evaluate to their placeholders.

use crate::{
    conf::ClassificationConfig,
    variant::{Classes, VariantRecord},
};

/// Lower-cased ClinVar significance.
fn clinvar_sig(record: &VariantRecord) -> String {
    record.annotations.string("clinvar_sig").to_lowercase()
}

/// ClinVar significance mentions "pathogenic", regardless of review status.
fn clinvar_pathogenic(record: &VariantRecord) -> bool {
    clinvar_sig(record).contains("pathogenic")
}

/// Any transcript consequence carries a critical term.
fn has_critical_csq(record: &VariantRecord, config: &ClassificationConfig) -> bool {
    record.transcript_consequences.iter().any(|tx| {
        tx.consequence_terms
            .iter()
            .any(|term| config.critical_csq.contains(term))
    })
}

/// Class 1: confident pathogenic in ClinVar.
pub fn class_1(record: &VariantRecord) -> bool {
    let sig = clinvar_sig(record);
    record.annotations.int("clinvar_stars") > 0
        && sig.contains("pathogenic")
        && !sig.contains("conflicting")
}

/// Class 2: new gene on panel with some indication of damage.
pub fn class_2(record: &VariantRecord, config: &ClassificationConfig, gene_is_new: bool) -> bool {
    gene_is_new
        && (has_critical_csq(record, config)
            || clinvar_pathogenic(record)
            || record.annotations.float("cadd") > config.in_silico.cadd
            || record.annotations.float("revel") > config.in_silico.revel)
}

/// Class 3: critical consequence backed by LOFTEE or ClinVar.
pub fn class_3(record: &VariantRecord, config: &ClassificationConfig) -> bool {
    has_critical_csq(record, config)
        && (record
            .transcript_consequences
            .iter()
            .any(|tx| matches!(tx.lof.as_deref(), None | Some("HC")))
            || clinvar_pathogenic(record))
}

/// Class 4: in-silico consensus.
pub fn class_4(record: &VariantRecord, config: &ClassificationConfig) -> bool {
    let in_silico = &config.in_silico;
    let annos = &record.annotations;

    let cadd_revel =
        annos.float("cadd") > in_silico.cadd && annos.float("revel") > in_silico.revel;
    if cadd_revel {
        return true;
    }

    let mutationtaster = annos.string("mutationtaster");
    record
        .transcript_consequences
        .iter()
        .any(|tx| tx.sift() < in_silico.sift)
        && record
            .transcript_consequences
            .iter()
            .any(|tx| tx.polyphen() > in_silico.polyphen)
        && (mutationtaster.contains('D') || mutationtaster == crate::variant::MISSING_STRING)
        && annos.float("gerp_rs") >= in_silico.gerp
        && annos.float("eigen_phred") > in_silico.eigen
}

/// Compute all class flags of `record`.
pub fn classify(record: &VariantRecord, config: &ClassificationConfig, gene_is_new: bool) -> Classes {
    Classes {
        class_1: class_1(record),
        class_2: class_2(record, config, gene_is_new),
        class_3: class_3(record, config),
        class_4: class_4(record, config),
    }
}

//! Annotated variant records as consumed by classification and inheritance testing.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    common::{canonicalize, Chrom},
    err::DataError,
};

/// Placeholder for missing string annotations.
pub const MISSING_STRING: &str = "missing";
/// Placeholder for missing SIFT scores, i.e., "tolerated".
pub const MISSING_SIFT: f64 = 1.0;
/// Placeholder for missing PolyPhen scores, i.e., "benign".
pub const MISSING_POLYPHEN: f64 = 0.0;

/// Identity of a variant: chromosome (without `chr` prefix), position, and alleles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantKey {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}

/// Free-form annotation map of a variant.
///
/// Accessors substitute the least consequential placeholder for absent or null
/// values so that rule evaluation never fails on missing fields.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Annotations(pub IndexMap<String, serde_json::Value>);

impl Annotations {
    /// Set `key` to `value`, mostly useful in tests.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.0.insert(key.into(), value.into());
    }

    /// Floating point value, if present, numeric, and finite.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        value.filter(|v: &f64| v.is_finite())
    }

    /// Integer value, if present and numeric.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating point value with `0.0` for missing values.
    pub fn float(&self, key: &str) -> f64 {
        self.get_f64(key).unwrap_or(0.0)
    }

    /// Integer value with `0` for missing values.
    pub fn int(&self, key: &str) -> i64 {
        self.get_i64(key).unwrap_or(0)
    }

    /// String value with `"missing"` for missing values.
    pub fn string(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => MISSING_STRING.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Consequence of the variant on one transcript.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptConsequence {
    /// Gene of the transcript.
    pub gene_id: String,
    /// Sequence ontology terms.
    #[serde(default)]
    pub consequence_terms: Vec<String>,
    /// LOFTEE confidence, e.g., `HC`.
    #[serde(default)]
    pub lof: Option<String>,
    #[serde(default)]
    pub sift_score: Option<f64>,
    #[serde(default)]
    pub polyphen_score: Option<f64>,
}

impl TranscriptConsequence {
    /// SIFT score with the "tolerated" placeholder.
    pub fn sift(&self) -> f64 {
        self.sift_score.unwrap_or(MISSING_SIFT)
    }

    /// PolyPhen score with the "benign" placeholder.
    pub fn polyphen(&self) -> f64 {
        self.polyphen_score.unwrap_or(MISSING_POLYPHEN)
    }
}

/// Class flags of a variant, not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Classes {
    #[serde(default)]
    pub class_1: bool,
    #[serde(default)]
    pub class_2: bool,
    #[serde(default)]
    pub class_3: bool,
    #[serde(default)]
    pub class_4: bool,
}

impl Classes {
    /// Class 4 is the only class assigned.
    pub fn class_4_only(&self) -> bool {
        self.class_4 && !(self.class_1 || self.class_2 || self.class_3)
    }

    /// Any class is assigned.
    pub fn is_classified(&self) -> bool {
        self.class_1 || self.class_2 || self.class_3 || self.class_4
    }

    /// Assigned classes as integers, ascending.
    pub fn as_ints(&self) -> Vec<u8> {
        [self.class_1, self.class_2, self.class_3, self.class_4]
            .into_iter()
            .zip(1u8..)
            .filter_map(|(flag, no)| flag.then_some(no))
            .collect()
    }
}

/// One annotated variant in one gene together with the carrying samples.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct VariantRecord {
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
    /// The single gene that this record was split out for.
    pub gene_id: String,
    #[serde(default)]
    #[builder(default)]
    pub annotations: Annotations,
    #[serde(default)]
    #[builder(default)]
    pub transcript_consequences: Vec<TranscriptConsequence>,
    /// Samples with heterozygous call.
    #[serde(default)]
    #[builder(default)]
    pub het_samples: BTreeSet<String>,
    /// Samples with homozygous alternative call.
    #[serde(default)]
    #[builder(default)]
    pub hom_samples: BTreeSet<String>,
    #[serde(default)]
    #[builder(default)]
    pub classes: Classes,
}

impl VariantRecord {
    pub fn key(&self) -> VariantKey {
        VariantKey {
            chrom: canonicalize(&self.chrom),
            pos: self.pos,
            ref_allele: self.ref_allele.clone(),
            alt_allele: self.alt_allele.clone(),
        }
    }

    /// The `chrom-pos-ref-alt` representation.
    pub fn string(&self) -> String {
        self.key().to_string()
    }

    pub fn chrom_kind(&self) -> Chrom {
        Chrom::from_name(&self.chrom)
    }

    /// Samples with any alternative call, in sorted order.
    pub fn called_samples(&self) -> impl Iterator<Item = &String> {
        self.het_samples.union(&self.hom_samples)
    }

    /// Ensure that no sample is listed as both het. and hom.
    pub fn validate(&self) -> Result<(), DataError> {
        match self.het_samples.intersection(&self.hom_samples).next() {
            Some(sample) => Err(DataError::ConflictingZygosity {
                sample: sample.clone(),
                variant: self.string(),
            }),
            None => Ok(()),
        }
    }
}

/// Read records from JSONL file, dropping those with conflicting zygosity.
pub fn read_records<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<VariantRecord>, anyhow::Error> {
    let records: Vec<VariantRecord> = crate::common::io::read_jsonl(path)?;
    Ok(records
        .into_iter()
        .filter(|record| match record.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("skipping record: {}", e);
                false
            }
        })
        .collect())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Annotations, Classes, TranscriptConsequence, VariantRecord, VariantRecordBuilder};

    fn record(chrom: &str) -> VariantRecord {
        VariantRecordBuilder::default()
            .chrom(chrom)
            .pos(12345u64)
            .ref_allele("A")
            .alt_allele("G")
            .gene_id("ENSG00000000001")
            .build()
            .unwrap()
    }

    #[rstest::rstest]
    #[case("chr1", "1-12345-A-G")]
    #[case("1", "1-12345-A-G")]
    #[case("chrX", "X-12345-A-G")]
    fn string_strips_chr(#[case] chrom: &str, #[case] expected: &str) {
        assert_eq!(record(chrom).string(), expected);
    }

    #[test]
    fn key_identity_ignores_chr_prefix() {
        assert_eq!(record("chr1").key(), record("1").key());
    }

    #[test]
    fn annotation_placeholders() {
        let mut annos = Annotations::default();
        annos.insert("cadd", 31.5);
        annos.insert("gnomad_hom", 3);
        annos.insert("revel", serde_json::Value::Null);
        annos.insert("gerp_rs", "2.5");
        annos.insert("clinvar_sig", "Pathogenic");

        assert_eq!(annos.float("cadd"), 31.5);
        assert_eq!(annos.float("revel"), 0.0);
        assert_eq!(annos.float("eigen_phred"), 0.0);
        assert_eq!(annos.float("gerp_rs"), 2.5);
        assert_eq!(annos.int("gnomad_hom"), 3);
        assert_eq!(annos.int("exac_ac_hom"), 0);
        assert_eq!(annos.string("clinvar_sig"), "Pathogenic");
        assert_eq!(annos.string("mutationtaster"), "missing");
    }

    #[rstest::rstest]
    #[case(serde_json::json!("NaN"), None)]
    #[case(serde_json::json!("nan"), None)]
    #[case(serde_json::json!("inf"), None)]
    #[case(serde_json::json!("-infinity"), None)]
    #[case(serde_json::json!("0.25"), Some(0.25))]
    #[case(serde_json::json!(0.5), Some(0.5))]
    fn non_finite_floats_are_missing(
        #[case] value: serde_json::Value,
        #[case] expected: Option<f64>,
    ) {
        let mut record = record("1");
        record.annotations.insert("gnomad_af", value);

        assert_eq!(record.annotations.get_f64("gnomad_af"), expected);
        assert_eq!(
            record.annotations.float("gnomad_af"),
            expected.unwrap_or(0.0)
        );
    }

    #[test]
    fn transcript_placeholders() {
        let tx = TranscriptConsequence::default();
        assert_eq!(tx.sift(), 1.0);
        assert_eq!(tx.polyphen(), 0.0);
    }

    #[rstest::rstest]
    #[case(false, false, false, false, false, false, vec![])]
    #[case(false, false, false, true, true, true, vec![4])]
    #[case(true, false, false, true, false, true, vec![1, 4])]
    #[case(false, true, true, false, false, true, vec![2, 3])]
    fn classes(
        #[case] class_1: bool,
        #[case] class_2: bool,
        #[case] class_3: bool,
        #[case] class_4: bool,
        #[case] expected_4_only: bool,
        #[case] expected_classified: bool,
        #[case] expected_ints: Vec<u8>,
    ) {
        let classes = Classes {
            class_1,
            class_2,
            class_3,
            class_4,
        };
        assert_eq!(classes.class_4_only(), expected_4_only);
        assert_eq!(classes.is_classified(), expected_classified);
        assert_eq!(classes.as_ints(), expected_ints);
    }

    #[test]
    fn conflicting_zygosity() {
        let mut record = record("1");
        record.het_samples.insert("S1".into());
        record.hom_samples.insert("S2".into());
        assert!(record.validate().is_ok());

        record.hom_samples.insert("S1".into());
        assert_eq!(
            record.validate(),
            Err(crate::err::DataError::ConflictingZygosity {
                sample: "S1".into(),
                variant: "1-12345-A-G".into(),
            })
        );
    }

    #[test]
    fn read_records_drops_conflicting() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("records.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"chrom": "1", "pos": 1, "ref": "A", "alt": "G", "gene_id": "G", "het_samples": ["S1"]}"#,
                "\n",
                r#"{"chrom": "1", "pos": 2, "ref": "A", "alt": "G", "gene_id": "G", "het_samples": ["S1"], "hom_samples": ["S1"]}"#,
                "\n",
            ),
        )?;

        let records = super::read_records(&path)?;

        assert_eq!(records.iter().map(|r| r.pos).collect::<Vec<_>>(), vec![1]);

        Ok(())
    }

    #[test]
    fn deserialize_jsonl_line() -> Result<(), anyhow::Error> {
        let line = r#"{"chrom": "chr2", "pos": 100, "ref": "C", "alt": "T",
            "gene_id": "ENSG2", "het_samples": ["S1"], "annotations": {"cadd": 12.0},
            "transcript_consequences": [{"gene_id": "ENSG2", "consequence_terms": ["stop_gained"], "lof": "HC"}]}"#;
        let record: VariantRecord = serde_json::from_str(line)?;

        assert_eq!(record.string(), "2-100-C-T");
        assert_eq!(record.classes, Classes::default());
        assert_eq!(record.hom_samples.len(), 0);
        assert_eq!(record.transcript_consequences[0].lof.as_deref(), Some("HC"));
        assert_eq!(record.annotations.float("cadd"), 12.0);

        Ok(())
    }
}

//! Output records, one per de-duplicated finding.

use crate::{panel::PanelRegistry, results::ReportedVariant};

/// One reportable finding as written to the result JSONL file.
#[derive(
    Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ResultRecord {
    /// Sample identifier.
    pub sample: String,
    /// Gene identifier.
    pub gene: String,
    /// Gene symbol from the panel.
    pub symbol: String,
    /// The `chrom-pos-ref-alt` representation.
    pub variant: String,
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
    /// Effective classes, ascending.
    pub classes: Vec<u8>,
    /// Matched inheritance patterns, sorted.
    pub reasons: Vec<String>,
    /// Whether a compound-het partner supports the finding.
    pub supported: bool,
    /// Partner variant, if supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub support_variant: Option<String>,
}

impl ResultRecord {
    /// Construct from `finding`, looking up the gene symbol in `panel`.
    pub fn with_finding(
        finding: &ReportedVariant,
        panel: &PanelRegistry,
    ) -> Result<Self, anyhow::Error> {
        let key = finding.variant.key();
        let symbol = panel
            .get(&finding.gene_id)
            .map(|entry| entry.symbol.clone())
            .unwrap_or_default();
        ResultRecordBuilder::default()
            .sample(finding.sample.clone())
            .gene(finding.gene_id.clone())
            .symbol(symbol)
            .variant(key.to_string())
            .chrom(key.chrom)
            .pos(key.pos)
            .ref_allele(key.ref_allele)
            .alt_allele(key.alt_allele)
            .classes(finding.classes.as_ints())
            .reasons(finding.reasons.iter().cloned().collect::<Vec<_>>())
            .supported(finding.supported)
            .support_variant(
                finding
                    .support_variant
                    .as_ref()
                    .filter(|_| finding.supported)
                    .map(|partner| partner.string()),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("could not build result record: {}", e))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::ResultRecord;
    use crate::{
        panel::PanelRegistry,
        results::ReportedVariant,
        variant::{Classes, VariantRecordBuilder},
    };

    #[test]
    fn with_finding() -> Result<(), anyhow::Error> {
        let panel = PanelRegistry::from_path("tests/data/panel/panel.json")?;
        let variant = |pos: u64| {
            Arc::new(
                VariantRecordBuilder::default()
                    .chrom("chr1")
                    .pos(pos)
                    .ref_allele("C")
                    .alt_allele("T")
                    .gene_id("ENSG00000000001")
                    .classes(Classes {
                        class_3: true,
                        ..Default::default()
                    })
                    .build()
                    .unwrap(),
            )
        };
        let finding = ReportedVariant::supported(
            "index",
            "ENSG00000000001",
            &variant(1000),
            "Autosomal Recessive Compound-Het",
            &variant(2000),
        );

        let record = ResultRecord::with_finding(&finding, &panel)?;

        assert_eq!(
            record,
            ResultRecord {
                sample: "index".into(),
                gene: "ENSG00000000001".into(),
                symbol: "GENE1".into(),
                variant: "1-1000-C-T".into(),
                chrom: "1".into(),
                pos: 1000,
                ref_allele: "C".into(),
                alt_allele: "T".into(),
                classes: vec![3],
                reasons: vec!["Autosomal Recessive Compound-Het".into()],
                supported: true,
                support_variant: Some("1-2000-C-T".into()),
            }
        );

        let json = serde_json::to_value(&record)?;
        assert_eq!(json["ref"], "C");
        assert_eq!(json["support_variant"], "1-2000-C-T");

        Ok(())
    }

    #[test]
    fn unsupported_omits_support_variant() -> Result<(), anyhow::Error> {
        let panel = PanelRegistry::default();
        let variant = Arc::new(
            VariantRecordBuilder::default()
                .chrom("2")
                .pos(5u64)
                .ref_allele("A")
                .alt_allele("G")
                .gene_id("ENSG_X")
                .build()
                .unwrap(),
        );
        let finding = ReportedVariant::unsupported("S1", "ENSG_X", &variant, "Autosomal Dominant");

        let record = ResultRecord::with_finding(&finding, &panel)?;
        let json = serde_json::to_string(&record)?;

        assert_eq!(record.symbol, "");
        assert!(!json.contains("support_variant"), "{}", json);

        Ok(())
    }
}

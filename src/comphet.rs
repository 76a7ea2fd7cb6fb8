//! Index of compound-heterozygous partner variants per sample.

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use itertools::Itertools;

use crate::variant::{VariantKey, VariantRecord};

/// Partners of one variant in one sample.
type Partners = Vec<Arc<VariantRecord>>;

/// Mapping `sample -> variant key -> partner variants`, write-once then read-only.
///
/// Partners always share the gene with the variant, both carry a het. call in the
/// sample, they differ in their key, and they are never both Class 4 only.
#[derive(Debug, Default, Clone)]
pub struct CompoundHetIndex {
    samples: HashMap<String, HashMap<VariantKey, Partners>>,
}

impl CompoundHetIndex {
    /// Build the index in one pass over classified, frozen records.
    pub fn build(records: &[Arc<VariantRecord>]) -> Self {
        // Group by (sample, gene) keeping the input order for deterministic partners.
        let mut groups: IndexMap<(&str, &str), Vec<&Arc<VariantRecord>>> = IndexMap::new();
        for record in records {
            for sample in &record.het_samples {
                groups
                    .entry((sample.as_str(), record.gene_id.as_str()))
                    .or_default()
                    .push(record);
            }
        }

        let mut samples: HashMap<String, HashMap<VariantKey, Partners>> = HashMap::new();
        for ((sample, _gene_id), group) in groups {
            for (lhs, rhs) in group.into_iter().tuple_combinations() {
                let (lhs_key, rhs_key) = (lhs.key(), rhs.key());
                if lhs_key == rhs_key {
                    continue;
                }
                if lhs.classes.class_4_only() && rhs.classes.class_4_only() {
                    tracing::debug!(
                        "discarding pairing {} / {} in {} as both are Class 4 only",
                        &lhs_key,
                        &rhs_key,
                        sample
                    );
                    continue;
                }
                let per_sample = samples.entry(sample.to_string()).or_default();
                per_sample.entry(lhs_key).or_default().push(rhs.clone());
                per_sample.entry(rhs_key).or_default().push(lhs.clone());
            }
        }

        Self { samples }
    }

    /// Partners of `record` in `sample` that lie in `gene_id`.
    pub fn partners<'a>(
        &'a self,
        sample: &str,
        record: &VariantRecord,
        gene_id: &'a str,
    ) -> impl Iterator<Item = &'a Arc<VariantRecord>> + 'a {
        self.samples
            .get(sample)
            .and_then(|per_sample| per_sample.get(&record.key()))
            .into_iter()
            .flatten()
            .filter(move |partner| partner.gene_id == gene_id)
    }

    /// Number of samples with at least one pair.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Number of unordered pairs over all samples.
    pub fn pair_count(&self) -> usize {
        self.samples
            .values()
            .flat_map(|per_sample| per_sample.values())
            .map(|partners| partners.len())
            .sum::<usize>()
            / 2
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::CompoundHetIndex;
    use crate::variant::{Classes, VariantRecord, VariantRecordBuilder};

    fn record(pos: u64, gene_id: &str, het: &[&str], classes: Classes) -> Arc<VariantRecord> {
        Arc::new(
            VariantRecordBuilder::default()
                .chrom("chr1")
                .pos(pos)
                .ref_allele("A")
                .alt_allele("G")
                .gene_id(gene_id)
                .het_samples(het.iter().map(|s| s.to_string()).collect::<std::collections::BTreeSet<_>>())
                .classes(classes)
                .build()
                .unwrap(),
        )
    }

    const CLASS_3: Classes = Classes {
        class_1: false,
        class_2: false,
        class_3: true,
        class_4: false,
    };
    const CLASS_4: Classes = Classes {
        class_1: false,
        class_2: false,
        class_3: false,
        class_4: true,
    };

    fn partner_positions(index: &CompoundHetIndex, sample: &str, record: &VariantRecord) -> Vec<u64> {
        index
            .partners(sample, record, &record.gene_id)
            .map(|p| p.pos)
            .collect()
    }

    #[test]
    fn class_3_with_class_4_only_pairs() {
        let v1 = record(100, "G", &["S1"], CLASS_3);
        let v2 = record(200, "G", &["S1"], CLASS_4);
        let index = CompoundHetIndex::build(&[v1.clone(), v2.clone()]);

        assert_eq!(partner_positions(&index, "S1", &v1), vec![200]);
        assert_eq!(partner_positions(&index, "S1", &v2), vec![100]);
        assert_eq!(index.pair_count(), 1);
    }

    #[test]
    fn both_class_4_only_is_excluded() {
        let v1 = record(100, "G", &["S1"], CLASS_4);
        let v2 = record(200, "G", &["S1"], CLASS_4);
        let index = CompoundHetIndex::build(&[v1.clone(), v2.clone()]);

        assert_eq!(partner_positions(&index, "S1", &v1), Vec::<u64>::new());
        assert_eq!(index.sample_count(), 0);
    }

    #[test]
    fn pairs_need_same_gene_and_sample() {
        let v1 = record(100, "G", &["S1", "S2"], CLASS_3);
        let v2 = record(200, "H", &["S1"], CLASS_3);
        let v3 = record(300, "G", &["S2"], CLASS_3);
        let index = CompoundHetIndex::build(&[v1.clone(), v2.clone(), v3.clone()]);

        assert_eq!(partner_positions(&index, "S1", &v1), Vec::<u64>::new());
        assert_eq!(partner_positions(&index, "S2", &v1), vec![300]);
        assert_eq!(partner_positions(&index, "S1", &v3), Vec::<u64>::new());
    }

    #[test]
    fn no_self_pairing() {
        let v1 = record(100, "G", &["S1"], CLASS_3);
        let v1_again = record(100, "G", &["S1"], CLASS_3);
        let index = CompoundHetIndex::build(&[v1.clone(), v1_again]);

        assert_eq!(partner_positions(&index, "S1", &v1), Vec::<u64>::new());
    }

    #[test]
    fn multiple_partners() {
        let v1 = record(100, "G", &["S1"], CLASS_3);
        let v2 = record(200, "G", &["S1"], CLASS_4);
        let v3 = record(300, "G", &["S1"], CLASS_4);
        let index = CompoundHetIndex::build(&[v1.clone(), v2.clone(), v3.clone()]);

        assert_eq!(partner_positions(&index, "S1", &v1), vec![200, 300]);
        assert_eq!(partner_positions(&index, "S1", &v2), vec![100]);
        assert_eq!(index.pair_count(), 2);
    }
}

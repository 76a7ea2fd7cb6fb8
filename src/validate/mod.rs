//! Implementation of `validate` subcommand.
//!
//! Builds the compound-het index from classified records, re-validates Class 2 against
//! the panel version delta, runs the inheritance tests and aggregates the findings.

use std::{collections::BTreeSet, io::Write, sync::Arc};

use rayon::prelude::*;
use thousands::Separable;

use crate::{
    common::{self, io::write_jsonl, open_write_maybe_gz},
    comphet::CompoundHetIndex,
    conf::{Config, MoiTestsConfig},
    err::{ConfigError, DataError},
    moi::MoiRegistry,
    panel::{PanelGeneEntry, PanelRegistry, SimplifiedMoi},
    ped::Pedigree,
    results::{output::ResultRecord, summary::Summary, Aggregator, ReportedVariant},
    variant::{read_records, Classes, VariantRecord},
};

/// Command line arguments for `validate` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Run inheritance tests on classified variants", long_about = None)]
pub struct Args {
    /// Path to the configuration JSON file.
    #[arg(long)]
    pub path_config: String,
    /// Path to the panel JSON file.
    #[arg(long)]
    pub path_panel: String,
    /// Path to the pedigree TSV file.
    #[arg(long)]
    pub path_ped: String,
    /// Path to classified variants JSONL file, may be gzip-compressed.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output JSONL file with findings.
    #[arg(long)]
    pub path_output: String,
    /// Optional path to summary JSON file.
    #[arg(long)]
    pub path_summary: Option<String>,
    /// Number of worker threads, defaults to number of cores.
    #[arg(long)]
    pub num_threads: Option<usize>,
}

/// Union of the reasons of `findings`.
fn reasons_of(findings: Vec<ReportedVariant>) -> BTreeSet<String> {
    findings
        .into_iter()
        .flat_map(|finding| finding.reasons)
        .collect()
}

/// Decide whether Class 2 is retained for `variant` in `gene`.
///
/// New genes retain Class 2.  Otherwise, unless only new genes are considered, the gene's
/// MOI must have changed and the new MOI must yield a strict superset of the reasons
/// of the old MOI.  A previous MOI of "Unknown" retains Class 2 without comparison.
pub fn validate_class_2(
    gene: &PanelGeneEntry,
    variant: &Arc<VariantRecord>,
    registry: &MoiRegistry,
    comp_het: &CompoundHetIndex,
    new_only: bool,
) -> Result<bool, ConfigError> {
    if gene.is_new {
        return Ok(true);
    } else if new_only || !gene.changed {
        return Ok(false);
    }

    match gene.old_moi {
        Some(SimplifiedMoi::Unknown) => Ok(true),
        None => {
            tracing::warn!(
                "gene {} is flagged as changed but has no previous MOI",
                &gene.gene_id
            );
            Ok(false)
        }
        Some(old_moi) => {
            let old_reasons =
                reasons_of(registry.get(old_moi)?.run(variant, comp_het, &gene.gene_id));
            let new_reasons =
                reasons_of(registry.get(gene.moi)?.run(variant, comp_het, &gene.gene_id));
            tracing::debug!(
                "{} in {}: {} -> {:?} vs {} -> {:?}",
                variant.string(),
                &gene.gene_id,
                old_moi,
                &old_reasons,
                gene.moi,
                &new_reasons
            );
            Ok(new_reasons.is_superset(&old_reasons) && new_reasons != old_reasons)
        }
    }
}

/// Classes of `variant` after Class 2 re-validation; the record itself is not changed.
pub fn effective_classes(
    gene: &PanelGeneEntry,
    variant: &Arc<VariantRecord>,
    panel: &PanelRegistry,
    registry: &MoiRegistry,
    comp_het: &CompoundHetIndex,
    config: &MoiTestsConfig,
) -> Result<Classes, ConfigError> {
    let mut classes = variant.classes;
    if classes.class_2
        && (!panel.has_previous_version()
            || !validate_class_2(gene, variant, registry, comp_het, config.class_2_new_only)?)
    {
        classes.class_2 = false;
    }
    Ok(classes)
}

/// Run the inheritance tests on all principal variants.
///
/// Records of genes missing from the panel are logged and skipped.  Records that are
/// Class 4 only or unclassified after re-validation are not used as principal.
pub fn apply_moi_to_variants(
    records: &[Arc<VariantRecord>],
    comp_het: &CompoundHetIndex,
    registry: &MoiRegistry,
    panel: &PanelRegistry,
    config: &MoiTestsConfig,
) -> Result<Vec<ReportedVariant>, anyhow::Error> {
    let per_record = records
        .par_iter()
        .map(|record| -> Result<Vec<ReportedVariant>, ConfigError> {
            let Some(gene) = panel.get(&record.gene_id) else {
                tracing::error!(
                    "{}",
                    DataError::GeneNotInPanel {
                        gene: record.gene_id.clone(),
                        variant: record.string(),
                    }
                );
                return Ok(Vec::new());
            };

            let classes = effective_classes(gene, record, panel, registry, comp_het, config)?;
            if classes.class_4_only() || !classes.is_classified() {
                return Ok(Vec::new());
            }

            let mut findings = registry.get(gene.moi)?.run(record, comp_het, &gene.gene_id);
            for finding in findings.iter_mut() {
                finding.classes = classes;
            }
            Ok(findings)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(per_record.into_iter().flatten().collect())
}

/// Run the complete validation on classified `records`.
pub fn validate_records(
    records: Vec<VariantRecord>,
    config: &Config,
    panel: &PanelRegistry,
    pedigree: &Arc<Pedigree>,
) -> Result<Aggregator, anyhow::Error> {
    // Class flags are final from here on.
    let records: Vec<Arc<VariantRecord>> = records.into_iter().map(Arc::new).collect();

    tracing::info!("Building compound-het index...");
    let before_index = std::time::Instant::now();
    let comp_het = CompoundHetIndex::build(&records);
    tracing::info!(
        "... done building index with {} pairs in {} samples in {:?}",
        comp_het.pair_count().separate_with_commas(),
        comp_het.sample_count().separate_with_commas(),
        before_index.elapsed()
    );

    let registry = MoiRegistry::new(panel, pedigree, &config.moi_tests);
    tracing::info!("set up {} MOI runners", registry.len());

    tracing::info!("Running inheritance tests...");
    let before_moi = std::time::Instant::now();
    let findings = apply_moi_to_variants(&records, &comp_het, &registry, panel, &config.moi_tests)?;
    let aggregator: Aggregator = findings.into_iter().collect();
    tracing::info!(
        "... done with {} findings in {:?}",
        aggregator.len().separate_with_commas(),
        before_moi.elapsed()
    );

    Ok(aggregator)
}

/// Write aggregated findings and, optionally, the summary.
pub fn write_results(
    aggregator: &Aggregator,
    panel: &PanelRegistry,
    pedigree: &Pedigree,
    path_output: &str,
    path_summary: Option<&str>,
) -> Result<(), anyhow::Error> {
    let records = aggregator
        .iter()
        .map(|finding| ResultRecord::with_finding(finding, panel))
        .collect::<Result<Vec<_>, _>>()?;
    let count = write_jsonl(path_output, &records)?;
    tracing::info!(
        "wrote {} findings to {}",
        count.separate_with_commas(),
        path_output
    );

    let findings = aggregator.iter().cloned().collect::<Vec<_>>();
    let summary = Summary::new(&findings, pedigree);
    summary.log();
    if let Some(path_summary) = path_summary {
        let mut writer = open_write_maybe_gz(path_summary)?;
        serde_json::to_writer_pretty(&mut writer, &summary)?;
        writer.flush()?;
        tracing::info!("wrote summary to {}", path_summary);
    }

    Ok(())
}

/// Main entry point for `validate` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("building global Rayon thread pool failed: {}", e))?;
    }

    common::trace_rss_now();

    tracing::info!("Loading inputs...");
    let before_loading = std::time::Instant::now();
    let config = Config::from_path(&args.path_config)?;
    let panel = PanelRegistry::from_path(&args.path_panel)?;
    let pedigree = Arc::new(Pedigree::from_path(&args.path_ped)?);
    let records = read_records(&args.path_input)?;
    tracing::info!(
        "... done loading {} genes, {} individuals, and {} records in {:?}",
        panel.len().separate_with_commas(),
        pedigree.len().separate_with_commas(),
        records.len().separate_with_commas(),
        before_loading.elapsed()
    );

    let aggregator = validate_records(records, &config, &panel, &pedigree)?;

    common::trace_rss_now();

    write_results(
        &aggregator,
        &panel,
        &pedigree,
        &args.path_output,
        args.path_summary.as_deref(),
    )?;

    tracing::info!(
        "All of `validate` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

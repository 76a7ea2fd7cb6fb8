//! Implementation of `run` subcommand, `classify` followed by `validate` in memory.

use std::sync::Arc;

use thousands::Separable;

use crate::{
    classify::classify_records,
    common::{self, io::write_jsonl},
    conf::Config,
    panel::PanelRegistry,
    ped::Pedigree,
    validate::{validate_records, write_results},
    variant::read_records,
};

/// Command line arguments for `run` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Classify variants and run inheritance tests", long_about = None)]
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
    /// Path to annotated variants JSONL file, may be gzip-compressed.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output JSONL file with findings.
    #[arg(long)]
    pub path_output: String,
    /// Optional path to write the classified variants to.
    #[arg(long)]
    pub path_classified: Option<String>,
    /// Optional path to summary JSON file.
    #[arg(long)]
    pub path_summary: Option<String>,
    /// Number of worker threads, defaults to number of cores.
    #[arg(long)]
    pub num_threads: Option<usize>,
}

/// Main entry point for `run` sub command.
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

    tracing::info!("Classifying records...");
    let before_classify = std::time::Instant::now();
    let records = classify_records(records, &config, &panel);
    tracing::info!("... done classifying in {:?}", before_classify.elapsed());

    if let Some(path_classified) = &args.path_classified {
        let count = write_jsonl(path_classified, &records)?;
        tracing::info!(
            "wrote {} classified records to {}",
            count.separate_with_commas(),
            path_classified
        );
    }

    let aggregator = validate_records(records, &config, &panel, &pedigree)?;

    common::trace_rss_now();

    write_results(
        &aggregator,
        &panel,
        &pedigree,
        &args.path_output,
        args.path_summary.as_deref(),
    )?;

    tracing::info!("All of `run` completed in {:?}", before_anything.elapsed());
    Ok(())
}

//! Implementation of `classify` subcommand.

pub mod classes;
pub mod prefilter;

use rayon::prelude::*;
use thousands::Separable;

use crate::{
    common::{self, io::write_jsonl},
    conf::Config,
    panel::PanelRegistry,
    variant::{read_records, VariantRecord},
};

/// Command line arguments for `classify` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Classify annotated variants", long_about = None)]
pub struct Args {
    /// Path to the configuration JSON file.
    #[arg(long)]
    pub path_config: String,
    /// Path to the panel JSON file.
    #[arg(long)]
    pub path_panel: String,
    /// Path to annotated variants JSONL file, may be gzip-compressed.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output JSONL file with classified variants.
    #[arg(long)]
    pub path_output: String,
    /// Number of worker threads, defaults to number of cores.
    #[arg(long)]
    pub num_threads: Option<usize>,
}

/// Prefilter and classify `records`, dropping those without any class.
///
/// Class flags are assigned exactly once here; the result is meant to be frozen.
pub fn classify_records(
    records: Vec<VariantRecord>,
    config: &Config,
    panel: &PanelRegistry,
) -> Vec<VariantRecord> {
    let count_in = records.len();
    let mut records = if let Some(filter) = &config.filter {
        let (records, stats) = prefilter::apply(records, filter, panel);
        tracing::info!(
            "prefilters removed {} not rare, {} benign, {} outside green genes, {} without \
            consequence of interest",
            stats.not_rare.separate_with_commas(),
            stats.benign.separate_with_commas(),
            stats.not_green.separate_with_commas(),
            stats.no_consequence.separate_with_commas(),
        );
        records
    } else {
        records
    };

    records.par_iter_mut().for_each(|record| {
        record.classes = classes::classify(
            record,
            &config.classification,
            panel.is_new(&record.gene_id),
        );
    });
    records.retain(|record| record.classes.is_classified());

    tracing::info!(
        "{} of {} records carry at least one class",
        records.len().separate_with_commas(),
        count_in.separate_with_commas()
    );
    records
}

/// Main entry point for `classify` sub command.
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

    tracing::info!("Loading configuration and panel...");
    let before_loading = std::time::Instant::now();
    let config = Config::from_path(&args.path_config)?;
    let panel = PanelRegistry::from_path(&args.path_panel)?;
    let records = read_records(&args.path_input)?;
    tracing::info!(
        "... done loading {} genes and {} records in {:?}",
        panel.len().separate_with_commas(),
        records.len().separate_with_commas(),
        before_loading.elapsed()
    );

    tracing::info!("Classifying records...");
    let before_classify = std::time::Instant::now();
    let records = classify_records(records, &config, &panel);
    tracing::info!("... done classifying in {:?}", before_classify.elapsed());

    common::trace_rss_now();

    let count = write_jsonl(&args.path_output, &records)?;
    tracing::info!(
        "wrote {} classified records to {}",
        count.separate_with_commas(),
        &args.path_output
    );

    tracing::info!(
        "All of `classify` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{conf::Config, panel::PanelRegistry, variant::read_records};

    #[test]
    fn classify_records() -> Result<(), anyhow::Error> {
        let config = Config::from_path("tests/data/conf/config.json")?;
        let panel = PanelRegistry::from_path("tests/data/panel/panel.json")?;
        let records = read_records("tests/data/variants/annotated.jsonl")?;

        let classified = super::classify_records(records, &config, &panel);

        assert_eq!(
            classified
                .iter()
                .map(|r| (r.string(), r.classes.as_ints()))
                .collect::<Vec<_>>(),
            vec![
                ("1-1000-C-T".to_string(), vec![3]),
                ("1-2000-G-A".to_string(), vec![4]),
                ("2-3000-A-G".to_string(), vec![2, 4]),
                ("3-4000-T-C".to_string(), vec![1]),
                ("2-5000-G-T".to_string(), vec![2]),
                ("X-10000-G-A".to_string(), vec![3]),
                ("2-11000-C-A".to_string(), vec![2, 3]),
                ("6-12000-A-T".to_string(), vec![3]),
            ]
        );

        Ok(())
    }

    #[test]
    fn classify_is_deterministic() -> Result<(), anyhow::Error> {
        let config = Config::from_path("tests/data/conf/config.json")?;
        let panel = PanelRegistry::from_path("tests/data/panel/panel.json")?;

        let first = super::classify_records(
            read_records("tests/data/variants/annotated.jsonl")?,
            &config,
            &panel,
        );
        let second = super::classify_records(first.clone(), &config, &panel);

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("classified.jsonl");
        let args_common = crate::common::Args::default();
        let args = super::Args {
            path_config: "tests/data/conf/config.json".into(),
            path_panel: "tests/data/panel/panel.json".into(),
            path_input: "tests/data/variants/annotated.jsonl".into(),
            path_output: path_output.to_string_lossy().to_string(),
            num_threads: None,
        };

        super::run(&args_common, &args)?;

        let records = read_records(&path_output)?;
        assert_eq!(records.len(), 8);
        assert_eq!(records[7].transcript_consequences.len(), 1);

        Ok(())
    }
}

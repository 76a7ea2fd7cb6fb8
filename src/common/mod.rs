//! Common functionality.

use byte_unit::{Byte, UnitType};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

pub use io::{open_read_maybe_gz, open_write_maybe_gz};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    let rss_bytes = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    match rss_bytes {
        Ok(rss_bytes) => tracing::debug!(
            "RSS now: {:.2}",
            Byte::from_u64(rss_bytes).get_appropriate_unit(UnitType::Binary)
        ),
        Err(e) => tracing::debug!("could not determine RSS: {}", e),
    }
}

/// Chromosome class relevant for inheritance interpretation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Chrom {
    /// Autosomes, and chrMT which is never interpreted as sex-linked.
    Auto,
    X,
    Y,
}

impl Chrom {
    /// Classify a chromosome name, with or without `chr` prefix.
    pub fn from_name(name: &str) -> Self {
        match canonicalize(name).as_str() {
            "X" => Chrom::X,
            "Y" => Chrom::Y,
            _ => Chrom::Auto,
        }
    }
}

/// Canonicalize chromosome name, i.e., strip any `chr` prefix and use upper case
/// for the sex chromosomes and mitochondrial genome.
pub fn canonicalize(chrom: &str) -> String {
    let stripped = chrom
        .strip_prefix("chr")
        .or_else(|| chrom.strip_prefix("CHR"))
        .unwrap_or(chrom);
    match stripped {
        "x" => "X".to_string(),
        "y" => "Y".to_string(),
        "m" | "mt" | "M" | "MT" => "MT".to_string(),
        _ => stripped.to_string(),
    }
}

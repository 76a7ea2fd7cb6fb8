//! Gene panel registry with simplified modes of inheritance.
//!
//! The panel JSON is produced upstream from PanelApp.  Raw PanelApp inheritance
//! descriptions are reduced to the closed set of `SimplifiedMoi` labels before they
//! reach this code, and any other label is rejected on load.

use std::path::Path;

use indexmap::IndexMap;

use crate::{common::open_read_maybe_gz, err::ConfigError};

/// Simplified mode of inheritance of a panel gene.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    enum_map::Enum,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
)]
#[serde(try_from = "String", into = "String")]
pub enum SimplifiedMoi {
    #[strum(serialize = "Biallelic")]
    Biallelic,
    #[strum(serialize = "Monoallelic")]
    Monoallelic,
    #[strum(serialize = "Mono_And_Biallelic")]
    MonoAndBiallelic,
    #[strum(serialize = "Hemi_Mono_In_Female")]
    HemiMonoInFemale,
    #[strum(serialize = "Hemi_Bi_In_Female")]
    HemiBiInFemale,
    #[strum(serialize = "Y_Chrom_Variant")]
    YChromVariant,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl TryFrom<String> for SimplifiedMoi {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ConfigError::UnmappedMoi(value.clone()))
    }
}

impl From<SimplifiedMoi> for String {
    fn from(value: SimplifiedMoi) -> Self {
        value.to_string()
    }
}

/// Version information of the panel data.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct PanelMetadata {
    /// Version of the current panel.
    pub current_version: Option<String>,
    /// Version of the panel that the current one was compared against, if any.
    pub previous_version: Option<String>,
}

/// Information on one green gene of the panel.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct PanelGeneEntry {
    /// Gene ID, filled from the key of the panel JSON.
    #[serde(default)]
    pub gene_id: String,
    /// Gene symbol.
    pub symbol: String,
    /// Current simplified MOI.
    pub moi: SimplifiedMoi,
    /// Whether the gene is new on the panel compared to the previous version.
    #[serde(default, rename = "new")]
    pub is_new: bool,
    /// Whether the MOI changed compared to the previous version.
    #[serde(default)]
    pub changed: bool,
    /// The MOI in the previous version if changed.
    #[serde(default)]
    pub old_moi: Option<SimplifiedMoi>,
}

/// On-disk layout of the panel JSON.
#[derive(serde::Deserialize, Debug)]
struct PanelFile {
    #[serde(default)]
    panel_metadata: PanelMetadata,
    #[serde(flatten)]
    genes: IndexMap<String, PanelGeneEntry>,
}

/// Panel data, read-only after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelRegistry {
    pub metadata: PanelMetadata,
    pub genes: IndexMap<String, PanelGeneEntry>,
}

impl PanelRegistry {
    /// Load panel from JSON file, optionally gzip-compressed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not open panel file {:?}: {}", path.as_ref(), e)
        })?;
        let file: PanelFile = serde_json::from_reader(reader).map_err(|e| {
            anyhow::anyhow!("could not parse panel file {:?}: {}", path.as_ref(), e)
        })?;
        Ok(file.into())
    }

    /// Load panel from JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
        let file: PanelFile = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("could not parse panel JSON: {}", e))?;
        Ok(file.into())
    }

    /// Build from entries, mostly useful in tests.
    pub fn from_entries(
        metadata: PanelMetadata,
        entries: impl IntoIterator<Item = PanelGeneEntry>,
    ) -> Self {
        Self {
            metadata,
            genes: entries
                .into_iter()
                .map(|entry| (entry.gene_id.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, gene_id: &str) -> Option<&PanelGeneEntry> {
        self.genes.get(gene_id)
    }

    pub fn contains(&self, gene_id: &str) -> bool {
        self.genes.contains_key(gene_id)
    }

    /// Whether the gene is new on the panel.
    pub fn is_new(&self, gene_id: &str) -> bool {
        self.get(gene_id).map(|entry| entry.is_new).unwrap_or(false)
    }

    /// Whether a previous panel version was compared against.
    pub fn has_previous_version(&self) -> bool {
        self.metadata.previous_version.is_some()
    }

    /// All MOI labels used by the panel, current and previous, in order of first appearance.
    pub fn moi_labels(&self) -> Vec<SimplifiedMoi> {
        let mut result = Vec::new();
        for entry in self.genes.values() {
            for moi in std::iter::once(entry.moi).chain(entry.old_moi) {
                if !result.contains(&moi) {
                    result.push(moi);
                }
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl From<PanelFile> for PanelRegistry {
    fn from(file: PanelFile) -> Self {
        let mut genes = file.genes;
        for (gene_id, entry) in genes.iter_mut() {
            entry.gene_id.clone_from(gene_id);
        }
        Self {
            metadata: file.panel_metadata,
            genes,
        }
    }
}

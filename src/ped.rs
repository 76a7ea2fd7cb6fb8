//! Minimal pedigree model for singleton analysis: sample ID, sex, affection status.

use std::path::Path;

use indexmap::IndexMap;

use crate::common::open_read_maybe_gz;

/// One individual from the PED file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PedPerson {
    /// The sample identifier.
    pub sample_id: String,
    /// Whether the individual is male.
    pub is_male: bool,
    /// Whether the individual is affected.
    pub affected: bool,
}

/// Raw row of a PED file with header.
#[derive(Debug, serde::Deserialize)]
struct PedRow {
    #[serde(rename = "Individual ID")]
    individual_id: String,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Affected")]
    affected: String,
}

impl From<PedRow> for PedPerson {
    fn from(row: PedRow) -> Self {
        Self {
            is_male: row.sex.trim() == "1",
            affected: row.affected.trim() == "2",
            sample_id: row.individual_id,
        }
    }
}

/// Pedigree keyed by sample ID, read-only after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pedigree {
    pub individuals: IndexMap<String, PedPerson>,
}

impl Pedigree {
    /// Load pedigree from tab-separated file with header line.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(path.as_ref())
            .map_err(|e| anyhow::anyhow!("could not open PED file {:?}: {}", path.as_ref(), e))?;
        Self::from_reader(reader)
    }

    /// Load pedigree from a reader of a tab-separated file with header line.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, anyhow::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let mut individuals = IndexMap::new();
        for row in csv_reader.deserialize() {
            let row: PedRow = row.map_err(|e| anyhow::anyhow!("invalid PED row: {}", e))?;
            let person: PedPerson = row.into();
            if individuals.contains_key(&person.sample_id) {
                anyhow::bail!("duplicate individual {} in PED file", &person.sample_id);
            }
            individuals.insert(person.sample_id.clone(), person);
        }

        Ok(Self { individuals })
    }

    /// Build from a list of persons, mostly useful in tests.
    pub fn from_persons(persons: impl IntoIterator<Item = PedPerson>) -> Self {
        Self {
            individuals: persons
                .into_iter()
                .map(|person| (person.sample_id.clone(), person))
                .collect(),
        }
    }

    pub fn get(&self, sample_id: &str) -> Option<&PedPerson> {
        self.individuals.get(sample_id)
    }

    /// Iterate over the affected individuals in file order.
    pub fn affected(&self) -> impl Iterator<Item = &PedPerson> {
        self.individuals.values().filter(|p| p.affected)
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

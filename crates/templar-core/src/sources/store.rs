use super::{
    CoreTemplateRecord, CoreTemplateSource, DomainTemplate, DomainTemplateSource, Interaction,
    InteractionSource, LookupFailure, ResolutionSource, SequenceSource, StructureQuality,
    StructureSource,
};
use crate::core::io::fasta;
use crate::core::io::pdb::PdbFile;
use crate::core::io::tables::{self, TableError};
use crate::core::io::traits::StructureFile;
use crate::core::models::numbering::NativeSpan;
use crate::core::models::structure::StructureModel;
use crate::core::sequence::{Domain, DomainError, SequenceRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

pub const SEQUENCES_DIR: &str = "sequences";
pub const STRUCTURES_DIR: &str = "structures";
pub const INTERACTIONS_FILE: &str = "interactions.csv";
pub const DOMAIN_TEMPLATES_FILE: &str = "domain_templates.csv";
pub const CORE_TEMPLATES_FILE: &str = "core_templates.csv";
pub const RESOLUTIONS_FILE: &str = "resolutions.csv";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read table '{}': {source}", file.display())]
    Table {
        file: PathBuf,
        #[source]
        source: TableError,
    },
    #[error("Invalid domain in row {row} of '{}': {source}", file.display())]
    Domain {
        file: PathBuf,
        row: usize,
        #[source]
        source: DomainError,
    },
    #[error("Invalid chain identifier '{value}' in row {row} of '{}'", file.display())]
    Chain { file: PathBuf, row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    protein_a: String,
    protein_b: String,
    family_a: String,
    family_b: String,
    domain_a_start: usize,
    domain_a_end: usize,
    domain_b_start: usize,
    domain_b_end: usize,
    #[serde(default)]
    interaction_type: String,
}

#[derive(Debug, Deserialize)]
struct DomainTemplateRow {
    family_a: String,
    family_b: String,
    structure_id: String,
    chain_a: String,
    chain_b: String,
    domain_a_start: isize,
    domain_a_end: isize,
    domain_b_start: isize,
    domain_b_end: isize,
}

#[derive(Debug, Deserialize)]
struct CoreTemplateRow {
    protein_id: String,
    family_id: String,
    domain_start: usize,
    domain_end: usize,
    structure_id: String,
    chain: String,
    structure_domain_start: isize,
    structure_domain_end: isize,
}

#[derive(Debug, Deserialize)]
struct ResolutionRow {
    structure_id: String,
    experiment_type: u32,
    resolution: f64,
}

/// File-backed implementation of every data source.
///
/// The directory holds `sequences/<id>.fasta`, `structures/<id>.pdb` and the
/// CSV tables. Tables are loaded once when the store is opened; sequences and
/// structures are read on demand.
///
/// Every parsed structure stays cached for the life of the store and the
/// cache is never evicted, so memory grows with the number of distinct
/// structures looked up. Open a fresh store per run rather than keeping one
/// alive across many runs.
#[derive(Debug)]
pub struct DataStore {
    root: PathBuf,
    interactions: Vec<Interaction>,
    domain_templates: HashMap<(String, String), Vec<DomainTemplate>>,
    core_templates: HashMap<String, Vec<CoreTemplateRecord>>,
    resolutions: HashMap<String, StructureQuality>,
    structures: Mutex<HashMap<String, Arc<StructureModel>>>,
}

impl DataStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();

        let interactions = load(&root.join(INTERACTIONS_FILE), |row: InteractionRow, file, n| {
            Ok(Interaction {
                domains: (
                    domain(row.domain_a_start, row.domain_a_end, file, n)?,
                    domain(row.domain_b_start, row.domain_b_end, file, n)?,
                ),
                protein_ids: (row.protein_a, row.protein_b),
                family_ids: (row.family_a, row.family_b),
                interaction_type: row.interaction_type,
            })
        })?;

        let mut domain_templates: HashMap<(String, String), Vec<DomainTemplate>> = HashMap::new();
        for (families, template) in load(
            &root.join(DOMAIN_TEMPLATES_FILE),
            |row: DomainTemplateRow, file, n| {
                let template = DomainTemplate {
                    structure_id: row.structure_id.to_ascii_uppercase(),
                    chains: (chain(&row.chain_a, file, n)?, chain(&row.chain_b, file, n)?),
                    structure_domains: (
                        NativeSpan::new(row.domain_a_start, row.domain_a_end),
                        NativeSpan::new(row.domain_b_start, row.domain_b_end),
                    ),
                };
                Ok(((row.family_a, row.family_b), template))
            },
        )? {
            domain_templates.entry(families).or_default().push(template);
        }

        let mut core_templates: HashMap<String, Vec<CoreTemplateRecord>> = HashMap::new();
        for (protein_id, record) in load(&root.join(CORE_TEMPLATES_FILE), |row: CoreTemplateRow, file, n| {
            let record = CoreTemplateRecord {
                family_id: row.family_id,
                domain: domain(row.domain_start, row.domain_end, file, n)?,
                structure_id: row.structure_id.to_ascii_uppercase(),
                chain: chain(&row.chain, file, n)?,
                structure_domain: NativeSpan::new(row.structure_domain_start, row.structure_domain_end),
            };
            Ok((row.protein_id, record))
        })? {
            core_templates.entry(protein_id).or_default().push(record);
        }

        let resolutions = load(&root.join(RESOLUTIONS_FILE), |row: ResolutionRow, _, _| {
            Ok((
                row.structure_id.to_ascii_uppercase(),
                StructureQuality {
                    experiment_type: row.experiment_type,
                    resolution: row.resolution,
                },
            ))
        })?
        .into_iter()
        .collect();

        debug!(
            root = %root.display(),
            interactions = interactions.len(),
            "Opened data store"
        );

        Ok(Self {
            root,
            interactions,
            domain_templates,
            core_templates,
            resolutions,
            structures: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sequence_path(&self, protein_id: &str) -> PathBuf {
        self.root.join(SEQUENCES_DIR).join(format!("{}.fasta", protein_id))
    }

    fn structure_path(&self, structure_id: &str) -> Option<PathBuf> {
        let dir = self.root.join(STRUCTURES_DIR);
        [
            structure_id.to_string(),
            structure_id.to_ascii_lowercase(),
            structure_id.to_ascii_uppercase(),
        ]
        .into_iter()
        .map(|name| dir.join(format!("{}.pdb", name)))
        .find(|path| path.is_file())
    }
}

fn load<R, T, F>(file: &Path, convert: F) -> Result<Vec<T>, StoreError>
where
    R: serde::de::DeserializeOwned,
    F: Fn(R, &Path, usize) -> Result<T, StoreError>,
{
    let rows: Vec<R> = tables::read_table_from_path(file).map_err(|source| StoreError::Table {
        file: file.to_path_buf(),
        source,
    })?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| convert(row, file, i + 1))
        .collect()
}

fn domain(start: usize, end: usize, file: &Path, row: usize) -> Result<Domain, StoreError> {
    Domain::new(start, end).map_err(|source| StoreError::Domain {
        file: file.to_path_buf(),
        row,
        source,
    })
}

fn chain(value: &str, file: &Path, row: usize) -> Result<char, StoreError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(StoreError::Chain {
            file: file.to_path_buf(),
            row,
            value: value.to_string(),
        }),
    }
}

fn swap<T>((a, b): (T, T)) -> (T, T) {
    (b, a)
}

impl SequenceSource for DataStore {
    fn sequence(&self, protein_id: &str) -> Result<SequenceRecord, LookupFailure> {
        let path = self.sequence_path(protein_id);
        if !path.is_file() {
            return Err(LookupFailure::SequenceNotFound(protein_id.to_string()));
        }
        let records = fasta::read_records_from_path(&path).map_err(|e| LookupFailure::Unreadable {
            what: path.display().to_string(),
            message: e.to_string(),
        })?;
        let record = records
            .into_iter()
            .next()
            .filter(|record| !record.is_empty())
            .ok_or_else(|| LookupFailure::SequenceNotFound(protein_id.to_string()))?;
        Ok(SequenceRecord::new(protein_id, &record.residues.to_ascii_uppercase()))
    }
}

impl InteractionSource for DataStore {
    fn interactions(&self, protein_id: &str) -> Result<Vec<Interaction>, LookupFailure> {
        Ok(self
            .interactions
            .iter()
            .filter_map(|interaction| {
                if interaction.protein_ids.0 == protein_id {
                    Some(interaction.clone())
                } else if interaction.protein_ids.1 == protein_id {
                    Some(Interaction {
                        protein_ids: swap(interaction.protein_ids.clone()),
                        family_ids: swap(interaction.family_ids.clone()),
                        domains: swap(interaction.domains),
                        interaction_type: interaction.interaction_type.clone(),
                    })
                } else {
                    None
                }
            })
            .collect())
    }
}

impl DomainTemplateSource for DataStore {
    fn domain_templates(&self, family_a: &str, family_b: &str) -> Result<Vec<DomainTemplate>, LookupFailure> {
        let forward = self
            .domain_templates
            .get(&(family_a.to_string(), family_b.to_string()));
        let templates: Vec<DomainTemplate> = match forward {
            Some(templates) => templates.clone(),
            None => self
                .domain_templates
                .get(&(family_b.to_string(), family_a.to_string()))
                .map(|templates| {
                    templates
                        .iter()
                        .map(|t| DomainTemplate {
                            structure_id: t.structure_id.clone(),
                            chains: swap(t.chains),
                            structure_domains: swap(t.structure_domains),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        };
        if templates.is_empty() {
            return Err(LookupFailure::TemplatesNotFound(
                family_a.to_string(),
                family_b.to_string(),
            ));
        }
        Ok(templates)
    }
}

impl CoreTemplateSource for DataStore {
    fn core_templates(&self, protein_id: &str) -> Result<Vec<CoreTemplateRecord>, LookupFailure> {
        Ok(self.core_templates.get(protein_id).cloned().unwrap_or_default())
    }
}

impl ResolutionSource for DataStore {
    fn resolution(&self, structure_id: &str) -> Result<StructureQuality, LookupFailure> {
        self.resolutions
            .get(&structure_id.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| LookupFailure::ResolutionNotFound(structure_id.to_string()))
    }
}

impl StructureSource for DataStore {
    fn structure(&self, structure_id: &str) -> Result<Arc<StructureModel>, LookupFailure> {
        let key = structure_id.to_ascii_uppercase();
        if let Some(model) = self
            .structures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(model));
        }

        let path = self
            .structure_path(structure_id)
            .ok_or_else(|| LookupFailure::StructureNotFound(structure_id.to_string()))?;
        let model = PdbFile::read_from_path(&key, &path).map_err(|e| LookupFailure::Unreadable {
            what: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(structure = %key, atoms = model.atom_count(), "Parsed structure");

        let model = Arc::new(model);
        self.structures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&model));
        Ok(model)
    }
}

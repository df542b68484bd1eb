//! Fixtures shared by engine and workflow tests.

use super::aligner::{Aligner, AlignerError, GlobalAligner};
use super::config::MappingConfig;
use super::context::AlignmentContext;
use super::gate::AdmissionGate;
use super::progress::ProgressReporter;
use super::workspace::Workspace;
use crate::core::alignment::{AlignedRow, Alignment};
use crate::core::models::atom::Atom;
use crate::core::models::residue::ResidueKey;
use crate::core::models::structure::StructureModel;
use crate::core::sequence::SequenceRecord;
use crate::core::utils::identifiers::one_to_three;
use crate::sources::{
    CoreTemplateRecord, CoreTemplateSource, DomainTemplate, DomainTemplateSource, Interaction,
    InteractionSource, LookupFailure, ResolutionSource, SequenceSource, StructureQuality,
    StructureSource,
};
use nalgebra::Point3;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

enum Canned {
    /// Gapped rows named after the inputs at alignment time.
    Gapped { query: String, structure: String },
    /// Rows returned verbatim, identifiers included.
    Raw([(String, String); 2]),
}

/// Returns canned alignments keyed by the residues of the two inputs and
/// falls back to the built-in aligner for anything else.
pub struct StubAligner {
    canned: HashMap<(String, String), Canned>,
    fallback: GlobalAligner,
    calls: AtomicUsize,
}

impl StubAligner {
    pub fn new() -> Self {
        Self {
            canned: HashMap::new(),
            fallback: GlobalAligner::default(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_alignment(mut self, query_row: &str, structure_row: &str) -> Self {
        let key = (ungap(query_row), ungap(structure_row));
        self.canned.insert(
            key,
            Canned::Gapped {
                query: query_row.to_string(),
                structure: structure_row.to_string(),
            },
        );
        self
    }

    pub fn with_rows(mut self, query: &str, structure: &str, first: (&str, &str), second: (&str, &str)) -> Self {
        self.canned.insert(
            (query.to_string(), structure.to_string()),
            Canned::Raw([
                (first.0.to_string(), first.1.to_string()),
                (second.0.to_string(), second.1.to_string()),
            ]),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn ungap(row: &str) -> String {
    row.chars().filter(|&c| c != '-').collect()
}

impl Aligner for StubAligner {
    fn name(&self) -> &str {
        "stub"
    }

    fn align(
        &self,
        query: &SequenceRecord,
        structure: &SequenceRecord,
        workspace: &Workspace,
    ) -> Result<Alignment, AlignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (query.residues.clone(), structure.residues.clone());
        match self.canned.get(&key) {
            Some(Canned::Gapped { query: q, structure: s }) => Ok(Alignment::new(
                AlignedRow::new(&query.id, q)?,
                AlignedRow::new(&structure.id, s)?,
            )?),
            Some(Canned::Raw([(id_a, row_a), (id_b, row_b)])) => Ok(Alignment::new(
                AlignedRow::new(id_a, row_a)?,
                AlignedRow::new(id_b, row_b)?,
            )?),
            None => self.fallback.align(query, structure, workspace),
        }
    }
}

/// Owns everything an [`AlignmentContext`] borrows.
pub struct TestBench {
    _dir: TempDir,
    pub workspace: Workspace,
    pub gate: AdmissionGate,
    pub config: MappingConfig,
    pub reporter: ProgressReporter<'static>,
}

impl TestBench {
    pub fn new() -> Self {
        Self::with_config(MappingConfig::default())
    }

    pub fn with_config(config: MappingConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(dir.path()).unwrap();
        Self {
            _dir: dir,
            workspace,
            gate: AdmissionGate::new(1),
            config,
            reporter: ProgressReporter::new(),
        }
    }

    pub fn context<'a>(&'a self, aligner: &'a dyn Aligner) -> AlignmentContext<'a> {
        AlignmentContext::new(aligner, &self.gate, &self.workspace, &self.config, &self.reporter)
    }
}

/// Appends a chain laid out along the x axis, one CA atom per residue
/// spaced 3.8 apart, starting at `origin` and numbered from `first_number`.
pub fn add_linear_chain(
    model: &mut StructureModel,
    chain: char,
    sequence: &str,
    first_number: isize,
    origin: Point3<f64>,
) {
    let chain_id = model.add_chain(chain);
    for (i, code) in sequence.chars().enumerate() {
        let name = one_to_three(code).unwrap();
        let residue_id = model
            .add_residue(chain_id, ResidueKey::standard(first_number + i as isize), name)
            .unwrap();
        let position = origin + nalgebra::Vector3::new(3.8 * i as f64, 0.0, 0.0);
        let serial = model.atom_count() + 1;
        model
            .add_atom_to_residue(residue_id, Atom::new(serial, "CA", residue_id, position))
            .unwrap();
    }
}

/// In-memory implementation of every data source.
#[derive(Default)]
pub struct MemorySources {
    pub sequences: HashMap<String, SequenceRecord>,
    pub interactions: Vec<Interaction>,
    pub domain_templates: HashMap<(String, String), Vec<DomainTemplate>>,
    pub core_templates: HashMap<String, Vec<CoreTemplateRecord>>,
    pub resolutions: HashMap<String, StructureQuality>,
    pub structures: HashMap<String, Arc<StructureModel>>,
}

impl MemorySources {
    pub fn add_sequence(&mut self, id: &str, residues: &str) {
        self.sequences
            .insert(id.to_string(), SequenceRecord::new(id, residues));
    }

    pub fn add_structure(&mut self, model: StructureModel, experiment_type: u32, resolution: f64) {
        let id = model.id().to_string();
        self.resolutions.insert(
            id.clone(),
            StructureQuality {
                experiment_type,
                resolution,
            },
        );
        self.structures.insert(id, Arc::new(model));
    }
}

impl SequenceSource for MemorySources {
    fn sequence(&self, protein_id: &str) -> Result<SequenceRecord, LookupFailure> {
        self.sequences
            .get(protein_id)
            .cloned()
            .ok_or_else(|| LookupFailure::SequenceNotFound(protein_id.to_string()))
    }
}

impl InteractionSource for MemorySources {
    fn interactions(&self, protein_id: &str) -> Result<Vec<Interaction>, LookupFailure> {
        Ok(self
            .interactions
            .iter()
            .filter(|i| i.protein_ids.0 == protein_id)
            .cloned()
            .collect())
    }
}

impl DomainTemplateSource for MemorySources {
    fn domain_templates(&self, family_a: &str, family_b: &str) -> Result<Vec<DomainTemplate>, LookupFailure> {
        self.domain_templates
            .get(&(family_a.to_string(), family_b.to_string()))
            .cloned()
            .ok_or_else(|| LookupFailure::TemplatesNotFound(family_a.to_string(), family_b.to_string()))
    }
}

impl CoreTemplateSource for MemorySources {
    fn core_templates(&self, protein_id: &str) -> Result<Vec<CoreTemplateRecord>, LookupFailure> {
        Ok(self.core_templates.get(protein_id).cloned().unwrap_or_default())
    }
}

impl ResolutionSource for MemorySources {
    fn resolution(&self, structure_id: &str) -> Result<StructureQuality, LookupFailure> {
        self.resolutions
            .get(structure_id)
            .copied()
            .ok_or_else(|| LookupFailure::ResolutionNotFound(structure_id.to_string()))
    }
}

impl StructureSource for MemorySources {
    fn structure(&self, structure_id: &str) -> Result<Arc<StructureModel>, LookupFailure> {
        self.structures
            .get(structure_id)
            .cloned()
            .ok_or_else(|| LookupFailure::StructureNotFound(structure_id.to_string()))
    }
}

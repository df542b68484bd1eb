use super::aligner::Aligner;
use super::config::MappingConfig;
use super::error::EngineError;
use super::gate::AdmissionGate;
use super::progress::ProgressReporter;
use super::workspace::Workspace;
use crate::core::alignment::{Alignment, AlignmentError, AlignmentScore};
use crate::core::sequence::SequenceRecord;
use tracing::debug;

/// Everything a worker needs to align sequences: the aligner, the shared
/// admission gate, its own workspace, and the mapping configuration.
#[derive(Clone, Copy)]
pub struct AlignmentContext<'a> {
    pub aligner: &'a dyn Aligner,
    pub gate: &'a AdmissionGate,
    pub workspace: &'a Workspace,
    pub config: &'a MappingConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> AlignmentContext<'a> {
    pub fn new(
        aligner: &'a dyn Aligner,
        gate: &'a AdmissionGate,
        workspace: &'a Workspace,
        config: &'a MappingConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            aligner,
            gate,
            workspace,
            config,
            reporter,
        }
    }

    /// Aligns `query` against `structure` while holding an admission slot,
    /// validates the result and scores it.
    pub fn align(
        &self,
        query: &SequenceRecord,
        structure: &SequenceRecord,
    ) -> Result<(Alignment, AlignmentScore), EngineError> {
        let alignment = {
            let _permit = self.gate.acquire();
            debug!(query = %query.id, structure = %structure.id, aligner = self.aligner.name(), "Aligning");
            self.aligner.align(query, structure, self.workspace)?
        };
        verify_rows(&alignment, query, structure)?;
        let score = AlignmentScore::of(&alignment, self.config.identity_weight);
        debug!(
            query = %query.id,
            structure = %structure.id,
            identity = score.identity,
            coverage = score.coverage,
            score = score.combined,
            "Done aligning"
        );
        Ok((alignment, score))
    }
}

fn verify_rows(
    alignment: &Alignment,
    query: &SequenceRecord,
    structure: &SequenceRecord,
) -> Result<(), AlignmentError> {
    let (structure_row, query_row) = alignment.split(&structure.id)?;
    for (row, input) in [(query_row, query), (structure_row, structure)] {
        if row.id != input.id {
            return Err(AlignmentError::UnknownRow(input.id.clone()));
        }
        if !row.ungapped().residues.eq_ignore_ascii_case(&input.residues) {
            return Err(AlignmentError::ContentMismatch(input.id.clone()));
        }
    }
    Ok(())
}

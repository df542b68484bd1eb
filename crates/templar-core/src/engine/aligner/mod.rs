//! Pairwise sequence aligners.
//!
//! [`CommandAligner`] drives an external multiple-sequence-alignment program
//! through files in the caller's [`Workspace`]; [`GlobalAligner`] is a
//! built-in global aligner that needs no external tools.

mod command;
mod global;

pub use command::{CommandAligner, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
pub use global::{GlobalAligner, GlobalScoring};

use super::workspace::Workspace;
use crate::core::alignment::{Alignment, AlignmentError};
use crate::core::io::fasta::FastaError;
use crate::core::sequence::SequenceRecord;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("I/O error in alignment workspace: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to launch aligner '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Aligner '{program}' failed with {status}: {stderr}")]
    Program {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("Could not read aligner output: {0}")]
    Output(FastaError),
    #[error("Aligner produced an invalid alignment: {0}")]
    Alignment(#[from] AlignmentError),
}

impl From<FastaError> for AlignerError {
    fn from(error: FastaError) -> Self {
        match error {
            FastaError::Io(e) => AlignerError::Io(e),
            other => AlignerError::Output(other),
        }
    }
}

/// Produces a two-row alignment of a query sequence against a structure
/// sequence. Row identifiers must be the ids of the input records.
pub trait Aligner: Send + Sync {
    fn name(&self) -> &str;

    fn align(
        &self,
        query: &SequenceRecord,
        structure: &SequenceRecord,
        workspace: &Workspace,
    ) -> Result<Alignment, AlignerError>;
}

use thiserror::Error;

use super::aligner::AlignerError;
use super::config::ConfigError;
use crate::core::alignment::AlignmentError;
use crate::core::io::fasta::FastaError;
use crate::core::models::numbering::NumberingError;
use crate::core::sequence::{DomainError, Mutation, ParseMutationError};
use crate::sources::LookupFailure;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupFailure),

    #[error("Domain mapping failed for {structure_id}_{chain}: {source}")]
    DomainMapping {
        structure_id: String,
        chain: char,
        #[source]
        source: NumberingError,
    },

    #[error("Alignment contract violated: {0}")]
    AlignmentDivergence(#[from] AlignmentError),

    #[error("Aligner failed: {0}")]
    Aligner(AlignerError),

    #[error("Structure '{structure_id}' is unusable: {reason}")]
    Structure { structure_id: String, reason: String },

    #[error(
        "Mutation {mutation} does not match the sequence of {protein_id} (found {})",
        .found.map_or_else(|| "no residue".to_string(), |c| format!("'{}'", c))
    )]
    MutationMismatch {
        protein_id: String,
        mutation: Mutation,
        found: Option<char>,
    },

    #[error("Invalid mutation: {0}")]
    InvalidMutation(#[from] ParseMutationError),

    #[error("Invalid domain: {0}")]
    Domain(#[from] DomainError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether the failure only abandons the candidate being evaluated.
    ///
    /// Unrecoverable failures mean the inputs or the aligner broke their
    /// contract, and the whole query must stop.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Lookup(_)
                | EngineError::DomainMapping { .. }
                | EngineError::Aligner(_)
                | EngineError::Structure { .. }
                | EngineError::Domain(_)
        )
    }
}

impl From<AlignerError> for EngineError {
    fn from(error: AlignerError) -> Self {
        match error {
            AlignerError::Alignment(e) | AlignerError::Output(FastaError::Alignment(e)) => {
                EngineError::AlignmentDivergence(e)
            }
            other => EngineError::Aligner(other),
        }
    }
}

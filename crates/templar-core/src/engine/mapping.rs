use super::context::AlignmentContext;
use super::error::EngineError;
use super::tasks::refinement::{self, TrimTally};
use crate::core::alignment::{Alignment, AlignmentScore, Projection, project_position};
use crate::core::models::numbering::{ChainNumbering, NativeSpan, NumberingError, chain_sequence};
use crate::core::models::structure::StructureModel;
use crate::core::sequence::{Domain, SequenceRecord};
use tracing::{debug, instrument};

/// A query domain aligned against the matching domain of a structure chain.
#[derive(Debug, Clone)]
pub struct MappedDomain {
    pub alignment: Alignment,
    pub score: AlignmentScore,
    /// The query domain after any loner trimming, in full-sequence positions.
    pub query_domain: Domain,
    /// The query residues that were finally aligned.
    pub query_sequence: SequenceRecord,
    /// The chain residues covered by the structure domain.
    pub structure_sequence: SequenceRecord,
    /// The structure domain in chain sequence indices.
    pub structure_domain: Domain,
    pub numbering: ChainNumbering,
    pub query_trims: TrimTally,
}

impl MappedDomain {
    /// Projects a 1-based position of the query domain onto the structure
    /// domain.
    pub fn project(&self, domain_position: usize) -> Result<Projection, EngineError> {
        Ok(project_position(
            &self.alignment,
            &self.query_sequence.id,
            domain_position,
        )?)
    }

    /// Chain sequence index of a 1-based position of the structure domain.
    pub fn structure_index(&self, structure_position: usize) -> usize {
        self.structure_domain.start() + structure_position - 1
    }

    pub fn native_number(&self, structure_position: usize) -> Result<isize, NumberingError> {
        self.numbering
            .sequence_index_to_native(self.structure_index(structure_position))
    }
}

/// Aligns `domain` of the full query sequence against the residues of
/// `chain` covered by the native span `structure_span`.
///
/// With `refine`, loner overhang is trimmed from the query and the returned
/// query domain shrinks by the trimmed amounts.
#[instrument(skip_all, name = "domain_mapping", fields(query = %query.id, structure = %model.id(), chain = %chain))]
pub fn map_to_structure(
    context: &AlignmentContext,
    query: &SequenceRecord,
    domain: Domain,
    model: &StructureModel,
    chain: char,
    structure_span: NativeSpan,
    refine: bool,
) -> Result<MappedDomain, EngineError> {
    let mapping_error = |source: NumberingError| EngineError::DomainMapping {
        structure_id: model.id().to_string(),
        chain,
        source,
    };

    let chain_id = model
        .find_chain_by_id(chain)
        .ok_or_else(|| EngineError::Structure {
            structure_id: model.id().to_string(),
            reason: format!("chain {} not found", chain),
        })?;
    let numbering = ChainNumbering::from_chain(model, chain_id).map_err(mapping_error)?;
    let structure_domain = numbering
        .span_to_domain(structure_span)
        .map_err(mapping_error)?;
    let chain_record = chain_sequence(model, chain_id).ok_or_else(|| EngineError::Structure {
        structure_id: model.id().to_string(),
        reason: format!("chain {} has no sequence", chain),
    })?;
    let structure_sequence = chain_record.slice(structure_domain)?;
    let query_sequence = query.slice(domain)?;
    debug!(
        query_domain = %domain,
        structure_domain = %structure_domain,
        span = %structure_span,
        "Mapped structure span to chain sequence."
    );

    let (alignment, score) = context.align(&query_sequence, &structure_sequence)?;
    if !refine {
        return Ok(MappedDomain {
            alignment,
            score,
            query_domain: domain,
            query_sequence,
            structure_sequence,
            structure_domain,
            numbering,
            query_trims: TrimTally::default(),
        });
    }

    let refined = refinement::run(context, alignment, score, &query_sequence, &structure_sequence)?;
    let query_domain = domain.shrink(refined.query_trims.leading, refined.query_trims.trailing)?;
    Ok(MappedDomain {
        alignment: refined.alignment,
        score: refined.score,
        query_domain,
        query_sequence: refined.query,
        structure_sequence,
        structure_domain,
        numbering,
        query_trims: refined.query_trims,
    })
}

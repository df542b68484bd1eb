//! # Workflows Module
//!
//! Complete template searches for a single protein mutation.
//!
//! - [`core_template`] finds single-chain templates covering the mutated domain.
//! - [`interface_template`] finds interacting chain pairs in which the mutated
//!   residue contacts the partner chain.
//!
//! Both pipelines draw their data from the capability traits in
//! [`crate::sources`] and align through an
//! [`AlignmentContext`](crate::engine::context::AlignmentContext). Failures
//! that only concern one candidate are logged and skipped; contract
//! violations end the search with an error.

pub mod core_template;
pub mod interface_template;

use crate::core::models::numbering::NativeSpan;
use crate::core::sequence::{Domain, Mutation, SequenceRecord};
use crate::engine::context::AlignmentContext;
use crate::engine::error::EngineError;
use crate::engine::mapping::MappedDomain;
use crate::engine::progress::{CandidateOutcome, Progress};
use crate::engine::template::{RejectionReason, Template, TemplatePartner};
use crate::sources::SequenceSource;
use tracing::{debug, warn};

/// What happened to a candidate that was evaluated without error.
#[derive(Debug)]
enum Evaluation {
    Accepted(Box<Template>),
    Rejected(RejectionReason),
}

/// Where the mutation lands in a mapped domain.
struct MutationSite {
    domain_position: usize,
    structure_index: usize,
    native_number: isize,
}

/// Fetches the protein sequence and checks that it carries the mutation's
/// wild-type residue. A missing sequence yields `None`.
fn checked_sequence<S>(
    sources: &S,
    protein_id: &str,
    mutation: &Mutation,
) -> Result<Option<SequenceRecord>, EngineError>
where
    S: SequenceSource + ?Sized,
{
    let sequence = match sources.sequence(protein_id) {
        Ok(sequence) => sequence,
        Err(failure) => {
            warn!(protein = %protein_id, error = %failure, "No sequence for the query protein.");
            return Ok(None);
        }
    };
    let found = sequence.residue_at(mutation.position);
    if found != Some(mutation.wild_type) {
        return Err(EngineError::MutationMismatch {
            protein_id: protein_id.to_string(),
            mutation: *mutation,
            found,
        });
    }
    Ok(Some(sequence))
}

/// Locates the mutation in a mapped domain, or says why it cannot be placed.
fn locate_mutation(
    mapped: &MappedDomain,
    mutation: &Mutation,
    structure_id: &str,
    chain: char,
) -> Result<Result<MutationSite, RejectionReason>, EngineError> {
    let Some(domain_position) = mapped.query_domain.relative_position(mutation.position) else {
        return Ok(Err(RejectionReason::OutsideRefinedDomain));
    };
    let Some(structure_position) = mapped.project(domain_position)?.position() else {
        return Ok(Err(RejectionReason::InGap));
    };
    let native_number = mapped
        .native_number(structure_position)
        .map_err(|source| EngineError::DomainMapping {
            structure_id: structure_id.to_string(),
            chain,
            source,
        })?;
    Ok(Ok(MutationSite {
        domain_position,
        structure_index: mapped.structure_index(structure_position),
        native_number,
    }))
}

/// Builds one side of a template from a protein's mapping.
fn template_partner(
    sequence: &SequenceRecord,
    family_id: &str,
    requested: Domain,
    chain: char,
    structure_domain: NativeSpan,
    mapped: MappedDomain,
) -> Result<TemplatePartner, EngineError> {
    Ok(TemplatePartner {
        protein_id: sequence.id.clone(),
        family_id: family_id.to_string(),
        domain: requested,
        refined_domain: mapped.query_domain,
        chain,
        structure_domain,
        domain_sequence: sequence.slice(mapped.query_domain)?,
        alignment: mapped.alignment,
        score: mapped.score,
    })
}

/// Reports a candidate's outcome and decides whether the search goes on.
///
/// Accepted templates are returned; rejections and recoverable failures are
/// logged and yield `None`; anything else is returned as the error that ends
/// the search.
fn settle(
    context: &AlignmentContext,
    structure_id: &str,
    result: Result<Evaluation, EngineError>,
) -> Result<Option<Template>, EngineError> {
    let (outcome, accepted) = match result {
        Ok(Evaluation::Accepted(template)) => {
            debug!(structure = %structure_id, score = template.score, "Candidate accepted.");
            (
                CandidateOutcome::Accepted {
                    score: template.score,
                },
                Some(*template),
            )
        }
        Ok(Evaluation::Rejected(reason)) => {
            debug!(structure = %structure_id, reason = %reason, "Candidate rejected.");
            (CandidateOutcome::Rejected(reason), None)
        }
        Err(error) if error.is_recoverable() => {
            warn!(structure = %structure_id, error = %error, "Skipping candidate.");
            (CandidateOutcome::Failed(error.to_string()), None)
        }
        Err(error) => return Err(error),
    };
    context.reporter.report(Progress::CandidateFinished {
        structure_id: structure_id.to_string(),
        outcome,
    });
    Ok(accepted)
}

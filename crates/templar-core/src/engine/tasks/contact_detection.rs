use crate::core::models::numbering::ChainNumbering;
use crate::core::models::structure::{ChainId, StructureModel};
use crate::core::utils::geometry::any_within_distance;
use crate::engine::error::EngineError;
use nalgebra::Point3;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Whether the examined residue contacts each other chain of the structure.
pub type ContactMap = BTreeMap<char, bool>;

/// Computes the contact map of the residue at `sequence_index` (1-based, in
/// the chain's extracted sequence) of `chain`.
///
/// The index is translated to native numbering before the residue is looked
/// up. When `wild_type` is given and the residue found there has a different
/// identity, a warning is logged and detection continues.
#[instrument(skip_all, name = "contact_detection_task", fields(structure = %model.id(), chain = %chain))]
pub fn run(
    model: &StructureModel,
    chain: char,
    sequence_index: usize,
    wild_type: Option<char>,
    cutoff: f64,
) -> Result<ContactMap, EngineError> {
    let structure_error = |reason: String| EngineError::Structure {
        structure_id: model.id().to_string(),
        reason,
    };

    let chain_id = model
        .find_chain_by_id(chain)
        .ok_or_else(|| structure_error(format!("chain {} not found", chain)))?;
    let numbering = ChainNumbering::from_chain(model, chain_id).map_err(|source| {
        EngineError::DomainMapping {
            structure_id: model.id().to_string(),
            chain,
            source,
        }
    })?;
    let native = numbering
        .sequence_index_to_native(sequence_index)
        .map_err(|source| EngineError::DomainMapping {
            structure_id: model.id().to_string(),
            chain,
            source,
        })?;
    let residue_id = model
        .find_residue_by_number(chain_id, native)
        .ok_or_else(|| structure_error(format!("residue {} of chain {} not found", native, chain)))?;
    let residue = model
        .residue(residue_id)
        .ok_or_else(|| structure_error(format!("residue {} of chain {} has no record", native, chain)))?;

    if let Some(expected) = wild_type {
        let found = residue.one_letter_code();
        if found != Some(expected.to_ascii_uppercase()) {
            warn!(
                residue = native,
                expected = %expected,
                found = %residue.name,
                "Structure residue differs from the wild-type residue."
            );
        }
    }

    let target: Vec<Point3<f64>> = model.residue_atoms(residue_id).map(|a| a.position).collect();
    let others: Vec<(ChainId, char)> = model
        .chains_iter()
        .filter(|(id, _)| *id != chain_id)
        .map(|(id, c)| (id, c.id))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = others.iter();

    #[cfg(feature = "parallel")]
    let iterator = others.par_iter();

    let contacts: ContactMap = iterator
        .map(|&(other_id, other)| (other, chain_contacts(model, other_id, &target, cutoff)))
        .collect();

    debug!(residue = native, contacts = ?contacts, "Contact map computed.");
    Ok(contacts)
}

/// Whether any atom of any residue of `chain_id` (hetero groups included) lies
/// within `cutoff` of the target atoms. Stops at the first residue in contact.
fn chain_contacts(model: &StructureModel, chain_id: ChainId, target: &[Point3<f64>], cutoff: f64) -> bool {
    model.chain_residues(chain_id).any(|(residue_id, _)| {
        let atoms: Vec<Point3<f64>> = model.residue_atoms(residue_id).map(|a| a.position).collect();
        any_within_distance(target, &atoms, cutoff)
    })
}

//! # Data Sources
//!
//! Capability traits through which the pipelines look up sequences,
//! interactions, templates, resolutions and structures, together with the
//! records they return. [`store::DataStore`] implements every trait over a
//! directory of FASTA, CSV and PDB files; tests substitute in-memory sources.

pub mod store;

use crate::core::models::numbering::NativeSpan;
use crate::core::models::structure::StructureModel;
use crate::core::sequence::{Domain, SequenceRecord};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Interaction type whose entries describe linear motifs rather than
/// domain-domain contacts.
pub const ELM_INTERACTION: &str = "ELM";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("No sequence found for '{0}'")]
    SequenceNotFound(String),
    #[error("No domain templates for families '{0}' and '{1}'")]
    TemplatesNotFound(String, String),
    #[error("No resolution recorded for structure '{0}'")]
    ResolutionNotFound(String),
    #[error("Structure '{0}' is not available")]
    StructureNotFound(String),
    #[error("Failed to read {what}: {message}")]
    Unreadable { what: String, message: String },
}

/// A known interaction between two protein domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub protein_ids: (String, String),
    pub family_ids: (String, String),
    pub domains: (Domain, Domain),
    pub interaction_type: String,
}

impl Interaction {
    pub fn is_elm(&self) -> bool {
        self.interaction_type.eq_ignore_ascii_case(ELM_INTERACTION)
    }
}

/// A structure in which two domain families are observed in contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTemplate {
    pub structure_id: String,
    pub chains: (char, char),
    pub structure_domains: (NativeSpan, NativeSpan),
}

/// A structure covering a single domain of a protein.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreTemplateRecord {
    pub family_id: String,
    pub domain: Domain,
    pub structure_id: String,
    pub chain: char,
    pub structure_domain: NativeSpan,
}

/// Experimental quality of a structure. Lower experiment types and finer
/// resolutions are better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructureQuality {
    pub experiment_type: u32,
    pub resolution: f64,
}

pub trait SequenceSource: Send + Sync {
    fn sequence(&self, protein_id: &str) -> Result<SequenceRecord, LookupFailure>;
}

pub trait InteractionSource: Send + Sync {
    /// Every interaction the protein takes part in, oriented so that the
    /// protein is the first partner. Unknown proteins have no interactions.
    fn interactions(&self, protein_id: &str) -> Result<Vec<Interaction>, LookupFailure>;
}

pub trait DomainTemplateSource: Send + Sync {
    /// Templates for a family pair, with chains and spans in the order of the
    /// requested families.
    fn domain_templates(&self, family_a: &str, family_b: &str) -> Result<Vec<DomainTemplate>, LookupFailure>;
}

pub trait CoreTemplateSource: Send + Sync {
    fn core_templates(&self, protein_id: &str) -> Result<Vec<CoreTemplateRecord>, LookupFailure>;
}

pub trait ResolutionSource: Send + Sync {
    fn resolution(&self, structure_id: &str) -> Result<StructureQuality, LookupFailure>;
}

pub trait StructureSource: Send + Sync {
    fn structure(&self, structure_id: &str) -> Result<Arc<StructureModel>, LookupFailure>;
}

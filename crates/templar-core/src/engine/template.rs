use crate::core::alignment::{Alignment, AlignmentScore};
use crate::core::models::numbering::NativeSpan;
use crate::core::sequence::{Domain, Mutation, SequenceRecord};
use crate::sources::StructureQuality;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Core,
    Interface,
}

/// One protein's side of a template: the domain that was mapped and how it
/// aligned to its chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePartner {
    pub protein_id: String,
    pub family_id: String,
    /// Domain as requested by the template source.
    pub domain: Domain,
    /// Domain after loner trimming; equal to `domain` when not refined.
    pub refined_domain: Domain,
    pub chain: char,
    pub structure_domain: NativeSpan,
    pub domain_sequence: SequenceRecord,
    pub alignment: Alignment,
    pub score: AlignmentScore,
}

/// A structural template accepted for a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub kind: TemplateKind,
    pub structure_id: String,
    pub mutation: Mutation,
    /// The mutated protein.
    pub primary: TemplatePartner,
    /// The interacting protein of an interface template.
    pub partner: Option<TemplatePartner>,
    /// Mutation position relative to the refined domain (1-based).
    pub mutation_position_domain: usize,
    /// Mutation position in the extracted chain sequence (1-based).
    pub mutation_structure_index: usize,
    /// Mutation position in the structure's own residue numbering.
    pub mutation_native_number: isize,
    pub quality: StructureQuality,
    pub score: f64,
}

/// Identity shared by alternative templates of the same logical core domain
/// or interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub proteins: (String, Option<String>),
    pub families: (String, Option<String>),
    pub domains: (Domain, Option<Domain>),
}

impl Template {
    pub fn identity_key(&self) -> TemplateKey {
        let partner = self.partner.as_ref();
        TemplateKey {
            proteins: (
                self.primary.protein_id.clone(),
                partner.map(|p| p.protein_id.clone()),
            ),
            families: (
                self.primary.family_id.clone(),
                partner.map(|p| p.family_id.clone()),
            ),
            domains: (self.primary.domain, partner.map(|p| p.domain)),
        }
    }

    /// Combined score followed by the per-partner scores. Core templates
    /// repeat their only score and report zero for the missing partner.
    pub fn scores(&self) -> [f64; 3] {
        match &self.partner {
            Some(partner) => [
                self.score,
                self.primary.score.combined,
                partner.score.combined,
            ],
            None => [self.score, self.primary.score.combined, 0.0],
        }
    }
}

/// Why a candidate that mapped cleanly was still not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    OutsideDomain,
    OutsideRefinedDomain,
    InGap,
    NoPartnerContact,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::OutsideDomain => "mutation outside the domain",
            RejectionReason::OutsideRefinedDomain => "mutation outside the refined domain",
            RejectionReason::InGap => "mutation aligned to a gap",
            RejectionReason::NoPartnerContact => "mutated residue does not contact the partner chain",
        };
        f.write_str(text)
    }
}

/// Result of a template search for one mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "templates", rename_all = "kebab-case")]
pub enum TemplateSearch {
    Found(Vec<Template>),
    NoTemplate,
}

impl TemplateSearch {
    pub fn from_templates(templates: Vec<Template>) -> Self {
        if templates.is_empty() {
            TemplateSearch::NoTemplate
        } else {
            TemplateSearch::Found(templates)
        }
    }

    pub fn templates(&self) -> &[Template] {
        match self {
            TemplateSearch::Found(templates) => templates,
            TemplateSearch::NoTemplate => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, TemplateSearch::Found(_))
    }
}

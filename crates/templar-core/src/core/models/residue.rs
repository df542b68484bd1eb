use super::structure::{AtomId, ChainId};
use crate::core::utils::identifiers;

/// The full identity of a residue inside a chain: hetero flag, sequence number
/// and insertion code, mirroring how coordinate files disambiguate residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub hetero: bool,
    pub number: isize,
    pub insertion_code: Option<char>,
}

impl ResidueKey {
    pub fn standard(number: isize) -> Self {
        Self {
            hetero: false,
            number,
            insertion_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub key: ResidueKey,           // Hetero flag, number and insertion code from the file
    pub name: String,              // Three-letter residue name (e.g., "ALA", "HOH")
    pub chain_id: ChainId,         // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>, // Atoms in file order
}

impl Residue {
    pub(crate) fn new(key: ResidueKey, name: &str, chain_id: ChainId) -> Self {
        Self {
            key,
            name: name.trim().to_string(),
            chain_id,
            atoms: Vec::new(),
        }
    }

    pub fn number(&self) -> isize {
        self.key.number
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn one_letter_code(&self) -> Option<char> {
        identifiers::three_to_one(&self.name)
    }

    /// A residue that contributes to a chain's sequence: one of the twenty
    /// standard amino acids, not a hetero record, and without insertion code.
    pub fn is_sequence_residue(&self) -> bool {
        !self.key.hetero
            && self.key.insertion_code.is_none()
            && identifiers::is_standard_amino_acid(&self.name)
    }
}

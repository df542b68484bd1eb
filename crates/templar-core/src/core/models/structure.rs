use super::atom::Atom;
use super::chain::Chain;
use super::residue::{Residue, ResidueKey};
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

new_key_type! {
    pub struct AtomId;
    pub struct ResidueId;
    pub struct ChainId;
}

/// A parsed macromolecular structure: one model of a coordinate file with its
/// chains, residues and atoms.
///
/// Components are stored in slot maps and addressed by stable keys, with lookup
/// maps for chain letters and residue identities. Chains are iterated in the
/// order they first appeared in the source file.
#[derive(Debug, Clone, Default)]
pub struct StructureModel {
    id: String,
    atoms: SlotMap<AtomId, Atom>,
    residues: SlotMap<ResidueId, Residue>,
    chains: SlotMap<ChainId, Chain>,
    chain_order: Vec<ChainId>,
    chain_id_map: HashMap<char, ChainId>,
    residue_id_map: HashMap<(ChainId, ResidueKey), ResidueId>,
}

impl StructureModel {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Identifier of the structure (e.g., "1FOE").
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Iterates chains in file order.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue by its full identity within a chain.
    pub fn find_residue(&self, chain_id: ChainId, key: ResidueKey) -> Option<ResidueId> {
        self.residue_id_map.get(&(chain_id, key)).copied()
    }

    /// Finds the standard (non-hetero, no insertion code) residue with the
    /// given number.
    pub fn find_residue_by_number(&self, chain_id: ChainId, number: isize) -> Option<ResidueId> {
        self.find_residue(chain_id, ResidueKey::standard(number))
    }

    /// Iterates the residues of a chain in file order.
    pub fn chain_residues(&self, chain_id: ChainId) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.chains
            .get(chain_id)
            .into_iter()
            .flat_map(|chain| chain.residues.iter())
            .filter_map(|&id| self.residues.get(id).map(|residue| (id, residue)))
    }

    pub fn residue_atoms(&self, residue_id: ResidueId) -> impl Iterator<Item = &Atom> {
        self.residues
            .get(residue_id)
            .into_iter()
            .flat_map(|residue| residue.atoms.iter())
            .filter_map(|&id| self.atoms.get(id))
    }

    /// Returns the chain with the given letter, creating it if needed.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_order.push(chain_id);
        self.chain_id_map.insert(id, chain_id);
        chain_id
    }

    /// Adds a residue to a chain, or returns the existing residue with the same
    /// identity. Returns `None` if the chain does not exist.
    pub fn add_residue(&mut self, chain_id: ChainId, key: ResidueKey, name: &str) -> Option<ResidueId> {
        if let Some(&existing) = self.residue_id_map.get(&(chain_id, key)) {
            return Some(existing);
        }
        let chain = self.chains.get_mut(chain_id)?;
        let residue_id = self.residues.insert(Residue::new(key, name, chain_id));
        chain.residues.push(residue_id);
        self.residue_id_map.insert((chain_id, key), residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a residue. Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        atom.residue_id = residue_id;
        let atom_id = self.atoms.insert(atom);
        self.residues.get_mut(residue_id)?.atoms.push(atom_id);
        Some(atom_id)
    }
}

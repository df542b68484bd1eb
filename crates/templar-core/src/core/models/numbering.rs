use super::structure::{ChainId, StructureModel};
use crate::core::sequence::{Domain, SequenceRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Native residue number {0} is not observed in the chain")]
    PositionNotFound(isize),
    #[error("Sequence index {index} is out of range for a chain of {len} residues")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Native residue number {0} occurs more than once in the chain")]
    DuplicateNumber(isize),
    #[error("Chain has no standard amino-acid residues")]
    EmptyChain,
}

/// An inclusive range of native (author-assigned) residue numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeSpan {
    pub start: isize,
    pub end: isize,
}

impl NativeSpan {
    pub fn new(start: isize, end: isize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for NativeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Native residue numbers of a chain's sequence residues, in file order.
///
/// Position `i` (1-based) of the chain's extracted sequence corresponds to
/// native residue number `numbers[i - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainNumbering {
    numbers: Vec<isize>,
    index: HashMap<isize, usize>,
}

impl ChainNumbering {
    pub fn from_numbers(numbers: Vec<isize>) -> Result<Self, NumberingError> {
        if numbers.is_empty() {
            return Err(NumberingError::EmptyChain);
        }
        let mut index = HashMap::with_capacity(numbers.len());
        for (i, &number) in numbers.iter().enumerate() {
            if index.insert(number, i + 1).is_some() {
                return Err(NumberingError::DuplicateNumber(number));
            }
        }
        Ok(Self { numbers, index })
    }

    /// Builds the numbering for a chain, keeping only residues that take part
    /// in the chain's sequence.
    pub fn from_chain(model: &StructureModel, chain_id: ChainId) -> Result<Self, NumberingError> {
        let numbers = model
            .chain_residues(chain_id)
            .filter(|(_, residue)| residue.is_sequence_residue())
            .map(|(_, residue)| residue.number())
            .collect();
        Self::from_numbers(numbers)
    }

    pub fn numbers(&self) -> &[isize] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn sequence_index_to_native(&self, index: usize) -> Result<isize, NumberingError> {
        index
            .checked_sub(1)
            .and_then(|i| self.numbers.get(i))
            .copied()
            .ok_or(NumberingError::IndexOutOfRange {
                index,
                len: self.numbers.len(),
            })
    }

    pub fn native_to_sequence_index(&self, native: isize) -> Result<usize, NumberingError> {
        self.index
            .get(&native)
            .copied()
            .ok_or(NumberingError::PositionNotFound(native))
    }

    /// Converts a native span into 1-based sequence indices.
    ///
    /// The span is first clamped to the lowest and highest observed numbers;
    /// a clamped boundary that was never observed (missing density) fails.
    pub fn span_to_domain(&self, span: NativeSpan) -> Result<Domain, NumberingError> {
        let (min, max) = self.bounds();
        let start = self.native_to_sequence_index(span.start.max(min))?;
        let end = self.native_to_sequence_index(span.end.min(max))?;
        Domain::new(start, end).map_err(|_| NumberingError::PositionNotFound(span.end))
    }

    fn bounds(&self) -> (isize, isize) {
        let min = self.numbers.iter().copied().min().unwrap_or_default();
        let max = self.numbers.iter().copied().max().unwrap_or_default();
        (min, max)
    }
}

/// The one-letter sequence of a chain's sequence residues, identified as
/// structure id followed by the chain letter (e.g., "1FOEB").
pub fn chain_sequence(model: &StructureModel, chain_id: ChainId) -> Option<SequenceRecord> {
    let chain = model.chain(chain_id)?;
    let residues: String = model
        .chain_residues(chain_id)
        .filter(|(_, residue)| residue.is_sequence_residue())
        .filter_map(|(_, residue)| residue.one_letter_code())
        .collect();
    Some(SequenceRecord::new(
        &format!("{}{}", model.id(), chain.id),
        &residues,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::ResidueKey;

    fn gapped() -> ChainNumbering {
        ChainNumbering::from_numbers(vec![10, 11, 12, 15, 16]).unwrap()
    }

    #[test]
    fn native_lookup_skips_missing_density() {
        let numbering = gapped();
        assert_eq!(numbering.native_to_sequence_index(12), Ok(3));
        assert_eq!(numbering.native_to_sequence_index(15), Ok(4));
        assert_eq!(
            numbering.native_to_sequence_index(13),
            Err(NumberingError::PositionNotFound(13))
        );
    }

    #[test]
    fn sequence_index_is_one_based_and_bounded() {
        let numbering = gapped();
        assert_eq!(numbering.sequence_index_to_native(1), Ok(10));
        assert_eq!(numbering.sequence_index_to_native(5), Ok(16));
        assert_eq!(
            numbering.sequence_index_to_native(0),
            Err(NumberingError::IndexOutOfRange { index: 0, len: 5 })
        );
        assert_eq!(
            numbering.sequence_index_to_native(6),
            Err(NumberingError::IndexOutOfRange { index: 6, len: 5 })
        );
    }

    #[test]
    fn duplicates_and_empty_chains_are_rejected() {
        assert_eq!(
            ChainNumbering::from_numbers(vec![1, 2, 2]),
            Err(NumberingError::DuplicateNumber(2))
        );
        assert_eq!(
            ChainNumbering::from_numbers(Vec::new()),
            Err(NumberingError::EmptyChain)
        );
    }

    #[test]
    fn span_is_clamped_to_observed_numbers() {
        let numbering = gapped();
        let domain = numbering.span_to_domain(NativeSpan::new(-5, 100)).unwrap();
        assert_eq!((domain.start(), domain.end()), (1, 5));
        let domain = numbering.span_to_domain(NativeSpan::new(11, 15)).unwrap();
        assert_eq!((domain.start(), domain.end()), (2, 4));
    }

    #[test]
    fn span_boundary_in_missing_density_fails() {
        let numbering = gapped();
        assert_eq!(
            numbering.span_to_domain(NativeSpan::new(13, 16)),
            Err(NumberingError::PositionNotFound(13))
        );
    }

    #[test]
    fn chain_numbering_and_sequence_skip_non_sequence_residues() {
        let mut model = StructureModel::new("1FOE");
        let chain = model.add_chain('B');
        model.add_residue(chain, ResidueKey::standard(1), "MET");
        model.add_residue(
            chain,
            ResidueKey {
                insertion_code: Some('A'),
                ..ResidueKey::standard(1)
            },
            "GLY",
        );
        model.add_residue(chain, ResidueKey::standard(2), "MSE");
        model.add_residue(chain, ResidueKey::standard(3), "LYS");
        model.add_residue(
            chain,
            ResidueKey {
                hetero: true,
                ..ResidueKey::standard(4)
            },
            "HOH",
        );

        let numbering = ChainNumbering::from_chain(&model, chain).unwrap();
        assert_eq!(numbering.numbers(), &[1, 3]);
        let sequence = chain_sequence(&model, chain).unwrap();
        assert_eq!(sequence.id, "1FOEB");
        assert_eq!(sequence.residues, "MK");
    }
}

use super::loners::ScanDirection;
use crate::core::sequence::SequenceRecord;
use serde::Serialize;
use thiserror::Error;

/// The gap symbol of aligned rows.
pub const GAP: u8 = b'-';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("A pairwise alignment needs exactly two rows (got {0})")]
    RowCount(usize),
    #[error("Aligned rows have different lengths ({first} and {second})")]
    LengthMismatch { first: usize, second: usize },
    #[error("Column {0} is a gap in both rows")]
    DoubleGap(usize),
    #[error("No aligned row has identifier '{0}'")]
    UnknownRow(String),
    #[error("Aligned row '{0}' contains non-ASCII characters")]
    NonAscii(String),
    #[error("Aligned row '{0}' does not reproduce its input sequence")]
    ContentMismatch(String),
    #[error("Position {position} lies outside the {len} residues of the reference row")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("Loner trim at the {side} end came out negative ({amount})")]
    NegativeTrim { side: ScanDirection, amount: isize },
}

/// One gapped row of a pairwise alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedRow {
    pub id: String,
    residues: String,
}

impl AlignedRow {
    pub fn new(id: &str, residues: &str) -> Result<Self, AlignmentError> {
        if !residues.is_ascii() {
            return Err(AlignmentError::NonAscii(id.to_string()));
        }
        Ok(Self {
            id: id.to_string(),
            residues: residues.to_string(),
        })
    }

    pub fn residues(&self) -> &str {
        &self.residues
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.residues.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn is_gap(&self, column: usize) -> bool {
        self.as_bytes().get(column) == Some(&GAP)
    }

    /// Number of non-gap symbols.
    pub fn ungapped_len(&self) -> usize {
        self.as_bytes().iter().filter(|&&b| b != GAP).count()
    }

    pub fn ungapped(&self) -> SequenceRecord {
        let residues: String = self.residues.chars().filter(|&c| c != GAP as char).collect();
        SequenceRecord::new(&self.id, &residues)
    }
}

/// A validated two-row gapped alignment.
///
/// Both rows have the same length and no column is a gap in both rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alignment {
    rows: [AlignedRow; 2],
}

impl Alignment {
    pub fn new(first: AlignedRow, second: AlignedRow) -> Result<Self, AlignmentError> {
        if first.len() != second.len() {
            return Err(AlignmentError::LengthMismatch {
                first: first.len(),
                second: second.len(),
            });
        }
        if let Some(column) = first
            .as_bytes()
            .iter()
            .zip(second.as_bytes())
            .position(|(&a, &b)| a == GAP && b == GAP)
        {
            return Err(AlignmentError::DoubleGap(column));
        }
        Ok(Self {
            rows: [first, second],
        })
    }

    pub fn from_rows(rows: Vec<AlignedRow>) -> Result<Self, AlignmentError> {
        let count = rows.len();
        let [first, second]: [AlignedRow; 2] = rows
            .try_into()
            .map_err(|_| AlignmentError::RowCount(count))?;
        Self::new(first, second)
    }

    pub fn rows(&self) -> &[AlignedRow; 2] {
        &self.rows
    }

    pub fn first(&self) -> &AlignedRow {
        &self.rows[0]
    }

    pub fn second(&self) -> &AlignedRow {
        &self.rows[1]
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.rows[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows[0].is_empty()
    }

    /// Splits the alignment into the row identified by `reference_id` and the
    /// other row.
    pub fn split(&self, reference_id: &str) -> Result<(&AlignedRow, &AlignedRow), AlignmentError> {
        let [first, second] = &self.rows;
        if first.id == reference_id {
            Ok((first, second))
        } else if second.id == reference_id {
            Ok((second, first))
        } else {
            Err(AlignmentError::UnknownRow(reference_id.to_string()))
        }
    }

    /// The same alignment with its rows swapped.
    pub fn swapped(&self) -> Self {
        let [first, second] = self.rows.clone();
        Self {
            rows: [second, first],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, residues: &str) -> AlignedRow {
        AlignedRow::new(id, residues).unwrap()
    }

    #[test]
    fn valid_alignment_exposes_rows_and_length() {
        let alignment = Alignment::new(row("Q", "MKT-A"), row("S", "MK-YA")).unwrap();
        assert_eq!(alignment.len(), 5);
        assert_eq!(alignment.first().ungapped_len(), 4);
        assert_eq!(alignment.second().ungapped().residues, "MKYA");
        assert!(alignment.first().is_gap(3));
        assert!(!alignment.first().is_gap(2));
    }

    #[test]
    fn rows_of_different_length_are_rejected() {
        assert_eq!(
            Alignment::new(row("Q", "MKT"), row("S", "MK")),
            Err(AlignmentError::LengthMismatch { first: 3, second: 2 })
        );
    }

    #[test]
    fn double_gap_column_is_rejected() {
        assert_eq!(
            Alignment::new(row("Q", "M-KT"), row("S", "M-KT")),
            Err(AlignmentError::DoubleGap(1))
        );
    }

    #[test]
    fn row_count_must_be_two() {
        assert_eq!(
            Alignment::from_rows(vec![row("Q", "MK")]),
            Err(AlignmentError::RowCount(1))
        );
        assert_eq!(
            Alignment::from_rows(vec![row("A", "M"), row("B", "M"), row("C", "M")]),
            Err(AlignmentError::RowCount(3))
        );
    }

    #[test]
    fn split_puts_reference_row_first() {
        let alignment = Alignment::new(row("Q", "MK"), row("S", "MK")).unwrap();
        let (reference, other) = alignment.split("S").unwrap();
        assert_eq!((reference.id.as_str(), other.id.as_str()), ("S", "Q"));
        assert_eq!(
            alignment.split("X"),
            Err(AlignmentError::UnknownRow("X".to_string()))
        );
    }

    #[test]
    fn non_ascii_rows_are_rejected() {
        assert_eq!(
            AlignedRow::new("Q", "MKé"),
            Err(AlignmentError::NonAscii("Q".to_string()))
        );
    }
}

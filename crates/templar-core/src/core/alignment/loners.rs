use super::alignment::{AlignedRow, Alignment, AlignmentError, GAP};
use crate::core::utils::identifiers::STANDARD_AMINO_ACIDS;
use serde::Serialize;
use std::fmt;

/// Default block-to-gap ratio at or below which a terminal block is a loner.
pub const DEFAULT_LONER_RATIO: f64 = 0.2;

/// Which end of an aligned row a scan starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScanDirection {
    Leading,
    Trailing,
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanDirection::Leading => write!(f, "leading"),
            ScanDirection::Trailing => write!(f, "trailing"),
        }
    }
}

/// Which sequence of a query/structure alignment a loner is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowRole {
    Query,
    Structure,
}

/// Column indices of a terminal residue block followed by a gap.
///
/// For a leading scan `seq_begin < seq_end < gap_end`; for a trailing scan the
/// indices decrease in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapBlock {
    /// First residue column of the terminal block.
    pub seq_begin: usize,
    /// First gap column after the block.
    pub seq_end: usize,
    /// First residue column after the gap.
    pub gap_end: usize,
}

impl GapBlock {
    pub fn block_len(&self) -> usize {
        self.seq_end.abs_diff(self.seq_begin)
    }

    pub fn gap_len(&self) -> usize {
        self.gap_end.abs_diff(self.seq_end)
    }

    /// Number of residues of the opposing sequence to remove so that the
    /// loner block no longer pulls it out of place.
    pub fn trim_amount(
        &self,
        direction: ScanDirection,
        alignment_len: usize,
    ) -> Result<usize, AlignmentError> {
        let (seq_begin, seq_end, gap_end) = (
            self.seq_begin as isize,
            self.seq_end as isize,
            self.gap_end as isize,
        );
        let amount = match direction {
            ScanDirection::Leading => gap_end - (seq_end - seq_begin),
            ScanDirection::Trailing => (alignment_len as isize - gap_end) - (seq_begin - seq_end),
        };
        usize::try_from(amount).map_err(|_| AlignmentError::NegativeTrim {
            side: direction,
            amount,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    First,
    ResidueStarted,
    GapStarted,
}

/// Finds short residue blocks at the ends of an aligned row that are separated
/// from the rest by a disproportionately long gap.
#[derive(Debug, Clone)]
pub struct LonerDetector {
    alphabet: [bool; 256],
    ratio: f64,
}

impl Default for LonerDetector {
    fn default() -> Self {
        Self::new(STANDARD_AMINO_ACIDS, DEFAULT_LONER_RATIO)
    }
}

impl LonerDetector {
    /// Symbols outside `alphabet` (other than the gap) are skipped by scans.
    pub fn new(alphabet: &str, ratio: f64) -> Self {
        let mut table = [false; 256];
        for b in alphabet.bytes() {
            table[b as usize] = true;
        }
        Self {
            alphabet: table,
            ratio,
        }
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Locates the first residue block and the gap that follows it, scanning
    /// from the given end. Returns `None` if the row has no such block.
    pub fn scan(&self, row: &[u8], direction: ScanDirection) -> Option<GapBlock> {
        let columns: Box<dyn Iterator<Item = usize>> = match direction {
            ScanDirection::Leading => Box::new(0..row.len()),
            ScanDirection::Trailing => Box::new((0..row.len()).rev()),
        };

        let mut state = ScanState::First;
        let (mut seq_begin, mut seq_end) = (0, 0);
        for i in columns {
            let symbol = row[i];
            match state {
                ScanState::First if self.alphabet[symbol as usize] => {
                    seq_begin = i;
                    state = ScanState::ResidueStarted;
                }
                ScanState::ResidueStarted if symbol == GAP => {
                    seq_end = i;
                    state = ScanState::GapStarted;
                }
                ScanState::GapStarted if self.alphabet[symbol as usize] => {
                    return Some(GapBlock {
                        seq_begin,
                        seq_end,
                        gap_end: i,
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// Returns the terminal block if it qualifies as a loner: the gap is
    /// longer than the block, or the block-to-gap ratio is at or below the
    /// configured threshold.
    pub fn detect(&self, row: &[u8], direction: ScanDirection) -> Option<GapBlock> {
        self.scan(row, direction).filter(|block| self.is_loner(block))
    }

    fn is_loner(&self, block: &GapBlock) -> bool {
        let (block_len, gap_len) = (block.block_len(), block.gap_len());
        gap_len > block_len || block_len as f64 / gap_len as f64 <= self.ratio
    }
}

/// A loner found at one end of a query/structure alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loner {
    pub direction: ScanDirection,
    /// The sequence whose overhang produced the loner; this is the one to trim.
    pub attributed_to: RowRole,
    pub block: GapBlock,
    pub trim: usize,
}

/// Checks one end of the alignment for a loner.
///
/// The row that shows the first gap from that end is scanned; a loner found
/// there is attributed to the opposite sequence, whose extra residues forced
/// the gap open.
pub fn find_loner(
    alignment: &Alignment,
    structure_id: &str,
    direction: ScanDirection,
    detector: &LonerDetector,
) -> Result<Option<Loner>, AlignmentError> {
    let (structure, query) = alignment.split(structure_id)?;
    let Some((scanned, attributed_to)) = gapped_row(query, structure, direction) else {
        return Ok(None);
    };
    let Some(block) = detector.detect(scanned.as_bytes(), direction) else {
        return Ok(None);
    };
    let trim = block.trim_amount(direction, alignment.len())?;
    Ok(Some(Loner {
        direction,
        attributed_to,
        block,
        trim,
    }))
}

fn gapped_row<'a>(
    query: &'a AlignedRow,
    structure: &'a AlignedRow,
    direction: ScanDirection,
) -> Option<(&'a AlignedRow, RowRole)> {
    let len = query.len();
    let columns: Box<dyn Iterator<Item = usize>> = match direction {
        ScanDirection::Leading => Box::new(0..len),
        ScanDirection::Trailing => Box::new((0..len).rev()),
    };
    for column in columns {
        if query.is_gap(column) {
            return Some((query, RowRole::Structure));
        }
        if structure.is_gap(column) {
            return Some((structure, RowRole::Query));
        }
    }
    None
}

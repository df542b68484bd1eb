use super::alignment::{Alignment, AlignmentError, GAP};
use serde::Serialize;

/// Where a reference position lands in the other row of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Projection {
    /// 1-based position in the ungapped target sequence.
    Mapped(usize),
    /// The reference residue is aligned against a gap.
    InGap,
}

impl Projection {
    pub fn position(&self) -> Option<usize> {
        match self {
            Projection::Mapped(position) => Some(*position),
            Projection::InGap => None,
        }
    }
}

/// Projects a 1-based position of the row identified by `reference_id` onto
/// the other row.
pub fn project_position(
    alignment: &Alignment,
    reference_id: &str,
    position: usize,
) -> Result<Projection, AlignmentError> {
    let (reference, target) = alignment.split(reference_id)?;
    let len = reference.ungapped_len();
    if position == 0 || position > len {
        return Err(AlignmentError::PositionOutOfRange { position, len });
    }

    let (reference, target) = (reference.as_bytes(), target.as_bytes());
    let mut reference_count = 0;
    let mut target_count = 0;
    for column in 0..reference.len() {
        if reference_count >= position - 1 && reference[column] != GAP {
            return Ok(if target[column] == GAP {
                Projection::InGap
            } else {
                Projection::Mapped(target_count + 1)
            });
        }
        if reference[column] == GAP {
            target_count += 1;
        } else if target[column] == GAP {
            reference_count += 1;
        } else {
            reference_count += 1;
            target_count += 1;
        }
    }
    Err(AlignmentError::PositionOutOfRange { position, len })
}

use super::alignment::{Alignment, GAP};
use serde::Serialize;

/// Default weight of identity in [`combined_score`].
pub const DEFAULT_IDENTITY_WEIGHT: f64 = 0.95;

/// Percent identity: columns where both rows hold the same residue, over the
/// shorter ungapped sequence.
pub fn identity(alignment: &Alignment) -> f64 {
    let [first, second] = alignment.rows();
    let shorter = first.ungapped_len().min(second.ungapped_len());
    if shorter == 0 {
        return 0.0;
    }
    let matches = first
        .as_bytes()
        .iter()
        .zip(second.as_bytes())
        .filter(|&(&a, &b)| a != GAP && a == b)
        .count();
    100.0 * matches as f64 / shorter as f64
}

/// Percent coverage: the shorter ungapped sequence over the longer one.
pub fn coverage(alignment: &Alignment) -> f64 {
    let [first, second] = alignment.rows();
    let (a, b) = (first.ungapped_len(), second.ungapped_len());
    let longer = a.max(b);
    if longer == 0 {
        return 0.0;
    }
    100.0 * a.min(b) as f64 / longer as f64
}

/// Blends percent identity and coverage into a single value in `[0, 1]`.
pub fn combined_score(identity: f64, coverage: f64, identity_weight: f64) -> f64 {
    identity_weight * (identity / 100.0) * (coverage / 100.0)
        + (1.0 - identity_weight) * (coverage / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentScore {
    pub identity: f64,
    pub coverage: f64,
    pub combined: f64,
}

impl AlignmentScore {
    pub fn of(alignment: &Alignment, identity_weight: f64) -> Self {
        let identity = identity(alignment);
        let coverage = coverage(alignment);
        Self {
            identity,
            coverage,
            combined: combined_score(identity, coverage, identity_weight),
        }
    }
}

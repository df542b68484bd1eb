use super::{Aligner, AlignerError};
use crate::core::alignment::{AlignedRow, Alignment, GAP};
use crate::core::sequence::SequenceRecord;
use crate::engine::workspace::Workspace;

const NEG_INF: i32 = i32::MIN / 4;

/// Scores for [`GlobalAligner`]. Gap penalties are negative; a gap of length
/// `k` costs `gap_open + (k - 1) * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalScoring {
    pub match_score: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    /// Leading and trailing gaps cost nothing.
    pub free_end_gaps: bool,
}

impl Default for GlobalScoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch: -1,
            gap_open: -4,
            gap_extend: -1,
            free_end_gaps: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Match,
    GapInSecond,
    GapInFirst,
}

fn best_of(options: [(i32, State); 3]) -> (i32, State) {
    options
        .into_iter()
        .fold((NEG_INF - 1, State::Match), |best, option| {
            if option.0 > best.0 { option } else { best }
        })
}

/// Global alignment with affine gap penalties (Gotoh), computed in process.
///
/// Ties are broken in favour of matches, then gaps in the second sequence,
/// then gaps in the first, so results are deterministic.
#[derive(Debug, Clone, Default)]
pub struct GlobalAligner {
    scoring: GlobalScoring,
}

impl GlobalAligner {
    pub fn new(scoring: GlobalScoring) -> Self {
        Self { scoring }
    }

    fn end_gap(&self, length: usize) -> i32 {
        if self.scoring.free_end_gaps || length == 0 {
            0
        } else {
            self.scoring.gap_open + (length as i32 - 1) * self.scoring.gap_extend
        }
    }

    fn gap_costs(&self, at_end: bool) -> (i32, i32) {
        if self.scoring.free_end_gaps && at_end {
            (0, 0)
        } else {
            (self.scoring.gap_open, self.scoring.gap_extend)
        }
    }

    fn align_residues(&self, a: &[u8], b: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let (n, m) = (a.len(), b.len());
        let width = m + 1;
        let idx = |i: usize, j: usize| i * width + j;
        let cells = (n + 1) * width;

        let mut match_scores = vec![NEG_INF; cells];
        let mut gap_second = vec![NEG_INF; cells];
        let mut gap_first = vec![NEG_INF; cells];
        let mut match_from = vec![State::Match; cells];
        let mut gap_second_from = vec![State::Match; cells];
        let mut gap_first_from = vec![State::Match; cells];

        match_scores[0] = 0;
        for i in 1..=n {
            gap_second[idx(i, 0)] = self.end_gap(i);
            gap_second_from[idx(i, 0)] = if i == 1 { State::Match } else { State::GapInSecond };
        }
        for j in 1..=m {
            gap_first[idx(0, j)] = self.end_gap(j);
            gap_first_from[idx(0, j)] = if j == 1 { State::Match } else { State::GapInFirst };
        }

        for i in 1..=n {
            for j in 1..=m {
                let here = idx(i, j);

                let diagonal = idx(i - 1, j - 1);
                let substitution = if a[i - 1].eq_ignore_ascii_case(&b[j - 1]) {
                    self.scoring.match_score
                } else {
                    self.scoring.mismatch
                };
                let (best, from) = best_of([
                    (match_scores[diagonal], State::Match),
                    (gap_second[diagonal], State::GapInSecond),
                    (gap_first[diagonal], State::GapInFirst),
                ]);
                match_scores[here] = best + substitution;
                match_from[here] = from;

                let up = idx(i - 1, j);
                let (open, extend) = self.gap_costs(j == m);
                let (best, from) = best_of([
                    (match_scores[up] + open, State::Match),
                    (gap_second[up] + extend, State::GapInSecond),
                    (gap_first[up] + open, State::GapInFirst),
                ]);
                gap_second[here] = best;
                gap_second_from[here] = from;

                let left = idx(i, j - 1);
                let (open, extend) = self.gap_costs(i == n);
                let (best, from) = best_of([
                    (match_scores[left] + open, State::Match),
                    (gap_second[left] + open, State::GapInSecond),
                    (gap_first[left] + extend, State::GapInFirst),
                ]);
                gap_first[here] = best;
                gap_first_from[here] = from;
            }
        }

        let end = idx(n, m);
        let (_, mut state) = best_of([
            (match_scores[end], State::Match),
            (gap_second[end], State::GapInSecond),
            (gap_first[end], State::GapInFirst),
        ]);

        let mut row_a = Vec::with_capacity(n + m);
        let mut row_b = Vec::with_capacity(n + m);
        let (mut i, mut j) = (n, m);
        while i > 0 || j > 0 {
            let here = idx(i, j);
            match state {
                State::Match => {
                    row_a.push(a[i - 1]);
                    row_b.push(b[j - 1]);
                    state = match_from[here];
                    i -= 1;
                    j -= 1;
                }
                State::GapInSecond => {
                    row_a.push(a[i - 1]);
                    row_b.push(GAP);
                    state = gap_second_from[here];
                    i -= 1;
                }
                State::GapInFirst => {
                    row_a.push(GAP);
                    row_b.push(b[j - 1]);
                    state = gap_first_from[here];
                    j -= 1;
                }
            }
        }
        row_a.reverse();
        row_b.reverse();
        (row_a, row_b)
    }
}

impl Aligner for GlobalAligner {
    fn name(&self) -> &str {
        "builtin"
    }

    fn align(
        &self,
        query: &SequenceRecord,
        structure: &SequenceRecord,
        _workspace: &Workspace,
    ) -> Result<Alignment, AlignerError> {
        let (row_a, row_b) = self.align_residues(query.residues.as_bytes(), structure.residues.as_bytes());
        let first = AlignedRow::new(&query.id, &String::from_utf8_lossy(&row_a))?;
        let second = AlignedRow::new(&structure.id, &String::from_utf8_lossy(&row_b))?;
        Ok(Alignment::new(first, second)?)
    }
}

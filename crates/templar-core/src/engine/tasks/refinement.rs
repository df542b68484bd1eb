use crate::core::alignment::{Alignment, AlignmentScore, RowRole, ScanDirection, find_loner};
use crate::core::sequence::SequenceRecord;
use crate::engine::context::AlignmentContext;
use crate::engine::error::EngineError;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Residues removed (or flagged) at each end of a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrimTally {
    pub leading: usize,
    pub trailing: usize,
}

impl TrimTally {
    pub fn total(&self) -> usize {
        self.leading + self.trailing
    }
}

/// A stable alignment together with the trims that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub alignment: Alignment,
    pub score: AlignmentScore,
    /// The query as it was last aligned.
    pub query: SequenceRecord,
    /// Residues removed from the query, summed over all rounds.
    pub query_trims: TrimTally,
    /// Overhang attributed to the structure, summed over every scan. The
    /// structure itself is never trimmed.
    pub structure_trims: TrimTally,
    pub rounds: usize,
}

/// Repeatedly trims loner-inducing overhang from the query and re-aligns it
/// against the unchanged structure sequence until nothing more is trimmed.
#[instrument(skip_all, name = "refinement_task", fields(query = %query.id, structure = %structure.id))]
pub fn run(
    context: &AlignmentContext,
    alignment: Alignment,
    score: AlignmentScore,
    query: &SequenceRecord,
    structure: &SequenceRecord,
) -> Result<Refinement, EngineError> {
    let detector = context.config.loner_detector();
    let max_rounds = context
        .config
        .max_refinement_rounds
        .unwrap_or(query.len() + 1);

    let mut state = Refinement {
        alignment,
        score,
        query: query.clone(),
        query_trims: TrimTally::default(),
        structure_trims: TrimTally::default(),
        rounds: 0,
    };

    loop {
        let mut query_trim = TrimTally::default();
        let mut structure_trim = TrimTally::default();
        for direction in [ScanDirection::Leading, ScanDirection::Trailing] {
            let Some(loner) = find_loner(&state.alignment, &structure.id, direction, &detector)? else {
                continue;
            };
            let tally = match loner.attributed_to {
                RowRole::Query => &mut query_trim,
                RowRole::Structure => &mut structure_trim,
            };
            match direction {
                ScanDirection::Leading => tally.leading = loner.trim,
                ScanDirection::Trailing => tally.trailing = loner.trim,
            }
        }
        state.structure_trims.leading += structure_trim.leading;
        state.structure_trims.trailing += structure_trim.trailing;

        if query_trim.total() == 0 {
            break;
        }
        let Some(trimmed) = state.query.trimmed(query_trim.leading, query_trim.trailing) else {
            warn!(
                leading = query_trim.leading,
                trailing = query_trim.trailing,
                query_len = state.query.len(),
                "Loner trims would consume the whole query; keeping the current alignment."
            );
            break;
        };
        if state.rounds >= max_rounds {
            warn!(rounds = state.rounds, "Refinement round limit reached.");
            break;
        }

        state.rounds += 1;
        state.query_trims.leading += query_trim.leading;
        state.query_trims.trailing += query_trim.trailing;
        debug!(
            round = state.rounds,
            leading = query_trim.leading,
            trailing = query_trim.trailing,
            query_len = trimmed.len(),
            "Trimmed loner overhang from the query."
        );

        let (alignment, score) = context.align(&trimmed, structure)?;
        state.alignment = alignment;
        state.score = score;
        state.query = trimmed;
    }

    info!(
        rounds = state.rounds,
        leading = state.query_trims.leading,
        trailing = state.query_trims.trailing,
        structure_leading = state.structure_trims.leading,
        structure_trailing = state.structure_trims.trailing,
        score = state.score.combined,
        "Alignment refinement converged."
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::AlignedRow;
    use crate::engine::config::MappingConfigBuilder;
    use crate::engine::testing::{StubAligner, TestBench};

    fn aligned(query_row: &str, structure_row: &str) -> (Alignment, AlignmentScore) {
        let alignment = Alignment::new(
            AlignedRow::new("P1", query_row).unwrap(),
            AlignedRow::new("1ABCA", structure_row).unwrap(),
        )
        .unwrap();
        let score = AlignmentScore::of(&alignment, 0.95);
        (alignment, score)
    }

    mod convergence {
        use super::*;

        // The structure's lone M is pulled onto the query's first residue,
        // leaving query residues hanging over a gap.
        fn loner_aligner() -> StubAligner {
            StubAligner::new()
                .with_alignment("MKTAYIQR", "M---YIQR")
                .with_alignment("AYIQR", "MYIQR")
        }

        fn refine_once(context: &AlignmentContext) -> Refinement {
            let query = SequenceRecord::new("P1", "MKTAYIQR");
            let structure = SequenceRecord::new("1ABCA", "MYIQR");
            let (alignment, score) = context.align(&query, &structure).unwrap();
            run(context, alignment, score, &query, &structure).unwrap()
        }

        #[test]
        fn query_overhang_is_trimmed_until_stable() {
            let bench = TestBench::new();
            let aligner = loner_aligner();
            let refined = refine_once(&bench.context(&aligner));

            assert_eq!(refined.query.residues, "AYIQR");
            assert_eq!(refined.query_trims, TrimTally { leading: 3, trailing: 0 });
            assert_eq!(refined.structure_trims, TrimTally::default());
            assert_eq!(refined.rounds, 1);
            assert_eq!(refined.alignment.first().residues(), "AYIQR");
            assert_eq!(refined.score.coverage, 100.0);
            assert_eq!(aligner.calls(), 2);
        }

        #[test]
        fn rerunning_a_stable_alignment_trims_nothing() {
            let bench = TestBench::new();
            let aligner = loner_aligner();
            let context = bench.context(&aligner);
            let refined = refine_once(&context);

            let structure = SequenceRecord::new("1ABCA", "MYIQR");
            let again = run(
                &context,
                refined.alignment.clone(),
                refined.score,
                &refined.query,
                &structure,
            )
            .unwrap();

            assert_eq!(again.rounds, 0);
            assert_eq!(again.query_trims, TrimTally::default());
            assert_eq!(again.alignment, refined.alignment);
            assert_eq!(again.query, refined.query);
            assert_eq!(aligner.calls(), 2);
        }

        #[test]
        fn gapless_alignment_is_already_stable() {
            let bench = TestBench::new();
            let aligner = StubAligner::new();
            let context = bench.context(&aligner);
            let query = SequenceRecord::new("P1", "MKTAYIAKQR");
            let structure = SequenceRecord::new("1ABCA", "MKTAYIAKQR");
            let (alignment, score) = context.align(&query, &structure).unwrap();

            let refined = run(&context, alignment, score, &query, &structure).unwrap();
            assert_eq!(refined.rounds, 0);
            assert_eq!(refined.query, query);
            assert_eq!(aligner.calls(), 1);
        }
    }

    mod policy {
        use super::*;

        #[test]
        fn structure_overhang_is_tallied_but_never_trimmed() {
            let bench = TestBench::new();
            let aligner = StubAligner::new();
            let context = bench.context(&aligner);
            let query = SequenceRecord::new("P1", "MYIQR");
            let structure = SequenceRecord::new("1ABCA", "MKTAYIQR");
            let (alignment, score) = aligned("M---YIQR", "MKTAYIQR");

            let refined = run(&context, alignment.clone(), score, &query, &structure).unwrap();

            assert_eq!(refined.query, query);
            assert_eq!(refined.rounds, 0);
            assert_eq!(refined.structure_trims, TrimTally { leading: 3, trailing: 0 });
            assert_eq!(refined.alignment, alignment);
            assert_eq!(aligner.calls(), 0);
        }

        #[test]
        fn structure_overhang_is_kept_after_it_disappears() {
            let bench = TestBench::new();
            let aligner = StubAligner::new().with_alignment("AYIQR----", "MYIQWWWWL");
            let context = bench.context(&aligner);
            let query = SequenceRecord::new("P1", "MKTAYIQR");
            let structure = SequenceRecord::new("1ABCA", "MYIQWWWWL");
            let (alignment, score) = aligned("MKTAYIQ----R", "M---YIQWWWWL");

            let refined = run(&context, alignment, score, &query, &structure).unwrap();

            assert_eq!(refined.rounds, 1);
            assert_eq!(refined.query.residues, "AYIQR");
            assert_eq!(refined.query_trims, TrimTally { leading: 3, trailing: 0 });
            assert_eq!(refined.structure_trims, TrimTally { leading: 0, trailing: 5 });
            assert_eq!(refined.alignment.second().residues(), "MYIQWWWWL");
            assert_eq!(aligner.calls(), 1);
        }

        #[test]
        fn trims_covering_the_whole_query_stop_refinement() {
            let bench = TestBench::new();
            let aligner = StubAligner::new();
            let context = bench.context(&aligner);
            let query = SequenceRecord::new("P1", "MKTA");
            let structure = SequenceRecord::new("1ABCA", "MA");
            let (alignment, score) = aligned("MKTA", "M--A");

            let refined = run(&context, alignment.clone(), score, &query, &structure).unwrap();

            assert_eq!(refined.query, query);
            assert_eq!(refined.rounds, 0);
            assert_eq!(refined.query_trims, TrimTally::default());
            assert_eq!(refined.alignment, alignment);
            assert_eq!(aligner.calls(), 0);
        }

        #[test]
        fn round_limit_bounds_the_loop() {
            let config = MappingConfigBuilder::new()
                .contact_distance(5.0)
                .identity_weight(0.95)
                .loner_ratio(0.2)
                .max_refinement_rounds(1)
                .build()
                .unwrap();
            let bench = TestBench::with_config(config);
            let aligner = StubAligner::new().with_alignment("AMKTAYIQR", "MM---YIQR");
            let context = bench.context(&aligner);
            let query = SequenceRecord::new("P1", "MKTAMKTAYIQR");
            let structure = SequenceRecord::new("1ABCA", "MMYIQR");
            let (alignment, score) = aligned("MKTAMKTAYIQR", "M---M---YIQR");

            let refined = run(&context, alignment, score, &query, &structure).unwrap();

            assert_eq!(refined.rounds, 1);
            assert_eq!(refined.query.residues, "AMKTAYIQR");
            assert_eq!(refined.alignment.second().residues(), "MM---YIQR");
            assert_eq!(aligner.calls(), 1);
        }
    }
}

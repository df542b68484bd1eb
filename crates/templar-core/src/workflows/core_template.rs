use super::{Evaluation, checked_sequence, locate_mutation, settle, template_partner};
use crate::core::sequence::{Mutation, SequenceRecord};
use crate::engine::context::AlignmentContext;
use crate::engine::error::EngineError;
use crate::engine::mapping::map_to_structure;
use crate::engine::progress::Progress;
use crate::engine::tasks::selection;
use crate::engine::template::{RejectionReason, Template, TemplateKind, TemplateSearch};
use crate::sources::{CoreTemplateRecord, CoreTemplateSource, ResolutionSource, SequenceSource, StructureSource};
use tracing::{info, instrument, warn};

/// Finds the best single-chain template for each domain of `protein_id` that
/// contains the mutation.
#[instrument(skip_all, name = "core_template_workflow", fields(protein = %protein_id, mutation = %mutation))]
pub fn run<S>(
    sources: &S,
    context: &AlignmentContext,
    protein_id: &str,
    mutation: &Mutation,
) -> Result<TemplateSearch, EngineError>
where
    S: SequenceSource + CoreTemplateSource + ResolutionSource + StructureSource + ?Sized,
{
    let Some(sequence) = checked_sequence(sources, protein_id, mutation)? else {
        return Ok(TemplateSearch::NoTemplate);
    };
    let records = match sources.core_templates(protein_id) {
        Ok(records) => records,
        Err(failure) => {
            warn!(error = %failure, "Core templates unavailable.");
            return Ok(TemplateSearch::NoTemplate);
        }
    };

    context.reporter.report(Progress::PassStart {
        name: "Core templates",
        total_candidates: records.len() as u64,
    });
    let mut accepted = Vec::new();
    for record in &records {
        let result = evaluate(sources, context, &sequence, mutation, record);
        if let Some(template) = settle(context, &record.structure_id, result)? {
            accepted.push(template);
        }
    }
    context.reporter.report(Progress::PassFinish);

    let winners = selection::run(accepted);
    info!(candidates = records.len(), templates = winners.len(), "Core template search finished.");
    Ok(TemplateSearch::from_templates(winners))
}

fn evaluate<S>(
    sources: &S,
    context: &AlignmentContext,
    sequence: &SequenceRecord,
    mutation: &Mutation,
    record: &CoreTemplateRecord,
) -> Result<Evaluation, EngineError>
where
    S: ResolutionSource + StructureSource + ?Sized,
{
    if !record.domain.contains(mutation.position) {
        return Ok(Evaluation::Rejected(RejectionReason::OutsideDomain));
    }
    let model = sources.structure(&record.structure_id)?;
    let mapped = map_to_structure(
        context,
        sequence,
        record.domain,
        &model,
        record.chain,
        record.structure_domain,
        true,
    )?;
    let site = match locate_mutation(&mapped, mutation, model.id(), record.chain)? {
        Ok(site) => site,
        Err(reason) => return Ok(Evaluation::Rejected(reason)),
    };
    let quality = sources.resolution(&record.structure_id)?;
    let score = mapped.score.combined;
    let primary = template_partner(
        sequence,
        &record.family_id,
        record.domain,
        record.chain,
        record.structure_domain,
        mapped,
    )?;

    Ok(Evaluation::Accepted(Box::new(Template {
        kind: TemplateKind::Core,
        structure_id: model.id().to_string(),
        mutation: *mutation,
        primary,
        partner: None,
        mutation_position_domain: site.domain_position,
        mutation_structure_index: site.structure_index,
        mutation_native_number: site.native_number,
        quality,
        score,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::numbering::NativeSpan;
    use crate::core::models::structure::StructureModel;
    use crate::core::sequence::Domain;
    use crate::engine::progress::{CandidateOutcome, ProgressReporter};
    use crate::engine::testing::{MemorySources, StubAligner, TestBench, add_linear_chain};
    use nalgebra::Point3;
    use std::sync::{Arc, Mutex};

    fn record(structure_id: &str, chain: char, start: isize, end: isize) -> CoreTemplateRecord {
        CoreTemplateRecord {
            family_id: "PF00001".to_string(),
            domain: Domain::new(3, 10).unwrap(),
            structure_id: structure_id.to_string(),
            chain,
            structure_domain: NativeSpan::new(start, end),
        }
    }

    fn structure(id: &str, chain: char, sequence: &str, first_number: isize) -> StructureModel {
        let mut model = StructureModel::new(id);
        add_linear_chain(&mut model, chain, sequence, first_number, Point3::origin());
        model
    }

    // P1 carries the domain MKTAYIQR at positions 3..=10; Y7 is mutated.
    fn sources() -> MemorySources {
        let mut sources = MemorySources::default();
        sources.add_sequence("P1", "GSMKTAYIQRAA");
        sources.add_structure(structure("1ABC", 'A', "MKTAYIQR", 1), 0, 2.5);
        sources.add_structure(structure("2XYZ", 'B', "MKTAYIQR", 101), 2, 1.0);
        sources.core_templates.insert(
            "P1".to_string(),
            vec![record("2XYZ", 'B', 101, 108), record("1ABC", 'A', 1, 8)],
        );
        sources
    }

    fn mutation() -> Mutation {
        "Y7F".parse().unwrap()
    }

    #[test]
    fn best_structure_wins_and_maps_the_mutation() {
        let sources = sources();
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();

        let templates = search.templates();
        assert_eq!(templates.len(), 1);
        let template = &templates[0];
        assert_eq!(template.structure_id, "1ABC");
        assert_eq!(template.kind, TemplateKind::Core);
        assert_eq!(template.mutation_position_domain, 5);
        assert_eq!(template.mutation_structure_index, 5);
        assert_eq!(template.mutation_native_number, 5);
        let [total, primary, partner] = template.scores();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(primary, total);
        assert_eq!(partner, 0.0);
        assert_eq!(template.primary.domain_sequence.residues, "MKTAYIQR");
    }

    #[test]
    fn native_numbering_is_reported_for_the_winner() {
        let mut sources = sources();
        sources.core_templates.insert("P1".to_string(), vec![record("2XYZ", 'B', 101, 108)]);
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();
        assert_eq!(search.templates()[0].mutation_native_number, 105);
    }

    #[test]
    fn candidates_that_cannot_be_evaluated_are_skipped() {
        let mut sources = sources();
        let mut outside = record("1ABC", 'A', 1, 8);
        outside.domain = Domain::new(9, 12).unwrap();
        sources.core_templates.insert(
            "P1".to_string(),
            vec![record("9ZZZ", 'A', 1, 8), outside, record("1ABC", 'A', 1, 8)],
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut bench = TestBench::new();
        bench.reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();
        assert_eq!(search.templates().len(), 1);

        let events = events.lock().unwrap();
        let outcomes: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Progress::CandidateFinished { outcome, .. } => Some(outcome.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], CandidateOutcome::Failed(_)));
        assert_eq!(outcomes[1], CandidateOutcome::Rejected(RejectionReason::OutsideDomain));
        assert!(matches!(outcomes[2], CandidateOutcome::Accepted { .. }));
        assert!(matches!(
            events.first(),
            Some(Progress::PassStart { total_candidates: 3, .. })
        ));
    }

    #[test]
    fn mutation_aligned_to_a_gap_leaves_no_template() {
        let mut sources = MemorySources::default();
        sources.add_sequence("P1", "GSMKTAYIQRAA");
        sources.add_structure(structure("3DEF", 'A', "MKTAIQR", 1), 0, 2.0);
        sources.core_templates.insert("P1".to_string(), vec![record("3DEF", 'A', 1, 7)]);
        let bench = TestBench::new();
        let aligner = StubAligner::new().with_alignment("MKTAYIQR", "MKTA-IQR");

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();
        assert_eq!(search, TemplateSearch::NoTemplate);
    }

    #[test]
    fn protein_without_templates_has_no_template() {
        let mut sources = sources();
        sources.add_sequence("P2", "MKTAYIQR");
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P2", &"K2A".parse().unwrap()).unwrap();
        assert_eq!(search, TemplateSearch::NoTemplate);
        assert_eq!(aligner.calls(), 0);
    }

    #[test]
    fn wrong_wild_type_ends_the_search() {
        let sources = sources();
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let result = run(&sources, &bench.context(&aligner), "P1", &"W7F".parse().unwrap());
        assert!(matches!(result, Err(EngineError::MutationMismatch { .. })));
    }

    #[test]
    fn aligner_contract_violation_ends_the_search() {
        let sources = sources();
        let bench = TestBench::new();
        let aligner = StubAligner::new().with_rows(
            "MKTAYIQR",
            "MKTAYIQR",
            ("P1", "MKTAYIQR"),
            ("SOMETHING", "MKTAYIQR"),
        );

        let result = run(&sources, &bench.context(&aligner), "P1", &mutation());
        assert!(matches!(result, Err(EngineError::AlignmentDivergence(_))));
    }
}

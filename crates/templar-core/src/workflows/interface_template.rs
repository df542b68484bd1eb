use super::{Evaluation, checked_sequence, locate_mutation, settle, template_partner};
use crate::core::sequence::{Mutation, SequenceRecord};
use crate::engine::config::MappingConfig;
use crate::engine::context::AlignmentContext;
use crate::engine::error::EngineError;
use crate::engine::mapping::map_to_structure;
use crate::engine::progress::Progress;
use crate::engine::tasks::{contact_detection, selection};
use crate::engine::template::{RejectionReason, Template, TemplateKind, TemplateSearch};
use crate::sources::{
    DomainTemplate, DomainTemplateSource, Interaction, InteractionSource, LookupFailure,
    ResolutionSource, SequenceSource, StructureSource,
};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// One structure in which an interaction of the query protein can be
/// examined.
struct Candidate<'a> {
    interaction: &'a Interaction,
    template: DomainTemplate,
}

/// Restricts the refinement pass to the partner, families, structure and
/// chains of a first-pass winner.
struct Focus {
    partner: String,
    families: (String, String),
    structure_id: String,
    chains: (char, char),
}

impl Focus {
    fn of(template: &Template) -> Option<Self> {
        let partner = template.partner.as_ref()?;
        Some(Self {
            partner: partner.protein_id.clone(),
            families: (template.primary.family_id.clone(), partner.family_id.clone()),
            structure_id: template.structure_id.clone(),
            chains: (template.primary.chain, partner.chain),
        })
    }

    fn admits_interaction(&self, interaction: &Interaction) -> bool {
        interaction.protein_ids.1 == self.partner
            && interaction.family_ids.0 == self.families.0
            && interaction.family_ids.1 == self.families.1
    }

    fn admits_template(&self, template: &DomainTemplate) -> bool {
        template.structure_id.eq_ignore_ascii_case(&self.structure_id) && template.chains == self.chains
    }
}

/// Partner sequences fetched so far, so each partner is looked up once.
struct PartnerSequences<'s, S: ?Sized> {
    sources: &'s S,
    cache: HashMap<String, SequenceRecord>,
}

impl<'s, S> PartnerSequences<'s, S>
where
    S: SequenceSource + ?Sized,
{
    fn new(sources: &'s S) -> Self {
        Self {
            sources,
            cache: HashMap::new(),
        }
    }

    fn get(&mut self, protein_id: &str) -> Result<&SequenceRecord, LookupFailure> {
        if !self.cache.contains_key(protein_id) {
            let sequence = self.sources.sequence(protein_id)?;
            self.cache.insert(protein_id.to_string(), sequence);
        }
        self.cache
            .get(protein_id)
            .ok_or_else(|| LookupFailure::SequenceNotFound(protein_id.to_string()))
    }
}

/// Finds, for each interaction of `protein_id` whose first domain contains
/// the mutation, the best structure in which the mutated residue contacts the
/// partner chain.
///
/// Candidates are first compared on unrefined alignments; each winner is then
/// re-evaluated with refinement. A winner that does not survive refinement is
/// kept in its unrefined form.
#[instrument(skip_all, name = "interface_template_workflow", fields(protein = %protein_id, mutation = %mutation))]
pub fn run<S>(
    sources: &S,
    context: &AlignmentContext,
    protein_id: &str,
    mutation: &Mutation,
) -> Result<TemplateSearch, EngineError>
where
    S: SequenceSource
        + InteractionSource
        + DomainTemplateSource
        + ResolutionSource
        + StructureSource
        + ?Sized,
{
    let Some(sequence) = checked_sequence(sources, protein_id, mutation)? else {
        return Ok(TemplateSearch::NoTemplate);
    };
    let interactions = match sources.interactions(protein_id) {
        Ok(interactions) => interactions,
        Err(failure) => {
            warn!(error = %failure, "Interactions unavailable.");
            return Ok(TemplateSearch::NoTemplate);
        }
    };
    let mut partners = PartnerSequences::new(sources);

    // === Pass 1: unrefined alignments over every candidate ===
    let candidates = enumerate_candidates(sources, context.config, &interactions, None);
    context.reporter.report(Progress::PassStart {
        name: "Interface templates",
        total_candidates: candidates.len() as u64,
    });
    let mut accepted = Vec::new();
    for candidate in &candidates {
        let result = evaluate(&mut partners, context, &sequence, mutation, candidate, false);
        if let Some(template) = settle(context, &candidate.template.structure_id, result)? {
            accepted.push(template);
        }
    }
    context.reporter.report(Progress::PassFinish);
    let winners = selection::run(accepted);
    info!(
        candidates = candidates.len(),
        winners = winners.len(),
        "First interface pass finished."
    );

    // === Pass 2: refine each winner on its own interaction and structure ===
    let focused: Vec<(Template, Vec<Candidate>)> = winners
        .into_iter()
        .map(|winner| {
            let candidates = match Focus::of(&winner) {
                Some(focus) => enumerate_candidates(sources, context.config, &interactions, Some(&focus)),
                None => Vec::new(),
            };
            (winner, candidates)
        })
        .collect();
    context.reporter.report(Progress::PassStart {
        name: "Interface refinement",
        total_candidates: focused.iter().map(|(_, c)| c.len() as u64).sum(),
    });
    let mut templates = Vec::with_capacity(focused.len());
    for (winner, candidates) in focused {
        let mut refined = Vec::new();
        for candidate in &candidates {
            let result = evaluate(&mut partners, context, &sequence, mutation, candidate, true);
            if let Some(template) = settle(context, &candidate.template.structure_id, result)? {
                refined.push(template);
            }
        }
        let key = winner.identity_key();
        let best = refined
            .into_iter()
            .filter(|template| template.identity_key() == key)
            .sorted_by(selection::compare_templates)
            .next();
        match best {
            Some(template) => templates.push(template),
            None => {
                warn!(
                    structure = %winner.structure_id,
                    partner = winner.partner.as_ref().map(|p| p.protein_id.as_str()).unwrap_or_default(),
                    "Refinement rejected the template; keeping the unrefined alignment."
                );
                templates.push(winner);
            }
        }
    }
    context.reporter.report(Progress::PassFinish);

    info!(templates = templates.len(), "Interface template search finished.");
    Ok(TemplateSearch::from_templates(templates))
}

fn enumerate_candidates<'a, S>(
    sources: &S,
    config: &MappingConfig,
    interactions: &'a [Interaction],
    focus: Option<&Focus>,
) -> Vec<Candidate<'a>>
where
    S: DomainTemplateSource + ?Sized,
{
    let mut candidates = Vec::new();
    for interaction in interactions {
        if config.skip_elm_interactions && interaction.is_elm() {
            continue;
        }
        if focus.is_some_and(|f| !f.admits_interaction(interaction)) {
            continue;
        }
        let (family_a, family_b) = &interaction.family_ids;
        let templates = match sources.domain_templates(family_a, family_b) {
            Ok(templates) => templates,
            Err(LookupFailure::TemplatesNotFound(..)) => {
                debug!(families = %format!("{}:{}", family_a, family_b), "No domain templates.");
                continue;
            }
            Err(failure) => {
                warn!(error = %failure, "Skipping interaction.");
                continue;
            }
        };
        for template in templates {
            if config.is_obsolete(&template.structure_id) {
                continue;
            }
            if focus.is_some_and(|f| !f.admits_template(&template)) {
                continue;
            }
            candidates.push(Candidate {
                interaction,
                template,
            });
        }
    }
    candidates
}

fn evaluate<S>(
    partners: &mut PartnerSequences<S>,
    context: &AlignmentContext,
    sequence: &SequenceRecord,
    mutation: &Mutation,
    candidate: &Candidate,
    refine: bool,
) -> Result<Evaluation, EngineError>
where
    S: SequenceSource + ResolutionSource + StructureSource + ?Sized,
{
    let Candidate {
        interaction,
        template,
    } = candidate;
    if !interaction.domains.0.contains(mutation.position) {
        return Ok(Evaluation::Rejected(RejectionReason::OutsideDomain));
    }
    let partner_sequence = partners.get(&interaction.protein_ids.1)?.clone();
    let sources = partners.sources;
    let model = sources.structure(&template.structure_id)?;
    let (chain_a, chain_b) = template.chains;

    let first = map_to_structure(
        context,
        sequence,
        interaction.domains.0,
        &model,
        chain_a,
        template.structure_domains.0,
        refine,
    )?;
    let second = map_to_structure(
        context,
        &partner_sequence,
        interaction.domains.1,
        &model,
        chain_b,
        template.structure_domains.1,
        refine,
    )?;

    let site = match locate_mutation(&first, mutation, model.id(), chain_a)? {
        Ok(site) => site,
        Err(reason) => return Ok(Evaluation::Rejected(reason)),
    };
    let contacts = contact_detection::run(
        &model,
        chain_a,
        site.structure_index,
        Some(mutation.wild_type),
        context.config.contact_distance,
    )?;
    if !contacts.get(&chain_b).copied().unwrap_or(false) {
        return Ok(Evaluation::Rejected(RejectionReason::NoPartnerContact));
    }
    let quality = sources.resolution(&template.structure_id)?;

    let score = first.score.combined + second.score.combined;
    let primary = template_partner(
        sequence,
        &interaction.family_ids.0,
        interaction.domains.0,
        chain_a,
        template.structure_domains.0,
        first,
    )?;
    let partner = template_partner(
        &partner_sequence,
        &interaction.family_ids.1,
        interaction.domains.1,
        chain_b,
        template.structure_domains.1,
        second,
    )?;

    Ok(Evaluation::Accepted(Box::new(Template {
        kind: TemplateKind::Interface,
        structure_id: model.id().to_string(),
        mutation: *mutation,
        primary,
        partner: Some(partner),
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

    // Chain A carries P1's domain, chain B carries P2's domain `partner_y`
    // away along the y axis.
    fn complex(id: &str, chain_a: &str, partner_y: f64) -> StructureModel {
        let mut model = StructureModel::new(id);
        add_linear_chain(&mut model, 'A', chain_a, 1, Point3::origin());
        add_linear_chain(&mut model, 'B', "HGSDEF", 1, Point3::new(0.0, partner_y, 0.0));
        model
    }

    fn domain_template(structure_id: &str, chain_a_len: isize) -> DomainTemplate {
        DomainTemplate {
            structure_id: structure_id.to_string(),
            chains: ('A', 'B'),
            structure_domains: (NativeSpan::new(1, chain_a_len), NativeSpan::new(1, 6)),
        }
    }

    fn interaction(interaction_type: &str) -> Interaction {
        Interaction {
            protein_ids: ("P1".to_string(), "P2".to_string()),
            family_ids: ("PF1".to_string(), "PF2".to_string()),
            domains: (Domain::new(3, 10).unwrap(), Domain::new(3, 8).unwrap()),
            interaction_type: interaction_type.to_string(),
        }
    }

    fn sources(templates: Vec<DomainTemplate>) -> MemorySources {
        let mut sources = MemorySources::default();
        sources.add_sequence("P1", "GSMKTAYIQRAA");
        sources.add_sequence("P2", "WWHGSDEFWW");
        sources.add_structure(complex("4INT", "MKTAYIQR", 4.5), 0, 2.8);
        sources.add_structure(complex("6ALT", "MKTAYIQR", 4.5), 0, 1.9);
        sources.add_structure(complex("5FAR", "MKTAYIQR", 40.0), 0, 1.0);
        sources.interactions.push(interaction("domain"));
        sources
            .domain_templates
            .insert(("PF1".to_string(), "PF2".to_string()), templates);
        sources
    }

    fn mutation() -> Mutation {
        "Y7F".parse().unwrap()
    }

    #[test]
    fn contacting_structure_with_finest_resolution_wins() {
        let sources = sources(vec![
            domain_template("4INT", 8),
            domain_template("5FAR", 8),
            domain_template("6ALT", 8),
        ]);
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();

        let templates = search.templates();
        assert_eq!(templates.len(), 1);
        let template = &templates[0];
        assert_eq!(template.kind, TemplateKind::Interface);
        assert_eq!(template.structure_id, "6ALT");
        assert_eq!(template.mutation_structure_index, 5);
        assert_eq!(template.mutation_native_number, 5);
        let partner = template.partner.as_ref().unwrap();
        assert_eq!(partner.protein_id, "P2");
        assert_eq!(partner.domain_sequence.residues, "HGSDEF");
        let [total, first, second] = template.scores();
        assert!((total - (first + second)).abs() < 1e-12);
        assert!((total - 2.0).abs() < 1e-9);
    }

    #[test]
    fn structure_without_partner_contact_is_rejected() {
        let sources = sources(vec![domain_template("5FAR", 8)]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut bench = TestBench::new();
        bench.reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();

        assert_eq!(search, TemplateSearch::NoTemplate);
        assert!(events.lock().unwrap().iter().any(|event| matches!(
            event,
            Progress::CandidateFinished {
                outcome: CandidateOutcome::Rejected(RejectionReason::NoPartnerContact),
                ..
            }
        )));
    }

    #[test]
    fn elm_interactions_and_obsolete_structures_are_skipped() {
        let mut sources = sources(vec![domain_template("3C4D", 8)]);
        sources.interactions.push(Interaction {
            family_ids: ("PF1".to_string(), "ELMX".to_string()),
            ..interaction("ELM")
        });
        sources.domain_templates.insert(
            ("PF1".to_string(), "ELMX".to_string()),
            vec![domain_template("4INT", 8)],
        );
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();

        assert_eq!(search, TemplateSearch::NoTemplate);
        assert_eq!(aligner.calls(), 0);
    }

    #[test]
    fn mutation_outside_the_first_domain_finds_nothing() {
        let sources = sources(vec![domain_template("4INT", 8)]);
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &"A12G".parse().unwrap()).unwrap();
        assert_eq!(search, TemplateSearch::NoTemplate);
        assert_eq!(aligner.calls(), 0);
    }

    #[test]
    fn missing_partner_sequence_skips_the_candidate() {
        let mut sources = sources(vec![domain_template("4INT", 8)]);
        sources.sequences.remove("P2");
        let bench = TestBench::new();
        let aligner = StubAligner::new();

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();
        assert_eq!(search, TemplateSearch::NoTemplate);
    }

    #[test]
    fn winner_rejected_by_refinement_is_kept_unrefined() {
        // Chain A lacks KTA; refinement trims the query's leading MKT and with
        // it the mutated M3.
        let mut sources = sources(vec![domain_template("7TRM", 5)]);
        sources.add_structure(complex("7TRM", "MYIQR", 4.5), 0, 2.0);
        let bench = TestBench::new();
        let aligner = StubAligner::new()
            .with_alignment("MKTAYIQR", "M---YIQR")
            .with_alignment("AYIQR", "MYIQR");

        let search = run(&sources, &bench.context(&aligner), "P1", &"M3A".parse().unwrap()).unwrap();

        let templates = search.templates();
        assert_eq!(templates.len(), 1);
        let template = &templates[0];
        assert_eq!(template.structure_id, "7TRM");
        assert_eq!(template.primary.refined_domain, Domain::new(3, 10).unwrap());
        assert_eq!(template.primary.alignment.second().residues(), "M---YIQR");
        assert_eq!(template.mutation_native_number, 1);
    }

    #[test]
    fn refined_winner_replaces_the_unrefined_one() {
        // The mutation (Y7) survives trimming, so the refined mapping wins.
        let mut sources = sources(vec![domain_template("7TRM", 5)]);
        sources.add_structure(complex("7TRM", "MYIQR", 4.5), 0, 2.0);
        let bench = TestBench::new();
        let aligner = StubAligner::new()
            .with_alignment("MKTAYIQR", "M---YIQR")
            .with_alignment("AYIQR", "MYIQR");

        let search = run(&sources, &bench.context(&aligner), "P1", &mutation()).unwrap();

        let template = &search.templates()[0];
        assert_eq!(template.primary.refined_domain, Domain::new(6, 10).unwrap());
        assert_eq!(template.primary.domain, Domain::new(3, 10).unwrap());
        assert_eq!(template.mutation_position_domain, 2);
        assert_eq!(template.mutation_native_number, 2);
        assert_eq!(template.primary.domain_sequence.residues, "AYIQR");
    }
}

use crate::cli::SearchArgs;
use crate::config::{AppConfig, build_config};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use crate::report::{MutationReport, MutationStatus, SearchReport};
use crate::utils::progress::CliProgressHandler;
use rayon::prelude::*;
use std::fs;
use templar::core::sequence::Mutation;
use templar::engine::context::AlignmentContext;
use templar::engine::gate::AdmissionGate;
use templar::engine::progress::ProgressReporter;
use templar::engine::template::TemplateKind;
use templar::engine::workspace::Workspace;
use templar::sources::store::DataStore;
use templar::workflows::{core_template, interface_template};
use tracing::{error, info, warn};

pub async fn run(args: SearchArgs, kind: TemplateKind) -> Result<()> {
    info!("Initializing data manager...");
    let data_manager = DataManager::new()?;
    let config = build_config(&args.config, &data_manager)?;
    let mutations = parse_mutations(&args.mutations)?;

    info!("Opening data store at {:?}", &config.data_dir);
    let store = DataStore::open(&config.data_dir).map_err(|e| {
        CliError::Data(format!(
            "{}\nHint: Point --data-dir (or `data.directory`) at a directory holding the sequence, structure and template tables.",
            e
        ))
    })?;

    let progress = CliProgressHandler::new();
    let report = tokio::task::block_in_place(|| {
        search_mutations(&store, &config, kind, &args.protein, &mutations, &progress)
    })?;

    report.write(args.output.as_deref())?;
    eprintln!(
        "{} mutation(s): {} with templates, {} without, {} failed.",
        report.mutations.len(),
        report.count(MutationStatus::Found),
        report.count(MutationStatus::NoTemplate),
        report.count(MutationStatus::Error),
    );
    Ok(())
}

/// Parses mutations, dropping repeats so that no two workers share a
/// workspace.
fn parse_mutations(values: &[String]) -> Result<Vec<Mutation>> {
    let mut mutations: Vec<Mutation> = Vec::with_capacity(values.len());
    for value in values {
        let mutation = value
            .parse::<Mutation>()
            .map_err(|e| CliError::Argument(e.to_string()))?;
        if mutations.contains(&mutation) {
            warn!(mutation = %mutation, "Ignoring repeated mutation.");
            continue;
        }
        mutations.push(mutation);
    }
    Ok(mutations)
}

/// Runs one template search per mutation in parallel, each with its own
/// workspace, and collects the outcomes in input order.
///
/// A mutation whose search ends with an error is reported as failed; the
/// other mutations are unaffected.
pub fn search_mutations(
    store: &DataStore,
    config: &AppConfig,
    kind: TemplateKind,
    protein_id: &str,
    mutations: &[Mutation],
    progress: &CliProgressHandler,
) -> Result<SearchReport> {
    let aligner = config.aligner.build();
    let gate = AdmissionGate::new(config.aligner.max_concurrent);
    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let run_dir = config
        .aligner
        .scratch_dir
        .join(format!("run-{}", std::process::id()));
    fs::create_dir_all(&run_dir)?;

    info!(
        protein = %protein_id,
        mutations = mutations.len(),
        aligner = aligner.name(),
        "Starting {:?} template search.",
        kind
    );
    progress.start(mutations.len() as u64);

    let outcomes: Vec<Result<MutationReport>> = mutations
        .par_iter()
        .map(|mutation| -> Result<MutationReport> {
            let workspace = Workspace::create_in(&run_dir, &format!("{}_{}", protein_id, mutation))?;
            let context = AlignmentContext::new(aligner.as_ref(), &gate, &workspace, &config.mapping, &reporter);
            let search = match kind {
                TemplateKind::Core => core_template::run(store, &context, protein_id, mutation),
                TemplateKind::Interface => interface_template::run(store, &context, protein_id, mutation),
            };
            progress.mutation_finished();
            Ok(match search {
                Ok(search) => MutationReport::from_search(mutation.to_string(), search),
                Err(e) => {
                    error!(mutation = %mutation, error = %e, "Template search failed.");
                    MutationReport::failed(mutation.to_string(), e)
                }
            })
        })
        .collect();
    progress.finish();

    if let Err(e) = fs::remove_dir_all(&run_dir) {
        warn!("Could not remove scratch directory {:?}: {}", run_dir, e);
    }

    Ok(SearchReport {
        protein: protein_id.to_string(),
        search: kind,
        mutations: outcomes.into_iter().collect::<Result<Vec<_>>>()?,
    })
}

use crate::cli::AlignArgs;
use crate::config::{AppConfig, build_config};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use std::fs;
use std::io::{self, Write};
use templar::core::alignment::{Alignment, AlignmentScore};
use templar::core::io::fasta;
use templar::core::sequence::SequenceRecord;
use templar::engine::context::AlignmentContext;
use templar::engine::gate::AdmissionGate;
use templar::engine::progress::ProgressReporter;
use templar::engine::tasks::refinement::{self, TrimTally};
use templar::engine::workspace::Workspace;
use tracing::{info, warn};

/// A query/structure alignment as printed by `templar align`.
#[derive(Debug)]
pub struct PairAlignment {
    pub alignment: Alignment,
    pub score: AlignmentScore,
    pub query_trims: TrimTally,
    pub structure_trims: TrimTally,
    pub rounds: usize,
}

pub async fn run(args: AlignArgs) -> Result<()> {
    let data_manager = DataManager::new()?;
    let config = build_config(&args.config, &data_manager)?;

    let records = fasta::read_records_from_path(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;
    info!("Read {} sequence(s) from {:?}", records.len(), &args.input);

    let result = tokio::task::block_in_place(|| align_records(&config, &records, !args.no_refinement))?;

    let stdout = io::stdout();
    print_alignment(&mut stdout.lock(), &result)
}

/// Aligns the first record (the query) against the second (the structure
/// sequence) and, when `refine` is set, trims loner-inducing overhang from
/// the query until the alignment is stable.
pub fn align_records(config: &AppConfig, records: &[SequenceRecord], refine: bool) -> Result<PairAlignment> {
    let [query, structure] = records else {
        return Err(CliError::Argument(format!(
            "Expected exactly two sequences (query, then structure), found {}.",
            records.len()
        )));
    };

    let aligner = config.aligner.build();
    let gate = AdmissionGate::new(config.aligner.max_concurrent);
    let workspace = Workspace::create_in(&config.aligner.scratch_dir, &format!("align-{}", std::process::id()))?;
    let reporter = ProgressReporter::new();
    let context = AlignmentContext::new(aligner.as_ref(), &gate, &workspace, &config.mapping, &reporter);

    let result = align_pair(&context, query, structure, refine);
    if let Err(e) = fs::remove_dir_all(workspace.path()) {
        warn!("Could not remove scratch directory {:?}: {}", workspace.path(), e);
    }
    result
}

fn align_pair(
    context: &AlignmentContext,
    query: &SequenceRecord,
    structure: &SequenceRecord,
    refine: bool,
) -> Result<PairAlignment> {
    let (alignment, score) = context.align(query, structure)?;
    if !refine {
        return Ok(PairAlignment {
            alignment,
            score,
            query_trims: TrimTally::default(),
            structure_trims: TrimTally::default(),
            rounds: 0,
        });
    }

    let refined = refinement::run(context, alignment, score, query, structure)?;
    Ok(PairAlignment {
        alignment: refined.alignment,
        score: refined.score,
        query_trims: refined.query_trims,
        structure_trims: refined.structure_trims,
        rounds: refined.rounds,
    })
}

pub fn print_alignment(out: &mut impl Write, result: &PairAlignment) -> Result<()> {
    writeln!(out, "identity: {:.2}%", result.score.identity)?;
    writeln!(out, "coverage: {:.2}%", result.score.coverage)?;
    writeln!(out, "combined: {:.4}", result.score.combined)?;
    writeln!(
        out,
        "query trims: {} leading, {} trailing",
        result.query_trims.leading, result.query_trims.trailing
    )?;
    writeln!(
        out,
        "structure trims: {} leading, {} trailing",
        result.structure_trims.leading, result.structure_trims.trailing
    )?;
    writeln!(out, "refinement rounds: {}", result.rounds)?;
    writeln!(out)?;
    fasta::write_alignment(out, &result.alignment).map_err(|e| CliError::Other(e.into()))
}

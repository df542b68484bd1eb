use crate::config::AlignerKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Templar CLI - Find the structures that best represent a protein mutation and map the mutated residue onto them.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to process mutations in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find single-chain structures covering the mutated domain.
    Core(SearchArgs),
    /// Find chain pairs in which the mutated residue contacts an interaction partner.
    Interface(SearchArgs),
    /// Align two sequences from a FASTA file, refine the alignment and print its scores.
    Align(AlignArgs),
    /// Manage the local data directory (sequences, structures and tables).
    Data(DataArgs),
}

/// Arguments for the `core` and `interface` subcommands.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Identifier of the query protein (e.g., a UniProt accession).
    #[arg(required = true, value_name = "PROTEIN")]
    pub protein: String,

    /// One or more point mutations, e.g. A100T.
    #[arg(required = true, num_args = 1.., value_name = "MUTATION")]
    pub mutations: Vec<String>,

    /// Write the TOML report to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `align` subcommand.
#[derive(Args, Debug)]
pub struct AlignArgs {
    /// FASTA file holding the query sequence followed by the structure sequence.
    #[arg(required = true, value_name = "FASTA")]
    pub input: PathBuf,

    /// Print the first alignment without loner refinement.
    #[arg(long)]
    pub no_refinement: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Settings shared by every command that aligns sequences.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(short = 'd', long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Override the aligner used for every pairwise alignment.
    #[arg(long, value_enum, value_name = "KIND")]
    pub aligner: Option<AlignerKind>,

    /// Override the external aligner program (used with `--aligner command`).
    #[arg(long, value_name = "PATH")]
    pub aligner_program: Option<PathBuf>,

    /// Override the number of alignments allowed to run at the same time.
    #[arg(long, value_name = "INT")]
    pub max_concurrent: Option<usize>,

    /// Override the contact distance threshold in angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub contact_distance: Option<f64>,

    /// Override the weight of sequence identity in the combined score.
    #[arg(long, value_name = "FLOAT")]
    pub identity_weight: Option<f64>,

    /// Consider ELM (linear motif) interactions, overriding the config file.
    #[arg(long)]
    pub include_elm: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S mapping.loner-ratio=0.25
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `data` subcommand.
#[derive(Args, Debug)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommands,
}

/// Available commands for data management.
#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Show the absolute path to the local data directory.
    Path,
    /// Set a custom absolute path for the local data directory.
    SetPath {
        /// The new path to use for storing data files.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Reset the data path to its default, OS-specific location.
    ResetPath,
    /// Download a protein sequence from UniProt into the data directory.
    FetchSequence {
        /// UniProt accession of the protein.
        #[arg(required = true, value_name = "ID")]
        id: String,
        /// Overwrite a sequence that is already present.
        #[arg(long)]
        force: bool,
    },
}

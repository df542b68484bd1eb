use super::{Aligner, AlignerError};
use crate::core::alignment::Alignment;
use crate::core::io::fasta;
use crate::core::sequence::SequenceRecord;
use crate::engine::workspace::Workspace;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Replaced by the path of the FASTA file holding both input sequences.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Replaced by the path the program must write its aligned FASTA to.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

const INPUT_FILE: &str = "seqfiles.fasta";
const OUTPUT_FILE: &str = "seqfiles.aln.fasta";

/// Runs an external alignment program such as T-Coffee.
///
/// Both sequences are written to `seqfiles.fasta` in the workspace, the
/// program is started with the workspace as its working directory, and the
/// aligned FASTA it writes is read back.
#[derive(Debug, Clone)]
pub struct CommandAligner {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandAligner {
    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments for T-Coffee producing aligned FASTA.
    pub fn t_coffee_args() -> Vec<String> {
        vec![
            format!("-seq={}", INPUT_PLACEHOLDER),
            "-output=fasta_aln".to_string(),
            format!("-outfile={}", OUTPUT_PLACEHOLDER),
            "-quiet".to_string(),
        ]
    }

    fn expand_args(&self, input: &str, output: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, input)
                    .replace(OUTPUT_PLACEHOLDER, output)
            })
            .collect()
    }
}

impl Aligner for CommandAligner {
    fn name(&self) -> &str {
        self.program.to_str().unwrap_or("command")
    }

    fn align(
        &self,
        query: &SequenceRecord,
        structure: &SequenceRecord,
        workspace: &Workspace,
    ) -> Result<Alignment, AlignerError> {
        let input = workspace.file(INPUT_FILE);
        let output = workspace.file(OUTPUT_FILE);
        fasta::write_records_to_path(&input, &[query.clone(), structure.clone()])?;
        if output.exists() {
            std::fs::remove_file(&output)?;
        }

        let args = self.expand_args(&input.to_string_lossy(), &output.to_string_lossy());
        debug!(program = %self.program.display(), ?args, "Running external aligner");
        let result = Command::new(&self.program)
            .args(&args)
            .current_dir(workspace.path())
            .output()
            .map_err(|source| AlignerError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            return Err(AlignerError::Program {
                program: self.program.display().to_string(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(fasta::read_alignment_from_path(&output)?)
    }
}

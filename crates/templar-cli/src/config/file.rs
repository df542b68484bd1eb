use super::models::AlignerKind;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub data: Option<FileDataConfig>,
    pub aligner: Option<FileAlignerConfig>,
    pub mapping: Option<FileMappingConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileDataConfig {
    pub directory: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAlignerConfig {
    pub kind: Option<AlignerKind>,
    pub program: Option<PathBuf>,
    /// Program arguments; `{input}` and `{output}` are replaced by file paths.
    pub args: Option<Vec<String>>,
    pub scratch_dir: Option<PathBuf>,
    pub max_concurrent: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMappingConfig {
    pub contact_distance: Option<f64>,
    pub identity_weight: Option<f64>,
    pub loner_ratio: Option<f64>,
    pub skip_elm_interactions: Option<bool>,
    pub obsolete_structures: Option<Vec<String>>,
    pub max_refinement_rounds: Option<usize>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

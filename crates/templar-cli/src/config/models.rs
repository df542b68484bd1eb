use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;
use templar::engine::aligner::{Aligner, CommandAligner, GlobalAligner};
use templar::engine::config::MappingConfig;

#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AlignerKind {
    /// The built-in global aligner.
    Builtin,
    /// An external alignment program such as T-Coffee.
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignerSettings {
    pub kind: AlignerKind,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Parent of the per-mutation workspaces.
    pub scratch_dir: PathBuf,
    pub max_concurrent: usize,
}

impl AlignerSettings {
    pub fn build(&self) -> Box<dyn Aligner> {
        match self.kind {
            AlignerKind::Builtin => Box::new(GlobalAligner::default()),
            AlignerKind::Command => Box::new(CommandAligner::new(self.program.clone(), self.args.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub aligner: AlignerSettings,
    pub mapping: MappingConfig,
}

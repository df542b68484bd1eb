use crate::error::{CliError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use templar::engine::template::{Template, TemplateKind, TemplateSearch};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationStatus {
    Found,
    NoTemplate,
    Error,
}

/// The outcome of one mutation's search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MutationReport {
    pub mutation: String,
    pub status: MutationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub templates: Vec<Template>,
}

impl MutationReport {
    pub fn from_search(mutation: String, search: TemplateSearch) -> Self {
        match search {
            TemplateSearch::Found(templates) => Self {
                mutation,
                status: MutationStatus::Found,
                error: None,
                templates,
            },
            TemplateSearch::NoTemplate => Self {
                mutation,
                status: MutationStatus::NoTemplate,
                error: None,
                templates: Vec::new(),
            },
        }
    }

    pub fn failed(mutation: String, error: impl ToString) -> Self {
        Self {
            mutation,
            status: MutationStatus::Error,
            error: Some(error.to_string()),
            templates: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchReport {
    pub protein: String,
    pub search: TemplateKind,
    pub mutations: Vec<MutationReport>,
}

impl SearchReport {
    pub fn count(&self, status: MutationStatus) -> usize {
        self.mutations.iter().filter(|m| m.status == status).count()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| CliError::Other(e.into()))
    }

    /// Writes the report to `output`, or to standard output when no path is
    /// given.
    pub fn write(&self, output: Option<&Path>) -> Result<()> {
        let content = self.to_toml()?;
        match output {
            Some(path) => {
                fs::write(path, content)?;
                info!("Report written to {:?}", path);
            }
            None => print!("{}", content),
        }
        Ok(())
    }
}

use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use templar::core::io::fasta;
use templar::sources::store::SEQUENCES_DIR;
use tracing::{debug, info, warn};

const UNIPROT_URL: &str = "https://rest.uniprot.org/uniprotkb";

/// Locates the data directory holding `sequences/`, `structures/` and the
/// CSV tables.
#[derive(Debug)]
pub struct DataManager {
    base_path: PathBuf,
}

impl DataManager {
    pub fn new() -> Result<Self> {
        let path = Self::determine_data_path()?;
        debug!("DataManager initialized with path: {:?}", &path);
        Ok(Self { base_path: path })
    }

    pub fn with_custom_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            base_path: path.into(),
        }
    }

    pub fn get_data_path(&self) -> &Path {
        &self.base_path
    }

    pub fn sequence_path(&self, protein_id: &str) -> PathBuf {
        self.base_path
            .join(SEQUENCES_DIR)
            .join(format!("{}.fasta", protein_id))
    }

    /// Downloads the FASTA sequence of a UniProt entry into `sequences/`.
    pub async fn fetch_sequence(&self, protein_id: &str, force: bool) -> Result<PathBuf> {
        let accession = validate_accession(protein_id)?;
        let target = self.sequence_path(accession);
        if target.exists() && !force {
            return Err(CliError::Data(format!(
                "Sequence {} already exists at {:?}. Use --force to overwrite.",
                accession, target
            )));
        }

        let url = uniprot_url(accession);
        info!("Sending request to {}", url);
        let client = reqwest::Client::new();
        let body = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        self.store_sequence(accession, &body)
    }

    /// Checks that `body` is a FASTA record and writes it as the sequence of
    /// `protein_id`.
    fn store_sequence(&self, protein_id: &str, body: &str) -> Result<PathBuf> {
        let records = fasta::read_records(body.as_bytes()).map_err(|e| CliError::FileParsing {
            path: self.sequence_path(protein_id),
            source: e.into(),
        })?;
        if records.first().is_none_or(|record| record.is_empty()) {
            return Err(CliError::Data(format!(
                "UniProt returned no sequence for {}.",
                protein_id
            )));
        }
        if records.len() > 1 {
            warn!(protein = %protein_id, records = records.len(), "Keeping only the first FASTA record.");
        }

        let target = self.sequence_path(protein_id);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fasta::write_records_to_path(&target, &records[..1]).map_err(|e| CliError::FileParsing {
            path: target.clone(),
            source: e.into(),
        })?;
        info!(protein = %protein_id, residues = records[0].len(), "Sequence stored at {:?}", target);
        Ok(target)
    }

    pub fn set_custom_path(path: &Path) -> Result<()> {
        let config_path = Self::get_path_config_file()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let path = path.to_str().ok_or_else(|| {
            CliError::Argument(format!("Data path {:?} is not valid UTF-8.", path))
        })?;
        fs::write(config_path, path).map_err(CliError::from)
    }

    pub fn reset_path() -> Result<()> {
        if let Ok(config_path) = Self::get_path_config_file() {
            if config_path.exists() {
                fs::remove_file(config_path)?;
            }
        }
        Ok(())
    }

    fn determine_data_path() -> Result<PathBuf> {
        match Self::get_path_config_file() {
            Ok(config_path) if config_path.exists() => {
                let custom_path_str = fs::read_to_string(&config_path)?.trim().to_string();
                if custom_path_str.is_empty() {
                    warn!("Custom path config file is empty, falling back to default path.");
                    Self::get_default_data_path()
                } else {
                    Ok(PathBuf::from(custom_path_str))
                }
            }
            _ => Self::get_default_data_path(),
        }
    }

    fn get_path_config_file() -> Result<PathBuf> {
        ProjectDirs::from("org", "templar", "templar")
            .map(|dirs| dirs.config_dir().join("path.conf"))
            .ok_or_else(|| CliError::Data("Could not determine config directory path.".to_string()))
    }

    fn get_default_data_path() -> Result<PathBuf> {
        ProjectDirs::from("org", "templar", "templar")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                CliError::Data("Could not determine default data directory path.".to_string())
            })
    }
}

fn validate_accession(protein_id: &str) -> Result<&str> {
    let accession = protein_id.trim();
    if accession.is_empty() || !accession.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(CliError::Argument(format!(
            "'{}' is not a valid UniProt accession.",
            protein_id
        )));
    }
    Ok(accession)
}

fn uniprot_url(accession: &str) -> String {
    format!("{}/{}.fasta", UNIPROT_URL, accession)
}

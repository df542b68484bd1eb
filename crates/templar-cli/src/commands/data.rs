use crate::cli::{DataArgs, DataCommands};
use crate::data::DataManager;
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub async fn run(args: DataArgs) -> Result<()> {
    match args.command {
        DataCommands::FetchSequence { id, force } => {
            handle_fetch_sequence(&id, force).await?;
        }
        DataCommands::Path => {
            handle_path()?;
        }
        DataCommands::SetPath { path } => {
            handle_set_path(path)?;
        }
        DataCommands::ResetPath => {
            handle_reset_path()?;
        }
    }
    Ok(())
}

async fn handle_fetch_sequence(id: &str, force: bool) -> Result<()> {
    let manager = DataManager::new()?;

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(2));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Fetching {} from UniProt...", id));

    match manager.fetch_sequence(id, force).await {
        Ok(path) => {
            pb.finish_with_message(format!("✓ Sequence stored at {:?}", path));
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("✗ Fetch failed.");
            Err(e)
        }
    }
}

fn handle_path() -> Result<()> {
    let manager = DataManager::new()?;
    println!("{}", manager.get_data_path().display());
    Ok(())
}

fn handle_set_path(path: PathBuf) -> Result<()> {
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    DataManager::set_custom_path(&path)?;
    info!("Data path set to {:?}", &path);
    println!("✓ Data path set to: {}", path.display());
    Ok(())
}

fn handle_reset_path() -> Result<()> {
    DataManager::reset_path()?;
    let manager = DataManager::new()?;
    info!("Data path reset to {:?}", manager.get_data_path());
    println!("✓ Data path reset to default: {}", manager.get_data_path().display());
    Ok(())
}

use super::models::AlignerKind;
use std::path::PathBuf;
use templar::core::alignment::loners::DEFAULT_LONER_RATIO;
use templar::core::alignment::scoring::DEFAULT_IDENTITY_WEIGHT;
use templar::engine::config::DEFAULT_CONTACT_DISTANCE;

pub struct DefaultsConfig {
    pub aligner: AlignerKind,
    pub aligner_program: PathBuf,
    pub scratch_dir: PathBuf,
    pub max_concurrent: usize,
    pub contact_distance: f64,
    pub identity_weight: f64,
    pub loner_ratio: f64,
    pub skip_elm_interactions: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            aligner: AlignerKind::Builtin,
            aligner_program: PathBuf::from("t_coffee"),
            scratch_dir: std::env::temp_dir().join("templar"),
            max_concurrent: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            contact_distance: DEFAULT_CONTACT_DISTANCE,
            identity_weight: DEFAULT_IDENTITY_WEIGHT,
            loner_ratio: DEFAULT_LONER_RATIO,
            skip_elm_interactions: true,
        }
    }
}

use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AlignerKind, AlignerSettings, AppConfig};
use crate::cli::ConfigArgs;
use crate::data::DataManager;
use crate::error::{CliError, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::str::FromStr;
use templar::engine::aligner::CommandAligner;
use templar::engine::config::MappingConfigBuilder;
use tracing::debug;

pub fn build_config(args: &ConfigArgs, data_manager: &DataManager) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let data_dir = args
        .data_dir
        .clone()
        .or(file_config.data.take().and_then(|d| d.directory))
        .unwrap_or_else(|| data_manager.get_data_path().to_path_buf());

    let aligner_file = file_config.aligner.take().unwrap_or_default();
    let aligner = AlignerSettings {
        kind: args.aligner.or(aligner_file.kind).unwrap_or(defaults.aligner),
        program: args
            .aligner_program
            .clone()
            .or(aligner_file.program)
            .unwrap_or(defaults.aligner_program),
        args: aligner_file.args.unwrap_or_else(CommandAligner::t_coffee_args),
        scratch_dir: aligner_file.scratch_dir.unwrap_or(defaults.scratch_dir),
        max_concurrent: args
            .max_concurrent
            .or(aligner_file.max_concurrent)
            .unwrap_or(defaults.max_concurrent),
    };
    if aligner.max_concurrent == 0 {
        return Err(CliError::Config(
            "`aligner.max-concurrent` must be at least 1.".to_string(),
        ));
    }

    let mapping_file = file_config.mapping.take().unwrap_or_default();
    let skip_elm_interactions = if args.include_elm {
        false
    } else {
        mapping_file
            .skip_elm_interactions
            .unwrap_or(defaults.skip_elm_interactions)
    };

    let mut builder = MappingConfigBuilder::new()
        .contact_distance(
            args.contact_distance
                .or(mapping_file.contact_distance)
                .unwrap_or(defaults.contact_distance),
        )
        .identity_weight(
            args.identity_weight
                .or(mapping_file.identity_weight)
                .unwrap_or(defaults.identity_weight),
        )
        .loner_ratio(mapping_file.loner_ratio.unwrap_or(defaults.loner_ratio))
        .skip_elm_interactions(skip_elm_interactions);
    if let Some(ids) = mapping_file.obsolete_structures {
        builder = builder.obsolete_structures(ids);
    }
    if let Some(rounds) = mapping_file.max_refinement_rounds {
        builder = builder.max_refinement_rounds(rounds);
    }
    let mapping = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

    debug!(data_dir = %data_dir.display(), aligner = ?aligner.kind, "Configuration resolved.");
    Ok(AppConfig {
        data_dir,
        aligner,
        mapping,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", expected, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "data.directory" => {
                config.data.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value_str));
            }
            "aligner.kind" => {
                let kind = AlignerKind::from_str(value_str.trim(), true).map_err(|_| {
                    CliError::Config(format!(
                        "Invalid aligner kind for {}: {} (expected 'builtin' or 'command')",
                        key, value_str
                    ))
                })?;
                config.aligner.get_or_insert_with(Default::default).kind = Some(kind);
            }
            "aligner.program" => {
                config.aligner.get_or_insert_with(Default::default).program =
                    Some(PathBuf::from(value_str));
            }
            "aligner.scratch-dir" => {
                config.aligner.get_or_insert_with(Default::default).scratch_dir =
                    Some(PathBuf::from(value_str));
            }
            "aligner.max-concurrent" => {
                config.aligner.get_or_insert_with(Default::default).max_concurrent =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "mapping.contact-distance" => {
                config.mapping.get_or_insert_with(Default::default).contact_distance =
                    Some(parse_value(key, value_str, "float")?);
            }
            "mapping.identity-weight" => {
                config.mapping.get_or_insert_with(Default::default).identity_weight =
                    Some(parse_value(key, value_str, "float")?);
            }
            "mapping.loner-ratio" => {
                config.mapping.get_or_insert_with(Default::default).loner_ratio =
                    Some(parse_value(key, value_str, "float")?);
            }
            "mapping.skip-elm-interactions" => {
                config
                    .mapping
                    .get_or_insert_with(Default::default)
                    .skip_elm_interactions = Some(parse_value(key, value_str, "boolean")?);
            }
            "mapping.max-refinement-rounds" => {
                config
                    .mapping
                    .get_or_insert_with(Default::default)
                    .max_refinement_rounds = Some(parse_value(key, value_str, "integer")?);
            }
            "mapping.obsolete-structures" => {
                config
                    .mapping
                    .get_or_insert_with(Default::default)
                    .obsolete_structures = Some(
                    value_str
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

//! Configuration for the commands that align sequences.
//!
//! Values are resolved in order: command-line flags, `-S KEY=VALUE`
//! overrides, the TOML file given with `--config`, then [`DefaultsConfig`].

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use defaults::DefaultsConfig;
pub use models::{AlignerKind, AlignerSettings, AppConfig};

use crate::core::alignment::LonerDetector;
use crate::core::alignment::loners::DEFAULT_LONER_RATIO;
use crate::core::alignment::scoring::DEFAULT_IDENTITY_WEIGHT;
use crate::core::utils::identifiers::STANDARD_AMINO_ACIDS;
use std::collections::HashSet;
use thiserror::Error;

/// Default maximum atom-atom distance, in Angstroms, for two chains to be in contact.
pub const DEFAULT_CONTACT_DISTANCE: f64 = 5.0;

/// Structures whose template entries are known to be obsolete.
pub const DEFAULT_OBSOLETE_STRUCTURES: [&str; 5] = ["3C4D", "3LB7", "3NSV", "2NP8", "2WN0"];

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    pub contact_distance: f64,
    pub identity_weight: f64,
    pub loner_ratio: f64,
    pub obsolete_structures: HashSet<String>,
    pub skip_elm_interactions: bool,
    /// Upper bound on refinement re-alignments. `None` bounds the loop by the
    /// query length, which every trimming round shortens.
    pub max_refinement_rounds: Option<usize>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            contact_distance: DEFAULT_CONTACT_DISTANCE,
            identity_weight: DEFAULT_IDENTITY_WEIGHT,
            loner_ratio: DEFAULT_LONER_RATIO,
            obsolete_structures: default_obsolete_structures(),
            skip_elm_interactions: true,
            max_refinement_rounds: None,
        }
    }
}

impl MappingConfig {
    pub fn is_obsolete(&self, structure_id: &str) -> bool {
        self.obsolete_structures
            .contains(&structure_id.to_ascii_uppercase())
    }

    pub fn loner_detector(&self) -> LonerDetector {
        LonerDetector::new(STANDARD_AMINO_ACIDS, self.loner_ratio)
    }
}

fn default_obsolete_structures() -> HashSet<String> {
    DEFAULT_OBSOLETE_STRUCTURES
        .iter()
        .map(|id| id.to_string())
        .collect()
}

#[derive(Default)]
pub struct MappingConfigBuilder {
    contact_distance: Option<f64>,
    identity_weight: Option<f64>,
    loner_ratio: Option<f64>,
    obsolete_structures: Option<HashSet<String>>,
    skip_elm_interactions: Option<bool>,
    max_refinement_rounds: Option<usize>,
}

impl MappingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contact_distance(mut self, angstroms: f64) -> Self {
        self.contact_distance = Some(angstroms);
        self
    }
    pub fn identity_weight(mut self, weight: f64) -> Self {
        self.identity_weight = Some(weight);
        self
    }
    pub fn loner_ratio(mut self, ratio: f64) -> Self {
        self.loner_ratio = Some(ratio);
        self
    }
    pub fn obsolete_structures<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.obsolete_structures = Some(
            ids.into_iter()
                .map(|id| id.as_ref().to_ascii_uppercase())
                .collect(),
        );
        self
    }
    pub fn skip_elm_interactions(mut self, skip: bool) -> Self {
        self.skip_elm_interactions = Some(skip);
        self
    }
    pub fn max_refinement_rounds(mut self, rounds: usize) -> Self {
        self.max_refinement_rounds = Some(rounds);
        self
    }

    pub fn build(self) -> Result<MappingConfig, ConfigError> {
        let contact_distance = self
            .contact_distance
            .ok_or(ConfigError::MissingParameter("contact_distance"))?;
        let identity_weight = self
            .identity_weight
            .ok_or(ConfigError::MissingParameter("identity_weight"))?;
        let loner_ratio = self
            .loner_ratio
            .ok_or(ConfigError::MissingParameter("loner_ratio"))?;

        if !(contact_distance.is_finite() && contact_distance > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "contact_distance",
                reason: format!("must be a positive distance (got {})", contact_distance),
            });
        }
        if !(0.0..=1.0).contains(&identity_weight) {
            return Err(ConfigError::InvalidValue {
                parameter: "identity_weight",
                reason: format!("must lie in [0, 1] (got {})", identity_weight),
            });
        }
        if !(loner_ratio.is_finite() && loner_ratio >= 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "loner_ratio",
                reason: format!("must be non-negative (got {})", loner_ratio),
            });
        }
        if self.max_refinement_rounds == Some(0) {
            return Err(ConfigError::InvalidValue {
                parameter: "max_refinement_rounds",
                reason: "must allow at least one round".to_string(),
            });
        }

        Ok(MappingConfig {
            contact_distance,
            identity_weight,
            loner_ratio,
            obsolete_structures: self
                .obsolete_structures
                .unwrap_or_else(default_obsolete_structures),
            skip_elm_interactions: self.skip_elm_interactions.unwrap_or(true),
            max_refinement_rounds: self.max_refinement_rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> MappingConfigBuilder {
        MappingConfigBuilder::new()
            .contact_distance(5.0)
            .identity_weight(0.95)
            .loner_ratio(0.2)
    }

    #[test]
    fn builder_with_required_parameters_matches_defaults() {
        assert_eq!(complete_builder().build().unwrap(), MappingConfig::default());
    }

    #[test]
    fn missing_parameters_are_named() {
        let result = MappingConfigBuilder::new().identity_weight(0.95).loner_ratio(0.2).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("contact_distance")));
        let result = MappingConfigBuilder::new().contact_distance(5.0).loner_ratio(0.2).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("identity_weight")));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            complete_builder().contact_distance(0.0).build(),
            Err(ConfigError::InvalidValue { parameter: "contact_distance", .. })
        ));
        assert!(matches!(
            complete_builder().identity_weight(1.5).build(),
            Err(ConfigError::InvalidValue { parameter: "identity_weight", .. })
        ));
        assert!(matches!(
            complete_builder().loner_ratio(f64::NAN).build(),
            Err(ConfigError::InvalidValue { parameter: "loner_ratio", .. })
        ));
        assert!(matches!(
            complete_builder().max_refinement_rounds(0).build(),
            Err(ConfigError::InvalidValue { parameter: "max_refinement_rounds", .. })
        ));
    }

    #[test]
    fn obsolete_structures_are_matched_case_insensitively() {
        let config = complete_builder().obsolete_structures(["1abc"]).build().unwrap();
        assert!(config.is_obsolete("1ABC"));
        assert!(config.is_obsolete("1abc"));
        assert!(!config.is_obsolete("3C4D"));
        assert!(MappingConfig::default().is_obsolete("3c4d"));
    }
}

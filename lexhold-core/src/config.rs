//! Configuration types

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_MAX_HELD_ITEMS_IN_ERROR: usize = 5;
const DEFAULT_SYSTEM_ACTOR: &str = "System";
const DEFAULT_HOLD_CONTAINER_NAME: &str = "Holds";

/// Hold engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HoldConfig {
    /// Maximum number of inaccessible item names listed in a delete-hold denial
    pub max_held_items_in_error: usize,
    /// Name of the elevated actor used for mechanical freeze/unfreeze
    pub system_actor: String,
    /// Name given to a hold container created on demand
    pub hold_container_name: String,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            max_held_items_in_error: DEFAULT_MAX_HELD_ITEMS_IN_ERROR,
            system_actor: DEFAULT_SYSTEM_ACTOR.to_string(),
            hold_container_name: DEFAULT_HOLD_CONTAINER_NAME.to_string(),
        }
    }
}

impl HoldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_held_items_in_error == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_held_items_in_error".to_string(),
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.system_actor.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "system_actor".to_string(),
            });
        }
        if self.hold_container_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "hold_container_name".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: HoldConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Defaults overridden by `LEXHOLD_MAX_HELD_ITEMS_IN_ERROR`,
    /// `LEXHOLD_SYSTEM_ACTOR` and `LEXHOLD_HOLD_CONTAINER_NAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_held_items_in_error = match std::env::var("LEXHOLD_MAX_HELD_ITEMS_IN_ERROR") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "LEXHOLD_MAX_HELD_ITEMS_IN_ERROR".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            Err(_) => defaults.max_held_items_in_error,
        };

        let config = Self {
            max_held_items_in_error,
            system_actor: std::env::var("LEXHOLD_SYSTEM_ACTOR")
                .unwrap_or(defaults.system_actor),
            hold_container_name: std::env::var("LEXHOLD_HOLD_CONTAINER_NAME")
                .unwrap_or(defaults.hold_container_name),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HoldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_held_items_in_error, 5);
        assert_eq!(config.hold_container_name, "Holds");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = HoldConfig {
            max_held_items_in_error: 0,
            ..HoldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_blank_system_actor_rejected() {
        let config = HoldConfig {
            system_actor: "  ".to_string(),
            ..HoldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let config = HoldConfig::from_toml_str("max_held_items_in_error = 3\n").unwrap();
        assert_eq!(config.max_held_items_in_error, 3);
        assert_eq!(config.system_actor, "System");
    }

    #[test]
    fn test_from_toml_unknown_field_rejected() {
        let err = HoldConfig::from_toml_str("retries = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_missing_path_is_io_error() {
        let err = HoldConfig::from_path(Path::new("/nonexistent/lexhold.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

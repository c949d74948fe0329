//! Engine configuration
//!
//! Re-exports [`EngineConfig`] from evo-types and adds platform defaults and
//! persistence through confy.

use std::path::PathBuf;

use thiserror::Error;

pub use evo_types::EngineConfig;

const APP_NAME: &str = "evo";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load engine configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save engine configuration")]
    Save(#[source] confy::ConfyError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

fn default_definitions_dir() -> String {
    dirs::config_dir()
        .map(|p| p.join("evo").join("abilities"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// EngineConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for EngineConfig persistence
pub trait EngineConfigExt: Sized {
    fn load() -> Result<Self, ConfigError>;
    fn load_or_default() -> Self;
    fn load_with_defaults() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Option<PathBuf>;
    fn definitions_path(&self) -> Option<PathBuf>;
}

impl EngineConfigExt for EngineConfig {
    fn load() -> Result<Self, ConfigError> {
        confy::load(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)
    }

    /// Fall back to platform defaults when the stored config is unreadable
    fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) if !config.definitions_dir.is_empty() => config,
            Ok(config) => EngineConfig {
                definitions_dir: default_definitions_dir(),
                ..config
            },
            Err(err) => {
                tracing::warn!(error = %err, "Using default engine configuration");
                Self::load_with_defaults()
            }
        }
    }

    fn load_with_defaults() -> Self {
        EngineConfig::with_definitions_dir(default_definitions_dir())
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    fn definitions_path(&self) -> Option<PathBuf> {
        let dir = self.definitions_dir.trim();
        (!dir.is_empty()).then(|| PathBuf::from(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_path_ignores_blank_dirs() {
        assert_eq!(EngineConfig::default().definitions_path(), None);
        let config = EngineConfig::with_definitions_dir("/data/abilities");
        assert_eq!(
            config.definitions_path(),
            Some(PathBuf::from("/data/abilities"))
        );
    }

    #[test]
    fn defaults_match_case_insensitive_enums() {
        let config = EngineConfig::load_with_defaults();
        assert!(config.case_insensitive_enums);
        assert!(!config.debug_logging);
    }
}

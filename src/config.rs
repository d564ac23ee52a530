//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/outliner/outliner.toml`
//! 3. Explicit config file passed by the caller
//! 4. Environment variables: `OUTLINER_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::RootFallback;

/// Unified configuration for outliner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Handling of record sets without an unparented record
    pub root_fallback: RootFallback,
    /// Whether newly created documents start expanded
    pub expand_new_nodes: bool,
    /// Whether deleting the current document makes its parent current
    pub select_parent_on_delete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_fallback: RootFallback::Strict,
            expand_new_nodes: true,
            select_parent_on_delete: true,
        }
    }
}

/// Raw settings for intermediate parsing (None means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_fallback: Option<RootFallback>,
    pub expand_new_nodes: Option<bool>,
    pub select_parent_on_delete: Option<bool>,
}

/// Get the XDG config directory for outliner.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "outliner").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("outliner.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_fallback: overlay.root_fallback.unwrap_or(self.root_fallback),
            expand_new_nodes: overlay.expand_new_nodes.unwrap_or(self.expand_new_nodes),
            select_parent_on_delete: overlay
                .select_parent_on_delete
                .unwrap_or(self.select_parent_on_delete),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, if present
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply OUTLINER_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("OUTLINER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        match config.get::<RootFallback>("root_fallback") {
            Ok(val) => settings.root_fallback = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        if let Ok(val) = config.get_bool("expand_new_nodes") {
            settings.expand_new_nodes = val;
        }
        if let Ok(val) = config.get_bool("select_parent_on_delete") {
            settings.select_parent_on_delete = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# outliner configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/outliner/outliner.toml
#   File:   --config <path>
#   Env:    OUTLINER_* environment variables

# What to do when no record lacks a parent reference:
#   "strict"        fail to open the document
#   "first_record"  log a warning and use the first record as root
# root_fallback = "strict"

# New documents start expanded
# expand_new_nodes = true

# Deleting the current document selects its parent
# select_parent_on_delete = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_inherited() {
        let overlay = RawSettings {
            root_fallback: Some(RootFallback::FirstRecord),
            ..RawSettings::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.root_fallback, RootFallback::FirstRecord);
        assert!(merged.expand_new_nodes);
        assert!(merged.select_parent_on_delete);
    }

    #[test]
    fn given_template_when_parsing_then_yields_no_overrides() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.root_fallback.is_none());
        assert!(raw.expand_new_nodes.is_none());
    }

    #[test]
    fn given_settings_when_rendering_toml_then_uses_snake_case_values() {
        let settings = Settings {
            root_fallback: RootFallback::FirstRecord,
            ..Settings::default()
        };
        let rendered = settings.to_toml().unwrap();
        assert!(rendered.contains(r#"root_fallback = "first_record""#));
    }
}

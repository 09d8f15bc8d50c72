//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (<platform config dir>/civicpulse/config.toml)
//! 3. Project config (./civicpulse.toml)
//! 4. Explicit file passed on the command line
//! 5. Environment variables (CIVICPULSE_* prefix, `__` separates sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{PulseError, Result};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CIVICPULSE_";

/// Project config file name
pub const PROJECT_CONFIG_FILE: &str = "civicpulse.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → explicit file → env vars
    ///
    /// Missing files are skipped; only malformed or out-of-range values fail.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(PulseError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let figment = Self::figment(
            Self::global_config_path(),
            Self::project_config_path(),
            explicit,
        );
        Self::extract(figment)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::extract(figment)
    }

    fn figment(global: Option<PathBuf>, project: PathBuf, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = explicit {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g., CIVICPULSE_ANALYSIS__TOP_K_INSIGHTS -> analysis.top_k_insights
        figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| PulseError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "civicpulse").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(config: &Config) -> Result<String> {
        toml::to_string_pretty(config).map_err(|e| PulseError::Config(e.to_string()))
    }
}

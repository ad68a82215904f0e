//! Sync configuration
//!
//! Loaded from a YAML file; every field has a default so an absent file
//! means "mirror beta registers into the test catalog".
//!
//! ```yaml
//! source_url: https://register.register.gov.uk/records.json?page-size=500
//! catalog_url: https://test.data.gov.uk
//! api_key_env: CKAN_API_KEY
//! phase: beta
//! license_id: uk-ogl
//! max_renames: 10
//! timeout_seconds: 30
//! organisations:
//!   hm-land-registry: land-registry
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::reconcile::DEFAULT_MAX_RENAMES;
use crate::source::DEFAULT_SOURCE_URL;
use crate::transform::{OrganisationMap, DEFAULT_LICENSE_ID};

/// Top-level sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Register register index URL
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Base URL of the CKAN catalog
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Environment variable holding the CKAN API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Only registers in this phase are mirrored
    #[serde(default = "default_phase")]
    pub phase: String,

    #[serde(default = "default_license_id")]
    pub license_id: String,

    /// Renames attempted before a record is marked as failed
    #[serde(default = "default_max_renames")]
    pub max_renames: u32,

    /// HTTP timeout for both services
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Organisation renames, merged over the built-in table
    #[serde(default = "OrganisationMap::identity")]
    pub organisations: OrganisationMap,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            catalog_url: default_catalog_url(),
            api_key_env: default_api_key_env(),
            phase: default_phase(),
            license_id: default_license_id(),
            max_renames: default_max_renames(),
            timeout_seconds: default_timeout(),
            organisations: OrganisationMap::identity(),
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_api_key_env() -> String {
    "CKAN_API_KEY".to_string()
}

fn default_phase() -> String {
    "beta".to_string()
}

fn default_license_id() -> String {
    DEFAULT_LICENSE_ID.to_string()
}

fn default_max_renames() -> u32 {
    DEFAULT_MAX_RENAMES
}

fn default_timeout() -> u64 {
    30
}

impl SyncConfig {
    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: SyncConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file location (e.g. `~/.config/register-sync/config.yaml`)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("uk.gov", "registers", "register-sync")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("register-sync")))
            .context("Could not determine config directory")?;

        Ok(config_dir.join("config.yaml"))
    }

    /// Built-in organisation table with configured entries applied on top
    pub fn organisation_map(&self) -> OrganisationMap {
        let mut map = OrganisationMap::default();
        map.extend(self.organisations.clone());
        map
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

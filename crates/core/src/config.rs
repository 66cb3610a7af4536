//! Configuration file management
//!
//! The configuration lives in `config.toml` under `$OSC_CONFIG_DIR`, or under
//! `osc/` in the platform configuration directory. It holds output defaults, the
//! token store settings and the named cluster profiles.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::client::DEFAULT_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::token_store::TokenStoreConfig;

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "OSC_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Output and connection defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    /// `human` or `json`
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Profile used when `--cluster` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

fn default_output() -> String {
    "human".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cluster: None,
        }
    }
}

/// A named cluster login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,

    /// Skip TLS certificate verification for this cluster
    #[serde(default)]
    pub insecure: bool,
}

impl ClusterProfile {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: username.into(),
            password: password.into(),
            insecure: false,
        }
    }

    /// Validated credentials for this profile
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(&self.host, &self.username, &self.password)
    }
}

impl fmt::Debug for ClusterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterProfile")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

/// Whole configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub token_store: TokenStoreConfig,

    #[serde(default)]
    pub clusters: Vec<ClusterProfile>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            token_store: TokenStoreConfig::default(),
            clusters: Vec::new(),
        }
    }
}

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default location
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: default_config_dir()?.join(CONFIG_FILE),
        })
    }

    /// Manager for an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration; a missing file yields the defaults
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Invalid configuration file {}: {e}", self.path.display()))
        })?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration schema version {} is newer than supported version {SCHEMA_VERSION}",
                config.schema_version
            )));
        }

        Ok(config)
    }

    /// Write the configuration, creating the directory if needed
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {e}")))?;
        std::fs::write(&self.path, content)?;

        tracing::debug!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }
}

/// `$OSC_CONFIG_DIR`, else `<config dir>/osc`
pub fn default_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .map(|d| d.join("osc"))
        .ok_or_else(|| Error::Config("Cannot determine the configuration directory".to_string()))
}

/// CRUD over the `[[clusters]]` profiles
#[derive(Debug, Clone)]
pub struct ClusterManager {
    config: ConfigManager,
}

impl ClusterManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: ConfigManager::new()?,
        })
    }

    pub fn with_config_manager(config: ConfigManager) -> Self {
        Self { config }
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config
    }

    pub fn list(&self) -> Result<Vec<ClusterProfile>> {
        Ok(self.config.load()?.clusters)
    }

    pub fn get(&self, name: &str) -> Result<ClusterProfile> {
        self.config
            .load()?
            .clusters
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::Config(format!("Cluster '{name}' not found")))
    }

    /// Profile named by `name`, or the configured default, or the only profile
    pub fn resolve(&self, name: Option<&str>) -> Result<ClusterProfile> {
        let config = self.config.load()?;
        let name = match name.or(config.defaults.cluster.as_deref()) {
            Some(name) => name.to_string(),
            None => match config.clusters.as_slice() {
                [only] => return Ok(only.clone()),
                [] => return Err(Error::Config("No cluster configured".to_string())),
                _ => {
                    return Err(Error::Config(
                        "Several clusters configured; choose one with --cluster".to_string(),
                    ));
                }
            },
        };

        config
            .clusters
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::Config(format!("Cluster '{name}' not found")))
    }

    /// Add or replace a profile
    pub fn set(&self, profile: ClusterProfile) -> Result<()> {
        profile.credentials()?;

        let mut config = self.config.load()?;
        match config.clusters.iter_mut().find(|c| c.name == profile.name) {
            Some(existing) => *existing = profile,
            None => config.clusters.push(profile),
        }
        self.config.save(&config)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config.load()?;
        let before = config.clusters.len();
        config.clusters.retain(|c| c.name != name);
        if config.clusters.len() == before {
            return Err(Error::Config(format!("Cluster '{name}' not found")));
        }
        if config.defaults.cluster.as_deref() == Some(name) {
            config.defaults.cluster = None;
        }
        self.config.save(&config)
    }
}

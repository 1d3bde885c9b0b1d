use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jp4_dispatch::{ChannelSettings, DEFAULT_AGENT_ADDRESS};
use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{CatalogEntry, CatalogError, CatalogVariant, CommandCatalog};

pub const DEFAULT_PROMPT: &str = "JP4Agent> ";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub catalog: CatalogConfig,
    pub shell: ShellConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// `host:port` of the agent's CLI service.
    pub address: String,
    /// Bound on one dispatch. 0 waits forever.
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Connect at startup and refuse to start if the agent is down.
    pub fail_fast: bool,
    /// Ctrl-C cancels an in-flight dispatch.
    pub cancel_on_interrupt: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_AGENT_ADDRESS.to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            fail_fast: false,
            cancel_on_interrupt: true,
        }
    }
}

impl AgentConfig {
    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings {
            address: self.address.clone(),
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            cancel_on_interrupt: self.cancel_on_interrupt,
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Built-in vocabulary to use when `commands` is empty.
    pub variant: CatalogVariant,
    /// Overrides the variant's reply prefix.
    pub output_prefix: Option<String>,
    /// Custom vocabulary, replacing the built-in one.
    pub commands: Vec<CatalogEntry>,
}

impl CatalogConfig {
    pub fn build(&self) -> Result<CommandCatalog, CatalogError> {
        let builtin = CommandCatalog::builtin(self.variant);
        let prefix = self
            .output_prefix
            .clone()
            .unwrap_or_else(|| builtin.output_prefix().to_string());

        if self.commands.is_empty() {
            CommandCatalog::new(builtin.entries().to_vec(), prefix)
        } else {
            CommandCatalog::new(self.commands.clone(), prefix)
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    pub color: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            color: true,
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    /// Custom audit log path. Defaults to ~/.local/share/jp4cli/audit.jsonl.
    pub path: Option<String>,
}

impl AuditConfig {
    /// Resolve the audit log path, using the configured path or the XDG default.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(ref custom) = self.path {
            return PathBuf::from(custom);
        }

        let base = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".local").join("share")
            });
        base.join("jp4cli").join("audit.jsonl")
    }
}

impl Config {
    /// Load an explicitly named config file. Errors are fatal to the caller.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the default config file if there is one; fall back to defaults.
    pub fn load_or_default() -> Self {
        let path = config_path();
        match Self::load(&path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => Config::default(),
            Err(e) => {
                warn!("{e}; using defaults");
                Config::default()
            }
        }
    }
}

pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("jp4cli").join("config.toml")
}

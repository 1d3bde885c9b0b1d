//! Command-line arguments. Flags override values from the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::catalog::CatalogVariant;
use crate::config::{Config, ConfigError};

#[derive(Debug, Parser)]
#[command(name = "jp4cli", version, about = "Interactive command shell for JP4Agent")]
pub struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/jp4cli/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Agent address as host:port
    #[arg(long = "addr", value_name = "HOST:PORT", env = "JP4AGENT_ADDR")]
    pub address: Option<String>,

    /// Built-in command vocabulary
    #[arg(long, value_enum)]
    pub catalog: Option<CatalogVariant>,

    /// Per-command timeout in milliseconds, 0 to wait forever
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Connect at startup and exit if the agent is unreachable
    #[arg(long)]
    pub fail_fast: bool,

    /// Append a JSONL record of every dispatched command
    #[arg(long)]
    pub audit: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Load the config this invocation asks for. A file named with
    /// `--config` must exist and parse.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(ref address) = self.address {
            config.agent.address = address.clone();
        }
        if let Some(variant) = self.catalog {
            config.catalog.variant = variant;
            // an explicit variant wins over a custom vocabulary
            config.catalog.commands.clear();
            config.catalog.output_prefix = None;
        }
        if let Some(ms) = self.timeout_ms {
            config.agent.timeout_ms = ms;
        }
        if self.fail_fast {
            config.agent.fail_fast = true;
        }
        if self.audit {
            config.audit.enabled = true;
        }
        if self.no_color {
            config.shell.color = false;
        }
    }

    /// Default `env_logger` filter for this invocation.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "jp4_cli=debug,jp4_dispatch=debug,warn"
        } else {
            "warn"
        }
    }
}

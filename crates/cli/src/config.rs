//! Command-line configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use corelib::{HashAlgorithm, RouterConfig};

use crate::commands::{Command, CommandResult};
use crate::logging::{self, LogFormat};

/// Consistent-hash routing simulator and ring inspector.
#[derive(Parser, Debug)]
#[command(name = "ring-sim", version, about)]
pub struct CliConfig {
    /// JSON router configuration file (`replication_factor`, `hash`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Virtual nodes per server; overrides the configuration file.
    #[arg(long, global = true)]
    pub vnodes: Option<usize>,

    /// Hash function (blake3, siphash13, xxh3); overrides the configuration file.
    #[arg(long, global = true)]
    pub hash: Option<HashAlgorithm>,

    /// Log output format.
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> CommandResult {
        logging::init(self.log_format)?;
        let router_config = self.router_config()?;
        tracing::debug!(?router_config, "resolved router configuration");
        self.command.execute(&router_config)
    }

    /// File configuration (or defaults) with command-line overrides applied.
    pub fn router_config(&self) -> anyhow::Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => RouterConfig::default(),
        };
        if let Some(vnodes) = self.vnodes {
            config.replication_factor = vnodes;
        }
        if let Some(hash) = self.hash {
            config.hash = hash;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let cli = CliConfig::parse_from(["ring-sim", "--vnodes", "50", "--hash", "xxh3", "ring"]);
        let config = cli.router_config().unwrap();
        assert_eq!(config.replication_factor, 50);
        assert_eq!(config.hash, HashAlgorithm::Xxh3);
    }

    #[test]
    fn test_defaults() {
        let cli = CliConfig::parse_from(["ring-sim", "simulate"]);
        assert_eq!(cli.router_config().unwrap(), RouterConfig::default());
    }

    #[test]
    fn test_zero_vnodes_rejected() {
        let cli = CliConfig::parse_from(["ring-sim", "ring", "--vnodes", "0"]);
        assert!(cli.router_config().is_err());
    }

    #[test]
    fn test_unknown_hash_fails_parsing() {
        assert!(CliConfig::try_parse_from(["ring-sim", "--hash", "md5", "ring"]).is_err());
    }
}

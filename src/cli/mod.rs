pub mod keys;
pub mod wallet;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::account::DEFAULT_WORD_COUNT;
use crate::error::{Result, WalletError};

pub const MNEMONIC_ENV: &str = "GRAPHITE_MNEMONIC";
pub const PRIVATE_KEY_ENV: &str = "GRAPHITE_PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "graphite-wallet")]
#[command(about = "Graphite network wallet", long_about = None)]
pub struct Cli {
    /// Network config file (TOML)
    #[arg(long, global = true, default_value = "graphite.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new mnemonic and show the derived account
    New {
        /// Number of words (12, 15, 18, 21 or 24)
        #[arg(long, default_value_t = DEFAULT_WORD_COUNT)]
        words: usize,
    },
    /// Show the account behind a mnemonic or private key
    Inspect {
        #[command(flatten)]
        identity: IdentityArgs,
    },
    /// Check whether the account has paid the activation fee
    Status {
        #[command(flatten)]
        identity: IdentityArgs,
    },
    /// Pay the activation fee
    Activate {
        #[command(flatten)]
        identity: IdentityArgs,
    },
    /// Spam-filter level
    Filter {
        #[command(flatten)]
        identity: IdentityArgs,
        #[command(subcommand)]
        cmd: LevelCommands,
    },
    /// KYC level
    Kyc {
        #[command(flatten)]
        identity: IdentityArgs,
        #[command(subcommand)]
        cmd: LevelCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum LevelCommands {
    /// Read the current level
    Get,
    /// Submit a level change (requires activation)
    Set { level: String },
}

/// Where the account comes from. Falls back to the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    #[arg(long, conflicts_with = "key")]
    pub mnemonic: Option<String>,
    /// Hex private key
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    Mnemonic(String),
    PrivateKey(String),
}

impl IdentityArgs {
    pub fn resolve(&self) -> Result<IdentitySource> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<IdentitySource> {
        if let Some(phrase) = &self.mnemonic {
            return Ok(IdentitySource::Mnemonic(phrase.clone()));
        }
        if let Some(key) = &self.key {
            return Ok(IdentitySource::PrivateKey(key.clone()));
        }
        if let Some(phrase) = env(MNEMONIC_ENV).filter(|v| !v.trim().is_empty()) {
            return Ok(IdentitySource::Mnemonic(phrase));
        }
        if let Some(key) = env(PRIVATE_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            return Ok(IdentitySource::PrivateKey(key));
        }
        Err(WalletError::invalid_argument(
            "mnemonic",
            "",
            format!(
                "pass --mnemonic or --key, or set {} or {}",
                MNEMONIC_ENV, PRIVATE_KEY_ENV
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_level_set() {
        let cli = Cli::try_parse_from([
            "graphite-wallet",
            "filter",
            "--key",
            "0x01",
            "set",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Filter { identity, cmd } => {
                assert_eq!(identity.key.as_deref(), Some("0x01"));
                assert!(matches!(cmd, LevelCommands::Set { ref level } if level == "3"));
            }
            _ => panic!("expected filter command"),
        }
        assert_eq!(cli.config, PathBuf::from("graphite.toml"));
    }

    #[test]
    fn test_mnemonic_and_key_conflict() {
        let res = Cli::try_parse_from([
            "graphite-wallet",
            "status",
            "--mnemonic",
            "a b c",
            "--key",
            "0x01",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_identity_falls_back_to_env() {
        let args = IdentityArgs::default();
        let source = args
            .resolve_with(|name| (name == PRIVATE_KEY_ENV).then(|| "0xabc".to_string()))
            .unwrap();
        assert_eq!(source, IdentitySource::PrivateKey("0xabc".into()));

        let err = args.resolve_with(|_| None).unwrap_err();
        assert_eq!(err.argument(), Some("mnemonic"));

        let explicit = IdentityArgs {
            mnemonic: Some("kite pencil".into()),
            key: None,
        };
        assert_eq!(
            explicit.resolve_with(|_| Some("ignored".into())).unwrap(),
            IdentitySource::Mnemonic("kite pencil".into())
        );
    }
}

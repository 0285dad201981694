use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::account::{Address, DEFAULT_DERIVATION_PATH};
use crate::encoding::decode_hex_arg;
use crate::error::{Result, WalletError};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletConfig {
    pub network: NetworkConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Network-wide constants as written in the config file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Fetched from the node when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub separator: String,
    pub entrypoint_node_address: String,
    pub contracts: ContractAddresses,
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,
    #[serde(default = "default_kyc_value")]
    pub default_kyc_value: u64,
    #[serde(default = "default_derivation_path")]
    pub derivation_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ContractAddresses {
    pub fee: String,
    pub filter: String,
    pub kyc: String,
}

/// Validated, typed view of a [`NetworkConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub chain_id: Option<u64>,
    pub separator: Vec<u8>,
    pub entrypoint: Vec<u8>,
    pub fee_contract: Address,
    pub filter_contract: Address,
    pub kyc_contract: Address,
    pub default_gas_limit: u64,
    pub default_kyc_value: u128,
    pub derivation_path: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gas_limit() -> u64 {
    300_000
}

fn default_kyc_value() -> u64 {
    1_000_000_000_000_000
}

fn default_derivation_path() -> String {
    DEFAULT_DERIVATION_PATH.to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: None,
            separator: "0x00000000".to_string(),
            entrypoint_node_address: "0x0000000000000000000000000000000000000001".to_string(),
            contracts: ContractAddresses {
                fee: "0x0000000000000000000000000000000000001001".to_string(),
                filter: "0x0000000000000000000000000000000000001002".to_string(),
                kyc: "0x0000000000000000000000000000000000001003".to_string(),
            },
            default_gas_limit: default_gas_limit(),
            default_kyc_value: default_kyc_value(),
            derivation_path: default_derivation_path(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl NetworkConfig {
    /// Decode hex constants and addresses, rejecting malformed values.
    pub fn validate(&self) -> Result<NetworkParams> {
        let separator = decode_hex_arg("separator", &self.separator)?;
        if separator.is_empty() {
            return Err(WalletError::invalid_argument(
                "separator",
                &self.separator,
                "separator must not be empty",
            ));
        }
        let entrypoint = decode_hex_arg("entrypointNodeAddress", &self.entrypoint_node_address)?;
        if entrypoint.is_empty() {
            return Err(WalletError::invalid_argument(
                "entrypointNodeAddress",
                &self.entrypoint_node_address,
                "entrypoint marker must not be empty",
            ));
        }
        if self.default_gas_limit == 0 {
            return Err(WalletError::invalid_argument(
                "defaultGasLimit",
                "0",
                "gas limit must be non-zero",
            ));
        }
        if self.chain_id == Some(0) {
            return Err(WalletError::invalid_argument(
                "chainId",
                "0",
                "chain id must be non-zero",
            ));
        }

        Ok(NetworkParams {
            chain_id: self.chain_id,
            separator,
            entrypoint,
            fee_contract: self.contracts.fee.parse()?,
            filter_contract: self.contracts.filter.parse()?,
            kyc_contract: self.contracts.kyc.parse()?,
            default_gas_limit: self.default_gas_limit,
            default_kyc_value: u128::from(self.default_kyc_value),
            derivation_path: self.derivation_path.clone(),
        })
    }
}

impl WalletConfig {
    /// Strict load: the file must exist, parse and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WalletError::invalid_argument("config", path.display().to_string(), e.to_string())
        })?;
        let config: WalletConfig = toml::from_str(&raw).map_err(|e| {
            WalletError::invalid_argument("config", path.display().to_string(), e.to_string())
        })?;
        config.network.validate()?;
        Ok(config)
    }

    /// Strict load when the file exists; otherwise write and return the
    /// defaults. A file that fails to parse or validate is an error, never
    /// silently replaced.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let config = Self::load(path)?;
            info!("Config loaded from {}", path.display());
            return Ok(config);
        }

        info!("Config file not found at '{}'. Creating default.", path.display());
        let config = Self::default();
        match toml::to_string_pretty(&config) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    warn!("Could not write default config: {}", e);
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }
        Ok(config)
    }
}

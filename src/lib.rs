pub mod abi;
pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod transaction;
pub mod wallet;

pub use account::{Address, Identity, KeyDeriver, PrivateKey, PublicKey};
pub use client::{CallRequest, Provider, RpcClient};
pub use config::{NetworkConfig, NetworkParams, WalletConfig};
pub use contracts::{ContractKind, IntoLevel, Level, SystemContract, SystemContracts};
pub use encoding::{EncodedPayload, PayloadEncoder};
pub use error::{ErrorKind, ProviderError, Result, SignerError, WalletError};
pub use transaction::{RawTransaction, TransactionRequest, TransactionSigner, TransactionSpec, TxHash};
pub use wallet::Wallet;

//! Account identity: mnemonic handling, key derivation and addresses.
//!
//! - BIP39 mnemonic generation and validation
//! - BIP32 derivation along `m/44'/60'/0'/0/0`
//! - secp256k1 key pairs and checksummed 20-byte addresses

pub mod address;
pub mod recovery;
pub mod types;

pub use address::Address;
pub use recovery::{KeyDeriver, DEFAULT_DERIVATION_PATH, DEFAULT_WORD_COUNT, SUPPORTED_WORD_COUNTS};
pub use types::{Identity, KeyPair, PrivateKey, PublicKey};

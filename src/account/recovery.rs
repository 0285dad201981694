//! Identity derivation from BIP39 mnemonics and raw private keys

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use tiny_hderive::bip32::ExtendedPrivKey;

use super::address::Address;
use super::types::{Identity, KeyPair, PrivateKey, PublicKey};
use crate::error::{Result, WalletError};

/// BIP44 path for the first external account on coin type 60.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Word counts accepted by [`KeyDeriver::generate_mnemonic`].
pub const SUPPORTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Used when no word count is given.
pub const DEFAULT_WORD_COUNT: usize = 15;

/// Stateless key and address derivation.
pub struct KeyDeriver;

impl KeyDeriver {
    /// Generate a fresh English mnemonic with `word_count` words.
    pub fn generate_mnemonic(word_count: usize) -> Result<String> {
        let bits = entropy_bits(word_count).ok_or_else(|| {
            WalletError::invalid_argument(
                "wordsCount",
                word_count.to_string(),
                "Invalid count of words",
            )
        })?;

        let mut entropy = vec![0u8; bits / 8];
        OsRng.fill_bytes(&mut entropy);

        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
            .map_err(|e| WalletError::BadMnemonic(e.to_string()))?;
        Ok(mnemonic.to_string())
    }

    /// Derive the identity at [`DEFAULT_DERIVATION_PATH`].
    pub fn derive_from_mnemonic(phrase: &str) -> Result<Identity> {
        Self::derive_from_mnemonic_at(phrase, DEFAULT_DERIVATION_PATH)
    }

    pub fn derive_from_mnemonic_at(phrase: &str, path: &str) -> Result<Identity> {
        let normalized = normalize_phrase(phrase);
        if normalized.is_empty() {
            return Err(WalletError::invalid_argument(
                "mnemonic",
                "",
                "Invalid mnemonic",
            ));
        }

        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|e| WalletError::BadMnemonic(e.to_string()))?;
        let seed = mnemonic.to_seed("");

        let node = ExtendedPrivKey::derive(&seed, path).map_err(|_| {
            WalletError::invalid_argument("path", path, "key derivation failed")
        })?;
        let private_key = PrivateKey::from_bytes(node.secret())?;

        Ok(Identity::new(
            Some(normalized),
            KeyPair::from_private_key(private_key),
        ))
    }

    /// Build an identity with no mnemonic from a hex private key.
    pub fn derive_from_private_key(hex_key: &str) -> Result<Identity> {
        let private_key = PrivateKey::from_hex(hex_key)?;
        Ok(Identity::new(None, KeyPair::from_private_key(private_key)))
    }

    /// Checksummed address for a 64- or 65-byte uncompressed public key.
    pub fn address_of(public_key: &[u8]) -> Result<String> {
        let public_key = PublicKey::from_slice(public_key)?;
        Ok(Address::from_public_key(&public_key).to_checksum())
    }
}

fn entropy_bits(word_count: usize) -> Option<usize> {
    match word_count {
        12 => Some(128),
        15 => Some(160),
        18 => Some(192),
        21 => Some(224),
        24 => Some(256),
        _ => None,
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

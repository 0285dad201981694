//! Key and identity value types

use std::fmt;

use super::address::Address;
use crate::crypto;
use crate::error::{Result, WalletError};

/// A 32-byte secp256k1 secret scalar, with its public key computed once.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: [u8; 32],
    public: PublicKey,
}

impl PrivateKey {
    /// Wrap raw bytes, rejecting zero and out-of-range scalars.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        let public = crypto::public_key_from_private(&bytes).map_err(|e| {
            WalletError::invalid_argument("privateKey", "<redacted>", e.to_string())
        })?;
        Ok(Self {
            secret: bytes,
            public: PublicKey(public),
        })
    }

    /// Parse a hex private key, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let trimmed = hex_str.trim();
        if trimmed.is_empty() {
            return Err(WalletError::invalid_argument(
                "privateKey",
                "",
                "Invalid argument",
            ));
        }
        let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(raw).map_err(|e| {
            WalletError::invalid_argument("privateKey", "<redacted>", e.to_string())
        })?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            WalletError::invalid_argument(
                "privateKey",
                "<redacted>",
                format!("expected 32 bytes, got {}", v.len()),
            )
        })?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret))
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Uncompressed secp256k1 point without the leading `0x04` tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 64]);

impl PublicKey {
    /// Accepts the 64-byte form or the 65-byte SEC1 form, and checks the
    /// point lies on the curve.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; 64] = match bytes.len() {
            64 => bytes.try_into().map_err(|_| invalid_public_key(bytes, "bad length"))?,
            65 if bytes[0] == 0x04 => bytes[1..]
                .try_into()
                .map_err(|_| invalid_public_key(bytes, "bad length"))?,
            65 => {
                return Err(invalid_public_key(
                    bytes,
                    &format!(
                        "65-byte key must start with the SEC1 uncompressed tag 0x04, got 0x{:02x}",
                        bytes[0]
                    ),
                ))
            }
            n => {
                return Err(invalid_public_key(
                    bytes,
                    &format!("expected 64 or 65 bytes, got {}", n),
                ))
            }
        };
        if !crypto::is_valid_public_key(&raw) {
            return Err(invalid_public_key(bytes, "point is not on the curve"));
        }
        Ok(Self(raw))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let raw = hex_str.trim().strip_prefix("0x").unwrap_or(hex_str.trim());
        let bytes = hex::decode(raw)
            .map_err(|e| WalletError::invalid_argument("publicKey", hex_str, e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn invalid_public_key(bytes: &[u8], reason: &str) -> WalletError {
    WalletError::invalid_argument("publicKey", hex::encode(bytes), reason)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }
}

/// An account identity: keys, address, and the phrase they came from (if any).
///
/// Immutable once built. Construct through [`crate::account::KeyDeriver`].
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    mnemonic: Option<String>,
    keys: KeyPair,
    address: Address,
}

impl Identity {
    pub(crate) fn new(mnemonic: Option<String>, keys: KeyPair) -> Self {
        let address = keys.public_key.address();
        Self {
            mnemonic,
            keys,
            address,
        }
    }

    /// `None` when the identity was built from a raw private key.
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref()
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.keys.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keys.public_key
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.keys.public_key)
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_rejects_zero_scalar() {
        let err = PrivateKey::from_bytes([0u8; 32]).unwrap_err();
        assert_eq!(err.argument(), Some("privateKey"));
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKey::from_bytes([7u8; 32]).unwrap();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("0707"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_public_key_accepts_sec1_prefix() {
        let key = PrivateKey::from_bytes([7u8; 32]).unwrap().public_key();
        let mut sec1 = vec![0x04];
        sec1.extend_from_slice(key.as_bytes());

        assert_eq!(PublicKey::from_slice(&sec1).unwrap(), key);
        assert_eq!(PublicKey::from_slice(key.as_bytes()).unwrap(), key);
    }

    #[test]
    fn test_public_key_rejects_off_curve_point() {
        assert!(PublicKey::from_slice(&[1u8; 64]).is_err());
        assert!(PublicKey::from_slice(&[1u8; 33]).is_err());
    }

    #[test]
    fn test_public_key_missing_sec1_tag() {
        let key = PrivateKey::from_bytes([7u8; 32]).unwrap().public_key();
        let mut compressed_tag = vec![0x02];
        compressed_tag.extend_from_slice(key.as_bytes());

        let err = PublicKey::from_slice(&compressed_tag).unwrap_err();
        assert_eq!(err.argument(), Some("publicKey"));
        let message = err.to_string();
        assert!(message.contains("0x04"), "{}", message);
        assert!(!message.contains("expected 64 or 65 bytes"), "{}", message);
    }

    #[test]
    fn test_private_key_carries_matching_public_key() {
        let key = PrivateKey::from_bytes([7u8; 32]).unwrap();
        let expected = crypto::public_key_from_private(&[7u8; 32]).unwrap();
        assert_eq!(key.public_key().as_bytes(), &expected);
        assert_ne!(key.public_key().as_bytes(), &[0u8; 64]);
    }
}

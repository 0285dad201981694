//! 20-byte account addresses and their mixed-case checksum rendering.

use std::fmt;
use std::str::FromStr;

use super::types::PublicKey;
use crate::crypto::keccak256;
use crate::error::WalletError;

/// Canonical account address: the right-most 20 bytes of `keccak256(pubkey)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let hash = keccak256(public_key.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Address(out)
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Mixed-case checksum encoding: a hex letter is uppercased when the
    /// matching nibble of `keccak256(lowercase_hex)` is 8 or more.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = WalletError;

    /// Accepts all-lowercase, all-uppercase or correctly checksummed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        if raw.len() != 40 {
            return Err(WalletError::invalid_argument(
                "address",
                s,
                format!("expected 40 hex digits, got {}", raw.len()),
            ));
        }
        let bytes = hex::decode(raw)
            .map_err(|e| WalletError::invalid_argument("address", s, e.to_string()))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        let address = Address(out);

        let has_lower = raw.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *raw {
            return Err(WalletError::invalid_argument(
                "address",
                s,
                "bad address checksum",
            ));
        }
        Ok(address)
    }
}

//! Minimal contract ABI encoding for the system contracts.
//!
//! Only static head-encoded types are needed: every argument occupies one
//! 32-byte word after the 4-byte selector.

use crate::account::Address;
use crate::crypto::keccak256;
use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(u128),
    Address(Address),
    Bool(bool),
    FixedBytes32([u8; 32]),
}

impl Token {
    fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        match self {
            Token::Uint(v) => word[16..].copy_from_slice(&v.to_be_bytes()),
            Token::Address(a) => word[12..].copy_from_slice(a.as_bytes()),
            Token::Bool(b) => word[31] = u8::from(*b),
            Token::FixedBytes32(bytes) => word.copy_from_slice(bytes),
        }
        word
    }
}

/// First four bytes of `keccak256(signature)`, e.g. `"pay()"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 32 * args.len());
    out.extend_from_slice(&selector(signature));
    for arg in args {
        out.extend_from_slice(&arg.to_word());
    }
    out
}

fn first_word(data: &[u8]) -> Result<&[u8], ProviderError> {
    if data.len() < 32 {
        return Err(ProviderError::Decode(format!(
            "expected a 32-byte return word, got {} bytes",
            data.len()
        )));
    }
    Ok(&data[..32])
}

pub fn decode_bool(data: &[u8]) -> Result<bool, ProviderError> {
    let word = first_word(data)?;
    if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
        return Err(ProviderError::Decode(format!(
            "not a bool word: 0x{}",
            hex::encode(word)
        )));
    }
    Ok(word[31] == 1)
}

pub fn decode_uint(data: &[u8]) -> Result<u128, ProviderError> {
    let word = first_word(data)?;
    if word[..16].iter().any(|b| *b != 0) {
        return Err(ProviderError::Decode("uint256 overflows u128".into()));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

//! Transaction-data framing and hex quantity helpers.
//!
//! Every payload routed to a system contract is laid out positionally as
//! `SEPARATOR ‖ ENTRYPOINT_MARKER ‖ method_call_bytes`. The receiving
//! dispatcher parses that layout byte-for-byte, so the order is fixed.

use std::fmt;

use crate::error::{ProviderError, Result, WalletError};

/// Framed transaction data, ready to embed in a transaction.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct EncodedPayload(Vec<u8>);

impl EncodedPayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        EncodedPayload(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedPayload({})", self.to_hex())
    }
}

/// Frames call bytes with the network's separator and entrypoint marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    separator: Vec<u8>,
    entrypoint: Vec<u8>,
}

impl PayloadEncoder {
    pub fn new(separator: Vec<u8>, entrypoint: Vec<u8>) -> Self {
        Self {
            separator,
            entrypoint,
        }
    }

    pub fn separator(&self) -> &[u8] {
        &self.separator
    }

    pub fn entrypoint(&self) -> &[u8] {
        &self.entrypoint
    }

    /// `SEPARATOR ‖ marker ‖ call`, with no validation.
    pub fn encode(&self, marker: &[u8], call: &[u8]) -> EncodedPayload {
        let mut out = Vec::with_capacity(self.separator.len() + marker.len() + call.len());
        out.extend_from_slice(&self.separator);
        out.extend_from_slice(marker);
        out.extend_from_slice(call);
        EncodedPayload(out)
    }

    /// Frame arbitrary bytes for the configured entrypoint. Empty input
    /// yields the bare framing.
    pub fn frame(&self, call: &[u8]) -> EncodedPayload {
        self.encode(&self.entrypoint, call)
    }

    /// Frame a method call; the call bytes must be present.
    pub fn frame_call(&self, call: &[u8]) -> Result<EncodedPayload> {
        if call.is_empty() {
            return Err(WalletError::invalid_argument(
                "methodCallBytes",
                "0x",
                "method call bytes are required",
            ));
        }
        Ok(self.frame(call))
    }

    /// Data carried by a transaction with no business payload.
    pub fn ping(&self) -> EncodedPayload {
        self.frame(&[])
    }
}

/// Strip leading zero bytes, leaving an empty slice for zero.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// Minimal big-endian hex quantity (`0x0`, `0x1a`, ...).
pub fn to_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

/// Parse a `0x`-prefixed hex quantity returned by an RPC endpoint.
pub fn parse_quantity(value: &str) -> std::result::Result<u128, ProviderError> {
    let raw = value
        .strip_prefix("0x")
        .ok_or_else(|| ProviderError::Decode(format!("quantity without 0x prefix: {}", value)))?;
    if raw.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(raw, 16)
        .map_err(|e| ProviderError::Decode(format!("bad quantity {}: {}", value, e)))
}

/// Decode `0x`-prefixed (or bare) hex data.
pub fn decode_hex_data(value: &str) -> std::result::Result<Vec<u8>, ProviderError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(raw).map_err(|e| ProviderError::Decode(format!("bad hex data: {}", e)))
}

/// Decode a hex constant from configuration.
pub fn decode_hex_arg(argument: &'static str, value: &str) -> Result<Vec<u8>> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(raw).map_err(|e| WalletError::invalid_argument(argument, value, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> PayloadEncoder {
        PayloadEncoder::new(vec![0xaa, 0xbb], vec![0x01, 0x02, 0x03])
    }

    #[test]
    fn test_frame_layout() {
        let enc = encoder();
        let short = enc.encode(&[0x09], &[0xff]);
        assert_eq!(short.as_bytes(), &[0xaa, 0xbb, 0x09, 0xff]);

        let long_call: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let long = enc.frame(&long_call);
        assert_eq!(&long.as_bytes()[..2], enc.separator());
        assert_eq!(&long.as_bytes()[2..5], enc.entrypoint());
        assert_eq!(&long.as_bytes()[5..], long_call.as_slice());
        assert_eq!(long.len(), 1005);
    }

    #[test]
    fn test_ping_is_bare_framing() {
        let ping = encoder().ping();
        assert_eq!(ping.to_hex(), "0xaabb010203");
        assert_eq!(encoder().frame(&[]), ping);
    }

    #[test]
    fn test_frame_call_requires_bytes() {
        let err = encoder().frame_call(&[]).unwrap_err();
        assert_eq!(err.argument(), Some("methodCallBytes"));
        assert!(encoder().frame_call(&[0x00]).is_ok());
    }

    #[test]
    fn test_quantities() {
        assert_eq!(to_quantity(0), "0x0");
        assert_eq!(to_quantity(21_000), "0x5208");
        assert_eq!(parse_quantity("0x5208").unwrap(), 21_000);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert!(parse_quantity("5208").is_err());
    }

    #[test]
    fn test_trim_leading_zeros() {
        assert_eq!(trim_leading_zeros(&[0, 0, 1, 0]), &[1, 0]);
        assert!(trim_leading_zeros(&[0, 0]).is_empty());
    }
}

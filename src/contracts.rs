//! System contracts: fee/activation, spam-filter level and KYC level.
//!
//! Writes are ABI-encoded and then framed by [`PayloadEncoder`]; reads are
//! plain ABI calls sent through `eth_call`.

use std::fmt;
use std::str::FromStr;

use crate::abi::{self, Token};
use crate::account::Address;
use crate::config::NetworkParams;
use crate::encoding::{EncodedPayload, PayloadEncoder};
use crate::error::{Result, WalletError};

/// Reserved evidence reference attached to KYC requests; zero-filled for now.
pub const KYC_LEVEL_DATA: [u8; 32] = [0u8; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Fee,
    Filter,
    Kyc,
}

impl ContractKind {
    /// Canonical signature of the state-changing method.
    pub fn write_method(&self) -> &'static str {
        match self {
            ContractKind::Fee => "pay()",
            ContractKind::Filter => "setFilterLevel(uint256)",
            ContractKind::Kyc => "createKYCRequest(uint256,bytes32)",
        }
    }

    /// Canonical signature of the read-only query.
    pub fn read_method(&self) -> &'static str {
        match self {
            ContractKind::Fee => "paidFee(address)",
            ContractKind::Filter => "viewFilterLevel()",
            ContractKind::Kyc => "level(address)",
        }
    }

    /// ABI call bytes for the write method. `level` is ignored by `Fee`.
    pub fn method_call(&self, level: Option<Level>) -> Vec<u8> {
        let level = Token::Uint(u128::from(level.unwrap_or_default().value()));
        match self {
            ContractKind::Fee => abi::encode_call(self.write_method(), &[]),
            ContractKind::Filter => abi::encode_call(self.write_method(), &[level]),
            ContractKind::Kyc => abi::encode_call(
                self.write_method(),
                &[level, Token::FixedBytes32(KYC_LEVEL_DATA)],
            ),
        }
    }

    /// ABI call bytes for the read query about `account`.
    pub fn query_call(&self, account: Address) -> Vec<u8> {
        match self {
            ContractKind::Filter => abi::encode_call(self.read_method(), &[]),
            ContractKind::Fee | ContractKind::Kyc => {
                abi::encode_call(self.read_method(), &[Token::Address(account)])
            }
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Fee => f.write_str("fee"),
            ContractKind::Filter => f.write_str("filter"),
            ContractKind::Kyc => f.write_str("kyc"),
        }
    }
}

/// A system-contract call builder, optionally bound to a deployed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemContract {
    kind: ContractKind,
    address: Option<Address>,
}

impl SystemContract {
    pub fn unbound(kind: ContractKind) -> Self {
        Self {
            kind,
            address: None,
        }
    }

    pub fn bound(kind: ContractKind, address: Address) -> Self {
        Self {
            kind,
            address: Some(address),
        }
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn bound_contract_address(&self) -> Result<Address> {
        self.address.ok_or_else(|| {
            WalletError::invalid_argument(
                "contract",
                self.kind.to_string(),
                format!("Invalid {} contract", self.kind),
            )
        })
    }

    /// Framed write payload. `level` defaults to zero for Filter/KYC.
    pub fn build_call_data(
        &self,
        encoder: &PayloadEncoder,
        level: Option<Level>,
    ) -> Result<EncodedPayload> {
        self.bound_contract_address()?;
        encoder.frame_call(&self.kind.method_call(level))
    }
}

/// The three system contracts resolved for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemContracts {
    pub fee: SystemContract,
    pub filter: SystemContract,
    pub kyc: SystemContract,
}

impl SystemContracts {
    pub fn resolve(params: &NetworkParams) -> Self {
        Self {
            fee: SystemContract::bound(ContractKind::Fee, params.fee_contract),
            filter: SystemContract::bound(ContractKind::Filter, params.filter_contract),
            kyc: SystemContract::bound(ContractKind::Kyc, params.kyc_contract),
        }
    }

    pub fn get(&self, kind: ContractKind) -> &SystemContract {
        match kind {
            ContractKind::Fee => &self.fee,
            ContractKind::Filter => &self.filter,
            ContractKind::Kyc => &self.kyc,
        }
    }
}

/// Filter or KYC level. The contract is the authority on the accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(u64);

impl Level {
    pub const fn new(value: u64) -> Self {
        Level(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Level {
    fn from(value: u64) -> Self {
        Level(value)
    }
}

impl FromStr for Level {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().parse::<u64>().map(Level).map_err(|_| not_an_integer(s))
    }
}

fn not_an_integer(value: impl fmt::Display) -> WalletError {
    WalletError::invalid_argument(
        "newLevel",
        value.to_string(),
        "The newLevel must be an integer",
    )
}

/// Caller-supplied level, validated before any network call.
pub trait IntoLevel {
    fn into_level(self) -> Result<Level>;
}

impl IntoLevel for Level {
    fn into_level(self) -> Result<Level> {
        Ok(self)
    }
}

macro_rules! into_level_unsigned {
    ($($t:ty),*) => {
        $(impl IntoLevel for $t {
            fn into_level(self) -> Result<Level> {
                Ok(Level(u64::from(self)))
            }
        })*
    };
}

macro_rules! into_level_signed {
    ($($t:ty),*) => {
        $(impl IntoLevel for $t {
            fn into_level(self) -> Result<Level> {
                u64::try_from(self).map(Level).map_err(|_| not_an_integer(self))
            }
        })*
    };
}

into_level_unsigned!(u8, u16, u32, u64);
into_level_signed!(i8, i16, i32, i64);

// 2^64; `u64::MAX as f64` rounds up to this, so the bound is exclusive.
const U64_EXCLUSIVE_BOUND: f64 = 18_446_744_073_709_551_616.0;

impl IntoLevel for f64 {
    fn into_level(self) -> Result<Level> {
        if !self.is_finite() || self.fract() != 0.0 || self < 0.0 || self >= U64_EXCLUSIVE_BOUND {
            return Err(not_an_integer(self));
        }
        Ok(Level(self as u64))
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> Result<Level> {
        self.parse()
    }
}

impl IntoLevel for String {
    fn into_level(self) -> Result<Level> {
        self.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn encoder() -> PayloadEncoder {
        PayloadEncoder::new(vec![0xee], vec![0x10; 20])
    }

    #[test]
    fn test_fee_payload_is_framed_pay() {
        let fee = SystemContract::bound(ContractKind::Fee, Address::from_bytes([1; 20]));
        let payload = fee.build_call_data(&encoder(), None).unwrap();

        let mut expected = vec![0xee];
        expected.extend_from_slice(&[0x10; 20]);
        expected.extend_from_slice(&abi::selector("pay()"));
        assert_eq!(payload.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_filter_level_defaults_to_zero() {
        let filter = SystemContract::bound(ContractKind::Filter, Address::from_bytes([2; 20]));
        let default = filter.build_call_data(&encoder(), None).unwrap();
        let zero = filter.build_call_data(&encoder(), Some(Level::new(0))).unwrap();
        assert_eq!(default, zero);

        let three = filter.build_call_data(&encoder(), Some(Level::new(3))).unwrap();
        let bytes = three.as_bytes();
        assert_eq!(bytes.len(), 1 + 20 + 4 + 32);
        assert_eq!(&bytes[21..25], &abi::selector("setFilterLevel(uint256)"));
        assert_eq!(bytes[bytes.len() - 1], 3);
    }

    #[test]
    fn test_kyc_request_carries_zeroed_level_data() {
        let kyc = SystemContract::bound(ContractKind::Kyc, Address::from_bytes([3; 20]));
        let payload = kyc.build_call_data(&encoder(), Some(Level::new(2))).unwrap();
        let call = &payload.as_bytes()[21..];

        assert_eq!(&call[..4], &abi::selector("createKYCRequest(uint256,bytes32)"));
        assert_eq!(call[35], 2);
        assert_eq!(&call[36..68], &KYC_LEVEL_DATA);
    }

    #[test]
    fn test_unbound_contract_rejected() {
        let err = SystemContract::unbound(ContractKind::Kyc)
            .build_call_data(&encoder(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.argument(), Some("contract"));
    }

    #[test]
    fn test_query_calls() {
        let who = Address::from_bytes([9; 20]);
        assert_eq!(ContractKind::Filter.query_call(who).len(), 4);
        let paid = ContractKind::Fee.query_call(who);
        assert_eq!(&paid[..4], &abi::selector("paidFee(address)"));
        assert_eq!(&paid[16..], who.as_bytes());
    }

    #[test]
    fn test_level_conversions() {
        assert_eq!(3u8.into_level().unwrap(), Level::new(3));
        assert_eq!(4.0f64.into_level().unwrap(), Level::new(4));
        assert_eq!("7".into_level().unwrap(), Level::new(7));
        // Largest f64 below 2^64 still converts exactly.
        assert_eq!(
            18_446_744_073_709_549_568.0f64.into_level().unwrap(),
            Level::new(18_446_744_073_709_549_568)
        );

        for err in [
            1.5f64.into_level().unwrap_err(),
            f64::NAN.into_level().unwrap_err(),
            (-1i32).into_level().unwrap_err(),
            "two".into_level().unwrap_err(),
            18_446_744_073_709_551_616.0f64.into_level().unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert_eq!(err.argument(), Some("newLevel"));
        }
    }
}

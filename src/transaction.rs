//! Transaction assembly, signing and broadcast.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::account::{Address, PrivateKey};
use crate::client::Provider;
use crate::crypto::{LocalSigner, Signer};
use crate::encoding::{to_quantity, EncodedPayload};
use crate::error::{ProviderError, Result, WalletError};

/// Caller-facing description of an arbitrary transfer or call.
///
/// `data` holds raw call bytes; the controller frames them before signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub value: Option<u128>,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub data: Option<Vec<u8>>,
}

/// Fully assembled transaction fields, ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSpec {
    pub from: Address,
    pub to: Option<Address>,
    pub value: Option<u128>,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub nonce: u64,
    pub data: EncodedPayload,
    pub chain_id: u64,
}

impl TransactionSpec {
    /// JSON-RPC style rendering with minimal big-endian hex quantities.
    pub fn to_json(&self) -> Value {
        let mut fields = json!({
            "from": self.from.to_checksum(),
            "gasLimit": to_quantity(u128::from(self.gas_limit)),
            "gasPrice": to_quantity(self.gas_price),
            "nonce": to_quantity(u128::from(self.nonce)),
            "data": self.data.to_hex(),
            "chainId": to_quantity(u128::from(self.chain_id)),
        });
        if let Some(to) = self.to {
            fields["to"] = json!(to.to_checksum());
        }
        if let Some(value) = self.value {
            fields["value"] = json!(to_quantity(value));
        }
        fields
    }
}

/// Raw signed transaction bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RawTransaction(Vec<u8>);

impl RawTransaction {
    pub fn new(bytes: Vec<u8>) -> Self {
        RawTransaction(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawTransaction({})", self.to_hex())
    }
}

/// Confirmation handle returned by a broadcast.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl FromStr for TxHash {
    type Err = ProviderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(raw).map_err(|e| ProviderError::Decode(format!("bad tx hash: {}", e)))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ProviderError::Decode(format!("tx hash must be 32 bytes: {}", s)))?;
        Ok(TxHash(hash))
    }
}

/// Signs assembled transactions through a [`Signer`] and broadcasts them.
#[derive(Clone)]
pub struct TransactionSigner {
    signer: Arc<dyn Signer>,
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new(Arc::new(LocalSigner))
    }
}

impl fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionSigner").finish_non_exhaustive()
    }
}

impl TransactionSigner {
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self { signer }
    }

    pub fn sign(&self, spec: &TransactionSpec, private_key: &PrivateKey) -> Result<RawTransaction> {
        debug!(tx = %spec.to_json(), "Signing transaction");
        self.signer
            .sign_transaction(spec, private_key)
            .map_err(WalletError::TransactionFailed)
    }

    /// Broadcast once; a rejected transaction is reported, never retried,
    /// since a retry would reuse the same nonce slot.
    pub async fn submit<P>(&self, provider: &P, raw: &RawTransaction) -> Result<TxHash>
    where
        P: Provider + ?Sized,
    {
        match provider.send_raw_transaction(raw).await {
            Ok(hash) => {
                info!(%hash, "Transaction submitted");
                Ok(hash)
            }
            Err(e) => {
                warn!("Transaction rejected: {}", e);
                Err(WalletError::invalid_argument("rawTx", raw.to_hex(), e.to_string()))
            }
        }
    }
}

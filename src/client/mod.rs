// Client module
pub mod rpc_client;

use std::sync::Arc;

use async_trait::async_trait;

use crate::account::Address;
use crate::error::ProviderError;
use crate::transaction::{RawTransaction, TxHash};

pub use rpc_client::RpcClient;

/// Read-only `eth_call` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Vec<u8>,
}

/// Ledger node access used by the wallet.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Pending-inclusive nonce of `address`.
    async fn get_transaction_count(&self, address: &Address) -> Result<u64, ProviderError>;

    async fn get_gas_price(&self) -> Result<u128, ProviderError>;

    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<TxHash, ProviderError>;

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn get_transaction_count(&self, address: &Address) -> Result<u64, ProviderError> {
        (**self).get_transaction_count(address).await
    }

    async fn get_gas_price(&self) -> Result<u128, ProviderError> {
        (**self).get_gas_price().await
    }

    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<TxHash, ProviderError> {
        (**self).send_raw_transaction(raw).await
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        (**self).call(request).await
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        (**self).chain_id().await
    }
}

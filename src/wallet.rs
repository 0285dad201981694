//! Account controller: owns one identity and drives the system contracts.
//!
//! Every signed write re-reads the gas price and nonce, and level updates
//! re-check activation, so no ledger state is cached between calls.

use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::abi;
use crate::account::{Address, Identity, KeyDeriver, PrivateKey, PublicKey};
use crate::client::{CallRequest, Provider};
use crate::config::NetworkParams;
use crate::contracts::{ContractKind, IntoLevel, Level, SystemContracts};
use crate::crypto::Signer;
use crate::encoding::{EncodedPayload, PayloadEncoder};
use crate::error::{Result, WalletError};
use crate::transaction::{RawTransaction, TransactionRequest, TransactionSigner, TransactionSpec, TxHash};

pub struct Wallet<P: Provider> {
    identity: Identity,
    provider: P,
    params: NetworkParams,
    encoder: PayloadEncoder,
    signer: TransactionSigner,
    contracts: OnceLock<SystemContracts>,
    chain_id: OnceCell<u64>,
    // Held across nonce read, signing and broadcast.
    nonce_guard: Mutex<()>,
}

impl<P: Provider> Wallet<P> {
    pub fn new(identity: Identity, provider: P, params: NetworkParams) -> Self {
        let encoder = PayloadEncoder::new(params.separator.clone(), params.entrypoint.clone());
        Self {
            identity,
            provider,
            params,
            encoder,
            signer: TransactionSigner::default(),
            contracts: OnceLock::new(),
            chain_id: OnceCell::new(),
            nonce_guard: Mutex::new(()),
        }
    }

    /// Derive the identity from a mnemonic along the configured path.
    pub fn from_mnemonic(phrase: &str, provider: P, params: NetworkParams) -> Result<Self> {
        let identity = KeyDeriver::derive_from_mnemonic_at(phrase, &params.derivation_path)?;
        Ok(Self::new(identity, provider, params))
    }

    pub fn from_private_key(hex_key: &str, provider: P, params: NetworkParams) -> Result<Self> {
        let identity = KeyDeriver::derive_from_private_key(hex_key)?;
        Ok(Self::new(identity, provider, params))
    }

    /// Generate a fresh mnemonic of `word_count` words and derive from it.
    pub fn create_random(word_count: usize, provider: P, params: NetworkParams) -> Result<Self> {
        let phrase = KeyDeriver::generate_mnemonic(word_count)?;
        Self::from_mnemonic(&phrase, provider, params)
    }

    /// Replace the default local signer, e.g. with a remote or hardware one.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = TransactionSigner::new(signer);
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn mnemonic(&self) -> Option<&str> {
        self.identity.mnemonic()
    }

    pub fn private_key(&self) -> &PrivateKey {
        self.identity.private_key()
    }

    pub fn public_key(&self) -> &PublicKey {
        self.identity.public_key()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn encoder(&self) -> &PayloadEncoder {
        &self.encoder
    }

    /// Resolve the system contract handles. Safe to call repeatedly.
    pub fn create_contracts(&self) -> &SystemContracts {
        self.contracts.get_or_init(|| SystemContracts::resolve(&self.params))
    }

    /// Configured chain id, or the node's, fetched once.
    pub async fn chain_id(&self) -> Result<u64> {
        if let Some(id) = self.params.chain_id {
            return Ok(id);
        }
        let id = self
            .chain_id
            .get_or_try_init(|| async { self.provider.chain_id().await })
            .await?;
        Ok(*id)
    }

    pub async fn get_activation_status(&self) -> Result<bool> {
        let data = self.query(ContractKind::Fee, None).await?;
        let activated = abi::decode_bool(&data)?;
        debug!(address = %self.address(), activated, "Activation status");
        Ok(activated)
    }

    /// Pay the one-time activation fee.
    pub async fn activate_account(&self) -> Result<TxHash> {
        if self.get_activation_status().await? {
            return Err(WalletError::AccountAlreadyActivated);
        }

        let fee = &self.create_contracts().fee;
        let to = fee.bound_contract_address()?;
        let data = fee.build_call_data(&self.encoder, None)?;
        let hash = self
            .sign_and_submit(to, None, data)
            .await
            .map_err(|e| WalletError::ActivationFailed(Box::new(e)))?;
        info!(address = %self.address(), %hash, "Account activation submitted");
        Ok(hash)
    }

    pub async fn get_filter_level(&self) -> Result<Level> {
        let data = self.query(ContractKind::Filter, Some(self.address())).await?;
        decode_level(&data)
    }

    pub async fn get_kyc_level(&self) -> Result<Level> {
        let data = self.query(ContractKind::Kyc, None).await?;
        decode_level(&data)
    }

    pub async fn update_filter_level(&self, new_level: impl IntoLevel) -> Result<TxHash> {
        let level = new_level.into_level()?;
        self.require_activation("changing the filter level").await?;

        let filter = &self.create_contracts().filter;
        let to = filter.bound_contract_address()?;
        let data = filter.build_call_data(&self.encoder, Some(level))?;
        let hash = self.sign_and_submit(to, None, data).await?;
        info!(address = %self.address(), %level, %hash, "Filter level update submitted");
        Ok(hash)
    }

    /// Request a new KYC level; the KYC fee is attached as the value.
    pub async fn update_kyc_level(&self, new_level: impl IntoLevel) -> Result<TxHash> {
        let level = new_level.into_level()?;
        self.require_activation("changing the KYC level").await?;

        let kyc = &self.create_contracts().kyc;
        let to = kyc.bound_contract_address()?;
        let data = kyc.build_call_data(&self.encoder, Some(level))?;
        let value = Some(self.params.default_kyc_value);
        let hash = self.sign_and_submit(to, value, data).await?;
        info!(address = %self.address(), %level, %hash, "KYC level request submitted");
        Ok(hash)
    }

    /// Sign an arbitrary transaction. Data is framed; absent data becomes a
    /// bare ping. No activation check is made.
    pub async fn sign_transaction(&self, request: TransactionRequest) -> Result<RawTransaction> {
        let _guard = self.nonce_guard.lock().await;
        self.sign_request(request).await
    }

    pub async fn sign_and_send_transaction(&self, request: TransactionRequest) -> Result<TxHash> {
        let _guard = self.nonce_guard.lock().await;
        let raw = self.sign_request(request).await?;
        self.signer.submit(&self.provider, &raw).await
    }

    /// Broadcast an already signed transaction.
    pub async fn send_transaction(&self, raw: &RawTransaction) -> Result<TxHash> {
        self.signer.submit(&self.provider, raw).await
    }

    async fn sign_request(&self, request: TransactionRequest) -> Result<RawTransaction> {
        let data = match request.data {
            Some(call) => self.encoder.frame(&call),
            None => self.encoder.ping(),
        };
        let nonce = self.fetch_nonce().await?;
        let spec = TransactionSpec {
            from: self.address(),
            to: request.to,
            value: request.value,
            gas_limit: request.gas_limit,
            gas_price: request.gas_price,
            nonce,
            data,
            chain_id: self.chain_id().await?,
        };
        self.signer.sign(&spec, self.private_key())
    }

    /// Gas price, then nonce, then sign and broadcast under the nonce guard.
    async fn sign_and_submit(
        &self,
        to: Address,
        value: Option<u128>,
        data: EncodedPayload,
    ) -> Result<TxHash> {
        let _guard = self.nonce_guard.lock().await;

        let gas_price = self.provider.get_gas_price().await?;
        debug!(gas_price, "Fetched gas price");
        let nonce = self.fetch_nonce().await?;

        let spec = TransactionSpec {
            from: self.address(),
            to: Some(to),
            value,
            gas_limit: self.params.default_gas_limit,
            gas_price,
            nonce,
            data,
            chain_id: self.chain_id().await?,
        };
        let raw = self.signer.sign(&spec, self.private_key())?;
        self.signer.submit(&self.provider, &raw).await
    }

    async fn fetch_nonce(&self) -> Result<u64> {
        let nonce = self
            .provider
            .get_transaction_count(&self.identity.address())
            .await?;
        debug!(nonce, "Fetched nonce");
        Ok(nonce)
    }

    async fn require_activation(&self, operation: &'static str) -> Result<()> {
        if self.get_activation_status().await? {
            Ok(())
        } else {
            Err(WalletError::AccountNotActivated { operation })
        }
    }

    async fn query(&self, kind: ContractKind, from: Option<Address>) -> Result<Vec<u8>> {
        let contract = self.create_contracts().get(kind);
        let request = CallRequest {
            from,
            to: contract.bound_contract_address()?,
            data: kind.query_call(self.address()),
        };
        Ok(self.provider.call(&request).await?)
    }
}

fn decode_level(data: &[u8]) -> Result<Level> {
    let value = abi::decode_uint(data)?;
    let value = u64::try_from(value)
        .map_err(|_| WalletError::Unknown(format!("level {} out of range", value)))?;
    Ok(Level::new(value))
}

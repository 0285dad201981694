use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletError>;

/// Machine-readable error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    BadMnemonic,
    AccountAlreadyActivated,
    AccountNotActivated,
    TransactionFailed,
    ActivationFailed,
    ProviderError,
    UnknownError,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::BadMnemonic => "BAD_MNEMONIC",
            ErrorKind::AccountAlreadyActivated => "ACCOUNT_ALREADY_ACTIVATED",
            ErrorKind::AccountNotActivated => "ACCOUNT_NOT_ACTIVATED",
            ErrorKind::TransactionFailed => "TRANSACTION_FAILED",
            ErrorKind::ActivationFailed => "ACTIVATION_FAILED",
            ErrorKind::ProviderError => "PROVIDER_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("{reason} (argument={argument}, value={value:?})")]
    InvalidArgument {
        argument: &'static str,
        value: String,
        reason: String,
    },
    #[error("Bad mnemonic: {0}")]
    BadMnemonic(String),
    #[error("This account is already activated")]
    AccountAlreadyActivated,
    #[error("You need to activate your account before {operation}")]
    AccountNotActivated { operation: &'static str },
    #[error("Transaction failed: {0}")]
    TransactionFailed(#[source] SignerError),
    #[error("Activation failed: {0}")]
    ActivationFailed(#[source] Box<WalletError>),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl WalletError {
    pub fn invalid_argument(
        argument: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        WalletError::InvalidArgument {
            argument,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            WalletError::BadMnemonic(_) => ErrorKind::BadMnemonic,
            WalletError::AccountAlreadyActivated => ErrorKind::AccountAlreadyActivated,
            WalletError::AccountNotActivated { .. } => ErrorKind::AccountNotActivated,
            WalletError::TransactionFailed(_) => ErrorKind::TransactionFailed,
            WalletError::ActivationFailed(_) => ErrorKind::ActivationFailed,
            WalletError::Provider(_) => ErrorKind::ProviderError,
            WalletError::Unknown(_) => ErrorKind::UnknownError,
        }
    }

    /// Name of the offending argument, for `InvalidArgument` errors and
    /// activation failures caused by one.
    pub fn argument(&self) -> Option<&'static str> {
        match self {
            WalletError::InvalidArgument { argument, .. } => Some(*argument),
            WalletError::ActivationFailed(cause) => cause.argument(),
            _ => None,
        }
    }

    /// Offending value, alongside [`WalletError::argument`].
    pub fn value(&self) -> Option<&str> {
        match self {
            WalletError::InvalidArgument { value, .. } => Some(value.as_str()),
            WalletError::ActivationFailed(cause) => cause.value(),
            _ => None,
        }
    }
}

/// Failures surfaced by a ledger RPC endpoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("RPC request failed: {0}")]
    Transport(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Failures raised while producing a signature.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignerError {
    #[error("invalid signing key")]
    InvalidKey,
    #[error("signing failed: {0}")]
    Signing(String),
}

//! Error taxonomy shared by every domain client.
//!
//! `SdkError` is the base kind. Each variant wraps a narrower error so callers
//! can either match on the whole enum or branch on [`SdkError::kind`].

use thiserror::Error;

/// Discriminant for [`SdkError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Wallet,
    InsufficientFunds,
    Network,
    Config,
    NotSupported,
    Serialization,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Wallet => "wallet",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Network => "network",
            Self::Config => "config",
            Self::NotSupported => "not_supported",
            Self::Serialization => "serialization",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Base SDK error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(#[from] InsufficientFundsError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SdkError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Wallet(_) => ErrorKind::Wallet,
            Self::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            Self::Network(_) => ErrorKind::Network,
            Self::Config(_) => ErrorKind::Config,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Only network failures are worth retrying by the caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Apply the pipeline boundary rule.
    ///
    /// Validation, wallet and insufficient-funds errors pass through unchanged.
    /// Anything else is wrapped into a [`NetworkError`] that keeps the original
    /// error as its source.
    #[must_use]
    pub fn at_boundary(self, context: &str) -> Self {
        match self {
            Self::Validation(_) | Self::Wallet(_) | Self::InsufficientFunds(_) => self,
            other => Self::Network(NetworkError::wrap(context, other)),
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Caller-fixable input errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("No record found for {0}")]
    NotFound(String),
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::MissingField(field.to_string())
    }
}

/// Wallet capability errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Wallet does not support transaction signing")]
    SigningUnavailable,

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

/// Balance below the amount an operation needs
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Insufficient {asset} balance. Required: {required}, Available: {available}")]
pub struct InsufficientFundsError {
    pub asset: String,
    pub required: f64,
    pub available: f64,
}

/// Failure reported by a ledger or prover collaborator
#[derive(Debug, Error)]
#[error("{context}")]
pub struct NetworkError {
    pub context: String,
    #[source]
    pub source: Option<Box<SdkError>>,
}

impl NetworkError {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: None,
        }
    }

    pub fn wrap(context: impl Into<String>, cause: SdkError) -> Self {
        Self {
            context: context.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// The innermost error this one was built from, if any
    #[must_use]
    pub fn root_cause(&self) -> Option<&SdkError> {
        let mut current = self.source.as_deref()?;
        while let SdkError::Network(NetworkError {
            source: Some(inner),
            ..
        }) = current
        {
            current = inner.as_ref();
        }
        Some(current)
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid network '{0}', expected mainnet-beta, devnet or testnet")]
    InvalidNetwork(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

//! SDK configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::domain::ConfigError;

/// Default collaborator timeout (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Cluster the SDK talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    #[default]
    Devnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
        }
    }

    /// Public RPC endpoint for the cluster
    pub fn default_rpc_url(&self) -> String {
        format!("https://api.{}.solana.com", self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration shared by all domain clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    pub network: Network,
    pub rpc_url: String,
    /// Handed to the ledger collaborator; the pipeline enforces no timeout
    pub timeout: Duration,
}

impl SdkConfig {
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self {
            network,
            rpc_url: network.default_rpc_url(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `ZKHOLE_NETWORK`, `ZKHOLE_RPC_URL` and `ZKHOLE_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let network = match env::var("ZKHOLE_NETWORK") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => Network::default(),
        };

        let mut config = Self::new(network);

        if let Some(rpc_url) = env::var("ZKHOLE_RPC_URL").ok().filter(|u| !u.is_empty()) {
            config.rpc_url = rpc_url;
        }

        if let Ok(raw) = env::var("ZKHOLE_TIMEOUT_MS") {
            let millis = raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                name: "ZKHOLE_TIMEOUT_MS".to_string(),
                message: e.to_string(),
            })?;
            config.timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "timeout".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "rpc_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::new(Network::default())
    }
}

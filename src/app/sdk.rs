//! SDK entry point wiring the domain clients to shared collaborators.

use std::sync::Arc;
use tracing::info;

use crate::config::SdkConfig;
use crate::domain::{IdGenerator, Ledger, MessageSealer, Prover, SdkError, Wallet};
use crate::infra::{Base64Sealer, PlaceholderProver, RandomIdGenerator, RpcLedger, WatchOnlyWallet};

use super::identity::HoleIdClient;
use super::mail::HoleMailClient;
use super::pipeline::OperationExecutor;
use super::swap::HoleSwapClient;
use super::transfer::ZkHoleClient;

/// All four domain clients over one set of collaborators
pub struct ZkHole {
    config: SdkConfig,
    transfers: ZkHoleClient,
    identity: HoleIdClient,
    mail: HoleMailClient,
    swap: HoleSwapClient,
}

impl ZkHole {
    #[must_use]
    pub fn builder(config: SdkConfig) -> ZkHoleBuilder {
        ZkHoleBuilder::new(config)
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn transfers(&self) -> &ZkHoleClient {
        &self.transfers
    }

    pub fn identity(&self) -> &HoleIdClient {
        &self.identity
    }

    pub fn mail(&self) -> &HoleMailClient {
        &self.mail
    }

    pub fn swap(&self) -> &HoleSwapClient {
        &self.swap
    }
}

/// Builder for [`ZkHole`].
///
/// Unset collaborators fall back to the placeholder prover, random ids,
/// Base64 sealing, a disconnected wallet and an RPC ledger for the
/// configured endpoint.
pub struct ZkHoleBuilder {
    config: SdkConfig,
    wallet: Option<Arc<dyn Wallet>>,
    ledger: Option<Arc<dyn Ledger>>,
    prover: Option<Arc<dyn Prover>>,
    ids: Option<Arc<dyn IdGenerator>>,
    sealer: Option<Arc<dyn MessageSealer>>,
}

impl ZkHoleBuilder {
    #[must_use]
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config,
            wallet: None,
            ledger: None,
            prover: None,
            ids: None,
            sealer: None,
        }
    }

    #[must_use]
    pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    #[must_use]
    pub fn with_ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    #[must_use]
    pub fn with_prover(mut self, prover: Arc<dyn Prover>) -> Self {
        self.prover = Some(prover);
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    #[must_use]
    pub fn with_sealer(mut self, sealer: Arc<dyn MessageSealer>) -> Self {
        self.sealer = Some(sealer);
        self
    }

    pub fn build(self) -> Result<ZkHole, SdkError> {
        self.config.validate()?;

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(RandomIdGenerator::new()));
        let prover = self
            .prover
            .unwrap_or_else(|| Arc::new(PlaceholderProver::new(ids.clone())));
        let ledger = match self.ledger {
            Some(ledger) => ledger,
            None => Arc::new(RpcLedger::from_config(&self.config)?),
        };
        let wallet = self
            .wallet
            .unwrap_or_else(|| Arc::new(WatchOnlyWallet::disconnected()));
        let sealer = self.sealer.unwrap_or_else(|| Arc::new(Base64Sealer));

        info!(
            network = %self.config.network,
            wallet_connected = wallet.public_key().is_some(),
            can_sign = wallet.can_sign(),
            "ZkHole SDK initialized"
        );

        let executor = Arc::new(OperationExecutor::new(prover, ledger, wallet, ids));

        Ok(ZkHole {
            transfers: ZkHoleClient::new(executor.clone(), self.config.clone()),
            identity: HoleIdClient::new(executor.clone()),
            mail: HoleMailClient::new(executor.clone(), sealer),
            swap: HoleSwapClient::new(executor),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::domain::{ConfigError, IdentityParams};
    use crate::infra::{KeypairWallet, SimulatedLedger};

    #[test]
    fn test_build_with_defaults() {
        let sdk = ZkHole::builder(SdkConfig::new(Network::Testnet)).build().unwrap();
        assert_eq!(sdk.transfers().network(), Network::Testnet);
        assert!(sdk.transfers().wallet_address().is_none());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = ZkHole::builder(SdkConfig::default().with_rpc_url(" ")).build();
        assert!(matches!(
            result,
            Err(SdkError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_clients_share_the_ledger() {
        let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator::new());
        let ledger = Arc::new(SimulatedLedger::new(ids.clone()));
        let sdk = ZkHole::builder(SdkConfig::default())
            .with_id_generator(ids)
            .with_ledger(ledger.clone())
            .with_wallet(Arc::new(KeypairWallet::generate()))
            .build()
            .unwrap();

        let identity = sdk
            .identity()
            .create_identity(&IdentityParams::new("alice"))
            .await
            .unwrap();
        assert_eq!(ledger.record_count(), 1);
        assert!(sdk.identity().get_identity_status(&identity.hole_id).await.is_ok());
    }
}

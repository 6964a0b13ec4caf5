//! Offline walkthrough of every SDK domain against the in-memory ledger.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use zkhole_sdk::domain::tokens::{self, LAMPORTS_PER_SOL};
use zkhole_sdk::domain::{
    CredentialParams, IdGenerator, IdentityParams, InboxParams, MessageParams, SwapParams,
    TransferParams, VerificationParams,
};
use zkhole_sdk::infra::{KeypairWallet, RandomIdGenerator, SimulatedLedger};
use zkhole_sdk::{SdkConfig, ZkHole};

/// Starting balances credited to the demo wallet
const DEMO_LAMPORTS: u64 = 10 * LAMPORTS_PER_SOL;
const DEMO_USDC: f64 = 1_000.0;

fn load_wallet() -> Result<KeypairWallet> {
    match env::var("ZKHOLE_WALLET_KEY") {
        Ok(key) if !key.is_empty() => {
            info!("Loading wallet key from environment");
            KeypairWallet::from_base58(&SecretString::from(key))
                .context("Failed to parse ZKHOLE_WALLET_KEY as Base58")
        }
        _ => {
            warn!("ZKHOLE_WALLET_KEY not set, using a throwaway keypair");
            Ok(KeypairWallet::generate())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zkhole_sdk=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("ZkHole SDK simulator v{}", env!("CARGO_PKG_VERSION"));

    let config = SdkConfig::from_env().context("Invalid SDK configuration")?;
    let wallet = Arc::new(load_wallet()?);
    let owner = wallet.address();

    let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator::new());
    let ledger = Arc::new(SimulatedLedger::new(ids.clone()));
    ledger.fund(&owner, DEMO_LAMPORTS);
    if let Some(usdc) = tokens::token("USDC") {
        ledger.fund_token(&owner, usdc.mint, DEMO_USDC);
    }

    let sdk = ZkHole::builder(config)
        .with_id_generator(ids)
        .with_ledger(ledger.clone())
        .with_wallet(wallet)
        .build()?;

    info!(wallet = %owner, network = %sdk.config().network, "Wallet ready");

    // Transfers
    let recipient = KeypairWallet::generate().address();
    let tx = sdk
        .transfers()
        .send_anonymous(&TransferParams::new(&recipient, 1.5))
        .await?;
    let confirmation = sdk.transfers().confirm_transaction(&tx.signature).await?;
    let balance = sdk.transfers().get_balance(&owner).await?;
    info!(
        id = %tx.transaction_id,
        confirmed = confirmation.confirmed,
        remaining_sol = balance.sol,
        "Anonymous transfer sent"
    );

    // Identity
    let identity = sdk
        .identity()
        .create_identity(&IdentityParams::new("satoshi"))
        .await?;
    let credential = sdk
        .identity()
        .generate_credential(&CredentialParams {
            hole_id: identity.hole_id.clone(),
            claims: [("age_over_18".to_string(), serde_json::json!(true))].into(),
            expires_at: None,
        })
        .await?;
    let verification = sdk
        .identity()
        .verify_credential(&VerificationParams {
            credential: credential.clone(),
            required_claims: Some(vec!["age_over_18".to_string()]),
        })
        .await?;
    info!(
        hole_id = %identity.hole_id,
        credential = %credential.credential_id,
        valid = verification.is_valid,
        "Identity issued"
    );

    // Mail
    let message = sdk
        .mail()
        .send_message(&MessageParams::new(
            &identity.hole_id,
            "Welcome",
            "Your HoleID is live.",
        ))
        .await?;
    let inbox = sdk
        .mail()
        .get_inbox(&InboxParams::new(&identity.hole_id))
        .await?;
    let opened = sdk.mail().read_message(&message.message_id).await?;
    info!(
        inbox = inbox.len(),
        content = opened.content.as_deref().unwrap_or_default(),
        "Message delivered"
    );

    // Swap
    let params = SwapParams::new("USDC", "SOL", 250.0);
    let quote = sdk.swap().get_quote(&params)?;
    info!(
        output = quote.output_amount,
        minimum = quote.minimum_received,
        fee = quote.fee,
        "Swap quoted"
    );
    let swap = sdk.swap().execute_swap(&params).await?;
    let status = sdk.swap().get_swap_status(&swap.swap_id).await?;
    info!(id = %swap.swap_id, status = %status.status, "Swap executed");

    // Retirement
    sdk.mail().delete_message(&message.message_id).await?;
    sdk.identity().revoke(&identity.hole_id).await?;
    let identity_status = sdk.identity().get_identity_status(&identity.hole_id).await?;
    info!(status = %identity_status, "Identity revoked");

    info!(records = ledger.record_count(), "Walkthrough complete");
    Ok(())
}

//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::Utc;
use ed25519_dalek::{Signer, SigningKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{
    Confirmation, Ledger, LedgerRecord, NetworkError, OperationKind, ProofArtifact, ProofContext,
    Prover, RecordQuery, RecordState, SdkError, SignedOperation, StatusRecord, Wallet,
    WalletError,
};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }

    fn check(&self) -> Result<(), SdkError> {
        if self.should_fail {
            let msg = self
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock error".to_string());
            return Err(NetworkError::new(msg).into());
        }
        Ok(())
    }
}

/// Mock ledger recording every submission
pub struct MockLedger {
    records: Arc<Mutex<HashMap<String, LedgerRecord>>>,
    submitted: Arc<Mutex<Vec<SignedOperation>>>,
    lamports: u64,
    token_balances: HashMap<String, f64>,
    config: MockConfig,
    balance_calls: AtomicUsize,
}

impl MockLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            lamports: 0,
            token_balances: HashMap::new(),
            config,
            balance_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Lamport balance reported for every address
    #[must_use]
    pub fn with_lamports(mut self, lamports: u64) -> Self {
        self.lamports = lamports;
        self
    }

    /// Token balance reported for every owner of the mint
    #[must_use]
    pub fn with_token_balance(mut self, mint: &str, amount: f64) -> Self {
        self.token_balances.insert(mint.to_string(), amount);
        self
    }

    pub fn submitted(&self) -> Vec<SignedOperation> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    /// Overwrite the state of a stored record
    pub fn set_state(&self, id: &str, state: RecordState) {
        if let Some(record) = self.records.lock().unwrap().get_mut(id) {
            record.state = state;
            record.updated_at = Utc::now();
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn get_balance(&self, _address: &str) -> Result<u64, SdkError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.config.check()?;
        Ok(self.lamports)
    }

    async fn get_token_balance(&self, _owner: &str, mint: &str) -> Result<f64, SdkError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.config.check()?;
        Ok(self.token_balances.get(mint).copied().unwrap_or(0.0))
    }

    async fn submit(&self, signed: &SignedOperation) -> Result<String, SdkError> {
        self.config.check()?;
        let operation = &signed.operation;
        let signature = format!("sig_{}", operation.id);
        let now = Utc::now();

        let mut records = self.records.lock().unwrap();
        if matches!(
            operation.kind,
            OperationKind::Revocation | OperationKind::Deletion
        ) {
            if let Some(target) = operation.target.as_ref().and_then(|t| records.get_mut(t)) {
                target.state = RecordState::Revoked;
            }
        }

        let slot = records.len() as u64;
        records.insert(
            operation.id.clone(),
            LedgerRecord {
                operation: operation.clone(),
                signature: signature.clone(),
                state: RecordState::Pending,
                slot,
                confirmations: 0,
                submitted_at: now,
                updated_at: now,
                error: None,
            },
        );
        self.submitted.lock().unwrap().push(signed.clone());
        Ok(signature)
    }

    async fn get_status(&self, id: &str) -> Result<Option<StatusRecord>, SdkError> {
        self.config.check()?;
        Ok(self.records.lock().unwrap().get(id).map(LedgerRecord::status))
    }

    async fn confirm(&self, signature: &str) -> Result<Confirmation, SdkError> {
        self.config.check()?;
        let records = self.records.lock().unwrap();
        let found = records.values().find(|r| r.signature == signature);
        Ok(match found {
            Some(record) => Confirmation {
                signature: signature.to_string(),
                confirmed: true,
                slot: Some(record.slot),
                block_time: Some(record.submitted_at.timestamp()),
                error: None,
            },
            None => Confirmation::unconfirmed(signature),
        })
    }

    async fn fetch_record(&self, id: &str) -> Result<Option<LedgerRecord>, SdkError> {
        self.config.check()?;
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn list_records(&self, query: &RecordQuery) -> Result<Vec<LedgerRecord>, SdkError> {
        self.config.check()?;
        let records = self.records.lock().unwrap();
        let mut items: Vec<LedgerRecord> = records
            .values()
            .filter(|r| {
                r.operation.kind == query.kind
                    && (r.operation.owner == query.party
                        || r.operation.counterparty.as_deref() == Some(query.party.as_str()))
                    && !(query.live_only && r.state == RecordState::Revoked)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.slot.cmp(&a.slot));
        Ok(items
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

/// Mock prover producing numbered artifacts
pub struct MockProver {
    config: MockConfig,
    verdict: AtomicBool,
    generate_calls: AtomicUsize,
    contexts: Mutex<Vec<ProofContext>>,
}

impl MockProver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            verdict: AtomicBool::new(true),
            generate_calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Result returned by every `verify` call
    pub fn set_verdict(&self, valid: bool) {
        self.verdict.store(valid, Ordering::SeqCst);
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Contexts passed to `generate`, in call order
    pub fn contexts(&self) -> Vec<ProofContext> {
        self.contexts.lock().unwrap().clone()
    }
}

impl Default for MockProver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prover for MockProver {
    async fn generate(&self, context: &ProofContext) -> Result<ProofArtifact, SdkError> {
        let n = self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.config.check()?;
        self.contexts.lock().unwrap().push(context.clone());
        Ok(ProofArtifact::new(format!("{n:0>64}")))
    }

    async fn verify(&self, _artifact: &ProofArtifact) -> Result<bool, SdkError> {
        self.config.check()?;
        Ok(self.verdict.load(Ordering::SeqCst))
    }
}

/// Mock wallet with a fixed keypair
pub struct MockWallet {
    signing_key: Option<SigningKey>,
    public_key: Option<String>,
    sign_calls: AtomicUsize,
}

impl MockWallet {
    fn build(signing_key: Option<SigningKey>, public_key: Option<String>) -> Self {
        Self {
            signing_key,
            public_key,
            sign_calls: AtomicUsize::new(0),
        }
    }

    /// Connected wallet able to sign
    #[must_use]
    pub fn signer() -> Self {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let public_key = bs58::encode(key.verifying_key().as_bytes()).into_string();
        Self::build(Some(key), Some(public_key))
    }

    /// Connected wallet without a signing function
    #[must_use]
    pub fn watch_only() -> Self {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let public_key = bs58::encode(key.verifying_key().as_bytes()).into_string();
        Self::build(None, Some(public_key))
    }

    #[must_use]
    pub fn disconnected() -> Self {
        Self::build(None, None)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn public_key(&self) -> Option<String> {
        self.public_key.clone()
    }

    fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, SdkError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let key = self
            .signing_key
            .as_ref()
            .ok_or(WalletError::SigningUnavailable)?;
        Ok(bs58::encode(key.sign(message).to_bytes()).into_string())
    }
}

//! In-memory ledger.
//!
//! Keeps every submitted operation, tracks native and token balances, and
//! finalizes submissions immediately. Used for offline runs, demos and tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

use crate::domain::tokens::{NATIVE_ASSET, sol_to_lamports};
use crate::domain::{
    Confirmation, IdGenerator, Ledger, LedgerRecord, NetworkError, Operation, OperationKind,
    RecordQuery, RecordState, SdkError, SignedOperation, StatusRecord,
};

/// Confirmations reported for finalized records
pub const DEFAULT_CONFIRMATIONS: u64 = 32;

pub struct SimulatedLedger {
    ids: Arc<dyn IdGenerator>,
    records: DashMap<String, LedgerRecord>,
    /// signature -> operation id
    signatures: DashMap<String, String>,
    lamports: DashMap<String, u64>,
    tokens: DashMap<(String, String), f64>,
    slot: AtomicU64,
    confirmations: u64,
}

impl SimulatedLedger {
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            records: DashMap::new(),
            signatures: DashMap::new(),
            lamports: DashMap::new(),
            tokens: DashMap::new(),
            slot: AtomicU64::new(1),
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }

    /// Credit native lamports to an address
    pub fn fund(&self, address: &str, lamports: u64) {
        *self.lamports.entry(address.to_string()).or_insert(0) += lamports;
    }

    /// Credit token units (UI amount) to an owner
    pub fn fund_token(&self, owner: &str, mint: &str, amount: f64) {
        *self
            .tokens
            .entry((owner.to_string(), mint.to_string()))
            .or_insert(0.0) += amount;
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Mark a record failed, as a ledger-side rejection after the fact would
    pub fn fail(&self, id: &str, reason: &str) -> bool {
        match self.records.get_mut(id) {
            Some(mut record) => {
                record.state = RecordState::Failed;
                record.error = Some(reason.to_string());
                record.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    fn verify_wallet_signature(&self, signed: &SignedOperation) -> Result<(), SdkError> {
        let operation = &signed.operation;
        let signature = signed.wallet_signature.as_deref().ok_or_else(|| {
            NetworkError::new(format!("Operation {} is missing a wallet signature", operation.id))
        })?;

        let key_bytes: [u8; 32] = bs58::decode(&operation.owner)
            .into_vec()
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| NetworkError::new("Owner is not a valid public key"))?;
        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| NetworkError::new(format!("Owner key rejected: {e}")))?;

        let sig_bytes: [u8; 64] = bs58::decode(signature)
            .into_vec()
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| NetworkError::new("Malformed wallet signature"))?;

        verifying_key
            .verify(&operation.digest()?, &Signature::from_bytes(&sig_bytes))
            .map_err(|_| NetworkError::new("Wallet signature does not match operation").into())
    }

    fn settle(&self, operation: &Operation) -> Result<(), SdkError> {
        let amount = operation.amount.unwrap_or_default();
        match (operation.kind, operation.asset.as_deref()) {
            (OperationKind::Transfer, Some(asset)) => {
                self.debit(&operation.owner, asset, amount)?;
                if let Some(recipient) = &operation.counterparty {
                    self.credit(recipient, asset, amount);
                }
            }
            (OperationKind::Swap, Some(asset)) => {
                self.debit(&operation.owner, asset, amount)?;
                if let (Some(output), Some(received)) =
                    (operation.output_asset.as_deref(), operation.output_amount)
                {
                    self.credit(&operation.owner, output, received);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn debit(&self, owner: &str, asset: &str, amount: f64) -> Result<(), SdkError> {
        if asset == NATIVE_ASSET {
            let lamports = sol_to_lamports(amount);
            let mut balance = self.lamports.entry(owner.to_string()).or_insert(0);
            if *balance < lamports {
                return Err(
                    NetworkError::new("Transaction simulation failed: insufficient lamports").into(),
                );
            }
            *balance -= lamports;
        } else {
            let mut balance = self
                .tokens
                .entry((owner.to_string(), asset.to_string()))
                .or_insert(0.0);
            if *balance < amount {
                return Err(NetworkError::new(
                    "Transaction simulation failed: insufficient token balance",
                )
                .into());
            }
            *balance -= amount;
        }
        Ok(())
    }

    fn credit(&self, owner: &str, asset: &str, amount: f64) {
        if asset == NATIVE_ASSET {
            self.fund(owner, sol_to_lamports(amount));
        } else {
            self.fund_token(owner, asset, amount);
        }
    }

    fn retire(&self, target: &str) {
        let Some(mut record) = self.records.get_mut(target) else {
            return;
        };
        if record.state != RecordState::Revoked {
            record.state = RecordState::Revoked;
            record.updated_at = Utc::now();
            debug!(id = %target, "Record retired");
        }
    }
}

#[async_trait]
impl Ledger for SimulatedLedger {
    async fn get_balance(&self, address: &str) -> Result<u64, SdkError> {
        Ok(self.lamports.get(address).map(|b| *b).unwrap_or(0))
    }

    async fn get_token_balance(&self, owner: &str, mint: &str) -> Result<f64, SdkError> {
        Ok(self
            .tokens
            .get(&(owner.to_string(), mint.to_string()))
            .map(|b| *b)
            .unwrap_or(0.0))
    }

    #[instrument(skip_all, fields(id = %signed.operation.id, kind = %signed.operation.kind))]
    async fn submit(&self, signed: &SignedOperation) -> Result<String, SdkError> {
        let operation = &signed.operation;

        if self.records.contains_key(&operation.id) {
            warn!("Duplicate operation id rejected");
            return Err(NetworkError::new(format!("Duplicate operation {}", operation.id)).into());
        }

        if matches!(operation.kind, OperationKind::Transfer | OperationKind::Swap) {
            self.verify_wallet_signature(signed)?;
        }

        self.settle(operation)?;

        if let Some(target) = &operation.target {
            self.retire(target);
        }

        let signature = self.ids.signature_token();
        let now = Utc::now();
        let record = LedgerRecord {
            operation: operation.clone(),
            signature: signature.clone(),
            state: RecordState::Confirmed,
            slot: self.slot.fetch_add(1, Ordering::Relaxed),
            confirmations: self.confirmations,
            submitted_at: now,
            updated_at: now,
            error: None,
        };

        self.signatures
            .insert(signature.clone(), operation.id.clone());
        self.records.insert(operation.id.clone(), record);

        info!(signature = %signature, "Operation finalized");
        Ok(signature)
    }

    async fn get_status(&self, id: &str) -> Result<Option<StatusRecord>, SdkError> {
        Ok(self.records.get(id).map(|record| record.status()))
    }

    async fn confirm(&self, signature: &str) -> Result<Confirmation, SdkError> {
        let Some(id) = self.signatures.get(signature).map(|id| id.value().clone()) else {
            return Ok(Confirmation::unconfirmed(signature));
        };
        let Some(record) = self.records.get(&id) else {
            return Ok(Confirmation::unconfirmed(signature));
        };

        Ok(Confirmation {
            signature: signature.to_string(),
            confirmed: record.state == RecordState::Confirmed,
            slot: Some(record.slot),
            block_time: Some(record.submitted_at.timestamp()),
            error: record.error.clone(),
        })
    }

    async fn fetch_record(&self, id: &str) -> Result<Option<LedgerRecord>, SdkError> {
        Ok(self.records.get(id).map(|record| record.value().clone()))
    }

    async fn list_records(&self, query: &RecordQuery) -> Result<Vec<LedgerRecord>, SdkError> {
        let mut matches: Vec<LedgerRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let op = &entry.operation;
                if query.live_only && entry.state == RecordState::Revoked {
                    return false;
                }
                op.kind == query.kind
                    && (op.owner == query.party
                        || op.counterparty.as_deref() == Some(query.party.as_str()))
            })
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|a, b| b.slot.cmp(&a.slot));

        Ok(matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

//! Anonymous transfers and wallet reads.

use std::sync::Arc;
use tracing::instrument;

use crate::config::{Network, SdkConfig};
use crate::domain::tokens::{NATIVE_ASSET, lamports_to_sol};
use crate::domain::{
    Balance, Confirmation, LedgerRecord, Operation, OperationKind, ProofArtifact, ProofContext,
    ProofPurpose, RecordQuery, SdkError, Transaction, TransactionStatus, TransferParams,
    ValidationError, validation,
};

use super::pipeline::{Authority, OperationExecutor, OperationSpec, Run, Spend, expect_proofs};

/// Transfer strategy for the executor
#[derive(Debug, Default, Clone, Copy)]
pub struct TransferOperation;

impl OperationSpec for TransferOperation {
    type Params = TransferParams;
    type Prepared = TransferParams;
    type Output = Transaction;

    fn kind(&self) -> OperationKind {
        OperationKind::Transfer
    }

    fn authority(&self) -> Authority {
        Authority::Signer
    }

    fn validate(&self, params: &TransferParams) -> Result<(), ValidationError> {
        validation::validate_transfer(params)
    }

    fn prepare(&self, params: &TransferParams) -> Result<TransferParams, SdkError> {
        Ok(params.clone())
    }

    fn spend(&self, prepared: &TransferParams) -> Option<Spend> {
        Some(Spend::Native {
            amount: prepared.amount,
        })
    }

    fn proof_requests(&self, run: &Run, prepared: &TransferParams) -> Vec<ProofContext> {
        vec![
            ProofContext::new(ProofPurpose::Transfer, &run.id, &run.owner)
                .with_input("recipient", &prepared.recipient)
                .with_input("amount", prepared.amount),
        ]
    }

    fn operation(&self, run: &Run, prepared: &TransferParams) -> Operation {
        let mut operation = Operation::new(&run.id, OperationKind::Transfer, &run.owner);
        operation.counterparty = Some(prepared.recipient.clone());
        operation.asset = Some(NATIVE_ASSET.to_string());
        operation.amount = Some(prepared.amount);
        operation
    }

    fn build(
        &self,
        run: &Run,
        prepared: TransferParams,
        proofs: Vec<ProofArtifact>,
    ) -> Result<Transaction, SdkError> {
        let [zk_proof] = expect_proofs::<1>(proofs)?;
        Ok(Transaction {
            transaction_id: run.id.clone(),
            signature: String::new(),
            status: TransactionStatus::Pending,
            timestamp: run.timestamp,
            amount: prepared.amount,
            recipient: prepared.recipient,
            memo: prepared.memo,
            zk_proof,
        })
    }

    fn attach_signature(&self, output: &mut Transaction, signature: &str) {
        output.signature = signature.to_string();
    }
}

/// Rebuild a transaction from its ledger record
fn transaction_from_record(record: &LedgerRecord) -> Result<Transaction, SdkError> {
    let mut transaction: Transaction = record
        .payload()
        .map_err(|e| e.at_boundary("Malformed transaction record"))?;
    transaction.signature = record.signature.clone();
    transaction.status = TransactionStatus::from_record(record.state);
    Ok(transaction)
}

/// Client for anonymous SOL transfers
pub struct ZkHoleClient {
    executor: Arc<OperationExecutor>,
    config: SdkConfig,
}

impl ZkHoleClient {
    #[must_use]
    pub fn new(executor: Arc<OperationExecutor>, config: SdkConfig) -> Self {
        Self { executor, config }
    }

    /// Send SOL to `recipient`, hiding the link between sender and receiver
    #[instrument(skip(self, params), fields(recipient = %params.recipient, amount = params.amount))]
    pub async fn send_anonymous(&self, params: &TransferParams) -> Result<Transaction, SdkError> {
        self.executor.execute(&TransferOperation, params).await
    }

    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: &str) -> Result<Balance, SdkError> {
        validation::validate_wallet_address("address", address)?;
        let lamports = self
            .executor
            .ledger()
            .get_balance(address)
            .await
            .map_err(|e| e.at_boundary("Failed to get balance"))?;

        Ok(Balance {
            address: address.to_string(),
            lamports,
            sol: lamports_to_sol(lamports),
        })
    }

    #[instrument(skip(self))]
    pub async fn confirm_transaction(&self, signature: &str) -> Result<Confirmation, SdkError> {
        validation::validate_identifier("signature", signature)?;
        self.executor
            .ledger()
            .confirm(signature)
            .await
            .map_err(|e| e.at_boundary("Failed to confirm transaction"))
    }

    #[instrument(skip(self))]
    pub async fn get_transaction_status(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionStatus, SdkError> {
        validation::validate_identifier("transactionId", transaction_id)?;
        let status = self
            .executor
            .status_of(
                OperationKind::Transfer,
                transaction_id,
                "Failed to get transaction status",
            )
            .await?;

        Ok(TransactionStatus::from_record(status.state))
    }

    /// Transfers sent or received by the connected wallet, newest first
    #[instrument(skip(self))]
    pub async fn get_transaction_history(&self, limit: usize) -> Result<Vec<Transaction>, SdkError> {
        validation::validate_page_limit(limit)?;
        let owner = self.executor.owner()?;

        let query = RecordQuery {
            kind: OperationKind::Transfer,
            party: owner,
            limit,
            offset: 0,
            live_only: false,
        };
        let records = self
            .executor
            .ledger()
            .list_records(&query)
            .await
            .map_err(|e| e.at_boundary("Failed to get transaction history"))?;

        records.iter().map(transaction_from_record).collect()
    }

    /// Full transaction by identifier
    #[instrument(skip(self))]
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Transaction, SdkError> {
        validation::validate_identifier("transactionId", transaction_id)?;
        let record = self
            .executor
            .live_record(
                OperationKind::Transfer,
                transaction_id,
                "Failed to get transaction",
            )
            .await?;
        transaction_from_record(&record)
    }

    pub fn wallet_address(&self) -> Option<String> {
        self.executor.wallet().public_key()
    }

    pub fn network(&self) -> Network {
        self.config.network
    }
}

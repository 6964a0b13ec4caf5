//! Domain traits defining contracts for external collaborators.

use async_trait::async_trait;

use super::error::{SdkError, WalletError};
use super::types::{
    Confirmation, LedgerRecord, ProofArtifact, ProofContext, RecordQuery, SignedOperation,
    StatusRecord,
};

/// Produces and checks proof artifacts
#[async_trait]
pub trait Prover: Send + Sync {
    /// Generate a proof for the given context. Must be safe to call repeatedly.
    async fn generate(&self, context: &ProofContext) -> Result<ProofArtifact, SdkError>;

    /// Check an artifact previously produced by `generate`
    async fn verify(&self, artifact: &ProofArtifact) -> Result<bool, SdkError>;
}

/// System of record for submitted operations
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Native balance in lamports
    async fn get_balance(&self, address: &str) -> Result<u64, SdkError>;

    /// Token balance in UI units for the given mint
    async fn get_token_balance(&self, owner: &str, mint: &str) -> Result<f64, SdkError> {
        let _ = (owner, mint);
        Err(SdkError::NotSupported(
            "get_token_balance not implemented".to_string(),
        ))
    }

    /// Submit an operation, returning the ledger signature
    async fn submit(&self, operation: &SignedOperation) -> Result<String, SdkError>;

    /// Current status of an operation by identifier
    async fn get_status(&self, id: &str) -> Result<Option<StatusRecord>, SdkError>;

    /// Confirmation details for a ledger signature
    async fn confirm(&self, signature: &str) -> Result<Confirmation, SdkError>;

    /// Full record of an operation by identifier
    async fn fetch_record(&self, id: &str) -> Result<Option<LedgerRecord>, SdkError> {
        let _ = id;
        Err(SdkError::NotSupported(
            "fetch_record not implemented".to_string(),
        ))
    }

    /// Records of one kind involving a party, newest first
    async fn list_records(&self, query: &RecordQuery) -> Result<Vec<LedgerRecord>, SdkError> {
        let _ = query;
        Err(SdkError::NotSupported(
            "list_records not implemented".to_string(),
        ))
    }
}

/// Wallet capability: a public identity and, optionally, a signer
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Base58 public key, `None` when disconnected
    fn public_key(&self) -> Option<String>;

    fn can_sign(&self) -> bool {
        false
    }

    /// Sign a message digest, returning a Base58 signature
    async fn sign_message(&self, message: &[u8]) -> Result<String, SdkError> {
        let _ = message;
        Err(WalletError::SigningUnavailable.into())
    }
}

/// Source of identifiers and opaque tokens
pub trait IdGenerator: Send + Sync {
    /// `<prefix>_<random>`, never repeated by the same generator
    fn identifier(&self, prefix: &str) -> String;

    /// Token of proof length
    fn proof_token(&self) -> String;

    /// Token of submission-signature length
    fn signature_token(&self) -> String;
}

/// Seals message bodies for transport
pub trait MessageSealer: Send + Sync {
    fn seal(&self, plaintext: &str) -> Result<String, SdkError>;

    fn open(&self, sealed: &str) -> Result<String, SdkError>;
}

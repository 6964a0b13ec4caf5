//! Core types shared by the pipeline and the ledger/prover collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::error::SdkError;

/// Length of proof artifacts and credential strings
pub const PROOF_LENGTH: usize = 64;

/// Length of ledger submission signatures
pub const SIGNATURE_LENGTH: usize = 88;

/// Opaque proof token, produced once and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofArtifact(String);

impl ProofArtifact {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Structural check only; soundness belongs to the prover
    pub fn has_expected_length(&self) -> bool {
        self.len() == PROOF_LENGTH
    }
}

impl std::fmt::Display for ProofArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a proof is asked to attest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProofPurpose {
    /// Validity of an anonymous transfer
    Transfer,
    /// Ownership of a new identity
    Identity,
    /// Verifiable credential string bound to an identity
    CredentialString,
    /// Claims attached to a credential
    Credential,
    /// Anonymous routing of a message
    MessageRouting,
    /// MEV protection for a swap
    SwapProtection,
    /// Private pool routing for a swap
    SwapRouting,
}

impl ProofPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Identity => "identity",
            Self::CredentialString => "credential_string",
            Self::Credential => "credential",
            Self::MessageRouting => "message_routing",
            Self::SwapProtection => "swap_protection",
            Self::SwapRouting => "swap_routing",
        }
    }
}

/// Input handed to the prover
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProofContext {
    pub purpose: ProofPurpose,
    /// Identifier of the operation the proof is bound to
    pub operation_id: String,
    /// Wallet public key of the caller
    pub owner: String,
    pub public_inputs: BTreeMap<String, String>,
}

impl ProofContext {
    #[must_use]
    pub fn new(purpose: ProofPurpose, operation_id: &str, owner: &str) -> Self {
        Self {
            purpose,
            operation_id: operation_id.to_string(),
            owner: owner.to_string(),
            public_inputs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, key: &str, value: impl ToString) -> Self {
        self.public_inputs.insert(key.to_string(), value.to_string());
        self
    }
}

/// Kind of operation submitted to the ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Transfer,
    Identity,
    Credential,
    Message,
    Swap,
    Revocation,
    Deletion,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Identity => "identity",
            Self::Credential => "credential",
            Self::Message => "message",
            Self::Swap => "swap",
            Self::Revocation => "revocation",
            Self::Deletion => "deletion",
        }
    }

    /// Namespace prefix of identifiers issued for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Transfer => "tx",
            Self::Identity => "hole",
            Self::Credential => "cred",
            Self::Message => "msg",
            Self::Swap => "swap",
            Self::Revocation => "rev",
            Self::Deletion => "del",
        }
    }

    /// Context attached to network errors raised while running this kind
    pub fn failure_context(&self) -> &'static str {
        match self {
            Self::Transfer => "Failed to send anonymous transfer",
            Self::Identity => "Failed to create identity",
            Self::Credential => "Failed to generate credential",
            Self::Message => "Failed to send message",
            Self::Swap => "Failed to execute swap",
            Self::Revocation => "Failed to revoke identity",
            Self::Deletion => "Failed to delete message",
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transfer" => Ok(Self::Transfer),
            "identity" => Ok(Self::Identity),
            "credential" => Ok(Self::Credential),
            "message" => Ok(Self::Message),
            "swap" => Ok(Self::Swap),
            "revocation" => Ok(Self::Revocation),
            "deletion" => Ok(Self::Deletion),
            _ => Err(format!("Invalid operation kind: {}", s)),
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body of a ledger submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    pub id: String,
    pub kind: OperationKind,
    /// Wallet public key of the submitter
    pub owner: String,
    /// Recipient wallet or HoleID, when the operation has one
    pub counterparty: Option<String>,
    /// Asset moved by the operation (mint address or "SOL")
    pub asset: Option<String>,
    pub amount: Option<f64>,
    /// Asset credited back to the owner (swaps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_amount: Option<f64>,
    /// Identifier an operation acts upon (revocation, deletion)
    pub target: Option<String>,
    pub proofs: Vec<ProofArtifact>,
    /// Domain record as it should be returned on reads
    pub payload: serde_json::Value,
}

impl Operation {
    #[must_use]
    pub fn new(id: &str, kind: OperationKind, owner: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            owner: owner.to_string(),
            counterparty: None,
            asset: None,
            amount: None,
            output_asset: None,
            output_amount: None,
            target: None,
            proofs: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    /// SHA-256 over the JSON encoding; this is what wallets sign
    pub fn digest(&self) -> Result<[u8; 32], SdkError> {
        let encoded = serde_json::to_vec(self)?;
        Ok(Sha256::digest(&encoded).into())
    }
}

/// Operation plus the wallet signature, if the operation moves funds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignedOperation {
    pub operation: Operation,
    pub wallet_signature: Option<String>,
}

/// Ledger-side lifecycle of a submitted operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Accepted, not yet final
    #[default]
    Pending,
    /// Final on the ledger
    Confirmed,
    /// Rejected by the ledger
    Failed,
    /// Retired by a later revocation or deletion
    Revoked,
}

impl RecordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Revoked => "revoked",
        }
    }
}

impl std::str::FromStr for RecordState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            "revoked" => Ok(Self::Revoked),
            _ => Err(format!("Invalid record state: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a submitted operation, keyed by its identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusRecord {
    pub id: String,
    pub kind: OperationKind,
    pub state: RecordState,
    pub signature: String,
    pub confirmations: u64,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

/// Full ledger entry for an operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRecord {
    pub operation: Operation,
    pub signature: String,
    pub state: RecordState,
    pub slot: u64,
    pub confirmations: u64,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl LedgerRecord {
    #[must_use]
    pub fn status(&self) -> StatusRecord {
        StatusRecord {
            id: self.operation.id.clone(),
            kind: self.operation.kind,
            state: self.state,
            signature: self.signature.clone(),
            confirmations: self.confirmations,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
            error: self.error.clone(),
        }
    }

    /// Decode the domain record stored in the payload
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, SdkError> {
        Ok(serde_json::from_value(self.operation.payload.clone())?)
    }
}

/// Filter for listing ledger records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub kind: OperationKind,
    /// Matches either the owner or the counterparty
    pub party: String,
    pub limit: usize,
    pub offset: usize,
    /// Skip records retired by a revocation or deletion
    pub live_only: bool,
}

/// Signature confirmation details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub signature: String,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    /// Unix seconds reported by the ledger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Confirmation {
    #[must_use]
    pub fn unconfirmed(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            confirmed: false,
            slot: None,
            block_time: None,
            error: None,
        }
    }
}

//! Parameter and result records for the four domains.
//!
//! Field names serialize in camelCase and timestamps as Unix milliseconds so
//! the records stay interchangeable with existing JavaScript integrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{ProofArtifact, RecordState};

// ============================================================================
// TRANSFER
// ============================================================================

/// Parameters for an anonymous transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    /// Recipient wallet address (Base58)
    pub recipient: String,
    /// Amount in SOL
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl TransferParams {
    #[must_use]
    pub fn new(recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            recipient: recipient.into(),
            amount,
            memo: None,
        }
    }
}

/// Lifecycle of an anonymous transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn from_record(state: RecordState) -> Self {
        match state {
            RecordState::Pending => Self::Pending,
            RecordState::Confirmed => Self::Confirmed,
            RecordState::Failed | RecordState::Revoked => Self::Failed,
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anonymous transfer result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub signature: String,
    pub status: TransactionStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub zk_proof: ProofArtifact,
}

/// Wallet balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub address: String,
    pub lamports: u64,
    pub sol: f64,
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Parameters for creating an identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IdentityParams {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl IdentityParams {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    #[default]
    Active,
    Revoked,
}

impl IdentityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }

    #[must_use]
    pub fn from_record(state: RecordState) -> Self {
        match state {
            RecordState::Revoked => Self::Revoked,
            _ => Self::Active,
        }
    }
}

impl std::fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unlinkable identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub hole_id: String,
    pub username: String,
    /// Verifiable credential string
    pub credential: ProofArtifact,
    pub zk_proof: ProofArtifact,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub status: IdentityStatus,
}

/// Parameters for issuing a credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CredentialParams {
    pub hole_id: String,
    pub claims: BTreeMap<String, serde_json::Value>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    #[default]
    Valid,
    Expired,
    Revoked,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verifiable credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub credential_id: String,
    pub hole_id: String,
    pub claims: BTreeMap<String, serde_json::Value>,
    pub zk_proof: ProofArtifact,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    pub status: CredentialStatus,
}

impl Credential {
    /// Expiry absent or strictly in the future
    #[must_use]
    pub fn is_unexpired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Every required key appears in the claims mapping
    #[must_use]
    pub fn covers_claims(&self, required: &[String]) -> bool {
        required.iter().all(|claim| self.claims.contains_key(claim))
    }
}

/// Parameters for verifying a credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationParams {
    pub credential: Credential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_claims: Option<Vec<String>>,
}

/// Outcome of a credential verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub proof_valid: bool,
    pub not_expired: bool,
    pub claims_valid: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub verified_at: DateTime<Utc>,
}

impl VerificationResult {
    /// `is_valid` is the conjunction of the three checks, each kept for diagnosis
    #[must_use]
    pub fn compose(
        proof_valid: bool,
        not_expired: bool,
        claims_valid: bool,
        verified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            is_valid: proof_valid && not_expired && claims_valid,
            proof_valid,
            not_expired,
            claims_valid,
            verified_at,
        }
    }
}

/// Receipt for an identity or credential revocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revocation {
    pub success: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub revoked_at: DateTime<Utc>,
}

// ============================================================================
// MAIL
// ============================================================================

/// Parameters for sending a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageParams {
    /// Recipient HoleID (`hole_` prefixed)
    pub recipient: String,
    pub subject: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl MessageParams {
    #[must_use]
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            content: content.into(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    #[default]
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    /// Ledger state as seen by the mail domain; retired messages have none
    #[must_use]
    pub fn from_record(state: RecordState) -> Option<Self> {
        match state {
            RecordState::Pending => Some(Self::Sent),
            RecordState::Confirmed => Some(Self::Delivered),
            RecordState::Failed => Some(Self::Failed),
            RecordState::Revoked => None,
        }
    }
}

impl std::fmt::Display for MessageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sealed message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub recipient: String,
    pub subject: String,
    /// Plaintext, only present after a read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub encrypted_content: String,
    pub encrypted_metadata: String,
    pub routing_proof: ProofArtifact,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub status: MessageState,
}

/// Delivery status of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageStatus {
    pub message_id: String,
    pub status: MessageState,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub sent_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub read_at: Option<DateTime<Utc>>,
}

/// Inbox paging for one HoleID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboxParams {
    pub hole_id: String,
    #[serde(default = "default_inbox_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_inbox_limit() -> usize {
    20
}

impl InboxParams {
    #[must_use]
    pub fn new(hole_id: impl Into<String>) -> Self {
        Self {
            hole_id: hole_id.into(),
            limit: default_inbox_limit(),
            offset: 0,
        }
    }
}

/// Receipt for a message deletion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deletion {
    pub success: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub deleted_at: DateTime<Utc>,
}

// ============================================================================
// SWAP
// ============================================================================

/// Parameters for quoting or executing a swap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapParams {
    pub from_token: String,
    pub to_token: String,
    pub amount: f64,
    /// Fraction in [0, 1); 0.02 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<f64>,
}

impl SwapParams {
    #[must_use]
    pub fn new(from_token: impl Into<String>, to_token: impl Into<String>, amount: f64) -> Self {
        Self {
            from_token: from_token.into(),
            to_token: to_token.into(),
            amount,
            slippage_tolerance: None,
        }
    }
}

/// Pricing for a prospective swap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub from_token: String,
    pub to_token: String,
    pub input_amount: f64,
    pub output_amount: f64,
    pub exchange_rate: f64,
    pub minimum_received: f64,
    /// Percent
    pub price_impact: f64,
    pub fee: f64,
    pub route: Vec<String>,
    /// Seconds
    pub estimated_time: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SwapState {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl SwapState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn from_record(state: RecordState) -> Self {
        match state {
            RecordState::Pending => Self::Pending,
            RecordState::Confirmed => Self::Completed,
            RecordState::Failed | RecordState::Revoked => Self::Failed,
        }
    }
}

impl std::fmt::Display for SwapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Executed swap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub swap_id: String,
    pub signature: String,
    pub from_token: String,
    pub to_token: String,
    pub input_amount: f64,
    pub output_amount: f64,
    pub exchange_rate: f64,
    pub zk_proof: ProofArtifact,
    pub routing_proof: ProofArtifact,
    pub status: SwapState,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapStatus {
    pub swap_id: String,
    pub status: SwapState,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liquidity pool snapshot for a token pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub token_a: String,
    pub token_b: String,
    pub liquidity_a: f64,
    pub liquidity_b: f64,
    pub fee: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    pub apy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::str::FromStr;

    fn credential(expires_at: Option<DateTime<Utc>>) -> Credential {
        Credential {
            credential_id: "cred_abc".to_string(),
            hole_id: "hole_abc".to_string(),
            claims: BTreeMap::from([
                ("age_over_18".to_string(), serde_json::json!(true)),
                ("country".to_string(), serde_json::json!("DE")),
            ]),
            zk_proof: ProofArtifact::new("p".repeat(64)),
            issued_at: Utc::now(),
            expires_at,
            status: CredentialStatus::Valid,
        }
    }

    #[test]
    fn test_transaction_status_display_and_parsing() {
        for (status, string) in [
            (TransactionStatus::Pending, "pending"),
            (TransactionStatus::Confirmed, "confirmed"),
            (TransactionStatus::Failed, "failed"),
        ] {
            assert_eq!(status.to_string(), string);
            assert_eq!(TransactionStatus::from_str(string).unwrap(), status);
        }
        assert!(TransactionStatus::from_str("sent").is_err());
    }

    #[test]
    fn test_record_state_mappings() {
        assert_eq!(
            TransactionStatus::from_record(RecordState::Revoked),
            TransactionStatus::Failed
        );
        assert_eq!(
            IdentityStatus::from_record(RecordState::Confirmed),
            IdentityStatus::Active
        );
        assert_eq!(
            IdentityStatus::from_record(RecordState::Revoked),
            IdentityStatus::Revoked
        );
        assert_eq!(
            MessageState::from_record(RecordState::Confirmed),
            Some(MessageState::Delivered)
        );
        assert_eq!(MessageState::from_record(RecordState::Revoked), None);
        assert_eq!(
            SwapState::from_record(RecordState::Confirmed),
            SwapState::Completed
        );
    }

    #[test]
    fn test_credential_expiry_and_claims() {
        let now = Utc::now();
        assert!(credential(None).is_unexpired_at(now));
        assert!(credential(Some(now + Duration::hours(1))).is_unexpired_at(now));
        assert!(!credential(Some(now)).is_unexpired_at(now));

        let cred = credential(None);
        assert!(cred.covers_claims(&[]));
        assert!(cred.covers_claims(&["country".to_string()]));
        assert!(!cred.covers_claims(&["country".to_string(), "email".to_string()]));
    }

    #[test]
    fn test_identity_wire_format() {
        let identity = Identity {
            hole_id: "hole_abc123".to_string(),
            username: "alice".to_string(),
            credential: ProofArtifact::new("c".repeat(64)),
            zk_proof: ProofArtifact::new("z".repeat(64)),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            status: IdentityStatus::Active,
        };

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["holeId"], "hole_abc123");
        assert_eq!(json["zkProof"], "z".repeat(64));
        assert_eq!(json["timestamp"], 1_700_000_000_123_i64);
        assert_eq!(json["status"], "active");

        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_pool_info_volume_field_name() {
        let pool = PoolInfo {
            token_a: "SOL".to_string(),
            token_b: "USDC".to_string(),
            liquidity_a: 1.0,
            liquidity_b: 2.0,
            fee: 0.003,
            volume_24h: 5.0,
            apy: 12.5,
        };
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["volume24h"], 5.0);
        assert_eq!(json["tokenA"], "SOL");
    }

    #[test]
    fn test_inbox_params_defaults_when_deserialized() {
        let params: InboxParams = serde_json::from_str(r#"{"holeId":"hole_x"}"#).unwrap();
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset, 0);
    }
}

//! Pure parameter validation.
//!
//! Every function checks its rules in a fixed order and returns the first
//! violation. Nothing here touches a collaborator, so a failed validation
//! always means no proof was generated and nothing was submitted.

use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use validator::{ValidateLength, ValidateRange};

use super::error::ValidationError;
use super::records::{
    CredentialParams, IdentityParams, InboxParams, MessageParams, SwapParams, TransferParams,
    VerificationParams,
};
use super::tokens::{self, TokenInfo, lamports_to_sol};

/// Namespace prefix of HoleIDs
pub const HOLE_ID_PREFIX: &str = "hole_";

pub const MIN_USERNAME_CHARS: u64 = 3;

/// Solana memo program limit
pub const MAX_MEMO_BYTES: usize = 566;

pub const MAX_PAGE_LIMIT: usize = 100;

pub fn validate_transfer(params: &TransferParams) -> Result<(), ValidationError> {
    validate_wallet_address("recipient", &params.recipient)?;
    validate_positive_amount("amount", params.amount)?;
    if params.amount < lamports_to_sol(1) {
        return Err(ValidationError::invalid(
            "amount",
            "Amount must be at least 1 lamport",
        ));
    }

    if params
        .memo
        .as_ref()
        .is_some_and(|memo| memo.len() > MAX_MEMO_BYTES)
    {
        return Err(ValidationError::invalid(
            "memo",
            format!("Memo must be at most {MAX_MEMO_BYTES} bytes"),
        ));
    }
    Ok(())
}

pub fn validate_identity(params: &IdentityParams) -> Result<(), ValidationError> {
    if !params
        .username
        .validate_length(Some(MIN_USERNAME_CHARS), None, None)
    {
        return Err(ValidationError::invalid(
            "username",
            "Username must be at least 3 characters",
        ));
    }
    Ok(())
}

pub fn validate_credential(
    params: &CredentialParams,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    validate_identifier("holeId", &params.hole_id)?;

    if params.claims.is_empty() {
        return Err(ValidationError::invalid(
            "claims",
            "At least one claim is required",
        ));
    }
    if params.claims.keys().any(|key| key.trim().is_empty()) {
        return Err(ValidationError::invalid(
            "claims",
            "Claim keys must not be empty",
        ));
    }
    if params.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(ValidationError::invalid(
            "expiresAt",
            "Expiry must be in the future",
        ));
    }
    Ok(())
}

pub fn validate_verification(params: &VerificationParams) -> Result<(), ValidationError> {
    if params.credential.credential_id.trim().is_empty() {
        return Err(ValidationError::missing("credential"));
    }
    Ok(())
}

pub fn validate_message(params: &MessageParams) -> Result<(), ValidationError> {
    validate_hole_id("recipient", &params.recipient)?;

    if params.subject.is_empty() {
        return Err(ValidationError::missing("subject"));
    }
    if params.content.is_empty() {
        return Err(ValidationError::missing("content"));
    }
    Ok(())
}

pub fn validate_inbox(params: &InboxParams) -> Result<(), ValidationError> {
    validate_hole_id("holeId", &params.hole_id)?;
    validate_page_limit(params.limit)
}

/// Page sizes for inbox and history listings
pub fn validate_page_limit(limit: usize) -> Result<(), ValidationError> {
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::invalid(
            "limit",
            format!("Limit must be between 1 and {MAX_PAGE_LIMIT}"),
        ));
    }
    Ok(())
}

/// Validates a swap and resolves both tokens
pub fn validate_swap(
    params: &SwapParams,
) -> Result<(&'static TokenInfo, &'static TokenInfo), ValidationError> {
    let from = supported_token("fromToken", &params.from_token)?;
    let to = supported_token("toToken", &params.to_token)?;

    if from.symbol == to.symbol {
        return Err(ValidationError::invalid(
            "toToken",
            "Cannot swap same tokens",
        ));
    }

    validate_positive_amount("amount", params.amount)?;

    if params
        .slippage_tolerance
        .is_some_and(|slippage| !(0.0..1.0).contains(&slippage))
    {
        return Err(ValidationError::invalid(
            "slippageTolerance",
            "Slippage tolerance must be in [0, 1)",
        ));
    }
    Ok((from, to))
}

pub fn validate_pool_pair(
    token_a: &str,
    token_b: &str,
) -> Result<(&'static TokenInfo, &'static TokenInfo), ValidationError> {
    match (tokens::token(token_a), tokens::token(token_b)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(ValidationError::invalid("tokenPair", "Unsupported token pair")),
    }
}

/// Presence check used by status reads, revocation and deletion
pub fn validate_identifier(field: &str, id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

/// Base58 string decoding to 32 bytes
pub fn validate_address(field: &str, address: &str) -> Result<[u8; 32], ValidationError> {
    if address.is_empty() {
        return Err(ValidationError::missing(field));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|_| ValidationError::invalid(field, "Invalid Base58 address"))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        ValidationError::invalid(field, format!("Address must be 32 bytes, got {}", v.len()))
    })
}

/// Address that must also be a valid ed25519 point (a wallet, not a PDA)
pub fn validate_wallet_address(field: &str, address: &str) -> Result<(), ValidationError> {
    let bytes = validate_address(field, address)?;
    VerifyingKey::from_bytes(&bytes)
        .map(|_| ())
        .map_err(|_| ValidationError::invalid(field, "Address is not on the ed25519 curve"))
}

fn validate_hole_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.len() <= HOLE_ID_PREFIX.len() || !value.starts_with(HOLE_ID_PREFIX) {
        return Err(ValidationError::invalid(field, "Invalid recipient HoleID"));
    }
    Ok(())
}

fn validate_positive_amount(field: &str, amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || !amount.validate_range(None, None, Some(0.0), None) {
        return Err(ValidationError::invalid(
            field,
            "Amount must be greater than 0",
        ));
    }
    Ok(())
}

fn supported_token(field: &str, symbol: &str) -> Result<&'static TokenInfo, ValidationError> {
    tokens::token(symbol)
        .ok_or_else(|| ValidationError::invalid(field, format!("Unsupported {field}: {symbol}")))
}

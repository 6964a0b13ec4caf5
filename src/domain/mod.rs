//! Domain layer containing core types, traits, validation and error definitions.

pub mod error;
pub mod records;
pub mod tokens;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::{
    ConfigError, ErrorKind, InsufficientFundsError, NetworkError, SdkError, ValidationError,
    WalletError,
};
pub use records::{
    Balance, Credential, CredentialParams, CredentialStatus, Deletion, Identity, IdentityParams,
    IdentityStatus, InboxParams, Message, MessageParams, MessageState, MessageStatus, PoolInfo,
    Revocation, SwapParams, SwapQuote, SwapResult, SwapState, SwapStatus, Transaction,
    TransactionStatus, TransferParams, VerificationParams, VerificationResult,
};
pub use traits::{IdGenerator, Ledger, MessageSealer, Prover, Wallet};
pub use types::{
    Confirmation, LedgerRecord, Operation, OperationKind, PROOF_LENGTH, ProofArtifact,
    ProofContext, ProofPurpose, RecordQuery, RecordState, SIGNATURE_LENGTH, SignedOperation,
    StatusRecord,
};

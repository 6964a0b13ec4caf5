//! Generic validated-operation pipeline.
//!
//! Every write operation in the SDK runs through [`OperationExecutor::execute`]
//! with a domain strategy implementing [`OperationSpec`]. Stages run strictly in
//! order, and a failure at any stage ends the run:
//!
//! 1. parameter validation
//! 2. wallet connected, and able to sign when the operation moves funds
//! 3. preparation (quotes, sealing)
//! 4. balance check
//! 5. identifier issuance
//! 6. proof generation
//! 7. signing and submission
//!
//! Validation and wallet failures are returned as-is. Failures after that are
//! passed through [`SdkError::at_boundary`], so collaborator errors surface as
//! network errors carrying the original cause.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::tokens::{NATIVE_ASSET, lamports_to_sol};
use crate::domain::{
    IdGenerator, InsufficientFundsError, Ledger, LedgerRecord, NetworkError, Operation,
    OperationKind, ProofArtifact, ProofContext, Prover, RecordState, SdkError, SignedOperation,
    StatusRecord, ValidationError, Wallet, WalletError, validation,
};

/// Wallet capability an operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// A public key is enough
    Connected,
    /// The wallet must be able to sign
    Signer,
}

/// Balance an operation consumes
#[derive(Debug, Clone, PartialEq)]
pub enum Spend {
    /// Native SOL, checked against the lamport balance
    Native { amount: f64 },
    /// SPL token, checked against the owner's balance for the mint
    Token {
        symbol: &'static str,
        mint: &'static str,
        amount: f64,
    },
}

/// Identity of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: String,
    pub owner: String,
    pub timestamp: DateTime<Utc>,
}

/// Domain strategy plugged into the executor
pub trait OperationSpec: Send + Sync {
    type Params: Send + Sync;
    type Prepared: Send + Sync;
    type Output: Serialize + Send;

    fn kind(&self) -> OperationKind;

    fn authority(&self) -> Authority {
        Authority::Connected
    }

    /// Pure parameter checks; must not touch any collaborator
    fn validate(&self, params: &Self::Params) -> Result<(), ValidationError>;

    /// Derive values the later stages need
    fn prepare(&self, params: &Self::Params) -> Result<Self::Prepared, SdkError>;

    fn spend(&self, prepared: &Self::Prepared) -> Option<Spend> {
        let _ = prepared;
        None
    }

    /// One proof is generated per context, in order
    fn proof_requests(&self, run: &Run, prepared: &Self::Prepared) -> Vec<ProofContext>;

    /// Ledger submission body; proofs and payload are filled in by the executor
    fn operation(&self, run: &Run, prepared: &Self::Prepared) -> Operation;

    /// Result record, before the ledger signature is known
    fn build(
        &self,
        run: &Run,
        prepared: Self::Prepared,
        proofs: Vec<ProofArtifact>,
    ) -> Result<Self::Output, SdkError>;

    fn attach_signature(&self, output: &mut Self::Output, signature: &str) {
        let _ = (output, signature);
    }
}

/// Split the proofs of a run into the fixed number a strategy asked for
pub fn expect_proofs<const N: usize>(
    proofs: Vec<ProofArtifact>,
) -> Result<[ProofArtifact; N], SdkError> {
    proofs.try_into().map_err(|v: Vec<ProofArtifact>| {
        NetworkError::new(format!("Expected {N} proofs, prover returned {}", v.len())).into()
    })
}

/// Runs operation strategies against the injected collaborators
pub struct OperationExecutor {
    prover: Arc<dyn Prover>,
    ledger: Arc<dyn Ledger>,
    wallet: Arc<dyn Wallet>,
    ids: Arc<dyn IdGenerator>,
}

impl OperationExecutor {
    #[must_use]
    pub fn new(
        prover: Arc<dyn Prover>,
        ledger: Arc<dyn Ledger>,
        wallet: Arc<dyn Wallet>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            prover,
            ledger,
            wallet,
            ids,
        }
    }

    pub fn prover(&self) -> &Arc<dyn Prover> {
        &self.prover
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn wallet(&self) -> &Arc<dyn Wallet> {
        &self.wallet
    }

    /// Public key of the connected wallet
    pub fn owner(&self) -> Result<String, SdkError> {
        self.wallet
            .public_key()
            .ok_or_else(|| WalletError::NotConnected.into())
    }

    fn authorize(&self, authority: Authority) -> Result<String, SdkError> {
        let owner = self.owner()?;
        if authority == Authority::Signer && !self.wallet.can_sign() {
            return Err(WalletError::SigningUnavailable.into());
        }
        Ok(owner)
    }

    /// Run one operation end to end
    #[instrument(skip_all, fields(kind = %op.kind()))]
    pub async fn execute<S: OperationSpec>(
        &self,
        op: &S,
        params: &S::Params,
    ) -> Result<S::Output, SdkError> {
        op.validate(params).map_err(|e| {
            warn!(error = %e, "Validation failed");
            SdkError::from(e)
        })?;

        let owner = self.authorize(op.authority()).map_err(|e| {
            warn!(error = %e, "Wallet check failed");
            e
        })?;

        self.run(op, params, owner).await.map_err(|e| {
            warn!(error = %e, "Operation failed");
            e.at_boundary(op.kind().failure_context())
        })
    }

    async fn run<S: OperationSpec>(
        &self,
        op: &S,
        params: &S::Params,
        owner: String,
    ) -> Result<S::Output, SdkError> {
        let prepared = op.prepare(params)?;

        if let Some(spend) = op.spend(&prepared) {
            self.check_balance(&owner, &spend).await?;
        }

        let run = Run {
            id: self.ids.identifier(op.kind().prefix()),
            owner,
            // Records carry millisecond timestamps
            timestamp: Utc::now().trunc_subsecs(3),
        };

        let mut proofs = Vec::new();
        for context in op.proof_requests(&run, &prepared) {
            proofs.push(self.prover.generate(&context).await?);
        }
        debug!(id = %run.id, proofs = proofs.len(), "Proofs generated");

        let mut operation = op.operation(&run, &prepared);
        operation.proofs = proofs.clone();

        let mut output = op.build(&run, prepared, proofs)?;
        operation.payload = serde_json::to_value(&output)?;

        let wallet_signature = match op.authority() {
            Authority::Signer => Some(self.wallet.sign_message(&operation.digest()?).await?),
            Authority::Connected => None,
        };

        let signature = self
            .ledger
            .submit(&SignedOperation {
                operation,
                wallet_signature,
            })
            .await?;

        op.attach_signature(&mut output, &signature);
        info!(id = %run.id, signature = %signature, "Operation submitted");
        Ok(output)
    }

    async fn check_balance(&self, owner: &str, spend: &Spend) -> Result<(), SdkError> {
        let (asset, required, available) = match spend {
            Spend::Native { amount } => {
                let lamports = self.ledger.get_balance(owner).await?;
                (NATIVE_ASSET, *amount, lamports_to_sol(lamports))
            }
            Spend::Token {
                symbol,
                mint,
                amount,
            } => {
                let balance = self.ledger.get_token_balance(owner, mint).await?;
                (*symbol, *amount, balance)
            }
        };

        if available < required {
            warn!(asset, required, available, "Insufficient balance");
            return Err(InsufficientFundsError {
                asset: asset.to_string(),
                required,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Retire an earlier result by identifier.
    ///
    /// Only the identifier's presence is checked. Retiring the same
    /// identifier twice succeeds both times.
    #[instrument(skip(self))]
    pub async fn retire(
        &self,
        kind: OperationKind,
        field: &str,
        target: &str,
    ) -> Result<DateTime<Utc>, SdkError> {
        validation::validate_identifier(field, target)?;
        let owner = self.authorize(Authority::Connected)?;

        let id = self.ids.identifier(kind.prefix());
        let mut operation = Operation::new(&id, kind, &owner);
        operation.target = Some(target.to_string());

        let signed = SignedOperation {
            operation,
            wallet_signature: None,
        };
        self.ledger
            .submit(&signed)
            .await
            .map_err(|e| e.at_boundary(kind.failure_context()))?;

        info!(id = %id, target = %target, "Retired");
        Ok(Utc::now())
    }

    /// Status of an operation of `kind`. Identifiers of other kinds are not found.
    pub async fn status_of(
        &self,
        kind: OperationKind,
        id: &str,
        context: &str,
    ) -> Result<StatusRecord, SdkError> {
        self.ledger
            .get_status(id)
            .await
            .map_err(|e| e.at_boundary(context))?
            .filter(|status| status.kind == kind)
            .ok_or_else(|| ValidationError::NotFound(id.to_string()).into())
    }

    /// Fetch a record of `kind`, retired or not
    pub async fn record_of(
        &self,
        kind: OperationKind,
        id: &str,
        context: &str,
    ) -> Result<LedgerRecord, SdkError> {
        self.ledger
            .fetch_record(id)
            .await
            .map_err(|e| e.at_boundary(context))?
            .filter(|record| record.operation.kind == kind)
            .ok_or_else(|| ValidationError::NotFound(id.to_string()).into())
    }

    /// Fetch a live record of `kind`; missing, retired and foreign records are all not found
    pub async fn live_record(
        &self,
        kind: OperationKind,
        id: &str,
        context: &str,
    ) -> Result<LedgerRecord, SdkError> {
        let record = self.record_of(kind, id, context).await?;
        if record.state == RecordState::Revoked {
            return Err(ValidationError::NotFound(id.to_string()).into());
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProofPurpose;
    use crate::test_utils::{MockConfig, MockLedger, MockProver, MockWallet};

    struct EchoSpec {
        authority: Authority,
        spend: Option<Spend>,
    }

    impl OperationSpec for EchoSpec {
        type Params = String;
        type Prepared = String;
        type Output = serde_json::Value;

        fn kind(&self) -> OperationKind {
            OperationKind::Transfer
        }

        fn authority(&self) -> Authority {
            self.authority
        }

        fn validate(&self, params: &String) -> Result<(), ValidationError> {
            if params.is_empty() {
                return Err(ValidationError::missing("value"));
            }
            Ok(())
        }

        fn prepare(&self, params: &String) -> Result<String, SdkError> {
            Ok(params.to_uppercase())
        }

        fn spend(&self, _prepared: &String) -> Option<Spend> {
            self.spend.clone()
        }

        fn proof_requests(&self, run: &Run, _prepared: &String) -> Vec<ProofContext> {
            vec![ProofContext::new(ProofPurpose::Transfer, &run.id, &run.owner)]
        }

        fn operation(&self, run: &Run, _prepared: &String) -> Operation {
            Operation::new(&run.id, OperationKind::Transfer, &run.owner)
        }

        fn build(
            &self,
            run: &Run,
            prepared: String,
            proofs: Vec<ProofArtifact>,
        ) -> Result<serde_json::Value, SdkError> {
            let [proof] = expect_proofs::<1>(proofs)?;
            Ok(serde_json::json!({"id": run.id, "value": prepared, "proof": proof}))
        }
    }

    struct Harness {
        prover: Arc<MockProver>,
        ledger: Arc<MockLedger>,
        executor: OperationExecutor,
    }

    fn harness(wallet: MockWallet, ledger: MockLedger, prover: MockProver) -> Harness {
        let prover = Arc::new(prover);
        let ledger = Arc::new(ledger);
        let executor = OperationExecutor::new(
            prover.clone(),
            ledger.clone(),
            Arc::new(wallet),
            Arc::new(crate::infra::RandomIdGenerator::new()),
        );
        Harness {
            prover,
            ledger,
            executor,
        }
    }

    fn echo(authority: Authority, spend: Option<Spend>) -> EchoSpec {
        EchoSpec { authority, spend }
    }

    #[tokio::test]
    async fn test_successful_run() {
        let h = harness(MockWallet::signer(), MockLedger::new(), MockProver::new());
        let output = h
            .executor
            .execute(&echo(Authority::Signer, None), &"abc".to_string())
            .await
            .unwrap();

        assert_eq!(output["value"], "ABC");
        assert!(output["id"].as_str().unwrap().starts_with("tx_"));
        assert_eq!(h.prover.generate_calls(), 1);

        let submitted = h.ledger.submitted();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].wallet_signature.is_some());
        assert_eq!(submitted[0].operation.proofs.len(), 1);
        assert_eq!(submitted[0].operation.payload, output);
    }

    #[tokio::test]
    async fn test_validation_failure_has_no_effects() {
        let h = harness(
            MockWallet::signer(),
            MockLedger::new(),
            MockProver::new(),
        );
        let result = h
            .executor
            .execute(
                &echo(Authority::Signer, Some(Spend::Native { amount: 1.0 })),
                &String::new(),
            )
            .await;

        assert!(matches!(result, Err(SdkError::Validation(_))));
        assert_eq!(h.prover.generate_calls(), 0);
        assert_eq!(h.ledger.balance_calls(), 0);
        assert!(h.ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_wallet_checks_precede_balance() {
        let h = harness(
            MockWallet::disconnected(),
            MockLedger::new(),
            MockProver::new(),
        );
        let result = h
            .executor
            .execute(&echo(Authority::Connected, None), &"x".to_string())
            .await;
        assert!(matches!(
            result,
            Err(SdkError::Wallet(WalletError::NotConnected))
        ));

        let h = harness(
            MockWallet::watch_only(),
            MockLedger::new(),
            MockProver::new(),
        );
        let result = h
            .executor
            .execute(
                &echo(Authority::Signer, Some(Spend::Native { amount: 1.0 })),
                &"x".to_string(),
            )
            .await;
        assert!(matches!(
            result,
            Err(SdkError::Wallet(WalletError::SigningUnavailable))
        ));
        assert_eq!(h.ledger.balance_calls(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_passes_through() {
        let h = harness(
            MockWallet::signer(),
            MockLedger::new().with_lamports(500_000_000),
            MockProver::new(),
        );
        let result = h
            .executor
            .execute(
                &echo(Authority::Signer, Some(Spend::Native { amount: 1.0 })),
                &"x".to_string(),
            )
            .await;

        match result {
            Err(SdkError::InsufficientFunds(e)) => {
                assert_eq!(e.asset, "SOL");
                assert_eq!(e.available, 0.5);
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
        assert_eq!(h.prover.generate_calls(), 0);
        assert!(h.ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_collaborator_failures_become_network_errors() {
        let h = harness(
            MockWallet::signer(),
            MockLedger::new(),
            MockProver::with_config(MockConfig::failure("prover offline")),
        );
        let result = h
            .executor
            .execute(&echo(Authority::Signer, None), &"x".to_string())
            .await;

        let Err(SdkError::Network(e)) = result else {
            panic!("expected network error");
        };
        assert_eq!(e.context, "Failed to send anonymous transfer");
        assert!(e.root_cause().is_some());
        assert!(h.ledger.submitted().is_empty());

        let h = harness(
            MockWallet::signer(),
            MockLedger::with_config(MockConfig::failure("rpc down")),
            MockProver::new(),
        );
        let result = h
            .executor
            .execute(&echo(Authority::Connected, None), &"x".to_string())
            .await;
        assert!(matches!(result, Err(SdkError::Network(_))));
    }

    #[tokio::test]
    async fn test_retire_requires_identifier_and_wallet() {
        let h = harness(MockWallet::signer(), MockLedger::new(), MockProver::new());
        assert!(matches!(
            h.executor
                .retire(OperationKind::Revocation, "holeId", " ")
                .await,
            Err(SdkError::Validation(_))
        ));
        assert!(h.ledger.submitted().is_empty());

        h.executor
            .retire(OperationKind::Revocation, "holeId", "hole_abc")
            .await
            .unwrap();
        h.executor
            .retire(OperationKind::Revocation, "holeId", "hole_abc")
            .await
            .unwrap();

        let submitted = h.ledger.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].operation.target.as_deref(), Some("hole_abc"));
        assert!(submitted[0].operation.id.starts_with("rev_"));

        let h = harness(
            MockWallet::disconnected(),
            MockLedger::new(),
            MockProver::new(),
        );
        assert!(matches!(
            h.executor
                .retire(OperationKind::Deletion, "messageId", "msg_1")
                .await,
            Err(SdkError::Wallet(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_reject_identifiers_of_other_kinds() {
        let h = harness(MockWallet::signer(), MockLedger::new(), MockProver::new());
        let output = h
            .executor
            .execute(&echo(Authority::Signer, None), &"abc".to_string())
            .await
            .unwrap();
        let id = output["id"].as_str().unwrap();

        assert!(h
            .executor
            .status_of(OperationKind::Transfer, id, "ctx")
            .await
            .is_ok());
        assert!(h
            .executor
            .live_record(OperationKind::Transfer, id, "ctx")
            .await
            .is_ok());

        for kind in [OperationKind::Swap, OperationKind::Message, OperationKind::Identity] {
            assert!(matches!(
                h.executor.status_of(kind, id, "ctx").await,
                Err(SdkError::Validation(ValidationError::NotFound(_)))
            ));
            assert!(matches!(
                h.executor.live_record(kind, id, "ctx").await,
                Err(SdkError::Validation(ValidationError::NotFound(_)))
            ));
        }

        h.ledger.set_state(id, RecordState::Revoked);
        assert!(h
            .executor
            .record_of(OperationKind::Transfer, id, "ctx")
            .await
            .is_ok());
        assert!(matches!(
            h.executor.live_record(OperationKind::Transfer, id, "ctx").await,
            Err(SdkError::Validation(ValidationError::NotFound(_)))
        ));
    }

    #[test]
    fn test_expect_proofs_count() {
        let proofs = vec![ProofArtifact::new("a"), ProofArtifact::new("b")];
        assert!(expect_proofs::<2>(proofs.clone()).is_ok());
        assert!(matches!(
            expect_proofs::<1>(proofs),
            Err(SdkError::Network(_))
        ));
    }
}

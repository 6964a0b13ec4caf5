//! HoleID: unlinkable identities and verifiable credentials.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{
    Credential, CredentialParams, CredentialStatus, Identity, IdentityParams, IdentityStatus,
    Operation, OperationKind, ProofArtifact, ProofContext, ProofPurpose, RecordState,
    Revocation, SdkError, ValidationError, VerificationParams, VerificationResult, validation,
};

use super::pipeline::{OperationExecutor, OperationSpec, Run, expect_proofs};

#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityOperation;

impl OperationSpec for IdentityOperation {
    type Params = IdentityParams;
    type Prepared = IdentityParams;
    type Output = Identity;

    fn kind(&self) -> OperationKind {
        OperationKind::Identity
    }

    fn validate(&self, params: &IdentityParams) -> Result<(), ValidationError> {
        validation::validate_identity(params)
    }

    fn prepare(&self, params: &IdentityParams) -> Result<IdentityParams, SdkError> {
        Ok(params.clone())
    }

    fn proof_requests(&self, run: &Run, prepared: &IdentityParams) -> Vec<ProofContext> {
        vec![
            ProofContext::new(ProofPurpose::Identity, &run.id, &run.owner)
                .with_input("username", &prepared.username),
            ProofContext::new(ProofPurpose::CredentialString, &run.id, &run.owner),
        ]
    }

    fn operation(&self, run: &Run, _prepared: &IdentityParams) -> Operation {
        Operation::new(&run.id, OperationKind::Identity, &run.owner)
    }

    fn build(
        &self,
        run: &Run,
        prepared: IdentityParams,
        proofs: Vec<ProofArtifact>,
    ) -> Result<Identity, SdkError> {
        let [zk_proof, credential] = expect_proofs::<2>(proofs)?;
        Ok(Identity {
            hole_id: run.id.clone(),
            username: prepared.username,
            credential,
            zk_proof,
            timestamp: run.timestamp,
            status: IdentityStatus::Active,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialOperation;

impl OperationSpec for CredentialOperation {
    type Params = CredentialParams;
    type Prepared = CredentialParams;
    type Output = Credential;

    fn kind(&self) -> OperationKind {
        OperationKind::Credential
    }

    fn validate(&self, params: &CredentialParams) -> Result<(), ValidationError> {
        validation::validate_credential(params, Utc::now())
    }

    fn prepare(&self, params: &CredentialParams) -> Result<CredentialParams, SdkError> {
        Ok(params.clone())
    }

    fn proof_requests(&self, run: &Run, prepared: &CredentialParams) -> Vec<ProofContext> {
        let claim_keys: Vec<&str> = prepared.claims.keys().map(String::as_str).collect();
        vec![
            ProofContext::new(ProofPurpose::Credential, &run.id, &run.owner)
                .with_input("holeId", &prepared.hole_id)
                .with_input("claims", claim_keys.join(",")),
        ]
    }

    fn operation(&self, run: &Run, prepared: &CredentialParams) -> Operation {
        let mut operation = Operation::new(&run.id, OperationKind::Credential, &run.owner);
        operation.counterparty = Some(prepared.hole_id.clone());
        operation
    }

    fn build(
        &self,
        run: &Run,
        prepared: CredentialParams,
        proofs: Vec<ProofArtifact>,
    ) -> Result<Credential, SdkError> {
        let [zk_proof] = expect_proofs::<1>(proofs)?;
        Ok(Credential {
            credential_id: run.id.clone(),
            hole_id: prepared.hole_id,
            claims: prepared.claims,
            zk_proof,
            issued_at: run.timestamp,
            expires_at: prepared.expires_at,
            status: CredentialStatus::Valid,
        })
    }
}

/// Client for HoleID identities and credentials
pub struct HoleIdClient {
    executor: Arc<OperationExecutor>,
}

impl HoleIdClient {
    #[must_use]
    pub fn new(executor: Arc<OperationExecutor>) -> Self {
        Self { executor }
    }

    #[instrument(skip(self, params), fields(username = %params.username))]
    pub async fn create_identity(&self, params: &IdentityParams) -> Result<Identity, SdkError> {
        self.executor.execute(&IdentityOperation, params).await
    }

    #[instrument(skip(self, params), fields(hole_id = %params.hole_id))]
    pub async fn generate_credential(
        &self,
        params: &CredentialParams,
    ) -> Result<Credential, SdkError> {
        self.executor.execute(&CredentialOperation, params).await
    }

    /// Recompute a credential's validity.
    ///
    /// Proof validity, expiry and claim coverage are checked independently and
    /// all three are reported. Nothing is cached or written.
    #[instrument(skip_all, fields(credential = %params.credential.credential_id))]
    pub async fn verify_credential(
        &self,
        params: &VerificationParams,
    ) -> Result<VerificationResult, SdkError> {
        validation::validate_verification(params)?;
        let credential = &params.credential;

        let proof_valid = self
            .executor
            .prover()
            .verify(&credential.zk_proof)
            .await
            .map_err(|e| e.at_boundary("Failed to verify credential"))?;

        let now = Utc::now();
        let not_expired = credential.is_unexpired_at(now);
        let claims_valid = credential.covers_claims(params.required_claims.as_deref().unwrap_or(&[]));

        let result = VerificationResult::compose(proof_valid, not_expired, claims_valid, now);
        debug!(is_valid = result.is_valid, "Credential verified");
        Ok(result)
    }

    /// Revoke an identity or a credential by identifier
    #[instrument(skip(self))]
    pub async fn revoke(&self, id: &str) -> Result<Revocation, SdkError> {
        let revoked_at = self
            .executor
            .retire(OperationKind::Revocation, "holeId", id)
            .await?;
        Ok(Revocation {
            success: true,
            revoked_at,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_identity_status(&self, hole_id: &str) -> Result<IdentityStatus, SdkError> {
        validation::validate_identifier("holeId", hole_id)?;
        let status = self
            .executor
            .status_of(OperationKind::Identity, hole_id, "Failed to get identity status")
            .await?;

        Ok(IdentityStatus::from_record(status.state))
    }

    /// Stored credential with its status derived at read time
    #[instrument(skip(self))]
    pub async fn get_credential(&self, credential_id: &str) -> Result<Credential, SdkError> {
        validation::validate_identifier("credentialId", credential_id)?;
        let record = self
            .executor
            .record_of(OperationKind::Credential, credential_id, "Failed to get credential")
            .await?;

        let mut credential: Credential = record
            .payload()
            .map_err(|e| e.at_boundary("Malformed credential record"))?;
        credential.status = if record.state == RecordState::Revoked {
            CredentialStatus::Revoked
        } else if !credential.is_unexpired_at(Utc::now()) {
            CredentialStatus::Expired
        } else {
            CredentialStatus::Valid
        };
        Ok(credential)
    }
}

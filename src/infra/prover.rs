//! Placeholder prover.
//!
//! Stands in for a real proving system: artifacts are random tokens of the
//! proof length and verification only checks that length. The async boundary
//! is kept so a real prover can be dropped in without touching the pipeline.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{IdGenerator, ProofArtifact, ProofContext, Prover, SdkError};

pub struct PlaceholderProver {
    ids: Arc<dyn IdGenerator>,
}

impl PlaceholderProver {
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl Prover for PlaceholderProver {
    #[instrument(skip_all, fields(purpose = context.purpose.as_str(), op = %context.operation_id))]
    async fn generate(&self, context: &ProofContext) -> Result<ProofArtifact, SdkError> {
        let artifact = ProofArtifact::new(self.ids.proof_token());
        debug!("Placeholder proof generated");
        Ok(artifact)
    }

    async fn verify(&self, artifact: &ProofArtifact) -> Result<bool, SdkError> {
        Ok(artifact.has_expected_length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PROOF_LENGTH, ProofPurpose};
    use crate::infra::RandomIdGenerator;

    fn prover() -> PlaceholderProver {
        PlaceholderProver::new(Arc::new(RandomIdGenerator::new()))
    }

    #[tokio::test]
    async fn test_generated_artifacts_verify() {
        let prover = prover();
        let context = ProofContext::new(ProofPurpose::Identity, "hole_abc", "owner")
            .with_input("username", "alice");

        let first = prover.generate(&context).await.unwrap();
        let second = prover.generate(&context).await.unwrap();

        assert_eq!(first.len(), PROOF_LENGTH);
        assert_ne!(first, second);
        assert!(prover.verify(&first).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_length() {
        let prover = prover();
        assert!(!prover.verify(&ProofArtifact::new("short")).await.unwrap());
        assert!(!prover.verify(&ProofArtifact::new("a".repeat(65))).await.unwrap());
    }
}

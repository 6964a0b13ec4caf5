//! HoleMail: sealed messages routed to HoleIDs.

use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    Deletion, InboxParams, LedgerRecord, Message, MessageParams, MessageSealer, MessageState,
    MessageStatus, Operation, OperationKind, ProofArtifact, ProofContext, ProofPurpose,
    RecordQuery, RecordState, SdkError, ValidationError, validation,
};

use super::pipeline::{OperationExecutor, OperationSpec, Run, expect_proofs};

/// Message with its body and metadata sealed
#[derive(Debug, Clone)]
pub struct SealedMessage {
    pub recipient: String,
    pub subject: String,
    pub encrypted_content: String,
    pub encrypted_metadata: String,
}

pub struct MessageOperation {
    sealer: Arc<dyn MessageSealer>,
}

impl MessageOperation {
    #[must_use]
    pub fn new(sealer: Arc<dyn MessageSealer>) -> Self {
        Self { sealer }
    }
}

impl OperationSpec for MessageOperation {
    type Params = MessageParams;
    type Prepared = SealedMessage;
    type Output = Message;

    fn kind(&self) -> OperationKind {
        OperationKind::Message
    }

    fn validate(&self, params: &MessageParams) -> Result<(), ValidationError> {
        validation::validate_message(params)
    }

    fn prepare(&self, params: &MessageParams) -> Result<SealedMessage, SdkError> {
        let metadata = serde_json::json!({
            "subject": params.subject,
            "recipient": params.recipient,
            "attachments": params.attachments,
        });
        Ok(SealedMessage {
            recipient: params.recipient.clone(),
            subject: params.subject.clone(),
            encrypted_content: self.sealer.seal(&params.content)?,
            encrypted_metadata: self.sealer.seal(&metadata.to_string())?,
        })
    }

    fn proof_requests(&self, run: &Run, prepared: &SealedMessage) -> Vec<ProofContext> {
        vec![
            ProofContext::new(ProofPurpose::MessageRouting, &run.id, &run.owner)
                .with_input("recipient", &prepared.recipient),
        ]
    }

    fn operation(&self, run: &Run, prepared: &SealedMessage) -> Operation {
        let mut operation = Operation::new(&run.id, OperationKind::Message, &run.owner);
        operation.counterparty = Some(prepared.recipient.clone());
        operation
    }

    fn build(
        &self,
        run: &Run,
        prepared: SealedMessage,
        proofs: Vec<ProofArtifact>,
    ) -> Result<Message, SdkError> {
        let [routing_proof] = expect_proofs::<1>(proofs)?;
        Ok(Message {
            message_id: run.id.clone(),
            recipient: prepared.recipient,
            subject: prepared.subject,
            content: None,
            encrypted_content: prepared.encrypted_content,
            encrypted_metadata: prepared.encrypted_metadata,
            routing_proof,
            timestamp: run.timestamp,
            status: MessageState::Sent,
        })
    }
}

fn message_from_record(record: &LedgerRecord) -> Result<Message, SdkError> {
    let mut message: Message = record
        .payload()
        .map_err(|e| e.at_boundary("Malformed message record"))?;
    message.status = MessageState::from_record(record.state)
        .ok_or_else(|| ValidationError::NotFound(message.message_id.clone()))?;
    Ok(message)
}

/// Client for HoleMail
pub struct HoleMailClient {
    executor: Arc<OperationExecutor>,
    operation: MessageOperation,
    sealer: Arc<dyn MessageSealer>,
}

impl HoleMailClient {
    #[must_use]
    pub fn new(executor: Arc<OperationExecutor>, sealer: Arc<dyn MessageSealer>) -> Self {
        Self {
            executor,
            operation: MessageOperation::new(sealer.clone()),
            sealer,
        }
    }

    #[instrument(skip(self, params), fields(recipient = %params.recipient))]
    pub async fn send_message(&self, params: &MessageParams) -> Result<Message, SdkError> {
        self.executor.execute(&self.operation, params).await
    }

    /// Live messages addressed to a HoleID, newest first, content still sealed
    #[instrument(skip(self), fields(hole_id = %params.hole_id))]
    pub async fn get_inbox(&self, params: &InboxParams) -> Result<Vec<Message>, SdkError> {
        validation::validate_inbox(params)?;

        let query = RecordQuery {
            kind: OperationKind::Message,
            party: params.hole_id.clone(),
            limit: params.limit,
            offset: params.offset,
            live_only: true,
        };
        let records = self
            .executor
            .ledger()
            .list_records(&query)
            .await
            .map_err(|e| e.at_boundary("Failed to fetch inbox"))?;

        records
            .iter()
            .filter(|record| record.operation.counterparty.as_deref() == Some(params.hole_id.as_str()))
            .map(message_from_record)
            .collect()
    }

    /// Open a message. Reading never writes to the ledger.
    #[instrument(skip(self))]
    pub async fn read_message(&self, message_id: &str) -> Result<Message, SdkError> {
        validation::validate_identifier("messageId", message_id)?;
        let record = self
            .executor
            .live_record(OperationKind::Message, message_id, "Failed to fetch message")
            .await?;

        let mut message = message_from_record(&record)?;
        message.content = Some(
            self.sealer
                .open(&message.encrypted_content)
                .map_err(|e| e.at_boundary("Failed to open message"))?,
        );
        message.status = MessageState::Read;
        Ok(message)
    }

    #[instrument(skip(self))]
    pub async fn delete_message(&self, message_id: &str) -> Result<Deletion, SdkError> {
        let deleted_at = self
            .executor
            .retire(OperationKind::Deletion, "messageId", message_id)
            .await?;
        Ok(Deletion {
            success: true,
            deleted_at,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_message_status(&self, message_id: &str) -> Result<MessageStatus, SdkError> {
        validation::validate_identifier("messageId", message_id)?;
        let record = self
            .executor
            .live_record(
                OperationKind::Message,
                message_id,
                "Failed to get message status",
            )
            .await?;

        let status = MessageState::from_record(record.state)
            .ok_or_else(|| ValidationError::NotFound(message_id.to_string()))?;

        Ok(MessageStatus {
            message_id: message_id.to_string(),
            status,
            sent_at: record.submitted_at,
            delivered_at: (record.state == RecordState::Confirmed).then_some(record.updated_at),
            read_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ledger, SignedOperation};
    use crate::infra::{Base64Sealer, RandomIdGenerator};
    use crate::test_utils::{MockLedger, MockProver, MockWallet};

    struct Fixture {
        prover: Arc<MockProver>,
        ledger: Arc<MockLedger>,
        client: HoleMailClient,
    }

    fn fixture() -> Fixture {
        let prover = Arc::new(MockProver::new());
        let ledger = Arc::new(MockLedger::new());
        let executor = OperationExecutor::new(
            prover.clone(),
            ledger.clone(),
            Arc::new(MockWallet::watch_only()),
            Arc::new(RandomIdGenerator::new()),
        );
        Fixture {
            prover,
            ledger,
            client: HoleMailClient::new(Arc::new(executor), Arc::new(Base64Sealer)),
        }
    }

    #[tokio::test]
    async fn test_send_message_seals_content() {
        let f = fixture();
        let message = f
            .client
            .send_message(&MessageParams::new("hole_bob", "hello", "secret body"))
            .await
            .unwrap();

        assert!(message.message_id.starts_with("msg_"));
        assert_eq!(message.status, MessageState::Sent);
        assert!(message.content.is_none());
        assert_ne!(message.encrypted_content, "secret body");
        assert_eq!(f.prover.contexts()[0].purpose, ProofPurpose::MessageRouting);
    }

    #[tokio::test]
    async fn test_unprefixed_recipient_rejected() {
        let f = fixture();
        let result = f
            .client
            .send_message(&MessageParams::new("not_hole_prefixed", "s", "c"))
            .await;

        assert!(matches!(result, Err(SdkError::Validation(_))));
        assert_eq!(f.prover.generate_calls(), 0);
        assert!(f.ledger.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_read_message_opens_without_writing() {
        let f = fixture();
        let sent = f
            .client
            .send_message(&MessageParams::new("hole_bob", "hello", "secret body"))
            .await
            .unwrap();

        let read = f.client.read_message(&sent.message_id).await.unwrap();
        assert_eq!(read.content.as_deref(), Some("secret body"));
        assert_eq!(read.status, MessageState::Read);
        assert_eq!(f.ledger.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_inbox_and_deletion() {
        let f = fixture();
        let first = f
            .client
            .send_message(&MessageParams::new("hole_bob", "one", "1"))
            .await
            .unwrap();
        f.client
            .send_message(&MessageParams::new("hole_bob", "two", "2"))
            .await
            .unwrap();
        f.client
            .send_message(&MessageParams::new("hole_eve", "three", "3"))
            .await
            .unwrap();

        let inbox = f.client.get_inbox(&InboxParams::new("hole_bob")).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].subject, "two");

        assert!(f.client.delete_message(&first.message_id).await.unwrap().success);
        assert!(f.client.delete_message(&first.message_id).await.unwrap().success);

        let inbox = f.client.get_inbox(&InboxParams::new("hole_bob")).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(matches!(
            f.client.read_message(&first.message_id).await,
            Err(SdkError::Validation(ValidationError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_message_status_tracks_ledger_state() {
        let f = fixture();
        let sent = f
            .client
            .send_message(&MessageParams::new("hole_bob", "hello", "body"))
            .await
            .unwrap();

        let status = f.client.get_message_status(&sent.message_id).await.unwrap();
        assert_eq!(status.status, MessageState::Sent);
        assert!(status.delivered_at.is_none());

        f.ledger.set_state(&sent.message_id, RecordState::Confirmed);
        let status = f.client.get_message_status(&sent.message_id).await.unwrap();
        assert_eq!(status.status, MessageState::Delivered);
        assert!(status.delivered_at.is_some());
    }

    #[tokio::test]
    async fn test_malformed_message_record_is_network_error() {
        let f = fixture();
        let mut operation = Operation::new("msg_broken", OperationKind::Message, "owner");
        operation.counterparty = Some("hole_bob".to_string());
        operation.payload = serde_json::json!({"status": "active"});
        f.ledger
            .submit(&SignedOperation {
                operation,
                wallet_signature: None,
            })
            .await
            .unwrap();

        match f.client.read_message("msg_broken").await {
            Err(SdkError::Network(e)) => {
                assert_eq!(e.context, "Malformed message record");
                assert!(matches!(e.root_cause(), Some(SdkError::Serialization(_))));
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inbox_limit_bounds() {
        let f = fixture();
        let mut params = InboxParams::new("hole_bob");
        params.limit = 0;
        assert!(matches!(
            f.client.get_inbox(&params).await,
            Err(SdkError::Validation(_))
        ));
    }
}

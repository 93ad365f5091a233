//! Remote QnA service client traits

use async_trait::async_trait;

use super::entity::{
    KnowledgeBaseDetails, KnowledgeBaseId, OperationHandle, QnaAnswer, QnaEntry, QnaEnvironment,
};
use super::update::KnowledgeBaseUpdate;
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Management surface of the remote QnA service.
///
/// Implementations translate between the domain change set and the
/// service's wire contract. Retry, backoff and timeouts are the
/// implementation's concern; callers get failures unchanged.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QnaManagementClient: Send + Sync {
    /// Submit an add/update/delete change set against the edited slot.
    /// Returns a handle the caller may poll for completion.
    async fn update_knowledge_base(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        update: KnowledgeBaseUpdate,
    ) -> Result<OperationHandle, DomainError>;

    /// Fetch the knowledge base details, including publish timestamps.
    async fn knowledge_base_details(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
    ) -> Result<KnowledgeBaseDetails, DomainError>;

    /// Download the full document set of one slot as a single bounded payload.
    async fn download(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        environment: QnaEnvironment,
    ) -> Result<Vec<QnaEntry>, DomainError>;

    /// Promote the edited slot to the published one.
    async fn publish(&self, knowledge_base_id: &KnowledgeBaseId) -> Result<(), DomainError>;
}

/// Runtime (query) surface of the remote QnA service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QnaQueryClient: Send + Sync {
    /// Return the ranked candidate answers for a question, filtered by the
    /// given score threshold on the service side. An empty list is a valid
    /// result meaning "no confident match".
    async fn generate_answer(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        question: &str,
        environment: QnaEnvironment,
        score_threshold: f64,
    ) -> Result<Vec<QnaAnswer>, DomainError>;
}

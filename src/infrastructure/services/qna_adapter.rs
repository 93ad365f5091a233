//! QnA adapter - narrow operation set over the remote question-answering service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{
    metadata, ConfigStore, DomainError, EntryUpdate, KnowledgeBaseId, KnowledgeBaseUpdate,
    MetadataDelta, OperationHandle, QnaAnswer, QnaEntry, QnaEnvironment, QnaManagementClient,
    QnaQueryClient, QuestionsDelta, CONFIG_PARTITION, KNOWLEDGE_BASE_CONFIG_KEY,
};

/// Adapter between the bot's storage layer and the remote QnA service.
///
/// Holds its collaborators plus an immutable score threshold; every
/// operation re-resolves the active knowledge base id from the config store
/// so configuration changes take effect on the next call. The query client
/// is optional and checked at call time.
pub struct QnaAdapter {
    config_store: Arc<dyn ConfigStore>,
    management: Arc<dyn QnaManagementClient>,
    query: Option<Arc<dyn QnaQueryClient>>,
    score_threshold: f64,
}

impl std::fmt::Debug for QnaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QnaAdapter")
            .field("score_threshold", &self.score_threshold)
            .field("has_query_client", &self.query.is_some())
            .finish()
    }
}

impl QnaAdapter {
    /// Create a new adapter without query capability
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        management: Arc<dyn QnaManagementClient>,
        score_threshold: f64,
    ) -> Self {
        Self {
            config_store,
            management,
            query: None,
            score_threshold,
        }
    }

    /// Attach the query client
    pub fn with_query_client(mut self, query: Arc<dyn QnaQueryClient>) -> Self {
        self.query = Some(query);
        self
    }

    /// Add one new question/answer entry.
    ///
    /// Returns the remote operation handle for the caller to poll. The
    /// stored conversation id is only the segment after the last colon; the
    /// source system encodes channel/user prefixes before it.
    pub async fn add_entry(
        &self,
        question: &str,
        answer: &str,
        author_id: &str,
        conversation_id: Option<&str>,
        activity_reference_id: &str,
    ) -> Result<OperationHandle, DomainError> {
        let knowledge_base_id = self.require_knowledge_base_id().await?;

        let entry = QnaEntry::new(question.trim(), answer.trim())
            .with_metadata(metadata::CREATED_AT, Utc::now().to_rfc3339())
            .with_metadata(metadata::CREATED_BY, author_id)
            .with_metadata(
                metadata::CONVERSATION_ID,
                trailing_conversation_id(conversation_id),
            )
            .with_metadata(metadata::ACTIVITY_REFERENCE_ID, activity_reference_id);

        info!(knowledge_base_id = %knowledge_base_id, "Adding QnA entry");

        self.management
            .update_knowledge_base(&knowledge_base_id, KnowledgeBaseUpdate::add_entry(entry))
            .await
    }

    /// Update one existing entry.
    ///
    /// The answer is always replaced and update metadata appended. Question
    /// variants change only when the new text is non-empty and genuinely
    /// different from the original (case-insensitive, trim-insensitive);
    /// otherwise a redundant add+delete of the same text is skipped.
    pub async fn update_entry(
        &self,
        entry_id: i64,
        answer: &str,
        editor_id: &str,
        new_question: &str,
        original_question: &str,
    ) -> Result<(), DomainError> {
        let knowledge_base_id = self.require_knowledge_base_id().await?;

        let mut update = EntryUpdate::new(entry_id)
            .with_answer(answer.trim())
            .with_metadata(MetadataDelta {
                add: [
                    (metadata::UPDATED_AT.to_string(), Utc::now().to_rfc3339()),
                    (metadata::UPDATED_BY.to_string(), editor_id.to_string()),
                ]
                .into(),
            });

        if let Some(delta) = question_delta(new_question, original_question) {
            update = update.with_questions(delta);
        }

        info!(knowledge_base_id = %knowledge_base_id, entry_id, "Updating QnA entry");

        self.management
            .update_knowledge_base(&knowledge_base_id, KnowledgeBaseUpdate::update_entry(update))
            .await?;

        Ok(())
    }

    /// Delete one entry by id
    pub async fn delete_entry(&self, entry_id: i64) -> Result<(), DomainError> {
        let knowledge_base_id = self.require_knowledge_base_id().await?;

        info!(knowledge_base_id = %knowledge_base_id, entry_id, "Deleting QnA entry");

        self.management
            .update_knowledge_base(&knowledge_base_id, KnowledgeBaseUpdate::delete_entry(entry_id))
            .await?;

        Ok(())
    }

    /// Query the knowledge base with the configured score threshold.
    ///
    /// The remote result list is returned unmodified; an empty list means
    /// "no confident match" and is not an error.
    pub async fn query(
        &self,
        question: &str,
        environment: QnaEnvironment,
    ) -> Result<Vec<QnaAnswer>, DomainError> {
        let query = self.query.as_ref().ok_or_else(|| {
            DomainError::configuration("query client is not configured")
        })?;

        let knowledge_base_id = self.require_knowledge_base_id().await?;

        debug!(knowledge_base_id = %knowledge_base_id, environment = %environment, "Querying QnA entries");

        query
            .generate_answer(
                &knowledge_base_id,
                question.trim(),
                environment,
                self.score_threshold,
            )
            .await
    }

    /// Download the full document set of the given knowledge base slot
    pub async fn export_entries(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        environment: QnaEnvironment,
    ) -> Result<Vec<QnaEntry>, DomainError> {
        self.management.download(knowledge_base_id, environment).await
    }

    /// Resolve a knowledge base id from the configuration store.
    ///
    /// Returns `None` when the store holds nothing (or an empty value) for
    /// the key; callers must check.
    pub async fn resolve_knowledge_base_id(
        &self,
        config_key: &str,
    ) -> Result<Option<KnowledgeBaseId>, DomainError> {
        let value = self
            .config_store
            .configuration_data(CONFIG_PARTITION, config_key)
            .await?;

        Ok(value
            .filter(|v| !v.trim().is_empty())
            .map(KnowledgeBaseId::new))
    }

    /// Whether the knowledge base has unpublished changes.
    ///
    /// When either timestamp is missing or unreadable the state is unknown
    /// and reported as needing publish.
    pub async fn needs_publish(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
    ) -> Result<bool, DomainError> {
        let details = self
            .management
            .knowledge_base_details(knowledge_base_id)
            .await?;

        let changed = details.last_changed.as_deref().and_then(parse_timestamp);
        let published = details.last_published.as_deref().and_then(parse_timestamp);

        Ok(match (changed, published) {
            (Some(changed), Some(published)) => changed > published,
            _ => true,
        })
    }

    /// Promote the edited knowledge base to the published slot
    pub async fn publish(&self, knowledge_base_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        info!(knowledge_base_id = %knowledge_base_id, "Publishing knowledge base");
        self.management.publish(knowledge_base_id).await
    }

    /// Whether the knowledge base has ever been published
    pub async fn has_ever_published(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
    ) -> Result<bool, DomainError> {
        let details = self
            .management
            .knowledge_base_details(knowledge_base_id)
            .await?;

        Ok(details
            .last_published
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty()))
    }

    async fn require_knowledge_base_id(&self) -> Result<KnowledgeBaseId, DomainError> {
        self.resolve_knowledge_base_id(KNOWLEDGE_BASE_CONFIG_KEY)
            .await?
            .ok_or_else(|| DomainError::configuration("knowledge base id is not configured"))
    }
}

/// Segment after the last colon of a conversation id, empty when absent.
fn trailing_conversation_id(conversation_id: Option<&str>) -> String {
    conversation_id
        .and_then(|id| id.rsplit(':').next())
        .unwrap_or_default()
        .to_string()
}

/// Question-variant change for an update, or `None` when the new text is
/// empty or equals the original (case-insensitive, trim-insensitive).
fn question_delta(new_question: &str, original_question: &str) -> Option<QuestionsDelta> {
    let new_question = new_question.trim();
    let original_question = original_question.trim();

    if new_question.is_empty() {
        return None;
    }

    if new_question.eq_ignore_ascii_case(original_question) {
        return None;
    }

    Some(QuestionsDelta {
        add: vec![new_question.to_string()],
        delete: vec![original_question.to_string()],
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config_store::MockConfigStore;
    use crate::domain::qna::{MockQnaManagementClient, MockQnaQueryClient};
    use crate::domain::{KnowledgeBaseDetails, OperationState};

    fn config_store_with_kb(kb_id: &str) -> Arc<MockConfigStore> {
        let kb_id = kb_id.to_string();
        let mut store = MockConfigStore::new();
        store
            .expect_configuration_data()
            .returning(move |_, _| Ok(Some(kb_id.clone())));
        Arc::new(store)
    }

    fn accepted_handle() -> OperationHandle {
        OperationHandle::new("op-1", OperationState::Running)
    }

    fn details_with(
        last_changed: Option<&str>,
        last_published: Option<&str>,
    ) -> KnowledgeBaseDetails {
        KnowledgeBaseDetails {
            id: "kb-1".to_string(),
            last_changed: last_changed.map(String::from),
            last_published: last_published.map(String::from),
            ..KnowledgeBaseDetails::default()
        }
    }

    #[tokio::test]
    async fn test_add_entry_trims_and_builds_metadata() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_update_knowledge_base()
            .withf(|kb_id, update| {
                let entry = &update.add[0];
                kb_id.as_str() == "kb-1"
                    && update.update.is_empty()
                    && update.delete.is_empty()
                    && entry.questions == vec!["What is FAQ++?".to_string()]
                    && entry.answer == "It is a bot."
                    && entry.metadata.get(metadata::CREATED_BY) == Some(&"user1".to_string())
                    && entry.metadata.get(metadata::CONVERSATION_ID)
                        == Some(&"user1@thread".to_string())
                    && entry.metadata.get(metadata::ACTIVITY_REFERENCE_ID)
                        == Some(&"act-42".to_string())
                    && entry
                        .metadata
                        .get(metadata::CREATED_AT)
                        .is_some_and(|t| !t.is_empty())
            })
            .times(1)
            .returning(|_, _| Ok(accepted_handle()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        let handle = adapter
            .add_entry(
                "  What is FAQ++?  ",
                "It is a bot.",
                "user1",
                Some("19:user1@thread"),
                "act-42",
            )
            .await
            .unwrap();

        assert_eq!(handle.id, "op-1");
    }

    #[tokio::test]
    async fn test_add_entry_without_conversation_id() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_update_knowledge_base()
            .withf(|_, update| {
                update.add[0].metadata.get(metadata::CONVERSATION_ID) == Some(&String::new())
            })
            .returning(|_, _| Ok(accepted_handle()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        adapter
            .add_entry("Q", "A", "user1", None, "act-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_entry_fails_without_configured_kb() {
        let mut store = MockConfigStore::new();
        store
            .expect_configuration_data()
            .returning(|_, _| Ok(None));

        let adapter = QnaAdapter::new(
            Arc::new(store),
            Arc::new(MockQnaManagementClient::new()),
            0.5,
        );

        let result = adapter.add_entry("Q", "A", "user1", None, "act-1").await;
        assert!(matches!(
            result,
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_entry_same_question_skips_question_change() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_update_knowledge_base()
            .withf(|_, update| {
                let entry = &update.update[0];
                entry.id == 5
                    && entry.answer.as_deref() == Some("New answer")
                    && entry.questions.is_none()
                    && entry.metadata.as_ref().is_some_and(|m| {
                        m.add.get(metadata::UPDATED_BY) == Some(&"user2".to_string())
                            && m.add.contains_key(metadata::UPDATED_AT)
                    })
            })
            .times(1)
            .returning(|_, _| Ok(accepted_handle()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        adapter
            .update_entry(5, "New answer", "user2", "Same Q", "same q")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_entry_empty_question_skips_question_change() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_update_knowledge_base()
            .withf(|_, update| update.update[0].questions.is_none())
            .returning(|_, _| Ok(accepted_handle()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        adapter
            .update_entry(5, "New answer", "user2", "   ", "Old Q")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_entry_different_question_pairs_add_and_delete() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_update_knowledge_base()
            .withf(|_, update| {
                let questions = update.update[0].questions.as_ref().unwrap();
                questions.add == vec!["Where is the handbook?".to_string()]
                    && questions.delete == vec!["Where is the wiki?".to_string()]
            })
            .times(1)
            .returning(|_, _| Ok(accepted_handle()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        adapter
            .update_entry(
                5,
                "In the portal.",
                "user2",
                "  Where is the handbook?  ",
                "Where is the wiki?",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_entry_submits_single_id() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_update_knowledge_base()
            .withf(|_, update| {
                update.delete == vec![12] && update.add.is_empty() && update.update.is_empty()
            })
            .times(1)
            .returning(|_, _| Ok(accepted_handle()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        adapter.delete_entry(12).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_passes_threshold_and_returns_unmodified() {
        let answers = vec![QnaAnswer {
            id: Some(5),
            answer: "Contact support within 30 days.".to_string(),
            questions: vec!["refund policy".to_string()],
            score: 82.5,
            metadata: Default::default(),
            source: None,
        }];

        let expected = answers.clone();
        let mut query = MockQnaQueryClient::new();
        query
            .expect_generate_answer()
            .withf(|kb_id, question, environment, threshold| {
                kb_id.as_str() == "kb-1"
                    && question == "refund policy"
                    && *environment == QnaEnvironment::Prod
                    && *threshold == 0.3
            })
            .times(1)
            .returning(move |_, _, _, _| Ok(answers.clone()));

        let adapter = QnaAdapter::new(
            config_store_with_kb("kb-1"),
            Arc::new(MockQnaManagementClient::new()),
            0.3,
        )
        .with_query_client(Arc::new(query));

        let result = adapter
            .query("  refund policy  ", QnaEnvironment::Prod)
            .await
            .unwrap();

        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_query_without_client_is_a_configuration_error() {
        let adapter = QnaAdapter::new(
            config_store_with_kb("kb-1"),
            Arc::new(MockQnaManagementClient::new()),
            0.3,
        );

        let result = adapter.query("anything", QnaEnvironment::Test).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_export_entries_downloads_given_slot() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_download()
            .withf(|kb_id, environment| {
                kb_id.as_str() == "kb-2" && *environment == QnaEnvironment::Prod
            })
            .times(1)
            .returning(|_, _| Ok(vec![QnaEntry::new("Q", "A")]));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        let entries = adapter
            .export_entries(&KnowledgeBaseId::new("kb-2"), QnaEnvironment::Prod)
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_treats_empty_value_as_missing() {
        let mut store = MockConfigStore::new();
        store
            .expect_configuration_data()
            .withf(|partition, key| partition == CONFIG_PARTITION && key == "KnowledgeBaseId")
            .returning(|_, _| Ok(Some("  ".to_string())));

        let adapter = QnaAdapter::new(
            Arc::new(store),
            Arc::new(MockQnaManagementClient::new()),
            0.5,
        );

        let resolved = adapter
            .resolve_knowledge_base_id(KNOWLEDGE_BASE_CONFIG_KEY)
            .await
            .unwrap();

        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_needs_publish_when_changed_after_published() {
        let mut management = MockQnaManagementClient::new();
        management.expect_knowledge_base_details().returning(|_| {
            Ok(details_with(
                Some("2024-05-02T10:00:00Z"),
                Some("2024-05-01T10:00:00Z"),
            ))
        });

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        assert!(adapter
            .needs_publish(&KnowledgeBaseId::new("kb-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_needs_publish_false_when_up_to_date() {
        let mut management = MockQnaManagementClient::new();
        management.expect_knowledge_base_details().returning(|_| {
            Ok(details_with(
                Some("2024-05-01T10:00:00Z"),
                Some("2024-05-01T10:00:00Z"),
            ))
        });

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        assert!(!adapter
            .needs_publish(&KnowledgeBaseId::new("kb-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_needs_publish_when_timestamp_missing() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_knowledge_base_details()
            .returning(|_| Ok(details_with(Some("2024-05-01T10:00:00Z"), None)));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        assert!(adapter
            .needs_publish(&KnowledgeBaseId::new("kb-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_has_ever_published() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_knowledge_base_details()
            .returning(|_| Ok(details_with(None, Some("2024-05-01T10:00:00Z"))));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        assert!(adapter
            .has_ever_published(&KnowledgeBaseId::new("kb-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_has_ever_published_false_for_empty_timestamp() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_knowledge_base_details()
            .returning(|_| Ok(details_with(Some("2024-05-01T10:00:00Z"), Some(""))));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        assert!(!adapter
            .has_ever_published(&KnowledgeBaseId::new("kb-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_publish_delegates() {
        let mut management = MockQnaManagementClient::new();
        management
            .expect_publish()
            .withf(|kb_id| kb_id.as_str() == "kb-1")
            .times(1)
            .returning(|_| Ok(()));

        let adapter = QnaAdapter::new(config_store_with_kb("kb-1"), Arc::new(management), 0.5);

        adapter.publish(&KnowledgeBaseId::new("kb-1")).await.unwrap();
    }

    #[test]
    fn test_trailing_conversation_id() {
        assert_eq!(
            trailing_conversation_id(Some("19:user1@thread")),
            "user1@thread"
        );
        assert_eq!(trailing_conversation_id(Some("a:b:c")), "c");
        assert_eq!(trailing_conversation_id(Some("no-colon")), "no-colon");
        assert_eq!(trailing_conversation_id(Some("")), "");
        assert_eq!(trailing_conversation_id(None), "");
    }

    #[test]
    fn test_question_delta_rules() {
        assert!(question_delta("", "Old").is_none());
        assert!(question_delta("   ", "Old").is_none());
        assert!(question_delta("Same Q", "same q").is_none());
        assert!(question_delta("  Same Q  ", "same q").is_none());

        let delta = question_delta("New Q", "Old Q").unwrap();
        assert_eq!(delta.add, vec!["New Q".to_string()]);
        assert_eq!(delta.delete, vec!["Old Q".to_string()]);
    }
}

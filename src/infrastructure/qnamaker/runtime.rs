//! Runtime (query) client for the remote QnA service

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::{DomainError, KnowledgeBaseId, QnaAnswer, QnaEnvironment, QnaQueryClient};

/// QnA runtime endpoint configuration.
///
/// The runtime host and its endpoint key are distinct from the management
/// endpoint; they come from the published knowledge base.
#[derive(Debug, Clone)]
pub struct QnaRuntimeConfig {
    pub endpoint: String,
    pub endpoint_key: String,
}

impl QnaRuntimeConfig {
    pub fn new(endpoint: impl Into<String>, endpoint_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            endpoint_key: endpoint_key.into(),
        }
    }
}

/// Query client over the generate-answer REST contract
#[derive(Debug)]
pub struct QnaRuntimeClient<C: HttpClientTrait> {
    client: C,
    config: QnaRuntimeConfig,
}

impl<C: HttpClientTrait> QnaRuntimeClient<C> {
    pub fn new(client: C, config: QnaRuntimeConfig) -> Self {
        Self { client, config }
    }

    fn build_url(&self, knowledge_base_id: &KnowledgeBaseId) -> String {
        format!(
            "{}/qnamaker/knowledgebases/{}/generateAnswer",
            self.config.endpoint.trim_end_matches('/'),
            knowledge_base_id
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> QnaQueryClient for QnaRuntimeClient<C> {
    async fn generate_answer(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        question: &str,
        environment: QnaEnvironment,
        score_threshold: f64,
    ) -> Result<Vec<QnaAnswer>, DomainError> {
        let url = self.build_url(knowledge_base_id);
        let auth = format!("EndpointKey {}", self.config.endpoint_key);
        let body = serde_json::json!({
            "question": question,
            "isTest": environment.is_test(),
            "scoreThreshold": score_threshold,
        });

        debug!(knowledge_base_id = %knowledge_base_id, environment = %environment, "Querying knowledge base");

        let response = self
            .client
            .post_json(
                &url,
                vec![
                    ("Authorization", auth.as_str()),
                    ("Content-Type", "application/json"),
                ],
                Some(&body),
            )
            .await?;

        let answers: AnswersPayload = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("qnamaker", format!("Failed to parse answers: {}", e))
        })?;

        Ok(answers
            .answers
            .into_iter()
            .map(AnswerPayload::into_domain)
            .collect())
    }
}

// Wire types for the runtime API

#[derive(Debug, Deserialize)]
struct AnswersPayload {
    #[serde(default)]
    answers: Vec<AnswerPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPairPayload {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerPayload {
    id: Option<i64>,
    answer: String,
    #[serde(default)]
    questions: Vec<String>,
    score: f64,
    #[serde(default)]
    metadata: Vec<MetadataPairPayload>,
    source: Option<String>,
}

impl AnswerPayload {
    fn into_domain(self) -> QnaAnswer {
        QnaAnswer {
            id: self.id,
            answer: self.answer,
            questions: self.questions,
            score: self.score,
            metadata: self
                .metadata
                .into_iter()
                .map(|pair| (pair.name, pair.value))
                .collect(),
            source: self.source,
        }
    }
}

//! Management client for the remote QnA service

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, KnowledgeBaseDetails, KnowledgeBaseId, KnowledgeBaseUpdate, OperationHandle,
    OperationState, QnaEntry, QnaEnvironment, QnaManagementClient,
};

/// QnA Maker management API configuration
#[derive(Debug, Clone)]
pub struct QnaMakerConfig {
    pub endpoint: String,
    pub subscription_key: String,
    pub api_version: String,
}

impl QnaMakerConfig {
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
            api_version: "v4.0".to_string(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

/// Management client over the remote QnA service REST contract
#[derive(Debug)]
pub struct QnaMakerClient<C: HttpClientTrait> {
    client: C,
    config: QnaMakerConfig,
}

impl<C: HttpClientTrait> QnaMakerClient<C> {
    pub fn new(client: C, config: QnaMakerConfig) -> Self {
        Self { client, config }
    }

    fn build_url(&self, knowledge_base_id: &KnowledgeBaseId, suffix: &str) -> String {
        format!(
            "{}/qnamaker/{}/knowledgebases/{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.api_version,
            knowledge_base_id,
            suffix
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Ocp-Apim-Subscription-Key", self.config.subscription_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> QnaManagementClient for QnaMakerClient<C> {
    async fn update_knowledge_base(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        update: KnowledgeBaseUpdate,
    ) -> Result<OperationHandle, DomainError> {
        let url = self.build_url(knowledge_base_id, "");
        let body = serde_json::to_value(UpdateKbPayload::from_domain(&update))
            .map_err(|e| DomainError::internal(format!("Failed to encode update: {}", e)))?;

        debug!(knowledge_base_id = %knowledge_base_id, "Submitting knowledge base update");

        let response = self.client.patch_json(&url, self.headers(), &body).await?;

        let operation: OperationPayload = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("qnamaker", format!("Failed to parse operation: {}", e))
        })?;

        Ok(OperationHandle::new(
            operation.operation_id,
            OperationState::from(operation.operation_state.as_str()),
        ))
    }

    async fn knowledge_base_details(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
    ) -> Result<KnowledgeBaseDetails, DomainError> {
        let url = self.build_url(knowledge_base_id, "");

        let response = self.client.get_json(&url, self.headers()).await?;

        let details: DetailsPayload = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("qnamaker", format!("Failed to parse details: {}", e))
        })?;

        Ok(details.into_domain())
    }

    async fn download(
        &self,
        knowledge_base_id: &KnowledgeBaseId,
        environment: QnaEnvironment,
    ) -> Result<Vec<QnaEntry>, DomainError> {
        let url = self.build_url(knowledge_base_id, &format!("/{}/qna", environment));

        debug!(knowledge_base_id = %knowledge_base_id, environment = %environment, "Downloading knowledge base");

        let response = self.client.get_json(&url, self.headers()).await?;

        let download: DownloadPayload = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("qnamaker", format!("Failed to parse documents: {}", e))
        })?;

        Ok(download
            .qna_documents
            .into_iter()
            .map(QnaDocumentPayload::into_domain)
            .collect())
    }

    async fn publish(&self, knowledge_base_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        let url = self.build_url(knowledge_base_id, "");

        debug!(knowledge_base_id = %knowledge_base_id, "Publishing knowledge base");

        self.client.post_json(&url, self.headers(), None).await?;
        Ok(())
    }
}

// Wire types for the management API (camelCase per the remote contract)

#[derive(Debug, Serialize)]
struct MetadataPair {
    name: String,
    value: String,
}

/// Metadata maps are serialized sorted by name so payloads are stable.
fn metadata_pairs(metadata: &HashMap<String, String>) -> Vec<MetadataPair> {
    let mut pairs: Vec<MetadataPair> = metadata
        .iter()
        .map(|(name, value)| MetadataPair {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();
    pairs.sort_by(|a, b| a.name.cmp(&b.name));
    pairs
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateKbPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    add: Option<QnaListPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<UpdateListPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete: Option<DeleteListPayload>,
}

impl UpdateKbPayload {
    fn from_domain(update: &KnowledgeBaseUpdate) -> Self {
        let add = (!update.add.is_empty()).then(|| QnaListPayload {
            qna_list: update.add.iter().map(NewQnaPayload::from_domain).collect(),
        });

        let update_section = (!update.update.is_empty()).then(|| UpdateListPayload {
            qna_list: update
                .update
                .iter()
                .map(|entry| UpdateQnaPayload {
                    id: entry.id,
                    answer: entry.answer.clone(),
                    questions: entry.questions.as_ref().map(|q| QuestionsDeltaPayload {
                        add: q.add.clone(),
                        delete: q.delete.clone(),
                    }),
                    metadata: entry.metadata.as_ref().map(|m| MetadataDeltaPayload {
                        add: metadata_pairs(&m.add),
                    }),
                })
                .collect(),
        });

        let delete = (!update.delete.is_empty()).then(|| DeleteListPayload {
            ids: update.delete.clone(),
        });

        Self {
            add,
            update: update_section,
            delete,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QnaListPayload {
    qna_list: Vec<NewQnaPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewQnaPayload {
    id: i64,
    answer: String,
    questions: Vec<String>,
    metadata: Vec<MetadataPair>,
}

impl NewQnaPayload {
    fn from_domain(entry: &QnaEntry) -> Self {
        Self {
            id: entry.id.unwrap_or(0),
            answer: entry.answer.clone(),
            questions: entry.questions.clone(),
            metadata: metadata_pairs(&entry.metadata),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateListPayload {
    qna_list: Vec<UpdateQnaPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQnaPayload {
    id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    questions: Option<QuestionsDeltaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataDeltaPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsDeltaPayload {
    add: Vec<String>,
    delete: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDeltaPayload {
    add: Vec<MetadataPair>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteListPayload {
    ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationPayload {
    operation_state: String,
    operation_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsPayload {
    id: String,
    name: Option<String>,
    host_name: Option<String>,
    last_changed_timestamp: Option<String>,
    last_published_timestamp: Option<String>,
}

impl DetailsPayload {
    fn into_domain(self) -> KnowledgeBaseDetails {
        KnowledgeBaseDetails {
            id: self.id,
            name: self.name,
            host_name: self.host_name,
            last_changed: self.last_changed_timestamp,
            last_published: self.last_published_timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadPayload {
    qna_documents: Vec<QnaDocumentPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPairPayload {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QnaDocumentPayload {
    id: i64,
    answer: String,
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    metadata: Vec<MetadataPairPayload>,
    source: Option<String>,
}

impl QnaDocumentPayload {
    fn into_domain(self) -> QnaEntry {
        QnaEntry {
            id: Some(self.id),
            questions: self.questions,
            answer: self.answer,
            metadata: self
                .metadata
                .into_iter()
                .map(|pair| (pair.name, pair.value))
                .collect(),
            source: self.source,
        }
    }
}

//! QnA knowledge base adapter
//!
//! A thin adapter between an application's storage layer and a managed
//! question-answering service:
//! - add/update/delete entries against the edited knowledge base slot
//! - query with a configured score threshold
//! - export, publish and publish-state inspection
//! - knowledge base id resolution from an external configuration store

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::ConfigStore;
use infrastructure::qnamaker::{
    HttpClient, QnaMakerClient, QnaMakerConfig, QnaRuntimeClient, QnaRuntimeConfig,
};
use infrastructure::services::QnaAdapter;

/// Build an adapter from application configuration.
///
/// The query client is wired only when both the runtime endpoint and its
/// endpoint key are configured; otherwise queries fail at call time with a
/// configuration error.
pub fn build_adapter(config: &AppConfig, config_store: Arc<dyn ConfigStore>) -> QnaAdapter {
    let http = HttpClient::new();

    let management = QnaMakerClient::new(
        http.clone(),
        QnaMakerConfig::new(&config.qna.endpoint, &config.qna.subscription_key),
    );

    let mut adapter = QnaAdapter::new(
        config_store,
        Arc::new(management),
        config.qna.score_threshold,
    );

    if let (Some(endpoint), Some(key)) = (&config.qna.runtime_endpoint, &config.qna.endpoint_key) {
        let runtime = QnaRuntimeClient::new(http, QnaRuntimeConfig::new(endpoint, key));
        adapter = adapter.with_query_client(Arc::new(runtime));
    }

    adapter
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure::config_store::InMemoryConfigStore;

    fn config_with_runtime(runtime: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.qna.endpoint = "https://westus.api.cognitive.microsoft.com".to_string();
        config.qna.subscription_key = "sub-key".to_string();

        if runtime {
            config.qna.runtime_endpoint = Some("https://faq.azurewebsites.net".to_string());
            config.qna.endpoint_key = Some("ep-key".to_string());
        }

        config
    }

    #[tokio::test]
    async fn test_build_adapter_without_runtime_rejects_queries() {
        let adapter = build_adapter(
            &config_with_runtime(false),
            Arc::new(InMemoryConfigStore::new()),
        );

        let result = adapter
            .query("anything", domain::QnaEnvironment::Prod)
            .await;

        assert!(matches!(
            result,
            Err(domain::DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_build_adapter_with_runtime() {
        let adapter = build_adapter(
            &config_with_runtime(true),
            Arc::new(InMemoryConfigStore::new()),
        );

        assert!(format!("{:?}", adapter).contains("has_query_client: true"));
    }
}

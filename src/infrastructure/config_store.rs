//! In-memory configuration store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConfigStore, DomainError};

/// In-memory implementation of [`ConfigStore`].
///
/// Hosts with a real configuration backend supply their own implementation;
/// this one backs tests and single-process embeddings.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: RwLock<HashMap<(String, String), String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub async fn set(
        &self,
        partition_key: impl Into<String>,
        entity_key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.entries
            .write()
            .await
            .insert((partition_key.into(), entity_key.into()), value.into());
    }

    /// Remove a configuration value
    pub async fn remove(&self, partition_key: &str, entity_key: &str) {
        self.entries
            .write()
            .await
            .remove(&(partition_key.to_string(), entity_key.to_string()));
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn configuration_data(
        &self,
        partition_key: &str,
        entity_key: &str,
    ) -> Result<Option<String>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(partition_key.to_string(), entity_key.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CONFIG_PARTITION, KNOWLEDGE_BASE_CONFIG_KEY};

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryConfigStore::new();
        store
            .set(CONFIG_PARTITION, KNOWLEDGE_BASE_CONFIG_KEY, "kb-123")
            .await;

        let value = store
            .configuration_data(CONFIG_PARTITION, KNOWLEDGE_BASE_CONFIG_KEY)
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("kb-123"));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = InMemoryConfigStore::new();

        let value = store
            .configuration_data(CONFIG_PARTITION, "Unknown")
            .await
            .unwrap();

        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryConfigStore::new();
        store.set("p", "k", "v").await;
        store.remove("p", "k").await;

        let value = store.configuration_data("p", "k").await.unwrap();
        assert!(value.is_none());
    }
}

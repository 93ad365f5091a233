//! Configuration store trait

use async_trait::async_trait;

use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Partition under which bot-level configuration rows are stored.
pub const CONFIG_PARTITION: &str = "ConfigurationInfo";

/// Row key holding the active knowledge base id.
pub const KNOWLEDGE_BASE_CONFIG_KEY: &str = "KnowledgeBaseId";

/// Read access to the external configuration storage.
///
/// The backing store is owned by the host application; this crate only
/// resolves values from it. A missing row and an empty value are both
/// reported as `None` so callers never have to reason about empty-string
/// coercion.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the stored value for the given partition/entity key pair.
    async fn configuration_data(
        &self,
        partition_key: &str,
        entity_key: &str,
    ) -> Result<Option<String>, DomainError>;
}

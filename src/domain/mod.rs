//! Domain layer - Core entities and collaborator seams

pub mod config_store;
pub mod error;
pub mod qna;

pub use config_store::{ConfigStore, CONFIG_PARTITION, KNOWLEDGE_BASE_CONFIG_KEY};
pub use error::DomainError;
pub use qna::{
    metadata, EntryUpdate, KnowledgeBaseDetails, KnowledgeBaseId, KnowledgeBaseUpdate,
    MetadataDelta, OperationHandle, OperationState, QnaAnswer, QnaEntry, QnaEnvironment,
    QnaManagementClient, QnaQueryClient, QuestionsDelta,
};

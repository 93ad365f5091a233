//! QnA domain - knowledge base entries, change sets and client seams

mod client;
mod entity;
mod update;

pub use client::{QnaManagementClient, QnaQueryClient};
pub use entity::{
    metadata, KnowledgeBaseDetails, KnowledgeBaseId, OperationHandle, OperationState, QnaAnswer,
    QnaEntry, QnaEnvironment,
};
pub use update::{EntryUpdate, KnowledgeBaseUpdate, MetadataDelta, QuestionsDelta};

#[cfg(test)]
pub use client::{MockQnaManagementClient, MockQnaQueryClient};

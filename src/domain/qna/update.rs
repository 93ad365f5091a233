//! Change set submitted to the remote update operation

use std::collections::HashMap;

use super::entity::QnaEntry;

/// Question-variant changes for one entry.
///
/// The remote service models a question replacement as an add of the new
/// text paired with a delete of the old one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionsDelta {
    pub add: Vec<String>,
    pub delete: Vec<String>,
}

/// Metadata appended to one entry. Keys not listed here are left to the
/// remote service's own merge semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDelta {
    pub add: HashMap<String, String>,
}

/// Changes to one existing entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    /// Identifier of the entry to change
    pub id: i64,
    /// Replacement answer text
    pub answer: Option<String>,
    /// Question-variant changes, if any
    pub questions: Option<QuestionsDelta>,
    /// Metadata to append, if any
    pub metadata: Option<MetadataDelta>,
}

impl EntryUpdate {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            answer: None,
            questions: None,
            metadata: None,
        }
    }

    /// Replace the answer text
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Set the question-variant changes
    pub fn with_questions(mut self, delta: QuestionsDelta) -> Self {
        self.questions = Some(delta);
        self
    }

    /// Set the metadata to append
    pub fn with_metadata(mut self, delta: MetadataDelta) -> Self {
        self.metadata = Some(delta);
        self
    }
}

/// One update call against the remote knowledge base. Any combination of
/// the three sections may be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBaseUpdate {
    /// New entries to add
    pub add: Vec<QnaEntry>,
    /// Changes to existing entries
    pub update: Vec<EntryUpdate>,
    /// Ids of entries to delete
    pub delete: Vec<i64>,
}

impl KnowledgeBaseUpdate {
    /// Change set adding a single new entry
    pub fn add_entry(entry: QnaEntry) -> Self {
        Self {
            add: vec![entry],
            ..Self::default()
        }
    }

    /// Change set updating a single existing entry
    pub fn update_entry(update: EntryUpdate) -> Self {
        Self {
            update: vec![update],
            ..Self::default()
        }
    }

    /// Change set deleting a single entry by id
    pub fn delete_entry(id: i64) -> Self {
        Self {
            delete: vec![id],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

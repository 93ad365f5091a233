//! QnA knowledge base entities and related types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known metadata keys produced by this adapter.
///
/// The remote service lowercases metadata names, so the constants are
/// stored lowercased to keep lookups on exported entries straightforward.
pub mod metadata {
    pub const CREATED_AT: &str = "createdat";
    pub const CREATED_BY: &str = "createdby";
    pub const UPDATED_AT: &str = "updatedat";
    pub const UPDATED_BY: &str = "updatedby";
    pub const CONVERSATION_ID: &str = "conversationid";
    pub const ACTIVITY_REFERENCE_ID: &str = "activityreferenceid";
}

/// Knowledge base identifier
///
/// Opaque to this crate; the remote service owns the format. Resolved from
/// configuration at call time and never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBaseId(String);

impl KnowledgeBaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KnowledgeBaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot of the knowledge base a call targets.
///
/// `Prod` is the published (servable) slot, `Test` the edited one. Both the
/// query and the export operations take this explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QnaEnvironment {
    Prod,
    Test,
}

impl QnaEnvironment {
    /// Whether this targets the test slot (the remote query API takes a flag).
    pub fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

impl std::fmt::Display for QnaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prod => write!(f, "Prod"),
            Self::Test => write!(f, "Test"),
        }
    }
}

/// One question/answer pair with associated metadata
#[derive(Debug, Clone, PartialEq)]
pub struct QnaEntry {
    /// Identifier assigned by the remote service (absent before creation)
    pub id: Option<i64>,
    /// Question-text variants (non-empty on add)
    pub questions: Vec<String>,
    /// Answer text
    pub answer: String,
    /// Metadata key-value pairs
    pub metadata: HashMap<String, String>,
    /// Source label reported by the remote service
    pub source: Option<String>,
}

impl QnaEntry {
    /// Create a new entry with a single question variant
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: None,
            questions: vec![question.into()],
            answer: answer.into(),
            metadata: HashMap::new(),
            source: None,
        }
    }

    /// Add a metadata pair
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the source label
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// One ranked candidate answer returned by the query surface
#[derive(Debug, Clone, PartialEq)]
pub struct QnaAnswer {
    /// Identifier of the matched entry (absent for the "no match" sentinel)
    pub id: Option<i64>,
    /// Answer text
    pub answer: String,
    /// Question variants of the matched entry
    pub questions: Vec<String>,
    /// Confidence score reported by the remote service
    pub score: f64,
    /// Metadata of the matched entry
    pub metadata: HashMap<String, String>,
    /// Source label of the matched entry
    pub source: Option<String>,
}

/// State of a long-running remote operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Other(String),
}

impl From<&str> for OperationState {
    fn from(state: &str) -> Self {
        match state {
            "NotStarted" => Self::NotStarted,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Handle to a long-running remote operation, for the caller to poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    /// Operation id assigned by the remote service
    pub id: String,
    /// State reported when the operation was accepted
    pub state: OperationState,
}

impl OperationHandle {
    pub fn new(id: impl Into<String>, state: OperationState) -> Self {
        Self {
            id: id.into(),
            state,
        }
    }
}

/// Knowledge base details reported by the remote management surface.
///
/// Timestamps are kept as the raw strings the service reports; publish
/// state is derived from them and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KnowledgeBaseDetails {
    /// Knowledge base id
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Runtime host name for the published slot
    pub host_name: Option<String>,
    /// Timestamp of the last edit
    pub last_changed: Option<String>,
    /// Timestamp of the last publish (absent when never published)
    pub last_published: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::model::DocumentType;

/// Events emitted after successful administrative writes. In-process
/// consumers (cache warmers, audit sinks) subscribe via the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentEvent {
    Created(DocumentChanged),
    Updated(DocumentChanged),
    Deleted(DocumentChanged),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChanged {
    pub document_id: Uuid,
    pub doc_type: DocumentType,
    /// Whether the write appended a revision; always false for create
    /// and delete.
    pub revision_appended: bool,
    pub timestamp: DateTime<Utc>,
}

impl DocumentChanged {
    pub fn new(document_id: Uuid, doc_type: DocumentType, revision_appended: bool) -> Self {
        Self {
            document_id,
            doc_type,
            revision_appended,
            timestamp: Utc::now(),
        }
    }
}

//! Administrative write payloads.
//!
//! Shape validation (required locales, known fields) happens before these
//! reach the engine; the engine only enforces business invariants.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::model::{DocumentType, LocalizedText, Seo};

/// Payload for creating a document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub version: String,
    /// Defaults to `true` when omitted.
    pub is_active: Option<bool>,
    /// Defaults to `false`; guarded by the default-uniqueness check.
    pub is_default: Option<bool>,
    /// Defaults to the creation time when omitted.
    pub effective_date: Option<DateTime<Utc>>,
    pub seo: Option<Seo>,
}

/// Partial update payload. Absent fields are left untouched; a content
/// change triggers the version manager (snapshot + revision append).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    pub title: Option<LocalizedText>,
    pub content: Option<LocalizedText>,
    pub version: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub effective_date: Option<DateTime<Utc>>,
    pub seo: Option<Seo>,
    /// Stored on the revision snapshot when this update supersedes content.
    pub change_description: Option<String>,
}

/// Payload for the per-type supersede entry point: publish a new canonical
/// wording for a type, snapshotting the current one in place.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupersedeDocument {
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub version: String,
    pub change_description: Option<String>,
}

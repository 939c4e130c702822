use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification axis for legal documents. The default-uniqueness
/// invariant is scoped per type: at most one document per type may have
/// `is_default = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Terms,
    Privacy,
    Refund,
    Cookies,
    Disclaimer,
    Custom,
}

impl DocumentType {
    /// Stable lowercase name, also used as the SQL text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Terms => "terms",
            DocumentType::Privacy => "privacy",
            DocumentType::Refund => "refund",
            DocumentType::Cookies => "cookies",
            DocumentType::Disclaimer => "disclaimer",
            DocumentType::Custom => "custom",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terms" => Ok(DocumentType::Terms),
            "privacy" => Ok(DocumentType::Privacy),
            "refund" => Ok(DocumentType::Refund),
            "cookies" => Ok(DocumentType::Cookies),
            "disclaimer" => Ok(DocumentType::Disclaimer),
            "custom" => Ok(DocumentType::Custom),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Arabic/English locale pair. Both locales are required for title and
/// content; the engine never falls back from one locale to the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ar: String,
    pub en: String,
}

impl LocalizedText {
    pub fn new(ar: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ar: ar.into(),
            en: en.into(),
        }
    }
}

/// Free-form SEO metadata. Not versioned and carries no invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<LocalizedText>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Immutable snapshot of a superseded wording. Appended when content
/// changes, never edited or reordered afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub version: String,
    pub content: LocalizedText,
    pub published_date: DateTime<Utc>,
    pub updated_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_description: Option<String>,
}

/// The aggregate root: one legal document with its full revision history.
/// Maps to a single row of the `legal_documents` table; `revisions` is an
/// embedded JSONB array so content + revision commit atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalDocument {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: LocalizedText,
    pub content: LocalizedText,
    /// Derived from `title.en`; unique across all documents.
    pub slug: String,
    pub is_active: bool,
    pub is_default: bool,
    /// Free-form label supplied by the editor, e.g. "1.2" or "2024-01".
    pub version: String,
    /// Orders "current" resolution among active documents of a type.
    pub effective_date: DateTime<Utc>,
    /// Set whenever content actually changes.
    pub published_date: DateTime<Utc>,
    pub created_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,
    pub revisions: Vec<Revision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    pub created_at: DateTime<Utc>,
    /// Also serves as the compare-and-swap token for conditional writes.
    pub updated_at: DateTime<Utc>,
}

impl LegalDocument {
    /// The editor recorded in a revision snapshot: the last updater, or
    /// the creator if the document was never updated.
    pub fn last_editor(&self) -> Uuid {
        self.updated_by.unwrap_or(self.created_by)
    }
}

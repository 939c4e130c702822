//! Read-side projections.
//!
//! Public projections never expose revisions or actor identifiers; the
//! admin detail resolves actor ids into display identities via an
//! explicit join, decoupled from the write path.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::model::{DocumentType, LegalDocument, LocalizedText, Revision, Seo};
use crate::users::UserIdentity;

/// Projection served to unauthenticated callers, both for type-default
/// and slug lookups. SEO metadata is only attached on the slug path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicView {
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub version: String,
    pub effective_date: DateTime<Utc>,
    pub published_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
}

impl PublicView {
    /// Projection for `GET /legal-documents/type/:type`.
    pub fn for_type(doc: &LegalDocument) -> Self {
        Self {
            title: doc.title.clone(),
            content: doc.content.clone(),
            version: doc.version.clone(),
            effective_date: doc.effective_date,
            published_date: doc.published_date,
            seo: None,
        }
    }

    /// Projection for `GET /legal-documents/slug/:slug`.
    pub fn for_slug(doc: &LegalDocument) -> Self {
        Self {
            seo: doc.seo.clone(),
            ..Self::for_type(doc)
        }
    }
}

/// Full administrative view: every field plus the revision log, with
/// `created_by` / `updated_by` resolved into display identities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDetail {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub slug: String,
    pub is_active: bool,
    pub is_default: bool,
    pub version: String,
    pub effective_date: DateTime<Utc>,
    pub published_date: DateTime<Utc>,
    pub revisions: Vec<Revision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserIdentity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminDetail {
    pub fn new(
        doc: LegalDocument,
        created_by: Option<UserIdentity>,
        updated_by: Option<UserIdentity>,
    ) -> Self {
        Self {
            id: doc.id,
            doc_type: doc.doc_type,
            title: doc.title,
            content: doc.content,
            slug: doc.slug,
            is_active: doc.is_active,
            is_default: doc.is_default,
            version: doc.version,
            effective_date: doc.effective_date,
            published_date: doc.published_date,
            revisions: doc.revisions,
            seo: doc.seo,
            created_by,
            updated_by,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Row shape for the administrative listing; omits content and revisions
/// to keep list payloads small.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: LocalizedText,
    pub slug: String,
    pub is_active: bool,
    pub is_default: bool,
    pub version: String,
    pub effective_date: DateTime<Utc>,
    pub published_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&LegalDocument> for DocumentSummary {
    fn from(doc: &LegalDocument) -> Self {
        Self {
            id: doc.id,
            doc_type: doc.doc_type,
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            is_active: doc.is_active,
            is_default: doc.is_default,
            version: doc.version.clone(),
            effective_date: doc.effective_date,
            published_date: doc.published_date,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

//! Persistence boundary for legal documents.
//!
//! Implementations must uphold the two uniqueness invariants at the
//! storage layer (not just via the engine's advisory pre-checks): at most
//! one `is_default = true` document per type, and globally unique slugs.
//! A write that would violate either fails with the corresponding
//! business error, never a driver error.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::document::model::{DocumentType, LegalDocument};
use crate::error::EngineError;
use crate::listing::ListParams;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Persist a new document.
    async fn insert(&self, doc: &LegalDocument) -> Result<(), EngineError>;

    /// Conditional full-state replace: commits only when the stored
    /// `updated_at` still equals `expected_updated_at`. Returns `false`
    /// when the document changed underneath the caller (or vanished),
    /// letting the engine reload and retry. This is the serialization
    /// primitive for update and supersede.
    async fn replace_if_unchanged(
        &self,
        doc: &LegalDocument,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, EngineError>;

    /// Remove a document. Refuses to remove the default for its type
    /// (`DeleteBlocked`), checked atomically with the removal so a
    /// concurrent promote cannot slip in between. Returns whether a row
    /// was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, EngineError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LegalDocument>, EngineError>;

    /// Active document with the given slug.
    async fn find_active_by_slug(&self, slug: &str)
        -> Result<Option<LegalDocument>, EngineError>;

    /// The publicly served default: `is_active && is_default` for the type.
    async fn find_default(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<LegalDocument>, EngineError>;

    /// The "current" active document for a type: active, ordered by
    /// `effective_date` descending, first one. Used by supersede.
    async fn find_current_active(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<LegalDocument>, EngineError>;

    /// Any document with `is_default = true` for the type, regardless of
    /// `is_active`, optionally excluding one id. Advisory pre-check for
    /// the default-uniqueness guard.
    async fn find_default_any(
        &self,
        doc_type: DocumentType,
        exclude: Option<Uuid>,
    ) -> Result<Option<LegalDocument>, EngineError>;

    /// Filtered, sorted page of documents plus the total match count.
    async fn list(&self, params: &ListParams)
        -> Result<(Vec<LegalDocument>, u64), EngineError>;
}

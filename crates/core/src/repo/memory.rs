//! In-memory repository backed by a single `tokio::sync::RwLock`.
//!
//! Every write takes the write lock, so invariant checks and the actual
//! mutation are one atomic step; two racing writers are serialized and
//! the loser observes the winner's state, exactly like the partial
//! unique indexes do for PostgreSQL. Used by the engine test-suite and
//! usable as a standalone backend for ephemeral setups.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::model::{DocumentType, LegalDocument};
use crate::error::EngineError;
use crate::listing::{ListParams, SortField, SortOrder};

use super::DocumentRepository;

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    documents: Arc<RwLock<HashMap<Uuid, LegalDocument>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniqueness checks shared by insert and replace; must run under the
    /// write lock so check-then-act cannot interleave.
    fn assert_unique(
        docs: &HashMap<Uuid, LegalDocument>,
        candidate: &LegalDocument,
    ) -> Result<(), EngineError> {
        for other in docs.values() {
            if other.id == candidate.id {
                continue;
            }
            if other.slug == candidate.slug {
                return Err(EngineError::DuplicateSlug(candidate.slug.clone()));
            }
            if candidate.is_default && other.is_default && other.doc_type == candidate.doc_type {
                return Err(EngineError::DuplicateDefault(candidate.doc_type));
            }
        }
        Ok(())
    }

    fn compare(a: &LegalDocument, b: &LegalDocument, field: SortField) -> Ordering {
        match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::EffectiveDate => a.effective_date.cmp(&b.effective_date),
            SortField::PublishedDate => a.published_date.cmp(&b.published_date),
            SortField::Version => a.version.cmp(&b.version),
            SortField::Slug => a.slug.cmp(&b.slug),
            SortField::Type => a.doc_type.as_str().cmp(b.doc_type.as_str()),
            SortField::IsActive => a.is_active.cmp(&b.is_active),
            SortField::IsDefault => a.is_default.cmp(&b.is_default),
        }
    }

    fn matches(doc: &LegalDocument, params: &ListParams) -> bool {
        if let Some(t) = params.doc_type {
            if doc.doc_type != t {
                return false;
            }
        }
        if let Some(active) = params.is_active {
            if doc.is_active != active {
                return false;
            }
        }
        if let Some(term) = &params.search {
            let needle = term.to_lowercase();
            let hit = doc.title.ar.to_lowercase().contains(&needle)
                || doc.title.en.to_lowercase().contains(&needle)
                || doc.slug.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl DocumentRepository for MemoryRepository {
    async fn insert(&self, doc: &LegalDocument) -> Result<(), EngineError> {
        let mut docs = self.documents.write().await;
        Self::assert_unique(&docs, doc)?;
        docs.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn replace_if_unchanged(
        &self,
        doc: &LegalDocument,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let mut docs = self.documents.write().await;
        match docs.get(&doc.id) {
            Some(stored) if stored.updated_at == expected_updated_at => {
                Self::assert_unique(&docs, doc)?;
                docs.insert(doc.id, doc.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EngineError> {
        let mut docs = self.documents.write().await;
        match docs.get(&id) {
            Some(doc) if doc.is_default => Err(EngineError::DeleteBlocked),
            Some(_) => {
                docs.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LegalDocument>, EngineError> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let docs = self.documents.read().await;
        Ok(docs
            .values()
            .find(|d| d.is_active && d.slug == slug)
            .cloned())
    }

    async fn find_default(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let docs = self.documents.read().await;
        Ok(docs
            .values()
            .find(|d| d.doc_type == doc_type && d.is_active && d.is_default)
            .cloned())
    }

    async fn find_current_active(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let docs = self.documents.read().await;
        Ok(docs
            .values()
            .filter(|d| d.doc_type == doc_type && d.is_active)
            .max_by_key(|d| (d.effective_date, d.created_at))
            .cloned())
    }

    async fn find_default_any(
        &self,
        doc_type: DocumentType,
        exclude: Option<Uuid>,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let docs = self.documents.read().await;
        Ok(docs
            .values()
            .find(|d| d.doc_type == doc_type && d.is_default && Some(d.id) != exclude)
            .cloned())
    }

    async fn list(
        &self,
        params: &ListParams,
    ) -> Result<(Vec<LegalDocument>, u64), EngineError> {
        let docs = self.documents.read().await;
        let mut matched: Vec<LegalDocument> = docs
            .values()
            .filter(|d| Self::matches(d, params))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = Self::compare(a, b, params.sort_by);
            match params.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matched.len() as u64;
        let page: Vec<LegalDocument> = matched
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit as usize)
            .collect();
        Ok((page, total))
    }
}

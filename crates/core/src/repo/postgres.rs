//! PostgreSQL repository.
//!
//! The storage layer carries the invariants the advisory pre-checks can
//! only narrow: a unique index on `slug` and a partial unique index on
//! `(doc_type) WHERE is_default` (see `migrations/`). A losing concurrent
//! writer gets a `23505` which is translated into the matching business
//! error here. Content + revision live on one row (`revisions` JSONB), so
//! a content update and its snapshot commit atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::document::model::{DocumentType, LegalDocument, LocalizedText, Revision, Seo};
use crate::error::EngineError;
use crate::listing::ListParams;
use crate::users::{UserDirectory, UserIdentity};

use super::DocumentRepository;

const SLUG_CONSTRAINT: &str = "legal_documents_slug_key";
const DEFAULT_CONSTRAINT: &str = "legal_documents_default_per_type_key";

const SELECT_COLUMNS: &str = "id, doc_type, title_ar, title_en, content_ar, content_en, slug, \
     is_active, is_default, version, effective_date, published_date, \
     created_by, updated_by, revisions, seo, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Translate a unique-index violation into the business error for the
    /// document that caused it; everything else passes through as storage.
    fn map_write_error(err: sqlx::Error, doc: &LegalDocument) -> EngineError {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some("23505") {
                return match db.constraint() {
                    Some(SLUG_CONSTRAINT) => EngineError::DuplicateSlug(doc.slug.clone()),
                    Some(DEFAULT_CONSTRAINT) => EngineError::DuplicateDefault(doc.doc_type),
                    _ => EngineError::from(err),
                };
            }
        }
        EngineError::from(err)
    }

    fn from_row(row: &PgRow) -> Result<LegalDocument, EngineError> {
        let doc_type: String = row.get("doc_type");
        let doc_type = doc_type
            .parse::<DocumentType>()
            .map_err(|e| EngineError::Storage(anyhow::anyhow!(e)))?;

        let revisions: Vec<Revision> = serde_json::from_value(row.get("revisions"))
            .map_err(|e| EngineError::Storage(e.into()))?;
        let seo: Option<Seo> = row
            .get::<Option<serde_json::Value>, _>("seo")
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| EngineError::Storage(e.into()))?;

        Ok(LegalDocument {
            id: row.get("id"),
            doc_type,
            title: LocalizedText::new(
                row.get::<String, _>("title_ar"),
                row.get::<String, _>("title_en"),
            ),
            content: LocalizedText::new(
                row.get::<String, _>("content_ar"),
                row.get::<String, _>("content_en"),
            ),
            slug: row.get("slug"),
            is_active: row.get("is_active"),
            is_default: row.get("is_default"),
            version: row.get("version"),
            effective_date: row.get("effective_date"),
            published_date: row.get("published_date"),
            created_by: row.get("created_by"),
            updated_by: row.get("updated_by"),
            revisions,
            seo,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn revisions_json(doc: &LegalDocument) -> Result<serde_json::Value, EngineError> {
        serde_json::to_value(&doc.revisions).map_err(|e| EngineError::Storage(e.into()))
    }

    fn seo_json(doc: &LegalDocument) -> Result<Option<serde_json::Value>, EngineError> {
        doc.seo
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| EngineError::Storage(e.into()))
    }

    /// Shared WHERE clause for the listing's page and count queries.
    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, params: &'a ListParams) {
        qb.push(" WHERE TRUE");
        if let Some(doc_type) = params.doc_type {
            qb.push(" AND doc_type = ").push_bind(doc_type.as_str());
        }
        if let Some(is_active) = params.is_active {
            qb.push(" AND is_active = ").push_bind(is_active);
        }
        if let Some(term) = &params.search {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            qb.push(" AND (lower(title_ar) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR lower(title_en) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR lower(slug) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

/// Escape LIKE metacharacters in a search term.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl DocumentRepository for PgRepository {
    async fn insert(&self, doc: &LegalDocument) -> Result<(), EngineError> {
        sqlx::query(
            "INSERT INTO legal_documents \
             (id, doc_type, title_ar, title_en, content_ar, content_en, slug, \
              is_active, is_default, version, effective_date, published_date, \
              created_by, updated_by, revisions, seo, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(doc.id)
        .bind(doc.doc_type.as_str())
        .bind(&doc.title.ar)
        .bind(&doc.title.en)
        .bind(&doc.content.ar)
        .bind(&doc.content.en)
        .bind(&doc.slug)
        .bind(doc.is_active)
        .bind(doc.is_default)
        .bind(&doc.version)
        .bind(doc.effective_date)
        .bind(doc.published_date)
        .bind(doc.created_by)
        .bind(doc.updated_by)
        .bind(Self::revisions_json(doc)?)
        .bind(Self::seo_json(doc)?)
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, doc))?;
        Ok(())
    }

    async fn replace_if_unchanged(
        &self,
        doc: &LegalDocument,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let result = sqlx::query(
            "UPDATE legal_documents SET \
             doc_type = $1, title_ar = $2, title_en = $3, content_ar = $4, \
             content_en = $5, slug = $6, is_active = $7, is_default = $8, \
             version = $9, effective_date = $10, published_date = $11, \
             updated_by = $12, revisions = $13, seo = $14, updated_at = $15 \
             WHERE id = $16 AND updated_at = $17",
        )
        .bind(doc.doc_type.as_str())
        .bind(&doc.title.ar)
        .bind(&doc.title.en)
        .bind(&doc.content.ar)
        .bind(&doc.content.en)
        .bind(&doc.slug)
        .bind(doc.is_active)
        .bind(doc.is_default)
        .bind(&doc.version)
        .bind(doc.effective_date)
        .bind(doc.published_date)
        .bind(doc.updated_by)
        .bind(Self::revisions_json(doc)?)
        .bind(Self::seo_json(doc)?)
        .bind(doc.updated_at)
        .bind(doc.id)
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, doc))?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EngineError> {
        let result = sqlx::query("DELETE FROM legal_documents WHERE id = $1 AND NOT is_default")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 1 {
            return Ok(true);
        }
        // Nothing deleted: either the row is gone or it is the default.
        let is_default: Option<bool> =
            sqlx::query_scalar("SELECT is_default FROM legal_documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match is_default {
            Some(true) => Err(EngineError::DeleteBlocked),
            _ => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LegalDocument>, EngineError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM legal_documents WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let sql =
            format!("SELECT {SELECT_COLUMNS} FROM legal_documents WHERE slug = $1 AND is_active");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_default(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM legal_documents \
             WHERE doc_type = $1 AND is_active AND is_default"
        );
        let row = sqlx::query(&sql)
            .bind(doc_type.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_current_active(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM legal_documents \
             WHERE doc_type = $1 AND is_active \
             ORDER BY effective_date DESC, created_at DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(doc_type.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_default_any(
        &self,
        doc_type: DocumentType,
        exclude: Option<Uuid>,
    ) -> Result<Option<LegalDocument>, EngineError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM legal_documents \
             WHERE doc_type = $1 AND is_default AND ($2::uuid IS NULL OR id != $2)"
        );
        let row = sqlx::query(&sql)
            .bind(doc_type.as_str())
            .bind(exclude)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list(
        &self,
        params: &ListParams,
    ) -> Result<(Vec<LegalDocument>, u64), EngineError> {
        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM legal_documents");
        Self::push_filters(&mut count_qb, params);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut page_qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM legal_documents"));
        Self::push_filters(&mut page_qb, params);
        // Sort column and direction come from a whitelist, never raw input.
        page_qb.push(format!(
            " ORDER BY {} {}",
            params.sort_by.column(),
            params.sort_order.keyword()
        ));
        page_qb
            .push(" LIMIT ")
            .push_bind(i64::from(params.limit))
            .push(" OFFSET ")
            .push_bind(params.offset() as i64);

        let rows = page_qb.build().fetch_all(&self.pool).await?;
        let docs = rows
            .iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((docs, total as u64))
    }
}

/// Identity join against the external `users` table; the write path never
/// touches this, only the admin-detail read.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn resolve(&self, id: Uuid) -> Result<Option<UserIdentity>, EngineError> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserIdentity {
            id: r.get("id"),
            name: r.get("name"),
            email: r.get("email"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}

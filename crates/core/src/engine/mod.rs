//! The versioned document engine.
//!
//! All administrative writes flow through here: slug derivation, the
//! default-uniqueness guard, the version manager and finally the
//! repository. Reads project documents for their audience and never let
//! the public paths leak revisions or actor ids.

pub mod versioning;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::document::input::{CreateDocument, SupersedeDocument, UpdateDocument};
use crate::document::model::{DocumentType, LegalDocument};
use crate::document::projection::{AdminDetail, DocumentSummary, PublicView};
use crate::document::slug::derive_slug;
use crate::error::EngineError;
use crate::listing::{DocumentPage, ListParams, PaginationMeta};
use crate::repo::DocumentRepository;
use crate::users::UserDirectory;

/// How many times a conditional write is retried before giving up with
/// `Conflict`. Each retry reloads the document, so only sustained
/// contention on a single document exhausts this.
const CAS_ATTEMPTS: u32 = 3;

/// Outcome of an update, reporting whether the version manager appended
/// a revision.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub document: LegalDocument,
    pub revision_appended: bool,
}

/// Outcome of a supersede: either the current document was overwritten
/// in place (snapshot appended), or the type had no active document and
/// a brand-new default was created.
#[derive(Debug, Clone)]
pub struct SupersedeOutcome {
    pub document: LegalDocument,
    pub created: bool,
}

#[derive(Clone)]
pub struct DocumentEngine {
    repo: Arc<dyn DocumentRepository>,
    users: Arc<dyn UserDirectory>,
}

impl DocumentEngine {
    pub fn new(repo: Arc<dyn DocumentRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { repo, users }
    }

    /// Advisory pre-check for the default-uniqueness invariant. Narrows
    /// the race window; the repository's storage-level constraint closes
    /// it (a losing concurrent writer still gets `DuplicateDefault`).
    async fn assert_default_unique(
        &self,
        doc_type: DocumentType,
        exclude: Option<Uuid>,
    ) -> Result<(), EngineError> {
        match self.repo.find_default_any(doc_type, exclude).await? {
            Some(_) => Err(EngineError::DuplicateDefault(doc_type)),
            None => Ok(()),
        }
    }

    pub async fn create(
        &self,
        input: CreateDocument,
        actor: Uuid,
    ) -> Result<LegalDocument, EngineError> {
        let slug = derive_slug(&input.title.en)?;
        let is_default = input.is_default.unwrap_or(false);
        if is_default {
            self.assert_default_unique(input.doc_type, None).await?;
        }

        let now = Utc::now();
        let doc = LegalDocument {
            id: Uuid::new_v4(),
            doc_type: input.doc_type,
            title: input.title,
            content: input.content,
            slug,
            is_active: input.is_active.unwrap_or(true),
            is_default,
            version: input.version,
            effective_date: input.effective_date.unwrap_or(now),
            published_date: now,
            created_by: actor,
            updated_by: None,
            revisions: Vec::new(),
            seo: input.seo,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&doc).await?;
        tracing::info!(id = %doc.id, doc_type = %doc.doc_type, slug = %doc.slug, "created legal document");
        Ok(doc)
    }

    /// Partial update. A content change snapshots the prior wording into
    /// the revision log before overwriting; anything else is applied
    /// freely. The whole new state commits through one conditional write,
    /// so a revision can never land without its content or vice versa.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateDocument,
        actor: Uuid,
    ) -> Result<UpdateOutcome, EngineError> {
        for _ in 0..CAS_ATTEMPTS {
            let mut doc = self.repo.find_by_id(id).await?.ok_or(EngineError::NotFound)?;
            let expected = doc.updated_at;

            if input.is_default == Some(true) && !doc.is_default {
                self.assert_default_unique(doc.doc_type, Some(id)).await?;
            }

            let now = Utc::now();
            let mut revision_appended = false;

            if let Some(content) = &input.content {
                if versioning::content_changed(&doc, content) {
                    doc.revisions
                        .push(versioning::snapshot(&doc, input.change_description.clone()));
                    doc.content = content.clone();
                    doc.published_date = now;
                    revision_appended = true;
                }
            }
            if let Some(title) = &input.title {
                if title.en != doc.title.en {
                    doc.slug = derive_slug(&title.en)?;
                }
                doc.title = title.clone();
            }
            if let Some(version) = &input.version {
                doc.version = version.clone();
            }
            if let Some(is_active) = input.is_active {
                doc.is_active = is_active;
            }
            if let Some(is_default) = input.is_default {
                doc.is_default = is_default;
            }
            if let Some(effective_date) = input.effective_date {
                doc.effective_date = effective_date;
            }
            if let Some(seo) = &input.seo {
                doc.seo = Some(seo.clone());
            }
            doc.updated_by = Some(actor);
            doc.updated_at = now;

            if self.repo.replace_if_unchanged(&doc, expected).await? {
                tracing::info!(id = %doc.id, revision_appended, "updated legal document");
                return Ok(UpdateOutcome {
                    document: doc,
                    revision_appended,
                });
            }
            tracing::debug!(id = %id, "conditional write lost, reloading");
        }
        Err(EngineError::Conflict)
    }

    /// Publish a new canonical wording for a type. The current active
    /// document (latest `effective_date`) is snapshotted into its own
    /// revision log and overwritten in place, keeping its identity; when
    /// the type has no active document yet, a fresh default is created.
    /// The conditional write plus the per-type default constraint
    /// serialize concurrent callers.
    pub async fn supersede(
        &self,
        doc_type: DocumentType,
        input: SupersedeDocument,
        actor: Uuid,
    ) -> Result<SupersedeOutcome, EngineError> {
        for _ in 0..CAS_ATTEMPTS {
            match self.repo.find_current_active(doc_type).await? {
                Some(mut doc) => {
                    let expected = doc.updated_at;
                    let now = Utc::now();

                    doc.revisions
                        .push(versioning::snapshot(&doc, input.change_description.clone()));
                    if input.title.en != doc.title.en {
                        doc.slug = derive_slug(&input.title.en)?;
                    }
                    doc.title = input.title.clone();
                    doc.content = input.content.clone();
                    doc.version = input.version.clone();
                    doc.published_date = now;
                    doc.updated_by = Some(actor);
                    doc.updated_at = now;

                    if self.repo.replace_if_unchanged(&doc, expected).await? {
                        tracing::info!(id = %doc.id, doc_type = %doc_type, "superseded legal document");
                        return Ok(SupersedeOutcome {
                            document: doc,
                            created: false,
                        });
                    }
                }
                None => {
                    let create = CreateDocument {
                        doc_type,
                        title: input.title.clone(),
                        content: input.content.clone(),
                        version: input.version.clone(),
                        is_active: Some(true),
                        is_default: Some(true),
                        effective_date: None,
                        seo: None,
                    };
                    match self.create(create, actor).await {
                        Ok(document) => {
                            return Ok(SupersedeOutcome {
                                document,
                                created: true,
                            })
                        }
                        // A concurrent caller created the first document
                        // for this type; reload and supersede it instead.
                        Err(EngineError::DuplicateDefault(_)) => continue,
                        Err(err) => return Err(err),
                    }
                }
            }
        }
        Err(EngineError::Conflict)
    }

    /// Delete is blocked while the document is its type's default.
    /// Returns the deleted document.
    pub async fn delete(&self, id: Uuid) -> Result<LegalDocument, EngineError> {
        let doc = self.repo.find_by_id(id).await?.ok_or(EngineError::NotFound)?;
        if doc.is_default {
            return Err(EngineError::DeleteBlocked);
        }
        // The repository re-checks the flag atomically with the removal,
        // so a promote committing after the read above still blocks this.
        if !self.repo.delete(id).await? {
            return Err(EngineError::NotFound);
        }
        tracing::info!(id = %id, "deleted legal document");
        Ok(doc)
    }

    pub async fn get_default_by_type(
        &self,
        doc_type: DocumentType,
    ) -> Result<PublicView, EngineError> {
        self.repo
            .find_default(doc_type)
            .await?
            .map(|doc| PublicView::for_type(&doc))
            .ok_or(EngineError::NotFound)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<PublicView, EngineError> {
        self.repo
            .find_active_by_slug(slug)
            .await?
            .map(|doc| PublicView::for_slug(&doc))
            .ok_or(EngineError::NotFound)
    }

    /// Full administrative read, inactive documents included, with the
    /// actor ids joined to display identities.
    pub async fn get_admin_detail(&self, id: Uuid) -> Result<AdminDetail, EngineError> {
        let doc = self.repo.find_by_id(id).await?.ok_or(EngineError::NotFound)?;
        let created_by = self.users.resolve(doc.created_by).await?;
        let updated_by = match doc.updated_by {
            Some(actor) => self.users.resolve(actor).await?,
            None => None,
        };
        Ok(AdminDetail::new(doc, created_by, updated_by))
    }

    pub async fn list(&self, params: ListParams) -> Result<DocumentPage, EngineError> {
        let (docs, total) = self.repo.list(&params).await?;
        Ok(DocumentPage {
            documents: docs.iter().map(DocumentSummary::from).collect(),
            pagination: PaginationMeta::new(total, params.page, params.limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{LocalizedText, Seo};
    use crate::repo::memory::MemoryRepository;
    use crate::users::{StaticUserDirectory, UserIdentity};

    fn engine() -> DocumentEngine {
        DocumentEngine::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(StaticUserDirectory::default()),
        )
    }

    fn engine_with_users(users: Vec<UserIdentity>) -> DocumentEngine {
        DocumentEngine::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(StaticUserDirectory::new(users)),
        )
    }

    fn create_input(doc_type: DocumentType, title_en: &str) -> CreateDocument {
        CreateDocument {
            doc_type,
            title: LocalizedText::new("عنوان", title_en),
            content: LocalizedText::new("نص", "body"),
            version: "1.0".to_string(),
            is_active: None,
            is_default: None,
            effective_date: None,
            seo: None,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_and_applies_flag_defaults() {
        let engine = engine();
        let doc = engine
            .create(create_input(DocumentType::Refund, "Refund Policy"), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(doc.slug, "refund-policy");
        assert!(doc.is_active);
        assert!(!doc.is_default);
        assert!(doc.revisions.is_empty());
        assert_eq!(doc.effective_date, doc.created_at);
    }

    #[tokio::test]
    async fn create_rejects_title_with_empty_slug() {
        let engine = engine();
        let err = engine
            .create(create_input(DocumentType::Terms, "   ***   "), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSlug(_)));
    }

    #[tokio::test]
    async fn second_default_for_type_is_rejected() {
        let engine = engine();
        let mut first = create_input(DocumentType::Terms, "Terms of Service");
        first.is_default = Some(true);
        let winner = engine.create(first, Uuid::new_v4()).await.unwrap();

        let mut second = create_input(DocumentType::Terms, "Alternate Terms");
        second.is_default = Some(true);
        let err = engine.create(second, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EngineError::DuplicateDefault(DocumentType::Terms)));

        // The winner is unaffected.
        let view = engine.get_default_by_type(DocumentType::Terms).await.unwrap();
        assert_eq!(view.title.en, "Terms of Service");
        assert!(engine.get_admin_detail(winner.id).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_default_creates_have_exactly_one_winner() {
        let engine = engine();
        let mut a = create_input(DocumentType::Privacy, "Privacy Policy");
        a.is_default = Some(true);
        let mut b = create_input(DocumentType::Privacy, "Privacy Statement");
        b.is_default = Some(true);

        let (ra, rb) = tokio::join!(
            {
                let engine = engine.clone();
                tokio::spawn(async move { engine.create(a, Uuid::new_v4()).await })
            },
            {
                let engine = engine.clone();
                tokio::spawn(async move { engine.create(b, Uuid::new_v4()).await })
            },
        );
        let outcomes = [ra.unwrap(), rb.unwrap()];

        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(EngineError::DuplicateDefault(DocumentType::Privacy))
        )));
    }

    #[tokio::test]
    async fn colliding_derived_slugs_are_rejected() {
        let engine = engine();
        engine
            .create(create_input(DocumentType::Refund, "Refund Policy"), Uuid::new_v4())
            .await
            .unwrap();

        let err = engine
            .create(
                create_input(DocumentType::Custom, "Refund Policy!!!"),
                Uuid::new_v4(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateSlug(s) if s == "refund-policy"));
    }

    #[tokio::test]
    async fn content_update_appends_one_revision_capturing_prior_state() {
        let engine = engine();
        let actor = Uuid::new_v4();
        let doc = engine
            .create(create_input(DocumentType::Terms, "Terms"), actor)
            .await
            .unwrap();
        let original = doc.clone();

        // Only the English locale changes; that still counts.
        let editor = Uuid::new_v4();
        let outcome = engine
            .update(
                doc.id,
                UpdateDocument {
                    content: Some(LocalizedText::new("نص", "updated body")),
                    version: Some("2.0".to_string()),
                    change_description: Some("clarified liability".to_string()),
                    ..UpdateDocument::default()
                },
                editor,
            )
            .await
            .unwrap();

        assert!(outcome.revision_appended);
        let updated = outcome.document;
        assert_eq!(updated.revisions.len(), 1);
        let rev = &updated.revisions[0];
        assert_eq!(rev.version, "1.0");
        assert_eq!(rev.content, original.content);
        assert_eq!(rev.published_date, original.published_date);
        assert_eq!(rev.updated_by, actor);
        assert_eq!(rev.change_description.as_deref(), Some("clarified liability"));

        assert_eq!(updated.version, "2.0");
        assert_eq!(updated.content.en, "updated body");
        assert!(updated.published_date > original.published_date);
        assert_eq!(updated.updated_by, Some(editor));
    }

    #[tokio::test]
    async fn identical_content_update_appends_nothing() {
        let engine = engine();
        let doc = engine
            .create(create_input(DocumentType::Cookies, "Cookie Policy"), Uuid::new_v4())
            .await
            .unwrap();

        let outcome = engine
            .update(
                doc.id,
                UpdateDocument {
                    content: Some(doc.content.clone()),
                    is_active: Some(false),
                    ..UpdateDocument::default()
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        assert!(!outcome.revision_appended);
        assert!(outcome.document.revisions.is_empty());
        assert_eq!(outcome.document.published_date, doc.published_date);
        assert!(!outcome.document.is_active);
    }

    #[tokio::test]
    async fn title_change_rederives_slug_without_revision() {
        let engine = engine();
        let doc = engine
            .create(create_input(DocumentType::Disclaimer, "Disclaimer"), Uuid::new_v4())
            .await
            .unwrap();

        let outcome = engine
            .update(
                doc.id,
                UpdateDocument {
                    title: Some(LocalizedText::new("إخلاء مسؤولية", "Legal Disclaimer")),
                    ..UpdateDocument::default()
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.document.slug, "legal-disclaimer");
        assert!(!outcome.revision_appended);
    }

    #[tokio::test]
    async fn promote_and_demote_respect_the_default_guard() {
        let engine = engine();
        let actor = Uuid::new_v4();
        let mut input = create_input(DocumentType::Terms, "Terms v1");
        input.is_default = Some(true);
        let current = engine.create(input, actor).await.unwrap();
        let variant = engine
            .create(create_input(DocumentType::Terms, "Terms v2"), actor)
            .await
            .unwrap();

        let promote = UpdateDocument {
            is_default: Some(true),
            ..UpdateDocument::default()
        };
        let err = engine
            .update(variant.id, promote.clone(), actor)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateDefault(DocumentType::Terms)));

        // Demote the current default, then the promotion goes through.
        engine
            .update(
                current.id,
                UpdateDocument {
                    is_default: Some(false),
                    ..UpdateDocument::default()
                },
                actor,
            )
            .await
            .unwrap();
        let outcome = engine.update(variant.id, promote, actor).await.unwrap();
        assert!(outcome.document.is_default);
    }

    #[tokio::test]
    async fn delete_is_blocked_for_the_default_document() {
        let engine = engine();
        let mut input = create_input(DocumentType::Privacy, "Privacy Policy");
        input.is_default = Some(true);
        let doc = engine.create(input, Uuid::new_v4()).await.unwrap();

        let err = engine.delete(doc.id).await.unwrap_err();
        assert!(matches!(err, EngineError::DeleteBlocked));
        // Still resolvable afterwards.
        assert!(engine.get_admin_detail(doc.id).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_variant_disappears_from_listings() {
        let engine = engine();
        let doc = engine
            .create(create_input(DocumentType::Custom, "Community Rules"), Uuid::new_v4())
            .await
            .unwrap();

        engine.delete(doc.id).await.unwrap();
        assert!(matches!(
            engine.delete(doc.id).await,
            Err(EngineError::NotFound)
        ));

        let page = engine.list(ListParams::default()).await.unwrap();
        assert_eq!(page.pagination.total_docs, 0);
        assert!(page.documents.is_empty());
    }

    #[tokio::test]
    async fn default_resolution_returns_latest_content() {
        let engine = engine();
        let actor = Uuid::new_v4();
        let mut input = create_input(DocumentType::Terms, "Terms of Service");
        input.is_default = Some(true);
        let doc = engine.create(input, actor).await.unwrap();

        engine
            .update(
                doc.id,
                UpdateDocument {
                    content: Some(LocalizedText::new("نص ٢", "body v2")),
                    version: Some("2.0".to_string()),
                    ..UpdateDocument::default()
                },
                actor,
            )
            .await
            .unwrap();

        let view = engine.get_default_by_type(DocumentType::Terms).await.unwrap();
        assert_eq!(view.content.en, "body v2");
        assert_eq!(view.version, "2.0");

        let detail = engine.get_admin_detail(doc.id).await.unwrap();
        assert_eq!(detail.revisions.len(), 1);
        assert_eq!(detail.revisions[0].version, "1.0");
    }

    #[tokio::test]
    async fn public_projections_do_not_leak_internal_fields() {
        let engine = engine();
        let mut input = create_input(DocumentType::Terms, "Terms of Service");
        input.is_default = Some(true);
        input.seo = Some(Seo {
            keywords: vec!["terms".to_string()],
            ..Seo::default()
        });
        engine.create(input, Uuid::new_v4()).await.unwrap();

        let by_type = serde_json::to_value(
            engine.get_default_by_type(DocumentType::Terms).await.unwrap(),
        )
        .unwrap();
        let by_slug =
            serde_json::to_value(engine.get_by_slug("terms-of-service").await.unwrap()).unwrap();

        for view in [&by_type, &by_slug] {
            let obj = view.as_object().unwrap();
            assert!(!obj.contains_key("revisions"));
            assert!(!obj.contains_key("createdBy"));
            assert!(!obj.contains_key("updatedBy"));
            assert!(!obj.contains_key("id"));
        }
        // SEO rides only on the slug lookup.
        assert!(!by_type.as_object().unwrap().contains_key("seo"));
        assert!(by_slug.as_object().unwrap().contains_key("seo"));
    }

    #[tokio::test]
    async fn inactive_documents_are_hidden_from_public_reads_only() {
        let engine = engine();
        let mut input = create_input(DocumentType::Refund, "Refund Policy");
        input.is_active = Some(false);
        input.is_default = Some(true);
        let doc = engine.create(input, Uuid::new_v4()).await.unwrap();

        assert!(matches!(
            engine.get_default_by_type(DocumentType::Refund).await,
            Err(EngineError::NotFound)
        ));
        assert!(matches!(
            engine.get_by_slug("refund-policy").await,
            Err(EngineError::NotFound)
        ));
        // Administrators may still inspect it.
        assert!(engine.get_admin_detail(doc.id).await.is_ok());
    }

    #[tokio::test]
    async fn admin_detail_resolves_editor_identities() {
        let author = UserIdentity {
            id: Uuid::new_v4(),
            name: "Amal".to_string(),
            email: "amal@example.com".to_string(),
        };
        let engine = engine_with_users(vec![author.clone()]);

        let doc = engine
            .create(create_input(DocumentType::Terms, "Terms"), author.id)
            .await
            .unwrap();

        let detail = engine.get_admin_detail(doc.id).await.unwrap();
        assert_eq!(detail.created_by, Some(author));
        assert_eq!(detail.updated_by, None);
    }

    #[tokio::test]
    async fn supersede_overwrites_current_document_in_place() {
        let engine = engine();
        let actor = Uuid::new_v4();
        let mut input = create_input(DocumentType::Privacy, "Privacy Policy");
        input.is_default = Some(true);
        let doc = engine.create(input, actor).await.unwrap();

        let outcome = engine
            .supersede(
                DocumentType::Privacy,
                SupersedeDocument {
                    title: LocalizedText::new("سياسة الخصوصية", "Privacy Policy 2024"),
                    content: LocalizedText::new("نص جديد", "rewritten"),
                    version: "2024-01".to_string(),
                    change_description: Some("annual refresh".to_string()),
                },
                actor,
            )
            .await
            .unwrap();

        assert!(!outcome.created);
        let superseded = outcome.document;
        assert_eq!(superseded.id, doc.id);
        assert_eq!(superseded.slug, "privacy-policy-2024");
        assert_eq!(superseded.revisions.len(), 1);
        assert_eq!(superseded.revisions[0].version, "1.0");
        assert_eq!(superseded.version, "2024-01");
    }

    #[tokio::test]
    async fn supersede_creates_the_first_default_for_an_empty_type() {
        let engine = engine();
        let outcome = engine
            .supersede(
                DocumentType::Cookies,
                SupersedeDocument {
                    title: LocalizedText::new("الكوكيز", "Cookie Policy"),
                    content: LocalizedText::new("نص", "we use cookies"),
                    version: "1.0".to_string(),
                    change_description: None,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        assert!(outcome.created);
        let doc = outcome.document;
        assert!(doc.is_default);
        assert!(doc.is_active);
        assert!(doc.revisions.is_empty());
        assert!(engine.get_default_by_type(DocumentType::Cookies).await.is_ok());
    }

    #[tokio::test]
    async fn listing_filters_and_reports_pagination() {
        let engine = engine();
        let actor = Uuid::new_v4();
        engine
            .create(create_input(DocumentType::Terms, "Terms A"), actor)
            .await
            .unwrap();
        engine
            .create(create_input(DocumentType::Terms, "Terms B"), actor)
            .await
            .unwrap();
        engine
            .create(create_input(DocumentType::Privacy, "Privacy"), actor)
            .await
            .unwrap();

        let page = engine
            .list(ListParams {
                doc_type: Some(DocumentType::Terms),
                limit: 1,
                page: 2,
                ..ListParams::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total_docs, 2);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.current_page, 2);
        assert!(!page.pagination.has_next_page);
        assert!(page.pagination.has_prev_page);
        assert_eq!(page.documents.len(), 1);
    }
}

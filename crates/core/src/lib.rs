//! Versioned legal document engine.
//!
//! Stores terms-of-service, privacy, refund, cookie and similar
//! documents, keeps an append-only revision trail of every prior
//! wording, and guarantees at most one default document per type plus a
//! stable public slug per document.

pub mod document;
pub mod engine;
pub mod error;
pub mod events;
pub mod listing;
pub mod repo;
pub mod users;

pub use document::input::{CreateDocument, SupersedeDocument, UpdateDocument};
pub use document::model::{DocumentType, LegalDocument, LocalizedText, Revision, Seo};
pub use document::projection::{AdminDetail, DocumentSummary, PublicView};
pub use document::slug::derive_slug;
pub use engine::{DocumentEngine, SupersedeOutcome, UpdateOutcome};
pub use error::EngineError;
pub use listing::{DocumentPage, ListParams, PaginationMeta, SortField, SortOrder};
pub use repo::DocumentRepository;
pub use users::{UserDirectory, UserIdentity};

use crate::document::model::DocumentType;

/// Business-level error taxonomy for the versioned document engine.
///
/// Storage-layer uniqueness violations are translated into
/// `DuplicateDefault` / `DuplicateSlug` by the repository implementations
/// so callers never see driver-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("legal document not found")]
    NotFound,

    #[error("a default document already exists for type '{0}'")]
    DuplicateDefault(DocumentType),

    #[error("slug '{0}' is already in use by another document")]
    DuplicateSlug(String),

    #[error("title '{0}' produces an empty slug")]
    InvalidSlug(String),

    #[error("the default document for a type cannot be deleted")]
    DeleteBlocked,

    #[error("document was modified concurrently; retry the operation")]
    Conflict,

    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(err.into())
    }
}

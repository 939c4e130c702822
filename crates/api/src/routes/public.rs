//! Public read routes: no identity, projected fields only.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use legal_docs_core::{DocumentType, PublicView};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/legal-documents/type/{doc_type}", get(by_type))
        .route("/legal-documents/slug/{slug}", get(by_slug))
}

/// The default document for a type, for callers that know no slug.
async fn by_type(
    State(state): State<AppState>,
    Path(doc_type): Path<DocumentType>,
) -> ApiResult<Json<PublicView>> {
    let view = state.engine().get_default_by_type(doc_type).await?;
    Ok(Json(view))
}

async fn by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PublicView>> {
    let view = state.engine().get_by_slug(&slug).await?;
    Ok(Json(view))
}

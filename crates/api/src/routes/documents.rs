//! Administrative document routes. All of them require an actor token.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use legal_docs_core::events::types::{DocumentChanged, DocumentEvent};
use legal_docs_core::{
    AdminDetail, CreateDocument, DocumentPage, DocumentType, LegalDocument, ListParams,
    SortField, SortOrder, SupersedeDocument, UpdateDocument,
};

use crate::auth::Actor;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/legal-documents", get(list).post(create))
        .route(
            "/legal-documents/{id}",
            get(detail).patch(update).delete(remove),
        )
        .route("/legal-documents/type/{doc_type}/supersede", post(supersede))
}

/// Raw listing query parameters; parsed here so the engine only ever sees
/// the typed `ListParams`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    sort_by: Option<SortField>,
    sort_order: Option<SortOrder>,
    #[serde(rename = "type")]
    doc_type: Option<DocumentType>,
    is_active: Option<bool>,
    search: Option<String>,
}

impl From<ListQuery> for ListParams {
    fn from(query: ListQuery) -> Self {
        let defaults = ListParams::default();
        ListParams {
            page: query.page.unwrap_or(defaults.page).max(1),
            limit: query.limit.unwrap_or(defaults.limit).clamp(1, 100),
            sort_by: query.sort_by.unwrap_or(defaults.sort_by),
            sort_order: query.sort_order.unwrap_or(defaults.sort_order),
            doc_type: query.doc_type,
            is_active: query.is_active,
            search: query.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

async fn list(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<DocumentPage>> {
    let page = state.engine().list(query.into()).await?;
    Ok(Json(page))
}

async fn detail(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AdminDetail>> {
    let detail = state.engine().get_admin_detail(id).await?;
    Ok(Json(detail))
}

async fn create(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(input): Json<CreateDocument>,
) -> ApiResult<(StatusCode, Json<LegalDocument>)> {
    let doc = state.engine().create(input, actor).await?;
    state.event_bus().publish(DocumentEvent::Created(DocumentChanged::new(
        doc.id,
        doc.doc_type,
        false,
    )));
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDocument>,
) -> ApiResult<Json<LegalDocument>> {
    let outcome = state.engine().update(id, input, actor).await?;
    state.event_bus().publish(DocumentEvent::Updated(DocumentChanged::new(
        outcome.document.id,
        outcome.document.doc_type,
        outcome.revision_appended,
    )));
    Ok(Json(outcome.document))
}

async fn remove(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let doc = state.engine().delete(id).await?;
    state.event_bus().publish(DocumentEvent::Deleted(DocumentChanged::new(
        doc.id,
        doc.doc_type,
        false,
    )));
    Ok(StatusCode::NO_CONTENT)
}

async fn supersede(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(doc_type): Path<DocumentType>,
    Json(input): Json<SupersedeDocument>,
) -> ApiResult<Json<LegalDocument>> {
    let outcome = state.engine().supersede(doc_type, input, actor).await?;
    let change = DocumentChanged::new(
        outcome.document.id,
        outcome.document.doc_type,
        !outcome.created,
    );
    state.event_bus().publish(if outcome.created {
        DocumentEvent::Created(change)
    } else {
        DocumentEvent::Updated(change)
    });
    Ok(Json(outcome.document))
}

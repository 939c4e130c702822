//! Administrative listing: filters, sorting and pagination metadata.

use serde::{Deserialize, Serialize};

use crate::document::model::DocumentType;
use crate::document::projection::DocumentSummary;

/// Scalar fields the listing may sort by. Doubles as the SQL column
/// whitelist so user input is never interpolated into `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    EffectiveDate,
    PublishedDate,
    Version,
    Slug,
    Type,
    IsActive,
    IsDefault,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::EffectiveDate => "effective_date",
            SortField::PublishedDate => "published_date",
            SortField::Version => "version",
            SortField::Slug => "slug",
            SortField::Type => "doc_type",
            SortField::IsActive => "is_active",
            SortField::IsDefault => "is_default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Typed listing parameters, produced by the query-parameter parsing
/// collaborator at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct ListParams {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub doc_type: Option<DocumentType>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring match over title.ar, title.en and slug.
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
            doc_type: None,
            is_active: None,
            search: None,
        }
    }
}

impl ListParams {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total_docs: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    pub fn new(total_docs: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_docs.div_ceil(u64::from(limit))
        };
        Self {
            total_docs,
            total_pages,
            current_page: page,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

/// One page of the administrative listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    pub documents: Vec<DocumentSummary>,
    pub pagination: PaginationMeta,
}

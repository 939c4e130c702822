//! Version manager: decides when a content-changing update must snapshot
//! the prior wording into the revision log.

use crate::document::model::{LegalDocument, LocalizedText, Revision};

/// A change to either locale counts as a content change.
pub fn content_changed(existing: &LegalDocument, incoming: &LocalizedText) -> bool {
    existing.content.ar != incoming.ar || existing.content.en != incoming.en
}

/// Snapshot the document's current wording before it is overwritten. The
/// snapshot captures the pre-update version, content, published date and
/// editor; the caller appends it to `revisions` and then overwrites.
pub fn snapshot(existing: &LegalDocument, change_description: Option<String>) -> Revision {
    Revision {
        version: existing.version.clone(),
        content: existing.content.clone(),
        published_date: existing.published_date,
        updated_by: existing.last_editor(),
        change_description,
    }
}

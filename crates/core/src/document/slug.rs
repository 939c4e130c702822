//! Slug derivation from the English title.
//!
//! Pure and deterministic; runs as an explicit pipeline stage on create
//! and whenever `title.en` changes, never as a persistence hook.

use crate::error::EngineError;

/// Derive a URL-safe slug: lowercase, strip everything that is not a word
/// character, whitespace or hyphen, collapse separator runs into a single
/// hyphen, trim leading/trailing hyphens.
///
/// Fails with [`EngineError::InvalidSlug`] when the result is empty (e.g.
/// a title consisting only of punctuation), so an empty slug can never be
/// persisted.
pub fn derive_slug(title: &str) -> Result<String, EngineError> {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch == '-' || ch == '_' || ch.is_whitespace() {
            pending_separator = true;
        }
        // Any other character is stripped without acting as a separator.
    }

    if slug.is_empty() {
        return Err(EngineError::InvalidSlug(title.to_string()));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(derive_slug("Hello, World!").unwrap(), "hello-world");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(derive_slug("Refund   __ -- Policy").unwrap(), "refund-policy");
    }

    #[test]
    fn trims_leading_and_trailing_hyphens() {
        assert_eq!(derive_slug("  -Terms of Service-  ").unwrap(), "terms-of-service");
    }

    #[test]
    fn strips_punctuation_without_separating() {
        assert_eq!(derive_slug("Don't Panic").unwrap(), "dont-panic");
        assert_eq!(derive_slug("Refund Policy!!!").unwrap(), "refund-policy");
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let first = derive_slug("Cookie Policy (v2)").unwrap();
        assert_eq!(derive_slug(&first).unwrap(), first);
    }

    #[test]
    fn punctuation_only_title_is_rejected() {
        let err = derive_slug("   ***   ").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSlug(_)));
    }

    #[test]
    fn empty_title_is_rejected() {
        assert!(matches!(derive_slug(""), Err(EngineError::InvalidSlug(_))));
    }
}

//! Import reconciliation: matching an English document (and its optional
//! translated counterpart) to the canonical record and upserting it.
//!
//! Identity prefers the canonical URL, normalized so cosmetic differences
//! (tracking queries, fragments, trailing slashes, host case) cannot split
//! one article into two records. When no URL is known the composite
//! (date, source slug, author, title) key stands in. Lookup and write run
//! under the store's per-record transaction; re-running with identical
//! inputs updates in place and never duplicates.

use crate::error::Result;
use crate::models::{ArticleMetadata, ArticleRecord};
use crate::store::RecordStore;
use crate::utils::sanitize_component;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};
use url::Url;

/// Everything the reconciler needs about one extracted article.
#[derive(Debug, Clone)]
pub struct ReconcileInput {
    pub metadata: ArticleMetadata,
    pub source_name: String,
    pub source_slug: String,
    /// Reference to the persisted English body.
    pub body_ref: String,
    /// Reference to the persisted translated body, when one exists.
    pub body_ref_translated: Option<String>,
    /// Title of the translated variant, when one exists.
    pub title_translated: Option<String>,
}

/// Normalize a canonical URL for identity comparison: scheme and host are
/// already lowercased by the parser; query and fragment are stripped and the
/// trailing slash removed.
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.to_string().trim_end_matches('/').to_string()
}

/// Composite fallback key for articles without a usable URL.
pub fn composite_key(date: NaiveDate, slug: &str, author: &str, title: &str) -> String {
    format!(
        "{}|{}|{}|{}",
        date.format("%Y-%m-%d"),
        slug,
        sanitize_component(author),
        sanitize_component(title),
    )
}

/// Identity key for a document: normalized canonical URL when known, else
/// the composite key.
pub fn identity_key(
    url: Option<&Url>,
    date: NaiveDate,
    slug: &str,
    author: &str,
    title: &str,
) -> String {
    match url {
        Some(url) => normalize_url(url),
        None => composite_key(date, slug, author, title),
    }
}

/// Look up the record by identity key, then update in place or insert.
#[instrument(level = "info", skip_all, fields(url = %input.metadata.url))]
pub async fn reconcile<S: RecordStore>(store: &S, input: ReconcileInput) -> Result<ArticleRecord> {
    let meta = &input.metadata;
    let key = identity_key(
        Some(&meta.url),
        meta.date,
        &input.source_slug,
        &meta.author,
        &meta.title,
    );
    let now = Utc::now();

    let record = match store.find_by_key(&key).await? {
        Some(mut existing) => {
            debug!(%key, "Updating existing record");
            existing.title = meta.title.clone();
            existing.title_translated = input.title_translated.or(existing.title_translated);
            existing.date = meta.date;
            existing.category = meta.category.clone();
            existing.author = meta.author.clone();
            existing.body_ref = input.body_ref;
            existing.body_ref_translated =
                input.body_ref_translated.or(existing.body_ref_translated);
            existing.updated_at = now;
            if existing.url.is_none() {
                existing.url = Some(meta.url.to_string());
            }
            existing
        }
        None => {
            debug!(%key, "Creating new record");
            ArticleRecord {
                key: key.clone(),
                title: meta.title.clone(),
                title_translated: input.title_translated,
                date: meta.date,
                category: meta.category.clone(),
                author: meta.author.clone(),
                source: input.source_name,
                url: Some(meta.url.to_string()),
                body_ref: input.body_ref,
                body_ref_translated: input.body_ref_translated,
                created_at: now,
                updated_at: now,
            }
        }
    };

    let stored = store.upsert(record).await?;
    info!(key = %stored.key, "Reconciled article record");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(title: &str) -> ReconcileInput {
        ReconcileInput {
            metadata: ArticleMetadata {
                title: title.to_string(),
                author: "Jane Doe".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                category: "culture".to_string(),
                url: Url::parse("https://www.newyorker.com/culture/essay").unwrap(),
            },
            source_name: "The New Yorker".to_string(),
            source_slug: "newyorker".to_string(),
            body_ref: "en/2025-06-30_newyorker_culture_Jane_Doe_Essay.html".to_string(),
            body_ref_translated: None,
            title_translated: None,
        }
    }

    #[test]
    fn test_normalize_url_strips_noise() {
        let url = Url::parse("HTTPS://WWW.NewYorker.com/culture/essay/?utm_source=x#section").unwrap();
        assert_eq!(normalize_url(&url), "https://www.newyorker.com/culture/essay");
    }

    #[test]
    fn test_composite_key_sanitized() {
        let key = composite_key(
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            "newyorker",
            "Jane  Doe",
            "What Is Noise?",
        );
        assert_eq!(key, "2025-06-30|newyorker|Jane_Doe|What_Is_Noise");
    }

    #[test]
    fn test_identity_key_prefers_url() {
        let url = Url::parse("https://aeon.co/essays/why?ref=rss").unwrap();
        let key = identity_key(
            Some(&url),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            "aeon",
            "A",
            "B",
        );
        assert_eq!(key, "https://aeon.co/essays/why");
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let store = MemoryStore::new();
        let first = reconcile(&store, input("An Essay")).await.unwrap();
        let second = reconcile(&store, input("An Essay")).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(first.key, second.key);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_reconcile_updates_instead_of_duplicating() {
        let store = MemoryStore::new();
        reconcile(&store, input("Original Title")).await.unwrap();
        let updated = reconcile(&store, input("Corrected Title")).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(updated.title, "Corrected Title");
    }

    #[tokio::test]
    async fn test_translation_arriving_later_is_kept() {
        let store = MemoryStore::new();
        reconcile(&store, input("An Essay")).await.unwrap();

        let mut with_translation = input("An Essay");
        with_translation.title_translated = Some("一篇随笔".to_string());
        with_translation.body_ref_translated =
            Some("zh/2025-06-30_newyorker_culture_Jane_Doe_Essay.html".to_string());
        reconcile(&store, with_translation).await.unwrap();

        // A later English-only run must not erase the translation.
        let record = reconcile(&store, input("An Essay")).await.unwrap();
        assert_eq!(record.title_translated.as_deref(), Some("一篇随笔"));
        assert!(record.body_ref_translated.is_some());
    }

    #[tokio::test]
    async fn test_query_variants_resolve_to_one_record() {
        let store = MemoryStore::new();
        let mut a = input("An Essay");
        a.metadata.url = Url::parse("https://www.newyorker.com/culture/essay?utm=1").unwrap();
        let mut b = input("An Essay");
        b.metadata.url = Url::parse("https://www.newyorker.com/culture/essay#top").unwrap();
        reconcile(&store, a).await.unwrap();
        reconcile(&store, b).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}

//! Data models for fetched documents, extracted metadata, and persisted
//! article records.
//!
//! The pipeline distinguishes three lifetimes:
//! - [`ExtractedDocument`] and [`DiscoveryCandidate`] are ephemeral, owned by
//!   a single pipeline invocation and discarded afterwards.
//! - [`ArticleMetadata`] and [`ExtractionOutcome`] are the intermediate
//!   results of the extraction stage.
//! - [`ArticleRecord`] is the canonical persisted entity, upserted (never
//!   duplicated, never deleted) by the reconciler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A raw fetched document, alive for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// The originating URL.
    pub url: Url,
    /// The literal HTTP response body. Extraction never looks beyond it.
    pub html: String,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Normalized article metadata.
///
/// Invariant: no field is ever empty. Each degrades to a documented default
/// (`"untitled"`, `"unknown"`, the extraction date, the source display name)
/// rather than being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    pub category: String,
    pub url: Url,
}

/// Outcome of body extraction and access-block classification.
///
/// Only `Success` may ever be persisted as article body content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// A body that passed the sufficiency test, with the extracted text
    /// length kept as evidence.
    Success { body_html: String, text_len: usize },
    /// Access-restriction markers were detected and no sufficient public
    /// body surfaced.
    Blocked,
    /// Extraction ran on an open page but produced too little trustworthy
    /// text.
    Insufficient,
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }
}

/// Which probed date an adapter uses for day matching during discovery.
///
/// Sources are inconsistent about whether the listed date is the publish or
/// the last-modified date, so the preference is explicit per adapter rather
/// than a hidden default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreference {
    /// Use the modified date when present, else the publish date.
    PreferModified,
    /// Use the publish date when present, else the modified date.
    PreferPublished,
}

/// A candidate article URL seen during date-range discovery, paired with its
/// probed dates. Internal to the discoverer.
#[derive(Debug, Clone)]
pub struct DiscoveryCandidate {
    pub url: Url,
    pub published: Option<NaiveDate>,
    pub modified: Option<NaiveDate>,
}

impl DiscoveryCandidate {
    /// The date used for match and early-stop decisions, per the adapter's
    /// preference. `None` means the candidate's age is unknown and it must
    /// not count toward the early-stop decision.
    pub fn preferred_date(&self, pref: DatePreference) -> Option<NaiveDate> {
        match pref {
            DatePreference::PreferModified => self.modified.or(self.published),
            DatePreference::PreferPublished => self.published.or(self.modified),
        }
    }

    /// True when either probed date equals the target day.
    pub fn matches(&self, target: NaiveDate) -> bool {
        self.published == Some(target) || self.modified == Some(target)
    }
}

/// The persisted, canonical article entity.
///
/// At most one record exists per canonical URL; when the URL is unknown, at
/// most one per (date, source slug, sanitized author/title) composite key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Identity key: the normalized canonical URL, or the composite fallback.
    pub key: String,
    pub title: String,
    /// Title of the translated variant, when one exists.
    pub title_translated: Option<String>,
    pub date: NaiveDate,
    pub category: String,
    pub author: String,
    /// Human-readable source name, e.g. "The New Yorker".
    pub source: String,
    /// Canonical URL, when known.
    pub url: Option<String>,
    /// Reference to the English body document (relative path or blob key).
    pub body_ref: String,
    /// Reference to the translated body document, when one exists.
    pub body_ref_translated: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

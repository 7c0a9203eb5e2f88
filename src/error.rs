//! Error taxonomy for the ingestion pipeline.
//!
//! Every per-URL failure mode is a distinct variant so batch callers can
//! report outcomes individually without aborting the run. `Blocked` and
//! `Insufficient` are expected classifier outcomes, not bugs: they mean the
//! page refused to yield trustworthy public body text and was skipped.

use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network failure, timeout, non-2xx status, or an empty response body.
    /// Recoverable by external retry scheduling; never retried internally.
    #[error("fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// No registered adapter claims this URL. Fatal for the URL.
    #[error("no source adapter registered for {url}")]
    NoAdapter { url: String },

    /// Access-restriction markers detected and no sufficient public body
    /// text could be confirmed. Fatal for the URL, by design.
    #[error("access-restricted content at {url}; no public body available")]
    Blocked { url: String },

    /// Extraction ran but produced less text than the sufficiency thresholds
    /// allow. Treated identically to `Blocked` by callers.
    #[error("extracted body below sufficiency thresholds for {url}")]
    Insufficient { url: String },

    /// The translation capability failed. Non-fatal: the English-side record
    /// is still persisted.
    #[error("translation failed: {0}")]
    TranslationFailed(String),

    /// The resolved adapter exposes neither a feed nor a paginated listing.
    #[error("source {source_slug} does not support date-based discovery")]
    DiscoveryUnsupported { source_slug: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for the per-URL outcomes that batch runs log and skip rather
    /// than surface as run failures.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            PipelineError::FetchFailed { .. }
                | PipelineError::NoAdapter { .. }
                | PipelineError::Blocked { .. }
                | PipelineError::Insufficient { .. }
        )
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

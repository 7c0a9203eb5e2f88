//! # Mirror Press
//!
//! An ingestion pipeline for long-form web articles. Given an article URL or
//! a publication date, it fetches pages politely, extracts trustworthy body
//! text through a tiered strategy, classifies access-restricted pages,
//! persists body documents in a shared bilingual layout, and reconciles
//! everything into a deduplicated record store.
//!
//! ## Architecture
//!
//! 1. **Resolution**: a [`scrapers::Registry`] maps each URL to the one
//!    source adapter that claims it
//! 2. **Fetching**: [`fetcher::Fetcher`] downloads pages with a politeness
//!    delay and a browser user agent
//! 3. **Extraction**: [`metadata`] runs priority chains for title, author,
//!    date, and category; [`body`] runs primary selectors plus structured-data
//!    and script-state fallbacks, and classifies blocked or thin pages
//! 4. **Discovery**: [`discover`] turns a date into the set of article URLs a
//!    source published that day, via feed or listing pagination
//! 5. **Reconciliation**: [`reconcile`] matches documents to canonical
//!    records by normalized URL and upserts without duplicating

pub mod body;
pub mod cli;
pub mod discover;
pub mod error;
pub mod fetcher;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod scrapers;
pub mod store;
pub mod translate;
pub mod utils;

pub use error::{PipelineError, Result};
pub use models::{ArticleMetadata, ArticleRecord, ExtractedDocument, ExtractionOutcome};
pub use pipeline::Pipeline;

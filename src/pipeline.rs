//! End-to-end orchestration: URL in, reconciled record out.
//!
//! A single-article run resolves the source adapter, fetches the page,
//! extracts metadata and body, persists the body artifact, optionally
//! produces the translated variant, and reconciles the record. A batch run
//! discovers every URL a source published on a target date and feeds each
//! one through the single-article path, logging and skipping per-URL
//! failures instead of aborting.

use crate::body;
use crate::discover::{DiscoveryConfig, discover};
use crate::error::{PipelineError, Result};
use crate::fetcher::Fetcher;
use crate::metadata;
use crate::models::ExtractionOutcome;
use crate::reconcile::{ReconcileInput, reconcile};
use crate::scrapers::Registry;
use crate::store::{FsDocumentStore, Language, RecordStore};
use crate::translate::Translate;
use crate::utils::{body_filename, truncate_for_log};
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Aggregate result of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub records: Vec<crate::models::ArticleRecord>,
    pub skipped: Vec<(Url, PipelineError)>,
}

pub struct Pipeline<S, T> {
    fetcher: Fetcher,
    registry: Registry,
    store: S,
    documents: FsDocumentStore,
    translator: Option<T>,
    discovery: DiscoveryConfig,
}

impl<S: RecordStore, T: Translate> Pipeline<S, T> {
    pub fn new(fetcher: Fetcher, registry: Registry, store: S, documents: FsDocumentStore) -> Self {
        Self {
            fetcher,
            registry,
            store,
            documents,
            translator: None,
            discovery: DiscoveryConfig::default(),
        }
    }

    pub fn with_translator(mut self, translator: T) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_discovery(mut self, config: DiscoveryConfig) -> Self {
        self.discovery = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest one article URL.
    #[instrument(level = "info", skip(self), fields(%url))]
    pub async fn run_single(&self, url: &Url) -> Result<crate::models::ArticleRecord> {
        let adapter = self
            .registry
            .resolve(url)
            .ok_or_else(|| PipelineError::NoAdapter {
                url: url.to_string(),
            })?;
        info!(source = adapter.source_slug(), "Resolved source adapter");

        let doc = self.fetcher.fetch(url).await?;
        let meta = metadata::extract(&doc, adapter);
        info!(
            title = %truncate_for_log(&meta.title, 80),
            author = %meta.author,
            date = %meta.date,
            category = %meta.category,
            "Extracted metadata"
        );

        let body_html = match body::extract(&doc, adapter) {
            ExtractionOutcome::Success { body_html, text_len } => {
                info!(text_len, "Extracted article body");
                body_html
            }
            ExtractionOutcome::Blocked => {
                return Err(PipelineError::Blocked {
                    url: url.to_string(),
                });
            }
            ExtractionOutcome::Insufficient => {
                return Err(PipelineError::Insufficient {
                    url: url.to_string(),
                });
            }
        };

        let filename = body_filename(
            meta.date,
            adapter.source_slug(),
            &meta.category,
            &meta.author,
            &meta.title,
        );
        let body_ref = self
            .documents
            .write_body(Language::English, &filename, &body_html)
            .await?;

        let (body_ref_translated, title_translated) =
            self.translate_variant(&meta.title, &body_html, &filename).await;

        let input = ReconcileInput {
            metadata: meta,
            source_name: adapter.source_name().to_string(),
            source_slug: adapter.source_slug().to_string(),
            body_ref,
            body_ref_translated,
            title_translated,
        };
        reconcile(&self.store, input).await
    }

    /// Produce and persist the translated body, when a translator is
    /// configured. Failures are logged and swallowed: translation is never
    /// allowed to sink an article whose English side already succeeded.
    async fn translate_variant(
        &self,
        title: &str,
        body_html: &str,
        filename: &str,
    ) -> (Option<String>, Option<String>) {
        let Some(translator) = &self.translator else {
            debug!("No translator configured; skipping translated variant");
            return (None, None);
        };

        let translated_body = match translator.translate_body(body_html).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Body translation failed; keeping English-only record");
                return (None, None);
            }
        };

        // The translated document's own heading is the most faithful title;
        // fall back to translating the English title directly.
        let title_translated = match metadata::translated_title(&translated_body) {
            Some(heading) => Some(heading),
            None => match translator.translate_title(title).await {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!(error = %e, "Title translation failed; storing body without one");
                    None
                }
            },
        };

        match self
            .documents
            .write_body(Language::Translated, filename, &translated_body)
            .await
        {
            Ok(reference) => (Some(reference), title_translated),
            Err(e) => {
                warn!(error = %e, "Failed to persist translated body");
                (None, None)
            }
        }
    }

    /// Ingest everything the registered sources published on `target`.
    ///
    /// Sources without a feed or listing are skipped; per-URL classifier and
    /// fetch outcomes are collected, not fatal. Store-level failures abort.
    #[instrument(level = "info", skip(self), fields(%target))]
    pub async fn run_batch(&self, target: NaiveDate) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for adapter in self.registry.adapters() {
            let urls = match discover(&self.fetcher, adapter, target, &self.discovery).await {
                Ok(urls) => urls,
                Err(PipelineError::DiscoveryUnsupported { source_slug }) => {
                    debug!(source = source_slug, "Source has no discovery strategy; skipping");
                    continue;
                }
                Err(e) => {
                    warn!(source = adapter.source_slug(), error = %e, "Discovery failed; skipping source");
                    continue;
                }
            };
            info!(
                source = adapter.source_slug(),
                count = urls.len(),
                "Discovery finished"
            );

            for url in urls {
                match self.run_single(&url).await {
                    Ok(record) => summary.records.push(record),
                    Err(e) if e.is_skippable() => {
                        warn!(%url, error = %e, "Skipping article");
                        summary.skipped.push((url, e));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(
            ingested = summary.records.len(),
            skipped = summary.skipped.len(),
            "Batch run complete"
        );
        Ok(summary)
    }
}

//! Date-range discovery: turning a calendar date into the complete set of
//! article URLs a source published that day.
//!
//! Two strategies, in preference order:
//! 1. A chronological feed, when the adapter exposes one: a single fetch,
//!    filtered on entry publish dates.
//! 2. Reverse-chronological listing pagination: each page's candidate URLs
//!    are probed concurrently for publish/modified dates, and pagination
//!    halts early once every candidate on a page has a known date and all of
//!    them are strictly older than the target. A candidate whose date cannot
//!    be resolved is excluded from both the match set and the early-stop
//!    decision; unknown never means older.

use crate::error::{PipelineError, Result};
use crate::fetcher::Fetcher;
use crate::metadata::probe_dates;
use crate::models::DiscoveryCandidate;
use crate::scrapers::SourceAdapter;
use chrono::{DateTime, NaiveDate};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Tuning knobs for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Hard cap on listing pages scanned.
    pub max_pages: u32,
    /// Width of the per-article date-probe pool.
    pub concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            concurrency: 8,
        }
    }
}

/// Discover every article URL the source published on `target`.
#[instrument(level = "info", skip(fetcher, adapter), fields(source = adapter.source_slug(), %target))]
pub async fn discover(
    fetcher: &Fetcher,
    adapter: &dyn SourceAdapter,
    target: NaiveDate,
    config: &DiscoveryConfig,
) -> Result<Vec<Url>> {
    if let Some(feed_url) = adapter.feed_url() {
        return discover_from_feed(fetcher, adapter, feed_url, target).await;
    }
    if adapter.listing_page_url(1).is_some() {
        return discover_from_listing(fetcher, adapter, target, config).await;
    }
    Err(PipelineError::DiscoveryUnsupported {
        source_slug: adapter.source_slug().to_string(),
    })
}

async fn discover_from_feed(
    fetcher: &Fetcher,
    adapter: &dyn SourceAdapter,
    feed_url: &str,
    target: NaiveDate,
) -> Result<Vec<Url>> {
    let url = Url::parse(feed_url)?;
    let doc = fetcher.fetch(&url).await?;
    let entries = parse_feed(&doc.html);
    info!(entries = entries.len(), "Parsed feed entries");

    let mut matches = Vec::new();
    for (link, date) in entries {
        let Ok(resolved) = Url::parse(&link) else {
            continue;
        };
        if date == Some(target) && adapter.handles(&resolved) {
            matches.push(resolved);
        }
    }
    // Feeds repeat entries (per-topic and site-wide channels); duplicates
    // are not guaranteed adjacent.
    let matches: Vec<Url> = matches.into_iter().unique_by(|u| u.to_string()).collect();
    info!(count = matches.len(), "Feed discovery complete");
    Ok(matches)
}

async fn discover_from_listing(
    fetcher: &Fetcher,
    adapter: &dyn SourceAdapter,
    target: NaiveDate,
    config: &DiscoveryConfig,
) -> Result<Vec<Url>> {
    let pref = adapter.date_preference();
    // Dates survive across pages so duplicate URLs are probed once and still
    // participate in later early-stop decisions.
    let mut probed: HashMap<String, DiscoveryCandidate> = HashMap::new();
    let mut matches: Vec<Url> = Vec::new();

    for page in 1..=config.max_pages {
        let Some(page_url) = adapter.listing_page_url(page) else {
            break;
        };
        let page_url = Url::parse(&page_url)?;
        let doc = match fetcher.fetch(&page_url).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(page, error = %e, "Listing page fetch failed; stopping pagination");
                break;
            }
        };

        let candidates = adapter.listing_urls(&doc.html, &page_url);
        if candidates.is_empty() {
            debug!(page, "No candidates on listing page; stopping");
            break;
        }
        debug!(page, count = candidates.len(), "Probing listing candidates");

        let unseen: Vec<Url> = candidates
            .iter()
            .filter(|u| !probed.contains_key(u.as_str()))
            .cloned()
            .collect();
        // The probe pool completes out of order; the early-stop decision is
        // only evaluated after the whole page has been collected.
        let fresh: Vec<DiscoveryCandidate> = stream::iter(unseen)
            .map(|url| {
                let fetcher = fetcher.clone();
                async move { probe_candidate(&fetcher, url).await }
            })
            .buffer_unordered(config.concurrency)
            .collect()
            .await;
        for candidate in fresh {
            if candidate.matches(target) {
                matches.push(candidate.url.clone());
            }
            probed.insert(candidate.url.to_string(), candidate);
        }

        let page_candidates: Vec<&DiscoveryCandidate> = candidates
            .iter()
            .filter_map(|u| probed.get(u.as_str()))
            .collect();
        let known: Vec<NaiveDate> = page_candidates
            .iter()
            .filter_map(|c| c.preferred_date(pref))
            .collect();
        if known.len() == page_candidates.len()
            && !known.is_empty()
            && known.iter().all(|d| *d < target)
        {
            info!(page, "All candidates on page predate target; stopping early");
            break;
        }
    }

    let matches: Vec<Url> = matches.into_iter().unique_by(|u| u.to_string()).collect();
    info!(count = matches.len(), "Listing discovery complete");
    Ok(matches)
}

/// Fetch one candidate and read its dates. A failed or stalled probe yields
/// unknown dates rather than stalling the pool.
async fn probe_candidate(fetcher: &Fetcher, url: Url) -> DiscoveryCandidate {
    match fetcher.fetch(&url).await {
        Ok(doc) => {
            let (published, modified) = probe_dates(&doc.html);
            debug!(%url, ?published, ?modified, "Probed candidate dates");
            DiscoveryCandidate {
                url,
                published,
                modified,
            }
        }
        Err(e) => {
            warn!(%url, error = %e, "Candidate probe failed; treating date as unknown");
            DiscoveryCandidate {
                url,
                published: None,
                modified: None,
            }
        }
    }
}

/// Parse an RSS feed into `(link, publish date)` entries.
pub(crate) fn parse_feed(xml: &str) -> Vec<(String, Option<NaiveDate>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    #[derive(PartialEq)]
    enum Field {
        None,
        Link,
        PubDate,
    }

    let mut entries = Vec::new();
    let mut in_item = false;
    let mut field = Field::None;
    let mut link = String::new();
    let mut pub_date: Option<NaiveDate> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    link.clear();
                    pub_date = None;
                }
                b"link" if in_item => field = Field::Link,
                b"pubDate" if in_item => field = Field::PubDate,
                _ => field = Field::None,
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    in_item = false;
                    if !link.is_empty() {
                        entries.push((link.clone(), pub_date));
                    }
                }
                field = Field::None;
            }
            Ok(Event::Text(t)) => {
                let text = t.decode().unwrap_or_default().trim().to_string();
                match field {
                    Field::Link => link = text,
                    Field::PubDate => {
                        pub_date = DateTime::parse_from_rfc2822(&text).ok().map(|d| d.date_naive());
                    }
                    Field::None => {}
                }
            }
            Ok(Event::CData(t)) => {
                if field == Field::Link {
                    link = String::from_utf8_lossy(&t.into_inner()).trim().to_string();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "Feed parse error; keeping entries seen so far");
                break;
            }
            _ => {}
        }
    }
    entries
}

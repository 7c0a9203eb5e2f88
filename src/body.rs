//! Body extraction and access-block classification.
//!
//! The state machine: `Unchecked → {Blocked, Open}`; `Open → {Sufficient,
//! Insufficient}`. Block detection and extraction are deliberately
//! decoupled: some sites embed the full body in structured data on a page
//! that also shows a subscription banner, and that public text must not be
//! discarded just because the banner is present. The inverse also holds —
//! every tier reads only the single fetched response; nothing here issues a
//! second, privileged request.
//!
//! Extraction tiers, short-circuiting on the first sufficient candidate:
//! 1. site-specific structural selectors, most specific first
//! 2. JSON-LD `articleBody` (direct or inside an `@graph`)
//! 3. in-page initial-state script payloads, searched recursively
//! 4. largest-text container heuristic, strictly last resort

use crate::metadata::json_ld_nodes;
use crate::models::{ExtractedDocument, ExtractionOutcome};
use crate::scrapers::SourceAdapter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument};

/// Case-insensitive phrases whose presence marks an access-restricted page.
const RESTRICTION_PHRASES: &[&str] = &[
    "subscribe",
    "sign in",
    "log in",
    "register",
    "verify access",
    "paywall",
    "continue reading",
    "unlock",
    "trial",
    "captcha",
];

static RESTRICTION_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)paywall|overlay|modal|gateway|regwall").unwrap());
static STATE_PAYLOADS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.+?\});").unwrap(),
        Regex::new(r"(?s)window\.__PRELOADED_STATE__\s*=\s*(\{.+?\});").unwrap(),
    ]
});
static INLINE_ARTICLE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""articleBody"\s*:\s*"((?:[^"\\]|\\.)+)""#).unwrap());

const MIN_BODY_CHARS: usize = 200;
const MIN_PARAGRAPH_CHARS: usize = 30;
const MIN_LONG_PARAGRAPHS: usize = 3;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Classify a document and extract its body.
#[instrument(level = "debug", skip_all, fields(url = %doc.url))]
pub fn extract(doc: &ExtractedDocument, adapter: &dyn SourceAdapter) -> ExtractionOutcome {
    let document = Html::parse_document(&doc.html);
    let blocked = detect_restriction(&document);

    // Primary tier: site-specific selectors, evaluated regardless of the
    // block state.
    let mut primary_matched = false;
    for css in adapter.body_selectors() {
        let Ok(sel) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = document.select(&sel).next() {
            primary_matched = true;
            if let Some(text_len) = sufficient_element(element) {
                debug!(selector = css, text_len, "Primary extraction succeeded");
                return ExtractionOutcome::Success {
                    body_html: element.html(),
                    text_len,
                };
            }
        }
    }

    // Fallback tiers run when no selector matched at all, or when the page
    // is blocked and the primary candidate failed the sufficiency test.
    if !primary_matched || blocked {
        if let Some(outcome) = structured_data_body(&document)
            .or_else(|| script_state_body(&doc.html))
            .or_else(|| largest_text_body(&document))
        {
            return outcome;
        }
    }

    if blocked {
        debug!("No sufficient public body on restricted page");
        ExtractionOutcome::Blocked
    } else {
        debug!("Open page but extracted text below thresholds");
        ExtractionOutcome::Insufficient
    }
}

/// Scan rendered text and structural markers for access-restriction signals.
pub fn detect_restriction(document: &Html) -> bool {
    let text = document.root_element().text().collect::<String>().to_lowercase();
    if RESTRICTION_PHRASES.iter().any(|p| text.contains(p)) {
        return true;
    }
    document.select(&selector("[class], [id]")).any(|el| {
        let v = el.value();
        v.attr("class").is_some_and(|c| RESTRICTION_MARKERS.is_match(c))
            || v.attr("id").is_some_and(|i| RESTRICTION_MARKERS.is_match(i))
    })
}

/// Sufficiency test on an element: total text length and, when
/// paragraph-like children exist, enough individually substantial ones.
/// Returns the text length as evidence when the element passes.
fn sufficient_element(element: ElementRef) -> Option<usize> {
    let text: String = element.text().collect();
    let text_len = text.trim().chars().count();
    if text_len < MIN_BODY_CHARS {
        return None;
    }
    let paragraphs: Vec<_> = element.select(&selector("p")).collect();
    if !paragraphs.is_empty() {
        let long = paragraphs
            .iter()
            .filter(|p| p.text().collect::<String>().trim().chars().count() > MIN_PARAGRAPH_CHARS)
            .count();
        if long < MIN_LONG_PARAGRAPHS {
            return None;
        }
    }
    Some(text_len)
}

/// Tier 2a: JSON-LD `articleBody`, accepted only because it is literally
/// present in the fetched response.
fn structured_data_body(document: &Html) -> Option<ExtractionOutcome> {
    let nodes = json_ld_nodes(document);
    let body = nodes
        .iter()
        .find_map(|n| n.get("articleBody").and_then(|b| b.as_str()))?;
    wrap_text_body(body, "structured data")
}

/// Tier 2b: initial-state script payloads, searched recursively for an
/// `articleBody` field.
fn script_state_body(html: &str) -> Option<ExtractionOutcome> {
    for pattern in STATE_PAYLOADS.iter() {
        for captures in pattern.captures_iter(html) {
            let Ok(data) = serde_json::from_str::<Value>(&captures[1]) else {
                continue;
            };
            if let Some(body) = find_article_body(&data, 0) {
                if let Some(outcome) = wrap_text_body(&body, "script state") {
                    return Some(outcome);
                }
            }
        }
    }
    // Bare "articleBody" string assignments outside a parseable object.
    for captures in INLINE_ARTICLE_BODY.captures_iter(html) {
        let quoted = format!("\"{}\"", &captures[1]);
        let Ok(body) = serde_json::from_str::<String>(&quoted) else {
            continue;
        };
        if let Some(outcome) = wrap_text_body(&body, "inline script") {
            return Some(outcome);
        }
    }
    None
}

/// Tier 2c: the generic content container with the most text. Exists purely
/// as a last resort; still subject to the sufficiency test. Containers whose
/// class/id carry restriction markers are excluded so paywall boilerplate is
/// never promoted to body content.
fn largest_text_body(document: &Html) -> Option<ExtractionOutcome> {
    let candidates = selector("article, section, div, main");
    let largest = document
        .select(&candidates)
        .filter(|el| {
            let v = el.value();
            !v.attr("class").is_some_and(|c| RESTRICTION_MARKERS.is_match(c))
                && !v.attr("id").is_some_and(|i| RESTRICTION_MARKERS.is_match(i))
        })
        .max_by_key(|el| el.text().collect::<String>().trim().chars().count())?;
    let text_len = sufficient_element(largest)?;
    debug!(text_len, "Largest-text heuristic produced a body");
    Some(ExtractionOutcome::Success {
        body_html: largest.html(),
        text_len,
    })
}

fn wrap_text_body(text: &str, tier: &str) -> Option<ExtractionOutcome> {
    let text_len = text.trim().chars().count();
    if text_len < MIN_BODY_CHARS {
        return None;
    }
    debug!(tier, text_len, "Fallback extraction succeeded");
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    Some(ExtractionOutcome::Success {
        body_html: format!(r#"<div class="extracted-body">{escaped}</div>"#),
        text_len,
    })
}

fn find_article_body(data: &Value, depth: usize) -> Option<String> {
    if depth > 10 {
        return None;
    }
    if let Some(body) = data.get("articleBody").and_then(|b| b.as_str()) {
        if body.trim().chars().count() >= MIN_BODY_CHARS {
            return Some(body.to_string());
        }
    }
    match data {
        Value::Object(map) => map.values().find_map(|v| find_article_body(v, depth + 1)),
        Value::Array(items) => items.iter().find_map(|v| find_article_body(v, depth + 1)),
        _ => None,
    }
}

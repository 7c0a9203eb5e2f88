//! String sanitization and naming helpers.
//!
//! The persisted naming contract lives here: body artifacts are keyed by
//! `{date}_{source-slug}_{category}_{author}_{title}` with each field
//! sanitized to a filesystem-safe token. English and translated variants
//! share this key and differ only by storage directory, never by filename.
//! Downstream import/matching relies on the key being bit-exact.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static INVALID_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static SQUEEZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").unwrap());

/// Sanitize a metadata field for use as a filename component.
///
/// Replaces characters that are invalid on common filesystems with
/// underscores, collapses whitespace/underscore runs, trims leading and
/// trailing underscores, and caps the component at 100 characters.
///
/// # Examples
///
/// ```
/// use mirror_press::utils::sanitize_component;
/// assert_eq!(sanitize_component("What Is Noise?"), "What_Is_Noise");
/// assert_eq!(sanitize_component("a/b\\c"), "a_b_c");
/// ```
pub fn sanitize_component(text: &str) -> String {
    let replaced = INVALID_CHARS.replace_all(text, "_");
    let squeezed = SQUEEZE.replace_all(&replaced, "_");
    let trimmed = squeezed.trim_matches('_');
    trimmed.chars().take(100).collect()
}

/// Build the shared body-artifact filename for an article.
///
/// Format: `{date}_{source-slug}_{category}_{author}_{title}.html`. The slug
/// is assumed machine-safe already; the remaining fields are sanitized.
pub fn body_filename(
    date: NaiveDate,
    source_slug: &str,
    category: &str,
    author: &str,
    title: &str,
) -> String {
    format!(
        "{}_{}_{}_{}_{}.html",
        date.format("%Y-%m-%d"),
        source_slug,
        sanitize_component(category),
        sanitize_component(author),
        sanitize_component(title),
    )
}

/// Turn a byline profile-URL slug into a display name.
///
/// Some sources only expose the author through a profile link such as
/// `/contributors/jane-doe`; the slug is humanized into "Jane Doe".
pub fn humanize_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(upcase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to roughly `max` bytes with the remainder noted, so
/// debug logs never carry whole HTML documents.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map(|(i, ch)| i + ch.len_utf8())
            .unwrap_or(0);
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

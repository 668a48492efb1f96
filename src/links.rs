//! Hyperlink extraction from raw message content

use std::collections::HashSet;

use regex::Regex;
use tracing::trace;

// Regex patterns
static HREF_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']*https?://[^"']+)["']"#).unwrap()
});

static URL_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"(?i)https?://[-\w.]+(?::[0-9]+)?(?:/[-\w/.~%+]*)?(?:\?[-\w&=%.~+]*)?(?:#[-\w.]*)?",
    )
    .unwrap()
});

// A URL run continuing directly at the start of one or more following lines
static WRAPPED_URL_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"']+(?:\r?\n[^\s<>"']+)+"#).unwrap()
});

/// Sentence punctuation that ends a wrapped run but not the URL
const TRAILING_PUNCTUATION: [char; 8] = ['.', ',', ';', ':', '!', '?', ')', ']'];

/// Ordered set of links: first occurrence wins, later duplicates are dropped
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl LinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link, returning `false` if it was already present
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        let link = link.into();
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.ordered.push(link);
        true
    }

    #[must_use]
    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Links in first-seen order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

impl<S: Into<String>> Extend<S> for LinkSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for link in iter {
            self.insert(link);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LinkSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Extract every http(s) link from markup-bearing content
///
/// Runs the href, bare-URL and wrapped-URL passes in that order and
/// deduplicates the combined result, keeping first-seen order. A bare URL
/// that is the first line of a wrapped one is reported in its rejoined form.
#[must_use]
pub fn extract_links(content: &str) -> Vec<String> {
    let wrapped = wrapped_matches(content);

    let mut links = LinkSet::new();
    links.extend(href_links(content));
    for m in URL_REGEX.find_iter(content) {
        match wrapped.iter().find(|(start, _)| *start == m.start()) {
            Some((_, joined)) => links.insert(joined.as_str()),
            None => links.insert(m.as_str()),
        };
    }
    links.extend(wrapped.into_iter().map(|(_, url)| url));

    trace!("Extracted {} unique links", links.len());
    links.into_vec()
}

/// Values of `href` attributes that point at an http(s) URL
#[must_use]
pub fn href_links(content: &str) -> Vec<String> {
    HREF_REGEX
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// URLs appearing directly in running text
#[must_use]
pub fn bare_links(content: &str) -> Vec<String> {
    URL_REGEX
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// URLs split across line breaks, rejoined into one string
///
/// Single-line URLs are left to [`bare_links`].
#[must_use]
pub fn wrapped_links(content: &str) -> Vec<String> {
    wrapped_matches(content)
        .into_iter()
        .map(|(_, url)| url)
        .collect()
}

/// Rejoined wrapped URLs with the byte offset they start at
fn wrapped_matches(content: &str) -> Vec<(usize, String)> {
    WRAPPED_URL_REGEX
        .find_iter(content)
        .map(|m| {
            let joined: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
            (
                m.start(),
                joined.trim_end_matches(TRAILING_PUNCTUATION).to_string(),
            )
        })
        .filter(|(_, url)| is_absolute_http(url))
        .collect()
}

fn is_absolute_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

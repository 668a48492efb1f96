//! Raw message body normalization
//!
//! Turns whatever the provider stored for a message (headers, MIME markers,
//! quoted-printable escapes, HTML, mis-decoded UTF-8) into plain text and a
//! list of the links it contained. Every stage is a best-effort textual
//! transform; nothing here fails.

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::config::ProviderConfig;
use crate::links::extract_links;
use crate::types::NormalizedContent;

/// Text returned for an empty body
pub const NO_CONTENT: &str = "No content available";

/// Text returned when nothing readable survives normalization
pub const NO_READABLE_CONTENT: &str = "No readable message content found";

/// Label of the link block appended to the text
pub const LINKS_HEADER: &str = "Links:";

/// Line prefixes of transport headers that leak into stored bodies
const TECHNICAL_PREFIXES: [&str; 5] = [
    "DKIM-Signature:",
    "Received:",
    "Message-ID:",
    "Content-",
    "with SMTP",
];

/// Single-byte renderings of UTF-8 sequences and what they should read as.
/// Each sequence appears in its Windows-1252 and its Latin-1 form. Order
/// matters: the bare "â€" fallback must come after every longer pattern.
const MOJIBAKE_REPAIRS: [(&str, &str); 18] = [
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    ("\u{e2}\u{80}\u{99}", "'"),
    ("\u{e2}\u{20ac}\u{2dc}", "'"),
    ("\u{e2}\u{80}\u{98}", "'"),
    ("\u{e2}\u{20ac}\u{153}", "\""),
    ("\u{e2}\u{80}\u{9c}", "\""),
    ("\u{e2}\u{20ac}\u{9d}", "\""),
    ("\u{e2}\u{80}\u{9d}", "\""),
    ("\u{e2}\u{20ac}\u{201c}", "\u{2013}"),
    ("\u{e2}\u{80}\u{93}", "\u{2013}"),
    ("\u{e2}\u{20ac}\u{201d}", "\u{2014}"),
    ("\u{e2}\u{80}\u{94}", "\u{2014}"),
    ("\u{e2}\u{20ac}", "\""),
    ("\u{c3}\u{a1}", "\u{e1}"),
    ("\u{c3}\u{a9}", "\u{e9}"),
    ("\u{c3}\u{ad}", "\u{ed}"),
    ("\u{c3}\u{b3}", "\u{f3}"),
    ("\u{c3}\u{ba}", "\u{fa}"),
];

/// Property names whose presence means an inline style block survived
const CSS_MARKERS: [&str; 3] = ["padding:", "margin:", "font-family:"];

// Regex patterns
static BODY_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").unwrap());

static BLANK_LINE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\r?\n\r?\n").unwrap());

static SOFT_BREAK_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"=\r?\n").unwrap());

static QP_ESCAPE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"=([0-9A-F]{2})").unwrap());

static STYLE_BLOCK_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());

static SCRIPT_BLOCK_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());

static TAG_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static SENTENCE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[A-Z][^.!?]*[.!?]").unwrap());

static EMAIL_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap()
});

static DEFAULT_NORMALIZER: std::sync::LazyLock<Normalizer> =
    std::sync::LazyLock::new(Normalizer::default);

/// Normalize a raw body with the default (maildrop.cc) provider settings
#[must_use]
pub fn normalize(raw: &str) -> NormalizedContent {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Body normalizer bound to one provider's routing footer
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// "by maildrop" style relay lines; unset without a provider domain
    relay_prefix: Option<String>,
    /// "@maildrop.cc" in "for <rcpt>" envelope lines
    recipient_domain: Option<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ProviderConfig::default())
    }
}

impl Normalizer {
    #[must_use]
    pub fn new(config: &ProviderConfig) -> Self {
        let domain = config.domain.trim();
        let host_label = config.host_label().trim();

        Self {
            relay_prefix: (!host_label.is_empty()).then(|| format!("by {host_label}")),
            recipient_domain: (!domain.is_empty()).then(|| format!("@{domain}")),
        }
    }

    /// Produce readable text and the deduplicated link list for a raw body
    #[must_use]
    pub fn normalize(&self, raw: &str) -> NormalizedContent {
        if raw.is_empty() {
            return NormalizedContent::new(NO_CONTENT, Vec::new());
        }

        let content = isolate_body(raw);
        let content = strip_header_block(content);
        let content = self.strip_technical_lines(content);
        let content = decode_quoted_printable(&content);
        let content = repair_mis_encoding(content);

        // Links first: tag stripping throws away href attributes
        let links = extract_links(&content);

        let mut text = strip_markup(&content);
        if has_css_residue(&text)
            && let Some(readable) = salvage_readable(&text)
        {
            trace!("Replaced CSS residue with {} readable chars", readable.len());
            text = readable;
        }

        let text = append_links(text, &links);
        let text = if text.is_empty() {
            NO_READABLE_CONTENT.to_string()
        } else {
            text
        };

        debug!(
            "Normalized body: {} raw chars -> {} chars, {} links",
            raw.len(),
            text.len(),
            links.len()
        );

        NormalizedContent::new(text, links)
    }

    fn strip_technical_lines(&self, content: &str) -> String {
        content
            .split_inclusive('\n')
            .filter(|line| !self.is_technical_line(line.trim_end_matches(['\r', '\n'])))
            .collect()
    }

    fn is_technical_line(&self, line: &str) -> bool {
        TECHNICAL_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
            || self
                .relay_prefix
                .as_ref()
                .is_some_and(|prefix| line.starts_with(prefix.as_str()))
            || self.recipient_domain.as_ref().is_some_and(|domain| {
                line.strip_prefix("for ")
                    .is_some_and(|rest| rest.contains(domain.as_str()))
            })
    }
}

/// Inner content of the `<body>` element, or the whole input without one
fn isolate_body(content: &str) -> &str {
    BODY_REGEX
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map_or(content, |m| m.as_str())
}

/// Drop everything up to the first blank line
fn strip_header_block(content: &str) -> &str {
    BLANK_LINE_REGEX
        .find(content)
        .map_or(content, |m| &content[m.end()..])
}

/// Undo quoted-printable encoding.
///
/// Shorthand escapes such as `=20` and `=3D` go through the same single
/// left-to-right pass as every other `=XX`, so a `=` produced by decoding is
/// never read as the start of a new escape.
fn decode_quoted_printable(content: &str) -> String {
    let joined = SOFT_BREAK_REGEX.replace_all(content, "");
    QP_ESCAPE_REGEX
        .replace_all(&joined, |cap: &Captures<'_>| {
            u8::from_str_radix(&cap[1], 16)
                .map_or_else(|_| cap[0].to_string(), |byte| char::from(byte).to_string())
        })
        .into_owned()
}

fn repair_mis_encoding(mut content: String) -> String {
    for (broken, fixed) in MOJIBAKE_REPAIRS {
        if content.contains(broken) {
            content = content.replace(broken, fixed);
        }
    }
    content
}

/// Remove markup, decode entities and collapse whitespace onto one line
fn strip_markup(content: &str) -> String {
    let without_styles = STYLE_BLOCK_REGEX.replace_all(content, "");
    let without_scripts = SCRIPT_BLOCK_REGEX.replace_all(&without_styles, "");
    let without_tags = TAG_REGEX.replace_all(&without_scripts, " ");

    // Decode HTML entities
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_css_residue(text: &str) -> bool {
    CSS_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Sentences and email addresses found in CSS-polluted text
fn salvage_readable(text: &str) -> Option<String> {
    let pieces: Vec<&str> = SENTENCE_REGEX
        .find_iter(text)
        .chain(EMAIL_REGEX.find_iter(text))
        .map(|m| m.as_str())
        .collect();

    let readable = pieces.join("\n\n");
    if readable.trim().is_empty() {
        None
    } else {
        Some(readable)
    }
}

fn append_links(text: String, links: &[String]) -> String {
    if links.is_empty() {
        return text;
    }

    let listing = links.join("\n");
    if text.is_empty() {
        format!("{LINKS_HEADER}\n{listing}")
    } else {
        format!("{text}\n\n{LINKS_HEADER}\n{listing}")
    }
}

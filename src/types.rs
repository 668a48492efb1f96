//! Core types for provider messages and normalized content

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::normalizer::{Normalizer, normalize};

/// Shown in inbox listings for summaries that carry no body
pub const PREVIEW_PLACEHOLDER: &str = "Click to view full email content...";

/// Readable form of a raw message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedContent {
    /// Plain text, with a trailing "Links:" block when links were found
    pub text: String,

    /// Absolute URLs in first-seen order, each listed once
    pub links: Vec<String>,
}

impl NormalizedContent {
    pub fn new(text: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            text: text.into(),
            links,
        }
    }

    #[must_use]
    pub const fn has_links(&self) -> bool {
        !self.links.is_empty()
    }
}

impl fmt::Display for NormalizedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Provider message ID wrapper type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message as returned by the provider's inbox and message queries
///
/// Inbox listings may omit `data`; the single-message query fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned ID, unique within the mailbox
    pub id: MessageId,

    /// Receive date as the provider formats it
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    /// Envelope sender, possibly RFC 2047 encoded
    #[serde(default, deserialize_with = "null_as_default")]
    pub mailfrom: String,

    /// Subject line, possibly RFC 2047 encoded
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,

    /// Raw stored body
    #[serde(default)]
    pub data: Option<String>,
}

impl Message {
    /// Raw body, empty when the provider sent none
    #[must_use]
    pub fn raw_body(&self) -> &str {
        self.data.as_deref().unwrap_or("")
    }

    /// Normalized body with the default provider settings
    #[must_use]
    pub fn content(&self) -> NormalizedContent {
        normalize(self.raw_body())
    }

    /// Normalized body with a specific normalizer
    #[must_use]
    pub fn content_with(&self, normalizer: &Normalizer) -> NormalizedContent {
        normalizer.normalize(self.raw_body())
    }

    /// Raw body for list previews, or a placeholder when there is none
    #[must_use]
    pub fn preview(&self) -> &str {
        match self.data.as_deref() {
            Some(data) if !data.is_empty() => data,
            _ => PREVIEW_PLACEHOLDER,
        }
    }

    #[must_use]
    pub fn decoded_subject(&self) -> String {
        decode_header_value(&self.subject)
    }

    #[must_use]
    pub fn decoded_sender(&self) -> String {
        decode_header_value(&self.mailfrom)
    }

    /// Receive date, accepting RFC 3339 or RFC 2822
    #[must_use]
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        let date = self.date.trim();
        DateTime::parse_from_rfc3339(date)
            .or_else(|_| DateTime::parse_from_rfc2822(date))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.decoded_subject(), self.decoded_sender())
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode RFC 2047 encoded words, returning the input unchanged otherwise
#[must_use]
pub fn decode_header_value(raw: &str) -> String {
    if !raw.contains("=?") {
        return raw.to_string();
    }

    let line = format!("X-Value: {}", raw.replace(['\r', '\n'], " "));
    mailparse::parse_header(line.as_bytes())
        .map(|(header, _)| header.get_value())
        .unwrap_or_else(|_| raw.to_string())
}

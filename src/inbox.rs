//! Inbox polling against the provider's GraphQL API
//!
//! The crate does no network I/O: callers POST the bodies built here and hand
//! the response text back for decoding.

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{Message, MessageId};

const INBOX_QUERY: &str = "query GetInbox($mailbox: String!) { \
    inbox(mailbox: $mailbox) { id date mailfrom subject data } }";

const MESSAGE_QUERY: &str = "query GetMessage($mailbox: String!, $id: String!) { \
    message(mailbox: $mailbox, id: $id) { id date mailfrom subject data } }";

/// GraphQL request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxQuery {
    pub query: &'static str,
    pub variables: Value,
}

impl InboxQuery {
    /// List the messages of a mailbox
    #[must_use]
    pub fn inbox(mailbox: &str) -> Self {
        Self {
            query: INBOX_QUERY,
            variables: json!({ "mailbox": mailbox }),
        }
    }

    /// Fetch one message with its full body
    #[must_use]
    pub fn message(mailbox: &str, id: &MessageId) -> Self {
        Self {
            query: MESSAGE_QUERY,
            variables: json!({ "mailbox": mailbox, "id": id.as_str() }),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct InboxData {
    inbox: Option<Vec<Message>>,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    message: Option<Message>,
}

impl<T: DeserializeOwned> GraphQlResponse<T> {
    fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

/// Decode the response to [`InboxQuery::inbox`]
pub fn parse_inbox_response(body: &str) -> Result<Vec<Message>> {
    let response = GraphQlResponse::<InboxData>::parse(body)?;
    let errors = response.error_messages();

    match response.data.and_then(|d| d.inbox) {
        Some(messages) => {
            if !errors.is_empty() {
                warn!("Inbox response carried errors: {}", errors.join("; "));
            }
            Ok(messages)
        }
        None if !errors.is_empty() => Err(Error::Provider(errors)),
        None => Err(Error::MissingField("data.inbox".into())),
    }
}

/// Decode the response to [`InboxQuery::message`]; `None` if the provider has no such message
pub fn parse_message_response(body: &str) -> Result<Option<Message>> {
    let response = GraphQlResponse::<MessageData>::parse(body)?;
    let errors = response.error_messages();

    match response.data {
        Some(data) => {
            if !errors.is_empty() {
                warn!("Message response carried errors: {}", errors.join("; "));
            }
            Ok(data.message)
        }
        None if !errors.is_empty() => Err(Error::Provider(errors)),
        None => Err(Error::MissingField("data".into())),
    }
}

/// Last successfully polled message list
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    messages: Vec<Message>,
    last_polled: Option<DateTime<Utc>>,
}

impl Inbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Whether `interval` has passed since the last poll
    #[must_use]
    pub fn poll_due(&self, now: DateTime<Utc>, interval: TimeDelta) -> bool {
        self.last_polled.is_none_or(|last| now - last >= interval)
    }

    /// Record a poll result. Failures keep the previous list.
    ///
    /// Returns `true` if the list was replaced.
    pub fn apply(&mut self, now: DateTime<Utc>, result: Result<Vec<Message>>) -> bool {
        self.last_polled = Some(now);
        match result {
            Ok(messages) => {
                debug!("Inbox poll returned {} messages", messages.len());
                self.messages = messages;
                true
            }
            Err(e) => {
                warn!(
                    "Inbox poll failed, keeping {} cached messages: {e}",
                    self.messages.len()
                );
                false
            }
        }
    }

    /// Forget everything, e.g. after the address changed
    pub fn reset(&mut self) {
        self.messages.clear();
        self.last_polled = None;
    }

    /// Message to display when `summary` is opened: the fetched full message,
    /// or the summary itself if fetching failed or found nothing
    #[must_use]
    pub fn open(summary: &Message, fetched: Result<Option<Message>>) -> Message {
        match fetched {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("Message {} not found, showing summary", summary.id);
                summary.clone()
            }
            Err(e) => {
                warn!("Fetching message {} failed, showing summary: {e}", summary.id);
                summary.clone()
            }
        }
    }
}

// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Temporary Mail Extraction
//!
//! Library core of a disposable-email front end: issue a throwaway address,
//! poll the provider's inbox, and turn raw stored message bodies into
//! readable text plus the links they contain.
//!
//! # Features
//!
//! - Best-effort body normalization (headers, quoted-printable, mojibake, HTML)
//! - Link extraction with first-seen deduplication
//! - Random mailbox generation with an expiry countdown
//! - GraphQL request bodies and response decoding for inbox polling
//!
//! # Example
//!
//! ```rust
//! use tempmail_extract::normalize;
//!
//! let content = normalize("<p>Hi <b>there</b></p>");
//! assert_eq!(content.text, "Hi there");
//! assert!(content.links.is_empty());
//! ```

mod config;
mod error;
mod inbox;
mod links;
mod mailbox;
mod normalizer;
mod types;

pub use config::*;
pub use error::{Error, Result};
pub use inbox::{Inbox, InboxQuery, parse_inbox_response, parse_message_response};
pub use links::{LinkSet, bare_links, extract_links, href_links, wrapped_links};
pub use mailbox::*;
pub use normalizer::{LINKS_HEADER, NO_CONTENT, NO_READABLE_CONTENT, Normalizer, normalize};
pub use types::*;

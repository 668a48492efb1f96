//! Error types for mailbox and inbox handling
//!
//! Body normalization never fails; these cover address parsing, provider
//! responses and configuration.

use thiserror::Error;

/// Errors that can occur outside of body normalization
#[derive(Error, Debug)]
pub enum Error {
    /// Address could not be parsed into a mailbox and domain
    #[error("Invalid mailbox address: {0}")]
    InvalidAddress(String),

    /// Provider response was not valid JSON or had the wrong shape
    #[error("Failed to decode provider response: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider response lacked an expected field
    #[error("Missing field in provider response: {0}")]
    MissingField(String),

    /// Provider answered with GraphQL errors
    #[error("Provider returned errors: {}", .0.join("; "))]
    Provider(Vec<String>),

    /// Invalid configuration value
    #[error("Invalid configuration for {field}: {details}")]
    Config { field: String, details: String },
}

/// Result type for mailbox and inbox operations
pub type Result<T> = std::result::Result<T, Error>;

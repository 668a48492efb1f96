//! Provider configuration

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_DOMAIN: &str = "maildrop.cc";
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.maildrop.cc/graphql";
pub const DEFAULT_POLL_INTERVAL_SECS: u32 = 5;
pub const DEFAULT_ADDRESS_LIFETIME_SECS: u32 = 600;

/// Settings for the temporary mail provider
///
/// Every field has a default, so a partial JSON document only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Domain addresses are issued under (e.g., "maildrop.cc")
    #[serde(default = "default_domain")]
    pub domain: String,

    /// GraphQL endpoint receiving inbox and message queries
    #[serde(default = "default_graphql_endpoint")]
    pub graphql_endpoint: String,

    /// Seconds between inbox polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u32,

    /// Seconds an address stays valid before it is replaced
    #[serde(default = "default_address_lifetime_secs")]
    pub address_lifetime_secs: u32,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_graphql_endpoint() -> String {
    DEFAULT_GRAPHQL_ENDPOINT.to_string()
}

const fn default_poll_interval_secs() -> u32 {
    DEFAULT_POLL_INTERVAL_SECS
}

const fn default_address_lifetime_secs() -> u32 {
    DEFAULT_ADDRESS_LIFETIME_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            graphql_endpoint: default_graphql_endpoint(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            address_lifetime_secs: DEFAULT_ADDRESS_LIFETIME_SECS,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from a JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the mailbox unusable
    pub fn validate(&self) -> Result<()> {
        let domain = self.domain.trim();
        if domain.is_empty() || domain.contains('@') || domain.contains(char::is_whitespace) {
            return Err(Error::Config {
                field: "domain".into(),
                details: format!("not a mail domain: {:?}", self.domain),
            });
        }
        if !self.graphql_endpoint.starts_with("http://")
            && !self.graphql_endpoint.starts_with("https://")
        {
            return Err(Error::Config {
                field: "graphql_endpoint".into(),
                details: format!("not an http(s) URL: {}", self.graphql_endpoint),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config {
                field: "poll_interval_secs".into(),
                details: "must be at least 1".into(),
            });
        }
        if self.address_lifetime_secs == 0 {
            return Err(Error::Config {
                field: "address_lifetime_secs".into(),
                details: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Host label of the provider domain ("maildrop" for "maildrop.cc")
    #[must_use]
    pub fn host_label(&self) -> &str {
        self.domain.split('.').next().unwrap_or(&self.domain)
    }

    #[must_use]
    pub fn poll_interval(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.poll_interval_secs))
    }

    #[must_use]
    pub fn address_lifetime(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.address_lifetime_secs))
    }
}

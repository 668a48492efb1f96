//! Temporary mailbox addresses and their expiry

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};

/// Length of generated mailbox names
pub const GENERATED_LOCAL_PART_LEN: usize = 13;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static MAILBOX_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._+\-]{0,63}$").unwrap());

/// Temporary address; the local part doubles as the provider mailbox name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MailboxAddress {
    /// Mailbox name (before @)
    pub local_part: String,

    /// Provider domain (after @)
    pub domain: String,
}

impl MailboxAddress {
    /// Random base-36 mailbox under `domain`
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, domain: &str) -> Self {
        let local_part = (0..GENERATED_LOCAL_PART_LEN)
            .map(|_| char::from(BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())]))
            .collect();

        Self {
            local_part,
            domain: domain.trim().to_ascii_lowercase(),
        }
    }

    /// Parse "box@domain" or "<box@domain>", lowercasing both parts
    pub fn parse(s: &str) -> Result<Self> {
        let value = s.trim().trim_start_matches('<').trim_end_matches('>').trim();
        let (local, domain) = value
            .rsplit_once('@')
            .ok_or_else(|| Error::InvalidAddress(format!("missing '@' in {s:?}")))?;

        let local_part = local.trim().to_ascii_lowercase();
        let domain = domain.trim().to_ascii_lowercase();

        if !MAILBOX_REGEX.is_match(&local_part) {
            return Err(Error::InvalidAddress(format!("invalid mailbox name in {s:?}")));
        }
        if domain.is_empty() || !domain.contains('.') {
            return Err(Error::InvalidAddress(format!("invalid domain in {s:?}")));
        }

        Ok(Self { local_part, domain })
    }

    /// Mailbox name used by inbox queries
    #[must_use]
    pub fn mailbox(&self) -> &str {
        &self.local_part
    }
}

impl fmt::Display for MailboxAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

/// Countdown until an address should be replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryTimer {
    started_at: DateTime<Utc>,
    lifetime: TimeDelta,
}

impl ExpiryTimer {
    #[must_use]
    pub const fn start(now: DateTime<Utc>, lifetime: TimeDelta) -> Self {
        Self {
            started_at: now,
            lifetime,
        }
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.started_at + self.lifetime
    }

    /// Time left, never negative
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expires_at() - now).max(TimeDelta::zero())
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) <= TimeDelta::zero()
    }

    /// Restart the full lifetime from `now`
    pub fn extend(&mut self, now: DateTime<Utc>) {
        self.started_at = now;
    }

    /// Remaining time as "m:ss"
    #[must_use]
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        let secs = self.remaining(now).num_seconds();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Current address together with its expiry timer
#[derive(Debug, Clone)]
pub struct MailboxSession {
    address: MailboxAddress,
    timer: ExpiryTimer,
    domain: String,
}

impl MailboxSession {
    /// Issue a fresh address under the configured domain
    pub fn new<R: Rng + ?Sized>(config: &ProviderConfig, now: DateTime<Utc>, rng: &mut R) -> Self {
        let address = MailboxAddress::generate(rng, &config.domain);
        debug!("Generated mailbox address {address}");

        Self {
            address,
            timer: ExpiryTimer::start(now, config.address_lifetime()),
            domain: config.domain.clone(),
        }
    }

    #[must_use]
    pub const fn address(&self) -> &MailboxAddress {
        &self.address
    }

    #[must_use]
    pub const fn timer(&self) -> &ExpiryTimer {
        &self.timer
    }

    /// Replace the address and restart the timer
    pub fn regenerate<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) {
        self.address = MailboxAddress::generate(rng, &self.domain);
        self.timer.extend(now);
        debug!("Generated mailbox address {}", self.address);
    }

    /// Keep the current address for another full lifetime
    pub fn extend(&mut self, now: DateTime<Utc>) {
        self.timer.extend(now);
    }

    /// Regenerate when the timer ran out; returns whether it did
    pub fn renew_if_expired<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> bool {
        if !self.timer.is_expired(now) {
            return false;
        }

        debug!("Mailbox {} expired", self.address);
        self.regenerate(now, rng);
        true
    }

    #[must_use]
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        self.timer.format_remaining(now)
    }
}

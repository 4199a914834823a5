// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window submission limiter for the contact form.
//!
//! Implements dual-key cooldown:
//! 1. Per-client-address key (`ip:<addr>`)
//! 2. Per-email key (`email:<lower-cased address>`)
//!
//! Either key being live blocks a submission, so neither rotating emails from
//! one address nor rotating addresses with one email gets around the window.
//! The address key is checked first and wins ties.

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::store::{LruTtlStore, RateLimitEntry, RateLimitStore};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Submission accepted and recorded under both keys
    Allowed,
    /// Submission rejected
    Denied {
        /// Which key blocked the submission
        reason: RateLimitReason,
        /// Milliseconds until the blocking key frees up
        retry_after_ms: u64,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Denied { retry_after_ms, .. } => {
                Some(Duration::from_millis(*retry_after_ms))
            }
        }
    }
}

/// Reason for a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitReason {
    /// The client address submitted within the window
    ClientAddress,
    /// The email address submitted within the window
    Email,
}

impl std::fmt::Display for RateLimitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientAddress => write!(f, "Client address in cooldown"),
            Self::Email => write!(f, "Email address in cooldown"),
        }
    }
}

/// Store key for a client address.
pub fn address_key(client_address: &str) -> String {
    format!("ip:{client_address}")
}

/// Store key for an email. Normalizes case.
pub fn email_key(email: &str) -> String {
    format!("email:{}", email.to_lowercase())
}

/// Decide on a single looked-up entry.
///
/// An entry is live while `now - timestamp < window`; a timestamp in the
/// future counts as just recorded.
pub fn evaluate(
    entry: Option<&RateLimitEntry>,
    now: u64,
    window_ms: u64,
    reason: RateLimitReason,
) -> RateLimitDecision {
    match entry {
        Some(entry) => {
            let elapsed = now.saturating_sub(entry.timestamp);
            if elapsed < window_ms {
                RateLimitDecision::Denied {
                    reason,
                    retry_after_ms: window_ms - elapsed,
                }
            } else {
                RateLimitDecision::Allowed
            }
        }
        None => RateLimitDecision::Allowed,
    }
}

/// Thread-safe dual-key limiter.
///
/// The whole check-then-record sequence runs under one lock, so two
/// concurrent submissions sharing a key cannot both be accepted.
pub struct RateLimiter {
    window_ms: u64,
    clock: Arc<dyn Clock>,
    store: Mutex<Box<dyn RateLimitStore>>,
}

impl RateLimiter {
    /// Create a limiter backed by an [`LruTtlStore`] sized from `config`.
    ///
    /// A zero capacity is raised to one; [`Config::validate`](crate::config::Config::validate)
    /// rejects it before this point in the service.
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        let store = LruTtlStore::new(capacity, config.window_duration(), Arc::clone(&clock));
        Self::with_store(config.window_ms, clock, Box::new(store))
    }

    /// Create a limiter over any store.
    pub fn with_store(window_ms: u64, clock: Arc<dyn Clock>, store: Box<dyn RateLimitStore>) -> Self {
        Self {
            window_ms,
            clock,
            store: Mutex::new(store),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn RateLimitStore>> {
        // The store has no cross-key invariant a panicking holder could break.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check both keys and, if neither is live, record the submission.
    pub fn check_and_record(&self, client_address: &str, email: &str) -> RateLimitDecision {
        let normalized_email = email.to_lowercase();
        let ip_key = address_key(client_address);
        let email_key = email_key(&normalized_email);

        let mut store = self.lock();
        let now = self.clock.now_millis();

        let ip_entry = store.get(&ip_key);
        let decision = evaluate(
            ip_entry.as_deref(),
            now,
            self.window_ms,
            RateLimitReason::ClientAddress,
        );
        if !decision.is_allowed() {
            debug!(client_address, ?decision, "Client address in cooldown");
            return decision;
        }

        let email_entry = store.get(&email_key);
        let decision = evaluate(
            email_entry.as_deref(),
            now,
            self.window_ms,
            RateLimitReason::Email,
        );
        if !decision.is_allowed() {
            debug!(email = %normalized_email, ?decision, "Email in cooldown");
            return decision;
        }

        let entry = Arc::new(RateLimitEntry {
            timestamp: now,
            normalized_email,
            client_address: client_address.to_string(),
        });
        store.insert(ip_key, Arc::clone(&entry));
        store.insert(email_key, entry);

        RateLimitDecision::Allowed
    }

    /// Manual override: forget an email and, optionally, an address. An empty
    /// address counts as absent.
    pub fn clear(&self, email: &str, client_address: Option<&str>) {
        let mut store = self.lock();
        let email_removed = store.remove(&email_key(email));
        let address_removed = client_address
            .filter(|addr| !addr.is_empty())
            .map(|addr| store.remove(&address_key(addr)))
            .unwrap_or(false);

        info!(
            email = %email.to_lowercase(),
            client_address = ?client_address,
            email_removed,
            address_removed,
            "Cleared cooldown"
        );
    }

    /// Drop expired entries (should be called periodically).
    pub fn purge_expired(&self) -> usize {
        let purged = self.lock().purge_expired();
        if purged > 0 {
            debug!(purged, "Purged expired cooldown entries");
        }
        purged
    }

    /// Number of keys currently held by the store.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

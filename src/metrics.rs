// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the contact relay.
//!
//! Metrics live in a registry owned by the application state rather than the
//! global default registry, so several app instances can coexist in one
//! process (as they do in tests).

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Submission outcome labels.
pub mod outcome {
    pub const ACCEPTED: &str = "accepted";
    pub const INVALID: &str = "invalid";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const DISPATCH_FAILED: &str = "dispatch_failed";
    pub const ERROR: &str = "error";
}

/// Metric handles plus the registry they are registered in.
#[derive(Clone)]
pub struct ContactMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    dispatch_failures: IntCounterVec,
    cooldown_entries: IntGauge,
}

impl ContactMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )?;
        let dispatch_failures = IntCounterVec::new(
            Opts::new(
                "contact_dispatch_failures_total",
                "Failed outbound emails by message and error kind",
            ),
            &["message", "kind"],
        )?;
        let cooldown_entries = IntGauge::new(
            "contact_cooldown_entries",
            "Keys currently held by the cooldown store",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(dispatch_failures.clone()))?;
        registry.register(Box::new(cooldown_entries.clone()))?;

        Ok(Self {
            registry,
            submissions,
            dispatch_failures,
            cooldown_entries,
        })
    }

    pub fn record_submission(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    /// `message` is `notification` or `auto_response`.
    pub fn record_dispatch_failure(&self, message: &str, kind: &str) {
        self.dispatch_failures.with_label_values(&[message, kind]).inc();
    }

    pub fn set_cooldown_entries(&self, count: usize) {
        self.cooldown_entries
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn submissions(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    /// Render every metric in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

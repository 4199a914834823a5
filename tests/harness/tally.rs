// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome counting for abuse simulations.

use contact_relay::limiter::{RateLimitDecision, RateLimitReason};
use std::collections::HashMap;

/// Possible outcomes for a simulated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    DeniedByAddress,
    DeniedByEmail,
    Invalid,
}

impl From<&RateLimitDecision> for Outcome {
    fn from(decision: &RateLimitDecision) -> Self {
        match decision {
            RateLimitDecision::Allowed => Outcome::Allowed,
            RateLimitDecision::Denied {
                reason: RateLimitReason::ClientAddress,
                ..
            } => Outcome::DeniedByAddress,
            RateLimitDecision::Denied {
                reason: RateLimitReason::Email,
                ..
            } => Outcome::DeniedByEmail,
        }
    }
}

/// Counts outcomes over a simulation run.
#[derive(Debug, Default)]
pub struct Tally {
    outcomes: HashMap<Outcome, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn denied(&self) -> usize {
        self.count(Outcome::DeniedByAddress) + self.count(Outcome::DeniedByEmail)
    }

    /// Fraction of submissions that got through.
    pub fn pass_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(Outcome::Allowed) as f64 / total as f64
    }
}

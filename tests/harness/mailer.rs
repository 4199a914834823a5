// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory mailer that records every message it is asked to send.

use async_trait::async_trait;
use contact_relay::mailer::{DispatchError, DispatchReceipt, Mailer, OutgoingEmail};
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    attempts: Mutex<usize>,
    failing_recipients: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every message addressed to `recipient` fail with a provider rejection.
    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .push(recipient.to_string());
    }

    /// Messages delivered successfully, in order.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Every send call, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<DispatchReceipt, DispatchError> {
        *self.attempts.lock().unwrap() += 1;

        let failing = self.failing_recipients.lock().unwrap();
        if email.to.iter().any(|to| failing.contains(to)) {
            return Err(DispatchError::Rejected {
                status: 422,
                message: "The recipient is on the suppression list".to_string(),
            });
        }
        drop(failing);

        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(DispatchReceipt {
            id: format!("msg_{}", sent.len()),
        })
    }
}

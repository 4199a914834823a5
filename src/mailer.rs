// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail.
//!
//! [`Mailer`] is the seam between the contact handler and the delivery
//! provider. [`ResendMailer`] talks to a Resend-compatible HTTP API; tests
//! substitute an in-memory implementation.

use crate::config::MailConfig;
use crate::templates::RenderedEmail;
use crate::validator::ContactSubmission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Message handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Provider acknowledgment for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DispatchReceipt {
    pub id: String,
}

/// Dispatch failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Mail provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected mail provider response: {0}")]
    InvalidResponse(String),
}

impl DispatchError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Transport(_) => "transport",
            DispatchError::Rejected { .. } => "rejected",
            DispatchError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<DispatchReceipt, DispatchError>;
}

/// Owner notification: goes to the configured owner, replies go to the visitor.
pub fn owner_notification(
    mail: &MailConfig,
    submission: &ContactSubmission,
    rendered: RenderedEmail,
) -> OutgoingEmail {
    OutgoingEmail {
        from: mail.notification_from.clone(),
        to: vec![mail.owner_email.clone()],
        subject: rendered.subject,
        html: rendered.html,
        text: rendered.text,
        reply_to: Some(submission.email.clone()),
    }
}

/// Visitor acknowledgment: goes back to the address on the form.
pub fn visitor_acknowledgment(
    mail: &MailConfig,
    submission: &ContactSubmission,
    rendered: RenderedEmail,
) -> OutgoingEmail {
    OutgoingEmail {
        from: mail.autoresponse_from.clone(),
        to: vec![submission.email.clone()],
        subject: rendered.subject,
        html: rendered.html,
        text: rendered.text,
        reply_to: None,
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Resend-compatible HTTP mailer.
pub struct ResendMailer {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl ResendMailer {
    /// Create a mailer from configuration. Fails only if the HTTP client cannot be built.
    pub fn new(config: &MailConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            endpoint: format!("{}/emails", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<DispatchReceipt, DispatchError> {
        debug!(to = ?email.to, subject = %email.subject, "Sending email");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<DispatchReceipt>(&body)
                .map_err(|e| DispatchError::InvalidResponse(e.to_string()))
        } else {
            let message = serde_json::from_str::<ProviderError>(&body)
                .ok()
                .and_then(|e| e.message.or(e.name))
                .unwrap_or(body);
            Err(DispatchError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

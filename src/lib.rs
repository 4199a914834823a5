// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! Backend for the portfolio contact form:
//!
//! - Payload validation (name, email, message, locale)
//! - Dual-key cooldown: one submission per client address and per email
//!   every 30 minutes, over a bounded LRU store with per-entry TTL
//! - Bilingual (en/es) owner notification and visitor acknowledgment
//! - Dispatch through a Resend-compatible mail API

pub mod client_addr;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod store;
pub mod templates;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use handlers::{admin_router, router, AppState};
pub use limiter::{RateLimitDecision, RateLimitReason, RateLimiter};
pub use mailer::{DispatchError, DispatchReceipt, Mailer, OutgoingEmail, ResendMailer};
pub use validator::{ContactSubmission, ContactValidator, ValidationErrors};

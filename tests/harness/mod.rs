// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for the contact relay.
//!
//! Provides a recording mailer, test data generators, an outcome tally for
//! abuse simulations and helpers to drive the router in-process.

#![allow(dead_code)]

pub mod generators;
pub mod mailer;
pub mod tally;

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use contact_relay::{
    clock::ManualClock,
    config::{Config, MailConfig},
    handlers::{admin_router, router, AppState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub use mailer::RecordingMailer;

/// Owner address used by every test app.
pub const OWNER_EMAIL: &str = "owner@example.com";

/// Epoch milliseconds the manual clock starts at (2026-01-01T00:00:00Z).
pub const START_MILLIS: u64 = 1_767_225_600_000;

/// An app wired to fakes.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub mailer: Arc<RecordingMailer>,
    pub router: Router,
    pub admin: Router,
}

pub fn test_config() -> Config {
    Config {
        mail: MailConfig {
            api_key: "re_test_key".to_string(),
            owner_email: OWNER_EMAIL.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let mailer = Arc::new(RecordingMailer::new());
        let state = Arc::new(
            AppState::new(config, clock.clone(), mailer.clone()).expect("metrics registry"),
        );

        Self {
            router: router(state.clone()),
            admin: admin_router(state.clone()),
            state,
            clock,
            mailer,
        }
    }

    /// POST a contact payload as if relayed by a proxy for `client_ip`.
    pub async fn submit(&self, body: &Value, client_ip: &str) -> Reply {
        let request = Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .header("x-forwarded-for", client_ip)
            .body(Body::from(body.to_string()))
            .unwrap();
        send(&self.router, request).await
    }

    pub async fn get(&self, path: &str) -> Reply {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        send(&self.router, request).await
    }
}

/// Response parts the tests look at.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

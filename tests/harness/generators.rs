// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for contact submissions.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses in the 10.x.x.x range.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Generate a pool of distinct visitor emails.
pub fn generate_emails(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("visitor{}@mail-{}.example.com", i, i % 7))
        .collect()
}

/// A payload that passes validation.
pub fn valid_payload(email: &str) -> Value {
    json!({
        "name": "Ana Ruiz",
        "email": email,
        "message": "Hola, me interesa colaborar en un proyecto.",
        "locale": "es"
    })
}

/// Payloads that each fail validation for a different reason.
pub fn invalid_payloads() -> Vec<Value> {
    vec![
        json!({}),
        json!({ "name": "A", "email": "a@example.com", "message": "Long enough message" }),
        json!({ "name": "R2-D2", "email": "r2@example.com", "message": "Beep boop beep boop" }),
        json!({ "name": "Ana Ruiz", "email": "not-an-email", "message": "Long enough message" }),
        json!({ "name": "Ana Ruiz", "email": "ana@example.com", "message": "short" }),
        json!({ "name": "Ana Ruiz", "email": "ana@example.com", "message": "x".repeat(1001) }),
        json!({ "name": 42, "email": "ana@example.com", "message": "Long enough message" }),
        json!(["not", "an", "object"]),
    ]
}

// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form validator.
//!
//! Turns an untyped JSON payload into a [`ContactSubmission`] or reports every
//! violated field at once:
//! - name: 2-100 characters, letters (Latin-1 accented included) and spaces
//! - email: address syntax, 5-255 characters
//! - message: 10-1000 characters once trimmed
//! - locale: optional, defaults to `en`

use crate::config::ValidationConfig;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

lazy_static! {
    static ref NAME_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z\x{C0}-\x{FF}\s]+$").expect("name pattern compiles");
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$"
    )
    .expect("email pattern compiles");
}

/// Locale used when the payload does not carry one.
pub const DEFAULT_LOCALE: &str = "en";

/// A validated, normalized contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    /// As submitted; the limiter lower-cases it for its keys.
    pub email: String,
    /// Trimmed message body
    pub message: String,
    pub locale: String,
}

/// One violated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found in a payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid form data: {} violation(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    /// Single violation on the request body itself.
    pub fn body(message: impl Into<String>) -> Self {
        Self(vec![FieldViolation {
            field: "body".to_string(),
            message: message.into(),
        }])
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Whether `field` has at least one violation.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// Messages reported for `field`.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|v| v.field == field)
            .map(|v| v.message.as_str())
            .collect()
    }
}

/// Contact form validator.
pub struct ContactValidator {
    config: ValidationConfig,
}

impl ContactValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a complete contact payload.
    pub fn validate(&self, payload: &Value) -> Result<ContactSubmission, ValidationErrors> {
        let Some(fields) = payload.as_object() else {
            debug!(kind = json_type(payload), "Payload is not an object");
            return Err(ValidationErrors::body(format!(
                "Expected object, received {}",
                json_type(payload)
            )));
        };

        let mut violations = Vec::new();
        let mut report = |field: &str, messages: Vec<String>| {
            violations.extend(messages.into_iter().map(|message| FieldViolation {
                field: field.to_string(),
                message,
            }));
        };

        let name = required_string(fields, "name").and_then(|name| {
            let errors = self.check_name(&name);
            if errors.is_empty() { Ok(name) } else { Err(errors) }
        });
        let email = required_string(fields, "email").and_then(|email| {
            let errors = self.check_email(&email);
            if errors.is_empty() { Ok(email) } else { Err(errors) }
        });
        let message = required_string(fields, "message").and_then(|message| {
            let trimmed = message.trim().to_string();
            let errors = self.check_message(&trimmed);
            if errors.is_empty() { Ok(trimmed) } else { Err(errors) }
        });
        let locale = optional_string(fields, "locale")
            .map(|locale| locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()));

        let name = name.map_err(|e| report("name", e));
        let email = email.map_err(|e| report("email", e));
        let message = message.map_err(|e| report("message", e));
        let locale = locale.map_err(|e| report("locale", e));

        match (name, email, message, locale) {
            (Ok(name), Ok(email), Ok(message), Ok(locale)) => Ok(ContactSubmission {
                name,
                email,
                message,
                locale,
            }),
            _ => {
                debug!(violations = violations.len(), "Contact payload rejected");
                Err(ValidationErrors(violations))
            }
        }
    }

    fn check_name(&self, name: &str) -> Vec<String> {
        let mut errors = Vec::new();
        let len = text_len(name);
        if len < self.config.name_min_chars {
            errors.push(format!(
                "Name must be at least {} characters",
                self.config.name_min_chars
            ));
        }
        if len > self.config.name_max_chars {
            errors.push(format!(
                "Name must be less than {} characters",
                self.config.name_max_chars
            ));
        }
        if !NAME_PATTERN.is_match(name) {
            errors.push("Name can only contain letters and spaces".to_string());
        }
        errors
    }

    fn check_email(&self, email: &str) -> Vec<String> {
        let mut errors = Vec::new();
        if !is_valid_email(email) {
            errors.push("Please enter a valid email address".to_string());
        }
        let len = text_len(email);
        if len < self.config.email_min_chars {
            errors.push("Email is too short".to_string());
        }
        if len > self.config.email_max_chars {
            errors.push("Email is too long".to_string());
        }
        errors
    }

    fn check_message(&self, message: &str) -> Vec<String> {
        let mut errors = Vec::new();
        let len = text_len(message);
        if len < self.config.message_min_chars {
            errors.push(format!(
                "Message must be at least {} characters",
                self.config.message_min_chars
            ));
        }
        if len > self.config.message_max_chars {
            errors.push(format!(
                "Message must be less than {} characters",
                self.config.message_max_chars
            ));
        }
        errors
    }
}

/// Length in UTF-16 code units, the unit browsers use for form limits.
fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Address syntax check: the pattern plus the two rules regex cannot express
/// without look-around (no leading dot, no consecutive dots).
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

fn required_string(fields: &Map<String, Value>, field: &str) -> Result<String, Vec<String>> {
    match fields.get(field) {
        None => Err(vec!["Required".to_string()]),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(vec![format!(
            "Expected string, received {}",
            json_type(other)
        )]),
    }
}

fn optional_string(fields: &Map<String, Value>, field: &str) -> Result<Option<String>, Vec<String>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(vec![format!(
            "Expected string, received {}",
            json_type(other)
        )]),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

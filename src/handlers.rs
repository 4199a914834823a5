// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! The public router serves the contact endpoint, health checks and metrics.
//! The admin router carries the manual cooldown override and is meant to be
//! bound to a loopback address only.

use crate::client_addr::resolve_client_address;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::ContactError;
use crate::limiter::{RateLimitDecision, RateLimiter};
use crate::mailer::{owner_notification, visitor_acknowledgment, Mailer};
use crate::metrics::{outcome, ContactMetrics};
use crate::templates::Templates;
use crate::validator::{ContactValidator, ValidationErrors};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: ContactValidator,
    pub templates: Templates,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: ContactMetrics,
    pub config: Config,
}

impl AppState {
    /// Wire every component from configuration.
    pub fn new(
        config: Config,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            limiter: RateLimiter::new(&config.rate_limit, clock),
            validator: ContactValidator::new(config.validation.clone()),
            templates: Templates::new(config.site.clone()),
            mailer,
            metrics: ContactMetrics::new()?,
            config,
        })
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_response_id: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Manual cooldown override request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    pub email: String,
    #[serde(default)]
    pub client_address: Option<String>,
}

/// Public router: contact endpoint, health checks, metrics.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/contact", post(submit_contact));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    let cors = cors_layer(&state.config.cors_allowed_origins);

    app.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
    .with_state(state)
}

/// Admin router: manual cooldown override.
pub fn admin_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rate-limit/clear", post(clear_rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_origins(origins))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unusable CORS origin");
                None
            }
        })
        .collect()
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Handler panicked");
    ContactError::Unexpected("handler panicked".to_string()).into_response()
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.set_cooldown_entries(state.limiter.len());
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Contact form submission.
///
/// The body is taken raw so that malformed JSON and wrong content types end
/// up as validation failures rather than extractor rejections.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContactResponse>, ContactError> {
    let result = process_submission(&state, &headers, &body).await;

    state.metrics.record_submission(match &result {
        Ok(_) => outcome::ACCEPTED,
        Err(e) => e.outcome(),
    });
    state.metrics.set_cooldown_entries(state.limiter.len());

    result.map(Json)
}

async fn process_submission(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ContactResponse, ContactError> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Malformed contact payload");
        ValidationErrors::body(format!("Malformed JSON: {e}"))
    })?;

    let submission = state.validator.validate(&payload)?;
    let client_address = resolve_client_address(headers);

    if let RateLimitDecision::Denied {
        reason,
        retry_after_ms,
    } = state
        .limiter
        .check_and_record(&client_address, &submission.email)
    {
        info!(
            client_address = %client_address,
            reason = %reason,
            retry_after_ms,
            "Submission rate limited"
        );
        return Err(ContactError::RateLimited { retry_after_ms });
    }

    let mail = &state.config.mail;
    let notification = owner_notification(mail, &submission, state.templates.notification(&submission));
    let acknowledgment =
        visitor_acknowledgment(mail, &submission, state.templates.auto_response(&submission));

    let notification_id = match state.mailer.send(&notification).await {
        Ok(receipt) => receipt.id,
        Err(e) => {
            error!(
                client_address = %client_address,
                kind = e.kind(),
                error = %e,
                "Notification email failed"
            );
            state.metrics.record_dispatch_failure("notification", e.kind());
            return Err(ContactError::Notification(e));
        }
    };

    let auto_response_id = match state.mailer.send(&acknowledgment).await {
        Ok(receipt) => Some(receipt.id),
        Err(e) => {
            warn!(
                kind = e.kind(),
                error = %e,
                "Auto-response email failed; owner was already notified"
            );
            state.metrics.record_dispatch_failure("auto_response", e.kind());
            None
        }
    };

    info!(
        client_address = %client_address,
        locale = %submission.locale,
        notification_id = %notification_id,
        auto_response_id = ?auto_response_id,
        "Contact submission delivered"
    );

    Ok(ContactResponse {
        success: true,
        message: "Email sent successfully!",
        notification_id: Some(notification_id),
        auto_response_id,
    })
}

/// Manual cooldown override.
pub async fn clear_rate_limit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClearRequest>,
) -> StatusCode {
    state
        .limiter
        .clear(&req.email, req.client_address.as_deref());
    state.metrics.set_cooldown_entries(state.limiter.len());
    StatusCode::NO_CONTENT
}

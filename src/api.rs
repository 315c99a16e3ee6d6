//! Unified API router for Health Signal
//!
//! Merges the module routers into a single axum `Router` with CORS,
//! request tracing and one JSON error envelope.
//!
//! ## Endpoint Map
//!
//! | Prefix                     | Module       | Description                       |
//! |----------------------------|--------------|-----------------------------------|
//! | `/health`                  | api          | Liveness check                    |
//! | `/api/v1/constitution/*`   | scoring      | Constitution profile              |
//! | `/api/v1/safety/*`         | safety       | Emergency keyword check           |
//! | `/api/v1/surveillance/*`   | surveillance | Report intake, regional counts    |

use crate::error::Error;
use crate::safety::{safety_router, SafetyState};
use crate::scoring::{scoring_router, ScoringState};
use crate::surveillance::{surveillance_router, SurveillanceState};
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Health Signal HTTP application
pub fn build_app(
    scoring_state: ScoringState,
    safety_state: SafetyState,
    surveillance_state: SurveillanceState,
    cors_origins: &[String],
) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(scoring_router(scoring_state))
        .merge(safety_router(safety_state))
        .merge(surveillance_router(surveillance_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Error envelope
// =============================================================================

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    /// Offending field, for privacy violations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                field: None,
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl Error {
    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Error::PrivacyViolation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PRIVACY_VIOLATION")
            }
            Error::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            ApiError::internal("internal server error")
        } else {
            let mut body = ApiError::new(code, self.to_string());
            body.error.field = self.violating_field().map(str::to_string);
            body
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}

//! HTTP handler for the safety check
//!
//! - POST /api/v1/safety/check : classify text, log detections

use crate::safety::classifier::{SafetyCheckResult, SafetyClassifier};
use crate::safety::keywords::KeywordCategory;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for safety handlers
#[derive(Clone)]
pub struct SafetyState {
    pub classifier: Arc<SafetyClassifier>,
}

/// Create the safety router
pub fn safety_router(state: SafetyState) -> Router {
    Router::new()
        .route("/api/v1/safety/check", post(check))
        .with_state(state)
}

/// Request body for a safety check.
///
/// Every field is kept untyped so that a malformed value can never turn
/// into a 422 and hide an advisory. Non-string `text` is not an
/// emergency; non-string `language` and `region` count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyCheckRequest {
    #[serde(default)]
    pub text: Option<serde_json::Value>,
    #[serde(default)]
    pub language: Option<serde_json::Value>,
    /// Coarse region (e.g. pincode) used only for detection logging
    #[serde(default)]
    pub region: Option<serde_json::Value>,
}

impl SafetyCheckRequest {
    /// Requested language, if given as a string
    pub fn language(&self) -> Option<&str> {
        string_field(self.language.as_ref())
    }

    /// Region hint, if given as a string
    pub fn region(&self) -> Option<&str> {
        string_field(self.region.as_ref())
    }
}

fn string_field(value: Option<&serde_json::Value>) -> Option<&str> {
    value.and_then(serde_json::Value::as_str)
}

/// Wire form of `SafetyCheckResult`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyCheckResponse {
    pub is_emergency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<KeywordCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory_text: Option<String>,
}

impl From<SafetyCheckResult> for SafetyCheckResponse {
    fn from(result: SafetyCheckResult) -> Self {
        match result {
            SafetyCheckResult::NoEmergency => Self {
                is_emergency: false,
                matched_keywords: None,
                categories: None,
                advisory_text: None,
            },
            SafetyCheckResult::Emergency {
                matched_keywords,
                advisory_text,
                categories,
            } => Self {
                is_emergency: true,
                matched_keywords: Some(matched_keywords),
                categories: Some(categories),
                advisory_text: Some(advisory_text.to_string()),
            },
        }
    }
}

/// POST /api/v1/safety/check
async fn check(
    State(state): State<SafetyState>,
    Json(request): Json<SafetyCheckRequest>,
) -> Json<SafetyCheckResponse> {
    let classifier = &state.classifier;
    let language = request
        .language()
        .unwrap_or_else(|| classifier.advisory().default_language());
    let result = classifier.classify_value(request.text.as_ref(), language);

    if result.is_emergency() {
        classifier.record_detection(result.matched_keywords(), request.region());
    }

    Json(result.into())
}

//! HTTP handler for constitution scoring
//!
//! - POST /api/v1/constitution/profile : compute a profile from answers

use crate::error::Result;
use crate::scoring::engine::ScoringEngine;
use crate::scoring::types::{ConstitutionProfile, QuizAnswer};
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for scoring handlers
#[derive(Clone)]
pub struct ScoringState {
    pub engine: Arc<ScoringEngine>,
}

/// Create the scoring router
pub fn scoring_router(state: ScoringState) -> Router {
    Router::new()
        .route("/api/v1/constitution/profile", post(compute_profile))
        .with_state(state)
}

/// Request body for profile computation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub subject_id: String,
    pub answers: Vec<QuizAnswer>,
}

/// POST /api/v1/constitution/profile
async fn compute_profile(
    State(state): State<ScoringState>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ConstitutionProfile>> {
    let profile = state
        .engine
        .compute_profile(&request.subject_id, &request.answers)?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn make_app() -> Router {
        scoring_router(ScoringState {
            engine: Arc::new(ScoringEngine::default()),
        })
    }

    async fn post_json(app: Router, body: serde_json::Value) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/constitution/profile")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_compute_profile_ok() {
        let body = serde_json::json!({
            "subjectId": "user-42",
            "answers": [
                {"questionId": 1, "answerValue": 5, "doshaWeights": {"vata": 1.0, "pitta": 0.2, "kapha": 0.1}},
                {"questionId": 2, "answerValue": 4, "doshaWeights": {"vata": 0.8, "pitta": 0.3, "kapha": 0.0}}
            ]
        });

        let resp = post_json(make_app(), body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["subjectId"], "user-42");
        assert_eq!(json["dominant"], "vata");
        assert_eq!(json["scores"]["vata"], 100.0);
    }

    #[tokio::test]
    async fn test_compute_profile_validation_error() {
        let body = serde_json::json!({ "subjectId": "user-42", "answers": [] });

        let resp = post_json(make_app(), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_compute_profile_out_of_range_answer() {
        let body = serde_json::json!({
            "subjectId": "user-42",
            "answers": [
                {"questionId": 9, "answerValue": 7, "doshaWeights": {"vata": 1.0, "pitta": 0.0, "kapha": 0.0}}
            ]
        });

        let resp = post_json(make_app(), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

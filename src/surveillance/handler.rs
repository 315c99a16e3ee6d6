//! HTTP handlers for symptom surveillance
//!
//! - POST /api/v1/surveillance/reports          : submit one report
//! - POST /api/v1/surveillance/reports/batch    : submit many, per-report rejection
//! - GET  /api/v1/surveillance/regions/:pincode : aggregate counts for a date window

use crate::error::{Error, Result};
use crate::privacy::{AnonymizedSymptomRecord, RawSymptomReport};
use crate::surveillance::aggregator::{RegionAggregate, RegionKey};
use crate::surveillance::intake::{BatchOutcome, IntakePipeline};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for surveillance handlers
#[derive(Clone)]
pub struct SurveillanceState {
    pub pipeline: Arc<IntakePipeline>,
}

/// Create the surveillance router
pub fn surveillance_router(state: SurveillanceState) -> Router {
    Router::new()
        .route("/api/v1/surveillance/reports", post(submit_report))
        .route("/api/v1/surveillance/reports/batch", post(submit_batch))
        .route("/api/v1/surveillance/regions/:pincode", get(region_aggregate))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    reports: Vec<RawSymptomReport>,
}

#[derive(Debug, Deserialize)]
struct RegionQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

/// POST /api/v1/surveillance/reports
async fn submit_report(
    State(state): State<SurveillanceState>,
    Json(report): Json<RawSymptomReport>,
) -> Result<(StatusCode, Json<AnonymizedSymptomRecord>)> {
    let record = state.pipeline.submit(&report).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/v1/surveillance/reports/batch
async fn submit_batch(
    State(state): State<SurveillanceState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchOutcome>> {
    let outcome = state.pipeline.submit_batch(&request.reports).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/surveillance/regions/:pincode?from=&to=
///
/// `to` defaults to `from`.
async fn region_aggregate(
    State(state): State<SurveillanceState>,
    Path(pincode): Path<String>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<RegionAggregate>> {
    let from = params
        .from
        .ok_or_else(|| Error::Validation("query parameter 'from' is required".to_string()))?;
    let key = RegionKey::new(pincode, from, params.to.unwrap_or(from))?;
    let aggregate = state.pipeline.region_aggregate(&key).await?;
    Ok(Json(aggregate))
}

//! HTTP API exposing the scoring pipeline to a presentation layer

use crate::error::ScoringError;
use crate::feature_catalog::{self, FeatureSpec};
use crate::guidance::{self, LevelGuidance, MEDICAL_DISCLAIMER};
use crate::metrics::{AssessmentMetrics, MetricsSnapshot};
use crate::models::{NormalRange, NormalRangeTable, RiskScorer};
use crate::types::{AssessmentReport, DiagnosisClass, FeatureVector, ScoringResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<RiskScorer>,
    pub ranges: Arc<NormalRangeTable>,
    pub metrics: Arc<AssessmentMetrics>,
}

impl AppState {
    pub fn new(
        scorer: Arc<RiskScorer>,
        ranges: Arc<NormalRangeTable>,
        metrics: Arc<AssessmentMetrics>,
    ) -> Self {
        Self {
            scorer,
            ranges,
            metrics,
        }
    }
}

/// Build the API router
pub fn router(state: AppState, allow_any_origin: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/model", get(model_info))
        .route("/api/features", get(features))
        .route("/api/assess", post(assess))
        .route("/api/recommendations", get(recommendations))
        .route("/api/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if allow_any_origin {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Request body for `POST /api/assess`.
///
/// Exactly one of `features` (keyed by name) or `values` (in the model's
/// feature order) must be present.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessRequest {
    pub features: Option<FeatureVector>,
    pub values: Option<Vec<f64>>,
}

/// Validated form of an [`AssessRequest`]
#[derive(Debug)]
pub enum AssessInput {
    Named(FeatureVector),
    Ordered(Vec<f64>),
}

impl TryFrom<AssessRequest> for AssessInput {
    type Error = ApiError;

    fn try_from(request: AssessRequest) -> Result<Self, Self::Error> {
        match (request.features, request.values) {
            (Some(features), None) => Ok(AssessInput::Named(features)),
            (None, Some(values)) => Ok(AssessInput::Ordered(values)),
            (Some(_), Some(_)) => Err(ApiError::InvalidInput(
                "provide either `features` or `values`, not both".to_string(),
            )),
            (None, None) => Err(ApiError::InvalidInput(
                "request must contain `features` or `values`".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Error returned from handlers
#[derive(Debug)]
pub enum ApiError {
    /// Body is not parseable JSON or has the wrong content type
    Malformed(String),
    /// Well-formed JSON whose contents cannot be scored
    InvalidInput(String),
    Scoring(ScoringError),
}

impl From<ScoringError> for ApiError {
    fn from(e: ScoringError) -> Self {
        ApiError::Scoring(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        match e {
            JsonRejection::JsonDataError(e) => ApiError::InvalidInput(e.body_text()),
            other => ApiError::Malformed(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, error) = match self {
            ApiError::Malformed(msg) => (StatusCode::BAD_REQUEST, "malformed_request", msg),
            ApiError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", msg),
            ApiError::Scoring(e) if e.is_invalid_input() => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", e.to_string())
            }
            ApiError::Scoring(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "inference_failed",
                e.to_string(),
            ),
        };
        (status, Json(ErrorBody { error, kind })).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    model_name: String,
    accuracy: f64,
    feature_names: Vec<String>,
    classes: Vec<DiagnosisClass>,
}

async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    let artifact = state.scorer.artifact();
    Json(ModelInfo {
        model_name: artifact.model_name().to_string(),
        accuracy: artifact.accuracy(),
        feature_names: artifact.feature_names().to_vec(),
        classes: artifact.classes().classes().to_vec(),
    })
}

#[derive(Debug, Serialize)]
struct FeatureField {
    #[serde(flatten)]
    spec: &'static FeatureSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    normal_range: Option<NormalRange>,
}

async fn features(State(state): State<AppState>) -> Json<Vec<FeatureField>> {
    Json(
        feature_catalog::feature_specs()
            .iter()
            .map(|spec| FeatureField {
                spec,
                normal_range: state.ranges.get(spec.name).copied(),
            })
            .collect(),
    )
}

async fn assess(
    State(state): State<AppState>,
    payload: Result<Json<AssessRequest>, JsonRejection>,
) -> Result<Json<AssessmentReport>, ApiError> {
    let input = payload
        .map_err(ApiError::from)
        .and_then(|Json(request)| AssessInput::try_from(request))
        .inspect_err(|e| {
            state.metrics.record_rejection();
            warn!(error = ?e, "Assessment request rejected");
        })?;
    let start = Instant::now();

    let scored: Result<(ScoringResult, FeatureVector), ScoringError> = match input {
        AssessInput::Named(features) => state.scorer.score(&features).map(|r| (r, features)),
        AssessInput::Ordered(values) => state.scorer.score_ordered(&values).and_then(|r| {
            let names = state.scorer.artifact().feature_names();
            Ok((r, FeatureVector::from_ordered(names, &values)?))
        }),
    };

    let (result, features) = match scored {
        Ok(scored) => scored,
        Err(e) => {
            if e.is_invalid_input() {
                state.metrics.record_rejection();
            }
            warn!(error = %e, "Assessment rejected");
            return Err(e.into());
        }
    };

    let elapsed = start.elapsed();
    state
        .metrics
        .record_assessment(elapsed, result.probability_malignant, result.risk_level);

    let report = AssessmentReport::new(
        result,
        state.scorer.artifact().summary(),
        state.scorer.thresholds(),
    )
    .with_range_flags(state.ranges.annotate(&features));

    info!(
        assessment_id = %report.assessment_id,
        probability = %report.probability_percent,
        risk_level = ?report.result.risk_level,
        out_of_range = report.out_of_range_count(),
        scoring_time_us = elapsed.as_micros(),
        "Assessment scored"
    );

    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct RecommendationsBody {
    levels: Vec<LevelGuidance>,
    disclaimer: &'static str,
}

async fn recommendations(State(state): State<AppState>) -> Json<RecommendationsBody> {
    let thresholds = state.scorer.thresholds();
    Json(RecommendationsBody {
        levels: guidance::all_levels(thresholds.moderate, thresholds.high),
        disclaimer: MEDICAL_DISCLAIMER,
    })
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

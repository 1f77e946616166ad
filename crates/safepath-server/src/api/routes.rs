//! REST API routes.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::api::request_id;
use crate::planner::{PlanError, Planner, TripRequest};
use crate::providers::UpstreamError;
use crate::state::AppState;
use safepath_core::{CancelToken, CandidateRoute, EngineError, Evaluation, HazardZone, SelectionPolicy};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/routes/evaluate", post(evaluate_routes))
        .route("/v1/routes/plan", post(plan_trip))
        .layer(middleware::from_fn(request_id::ensure_request_id))
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub routes: Vec<CandidateRoute>,
    #[serde(default)]
    pub hazard_zones: Vec<HazardZone>,
    #[serde(default)]
    pub policy: SelectionPolicy,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Score caller-supplied routes against caller-supplied hazard zones.
async fn evaluate_routes(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<Evaluation>, ApiError> {
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());

    tracing::debug!(
        routes = request.routes.len(),
        zones = request.hazard_zones.len(),
        "evaluate request"
    );
    let evaluation = with_deadline(
        state.config.evaluate_timeout(),
        &cancel,
        state
            .evaluator
            .evaluate(request.routes, request.hazard_zones, request.policy, &cancel),
    )
    .await??;
    Ok(Json(evaluation))
}

/// Resolve a trip, fetch routes and hazard data upstream, then evaluate.
async fn plan_trip(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TripRequest>,
) -> Result<Json<Evaluation>, ApiError> {
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());

    let planner = Planner {
        routing: &state.routing,
        hazards: &state.hazards,
        geocoder: &state.geocoder,
        evaluator: &state.evaluator,
    };
    let evaluation = with_deadline(
        state.config.plan_timeout(),
        &cancel,
        planner.plan(request, &cancel),
    )
    .await??;
    Ok(Json(evaluation))
}

/// Cancels in-flight scoring when the handler future is dropped, which is
/// what happens when the client disconnects.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

async fn with_deadline<T>(
    limit: Duration,
    cancel: &CancelToken,
    work: impl Future<Output = T>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(limit, work).await {
        Ok(output) => Ok(output),
        Err(_) => {
            cancel.cancel();
            tracing::warn!(limit_ms = limit.as_millis() as u64, "request deadline exceeded");
            Err(ApiError::Timeout)
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    Upstream(UpstreamError),
    Timeout,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Engine(err) => Self::Engine(err),
            PlanError::Upstream(err) => Self::Upstream(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Engine(EngineError::Cancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "evaluation cancelled" }),
            ),
            ApiError::Engine(EngineError::TaskFailed(detail)) => {
                tracing::error!(%detail, "scoring task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "route scoring failed" }),
                )
            }
            ApiError::Engine(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string() }),
            ),
            ApiError::Upstream(err) => {
                tracing::warn!(upstream = %err.upstream(), error = %err, "upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": err.user_message(),
                        "upstream": err.upstream().to_string(),
                        "detail": err.to_string(),
                    }),
                )
            }
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({ "error": "evaluation timed out" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

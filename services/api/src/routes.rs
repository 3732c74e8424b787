use crate::infra::{deserialize_optional_date, AppState};
use ar_priority::error::AppError;
use ar_priority::prioritization::report::views::{
    AgingSummaryEntry, FormattedTotals, PortfolioTotals, RankedItemView, TopConcentration,
};
use ar_priority::prioritization::{PolicyWeights, Worklist};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

const EXPORT_FILE_NAME: &str = "top_items_to_process.csv";

/// Weights are optional and fall back to 0.4 / 0.3 / 0.2.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorklistRequest {
    #[serde(default)]
    pub(crate) transaction_w: Option<f64>,
    #[serde(default)]
    pub(crate) ops_w: Option<f64>,
    #[serde(default)]
    pub(crate) data_w: Option<f64>,
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WeightsView {
    #[serde(flatten)]
    pub(crate) policy: PolicyWeights,
    pub(crate) total: f64,
    pub(crate) overallocated: bool,
}

impl From<&PolicyWeights> for WeightsView {
    fn from(weights: &PolicyWeights) -> Self {
        Self {
            policy: *weights,
            total: weights.total(),
            overallocated: weights.is_overallocated(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WorklistResponse {
    pub(crate) today: NaiveDate,
    pub(crate) weights: WeightsView,
    pub(crate) totals: PortfolioTotals,
    pub(crate) formatted: FormattedTotals,
    pub(crate) aging: Vec<AgingSummaryEntry>,
    pub(crate) concentration: TopConcentration,
    pub(crate) items: Vec<RankedItemView>,
}

pub(crate) fn worklist_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/worklist", axum::routing::post(worklist_endpoint))
        .route(
            "/api/v1/worklist/export",
            axum::routing::post(worklist_export_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn worklist_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<WorklistRequest>,
) -> Result<Json<WorklistResponse>, AppError> {
    let (worklist, top_n) = compute_worklist(state, payload).await?;
    let summary = worklist.summary(top_n);

    Ok(Json(WorklistResponse {
        today: worklist.today(),
        weights: WeightsView::from(worklist.weights()),
        totals: summary.totals,
        formatted: summary.formatted,
        aging: summary.aging,
        concentration: summary.concentration,
        items: summary.top_items,
    }))
}

pub(crate) async fn worklist_export_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<WorklistRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (worklist, top_n) = compute_worklist(state, payload).await?;
    let mut body = Vec::new();
    worklist.write_csv(top_n, &mut body)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

/// Runs the load and compute on the blocking pool.
async fn compute_worklist(
    state: AppState,
    request: WorklistRequest,
) -> Result<(Worklist, usize), AppError> {
    tokio::task::spawn_blocking(move || build_worklist(&state, request))
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?
}

fn build_worklist(
    state: &AppState,
    request: WorklistRequest,
) -> Result<(Worklist, usize), AppError> {
    let WorklistRequest {
        transaction_w,
        ops_w,
        data_w,
        top_n,
        today,
    } = request;

    let weights = PolicyWeights::from_optional(transaction_w, ops_w, data_w)?;
    let table = state.store.table()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let top_n = top_n.filter(|n| *n > 0).unwrap_or(state.default_top_n);

    Ok((Worklist::compute(&table, weights, today), top_n))
}

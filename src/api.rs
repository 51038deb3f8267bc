use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::models::{DailyAggregate, EnergyRecord};
use crate::services::report_service::{RecordCountResponse, RecordListResponse, RecordQuery};
use crate::services::ReportService;

/// Path the raw report is served at, as the converter writes it
pub const REPORT_ASSET_PATH: &str = "/assets/energy-report.json";

#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/records", get(get_records))
        .route("/records/count", get(get_record_count))
        .route("/daily-consumption", get(get_daily_consumption));

    Router::new()
        .route(REPORT_ASSET_PATH, get(get_report_asset))
        .nest("/api/v1", api_routes)
        .with_state(state)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_report_asset(State(state): State<AppState>) -> Json<Vec<EnergyRecord>> {
    let records = state.report_service.records().to_vec();
    debug!("Serving energy report with {} records", records.len());
    Json(records)
}

#[instrument(skip(state))]
async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> Json<RecordListResponse> {
    debug!(
        "Fetching records (page={}, page_size={}, sort_by={:?}, order={:?})",
        query.page, query.page_size, query.sort_by, query.order
    );

    let response = state.report_service.get_records_page(&query);

    info!(
        "Retrieved {} records (page {}/{}, total={})",
        response.records.len(),
        response.page,
        response.total_pages,
        response.total_records
    );

    Json(response)
}

#[instrument(skip(state))]
async fn get_record_count(State(state): State<AppState>) -> Json<RecordCountResponse> {
    let count = state.report_service.record_count();
    debug!("Record count: {}", count.count);
    Json(count)
}

#[instrument(skip(state))]
async fn get_daily_consumption(State(state): State<AppState>) -> Json<Vec<DailyAggregate>> {
    let daily = state.report_service.daily_consumption();
    info!("Aggregated consumption into {} days", daily.len());
    Json(daily)
}

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::{
    MetricColumn, MetricsHistory, ResetConfirmation, ResetOutcome, TrendQuery, UploadSummary,
    WellHistory, WellHistoryQuery, parse_metric_columns,
};
use crate::common::errors::{ReportError, ReportResult};
use crate::common::state::AppState;
use crate::services::trend::TrendPoint;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(upload_report))
        .routes(routes!(get_metrics_history))
        .routes(routes!(get_well_history))
        .routes(routes!(get_trend))
        .routes(routes!(reset_history))
        .layer(DefaultBodyLimit::max(30 * 1024 * 1024)) // 30MB limit for report uploads
        .with_state(state.clone())
}

/// Run store work off the async runtime. The service serializes access to
/// the stores itself.
async fn run_blocking<T, F>(task: F) -> ReportResult<T>
where
    F: FnOnce() -> ReportResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ReportError::Internal {
            message: format!("ingestion task failed: {e}"),
        })?
}

/// Upload a daily operation report and merge it into history
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = String, description = "DOR workbook as multipart/form-data (field 'file')", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Report ingested", body = UploadSummary),
        (status = 400, description = "Missing or unreadable file"),
        (status = 422, description = "Report date or sheet layout is not as expected"),
        (status = 500, description = "History could not be saved")
    ),
    tag = "reports"
)]
pub async fn upload_report(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ReportResult<Json<UploadSummary>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReportError::InvalidUpload {
            message: format!("multipart error: {e}"),
        })?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" || field_name == "report_file" {
            file_name = field.file_name().map(std::string::ToString::to_string);
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ReportError::InvalidUpload {
                        message: format!("failed to read file data: {e}"),
                    })?
                    .to_vec(),
            );
            break;
        }
    }

    let file_data = file_data.ok_or_else(|| ReportError::InvalidUpload {
        message: "no report file found in request".to_string(),
    })?;
    let file_name = file_name.unwrap_or_else(|| "uploaded_report.xlsx".to_string());

    tracing::info!("Received '{file_name}' ({} bytes)", file_data.len());

    let service = state.report_service.clone();
    let summary = run_blocking(move || service.ingest(&file_name, file_data)).await?;
    Ok(Json(summary))
}

/// Metrics history, one row per report date
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Metrics history sorted by date", body = MetricsHistory),
        (status = 500, description = "History could not be read")
    ),
    tag = "reports"
)]
pub async fn get_metrics_history(State(state): State<AppState>) -> ReportResult<Json<MetricsHistory>> {
    let service = state.report_service.clone();
    run_blocking(move || service.metrics_history()).await.map(Json)
}

/// Well status history, optionally for a single report date
#[utoipa::path(
    get,
    path = "/wells",
    params(WellHistoryQuery),
    responses(
        (status = 200, description = "Well history sorted by date", body = WellHistory),
        (status = 500, description = "History could not be read")
    ),
    tag = "reports"
)]
pub async fn get_well_history(
    State(state): State<AppState>,
    Query(query): Query<WellHistoryQuery>,
) -> ReportResult<Json<WellHistory>> {
    let service = state.report_service.clone();
    run_blocking(move || service.well_history(query.date))
        .await
        .map(Json)
}

/// Metrics trend for charting
#[utoipa::path(
    get,
    path = "/trend",
    params(TrendQuery),
    responses(
        (status = 200, description = "Series sorted ascending by date", body = Vec<TrendPoint>),
        (status = 400, description = "Unknown metric column")
    ),
    tag = "reports"
)]
pub async fn get_trend(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> ReportResult<Json<Vec<TrendPoint>>> {
    let columns = match query.columns.as_deref() {
        Some(raw) => parse_metric_columns(raw)?,
        None => vec![MetricColumn::TotalGasClosing],
    };

    let service = state.report_service.clone();
    run_blocking(move || service.trend(&columns)).await.map(Json)
}

/// Permanently delete both history tables
#[utoipa::path(
    post,
    path = "/reset",
    request_body = ResetConfirmation,
    responses(
        (status = 200, description = "Both history tables cleared", body = ResetOutcome),
        (status = 400, description = "Reset was not confirmed"),
        (status = 500, description = "A history table could not be deleted")
    ),
    tag = "reports"
)]
pub async fn reset_history(
    State(state): State<AppState>,
    Json(confirmation): Json<ResetConfirmation>,
) -> ReportResult<Json<ResetOutcome>> {
    let service = state.report_service.clone();
    run_blocking(move || service.reset(&confirmation))
        .await
        .map(Json)
}

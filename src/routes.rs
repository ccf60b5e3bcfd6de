use crate::common::state::AppState;
use crate::config::Config;
use crate::reports;
use crate::reports::services::ReportService;
use crate::storage::history::HistoryStores;
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(config: &Config, stores: HistoryStores) -> Router {
    #[derive(OpenApi)]
    #[openapi(info(
        title = "DOR Trending API",
        description = "Daily operation report ingestion and trending"
    ))]
    struct ApiDoc;

    let report_service = ReportService::new(
        stores,
        config.upload_dir.clone(),
        config.well_replace_policy,
    );
    let app_state = AppState::new(config.clone(), report_service);

    // Build the router with OpenAPI documentation
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state)) // Root routes
        .nest("/api/reports", reports::views::router(&app_state))
        .split_for_parts();

    router.merge(Scalar::with_url("/api/docs", api))
}

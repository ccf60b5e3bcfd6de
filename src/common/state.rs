use crate::config::Config;
use crate::reports::services::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(config: Config, report_service: ReportService) -> Self {
        Self {
            config,
            report_service,
        }
    }
}

use crate::config::Config;
use crate::reports::models::MetricColumn;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Serialize, Default)]
pub struct UIConfiguration {
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub deployment: String,
    #[serde(rename = "defaultTrendMetric")]
    pub default_trend_metric: String,
    #[serde(rename = "wellReplacePolicy")]
    pub well_replace_policy: String,
}

impl UIConfiguration {
    pub fn new(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            field_name: config.field_name.clone(),
            deployment: config.deployment.clone(),
            default_trend_metric: MetricColumn::TotalGasClosing.name().to_string(),
            well_replace_policy: config.well_replace_policy.to_string(),
        }
    }
}

#[derive(ToSchema, Deserialize, Serialize)]
pub struct HealthCheck {
    pub status: String,
}

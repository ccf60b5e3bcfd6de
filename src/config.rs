use crate::services::processing::reconcile::WellReplacePolicy;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub deployment: String,
    pub field_name: String,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub bind_address: String,
    pub well_replace_policy: WellReplacePolicy,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available

        let well_replace_policy = match env::var("WELL_REPLACE_POLICY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!("{e}; using partial replacement");
                WellReplacePolicy::default()
            }),
            Err(_) => WellReplacePolicy::default(),
        };

        Config {
            app_name: env_or("APP_NAME", "dor-trending"),
            deployment: env_or("DEPLOYMENT", "local"),
            field_name: env_or("FIELD_NAME", "Tangga Barat Gas Field"),
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0:3000"),
            well_replace_policy,
        }
    }

    #[cfg(test)]
    pub fn for_tests(root: &std::path::Path) -> Self {
        Config {
            app_name: "dor-trending-test".to_string(),
            deployment: "test".to_string(),
            field_name: "Test Gas Field".to_string(),
            data_dir: root.join("data"),
            upload_dir: root.join("uploads"),
            bind_address: "127.0.0.1:0".to_string(),
            well_replace_policy: WellReplacePolicy::Partial,
        }
    }
}

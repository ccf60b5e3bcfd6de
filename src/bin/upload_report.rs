//! DOR batch uploader
//!
//! Sends one or more daily operation reports to a running dor-trending
//! server, in the order given, and stops at the first report the server
//! rejects.
//!
//! Usage:
//!   `cargo run --bin upload_report -- --url http://localhost:3000 reports/*.xlsx`

use clap::{Arg, ArgAction, Command};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, multipart};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";

struct Uploader {
    base_url: String,
    client: Client,
}

impl Uploader {
    fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(120)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn upload(&self, path: &Path) -> anyhow::Result<Value> {
        let url = format!("{}/api/reports/upload", self.base_url);
        let file_content = fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("report.xlsx")
            .to_string();
        let mime = if file_name.to_lowercase().ends_with(".xls") {
            XLS_MIME
        } else {
            XLSX_MIME
        };

        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(file_content)
                .file_name(file_name)
                .mime_str(mime)?,
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(ToString::to_string))
            .unwrap_or(body);
        anyhow::bail!("HTTP {status}: {message}")
    }
}

fn spinner(file: &Path) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Uploading {}...", file.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("DOR Uploader")
        .version("1.0")
        .about("Uploads daily operation reports to a dor-trending server")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("API base URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .help("Report workbooks, uploaded in the order given")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    let base_url = matches
        .get_one::<String>("url")
        .map_or("http://localhost:3000", String::as_str);
    let files: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(Iterator::collect)
        .unwrap_or_default();

    println!("{}", style("DOR Uploader v1.0").bold());
    println!("{}", style("-".repeat(40)).dim());
    println!("API URL: {}", style(base_url).cyan());

    let uploader = Uploader::new(base_url)?;
    let total = files.len();

    for (index, file) in files.into_iter().enumerate() {
        let step = style(format!("[{}/{total}]", index + 1)).bold().dim();
        let pb = spinner(file);

        match uploader.upload(file).await {
            Ok(summary) => {
                pb.finish_and_clear();
                println!(
                    "{step} {} {} -> {} ({} wells, {} well rows in history)",
                    style("OK").green(),
                    file.display(),
                    style(summary["report_date"].as_str().unwrap_or("?")).bold(),
                    summary["wells"].as_array().map_or(0, Vec::len),
                    summary["well_history_len"].as_u64().unwrap_or(0),
                );
            }
            Err(e) => {
                pb.finish_and_clear();
                println!(
                    "{step} {} {}: {e}",
                    style("FAILED").red().bold(),
                    file.display()
                );
                println!(
                    "{}",
                    style("Stopping; remaining reports were not uploaded").yellow()
                );
                std::process::exit(1);
            }
        }
    }

    println!("{} {total} report(s) uploaded", style("Done:").green().bold());
    Ok(())
}

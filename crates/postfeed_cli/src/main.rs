//! One-shot request runner over a local postfeed database.
//!
//! # Responsibility
//! - Resolve config from environment and flags.
//! - Dispatch exactly one request through `postfeed_core::handle`.
//! - Print the status line and pretty JSON body; exit non-zero on 4xx/5xx.

use clap::Parser;
use postfeed_core::config::{LOG_DIR_ENV, LOG_LEVEL_ENV};
use postfeed_core::db::open_db;
use postfeed_core::{handle, init_logging, init_stderr_logging, ApiRequest, Method, ServiceConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "postfeed")]
#[command(about = "Run one author/post request against a local database", long_about = None)]
struct Cli {
    /// HTTP-style method: GET, POST, PUT or DELETE
    method: String,

    /// Request path without a query string, e.g. /feed or /post/3/views
    path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_parser = parse_key_value)]
    query: Vec<(String, String)>,

    /// JSON request body
    #[arg(short, long)]
    body: Option<String>,

    /// SQLite database file (overrides POSTFEED_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (overrides POSTFEED_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute rolling-log directory (overrides POSTFEED_LOG_DIR)
    #[arg(long)]
    log_dir: Option<String>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("postfeed: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let mut config = ServiceConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level.as_deref() {
        config
            .set_log_level(level, LOG_LEVEL_ENV)
            .map_err(|err| err.to_string())?;
    }
    if let Some(dir) = cli.log_dir.as_deref() {
        config
            .set_log_dir(dir, LOG_DIR_ENV)
            .map_err(|err| err.to_string())?;
    }

    match config.log_dir.as_deref().and_then(|dir| dir.to_str()) {
        Some(dir) => init_logging(config.log_level, dir)?,
        None => init_stderr_logging(config.log_level)?,
    }

    let method =
        Method::parse(&cli.method).ok_or_else(|| format!("unsupported method `{}`", cli.method))?;
    let mut request = ApiRequest::new(method, cli.path);
    for (key, value) in cli.query {
        request = request.with_query(key, value);
    }
    if let Some(body) = cli.body.as_deref() {
        let value =
            serde_json::from_str(body).map_err(|err| format!("body is not valid JSON: {err}"))?;
        request = request.with_body(value);
    }

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let response = handle(&conn, &request);
    log::debug!("event=cli_request module=cli status={}", response.status);

    let rendered = serde_json::to_string_pretty(&response.body).map_err(|err| err.to_string())?;
    println!("{}", response.status);
    println!("{rendered}");

    Ok(if response.status < 400 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

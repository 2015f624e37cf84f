//! Vigil - SQL Injection Scanner CLI

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

use vigil::config;
use vigil::error::Result;
use vigil::http::HttpClient;
use vigil::models::{ParameterizedRequest, ScanConfig, ScannerOptions, Severity};
use vigil::scanner::sqli::harness::Params;
use vigil::scanner::ScanEngine;

/// Vigil - black-box SQL injection scanner
#[derive(Parser)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    /// Target URL; for GET requests its query parameters become probe candidates
    #[arg(short, long)]
    target: String,

    /// HTTP method (GET or POST)
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// URL-encoded form body for POST requests
    #[arg(short, long, default_value = "")]
    data: String,

    /// Parameter names to probe (comma-separated; defaults to every parameter present)
    #[arg(short, long, value_delimiter = ',')]
    params: Option<Vec<String>>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Max requests per second
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Custom headers (format: "Key: Value")
    #[arg(short = 'H', long)]
    header: Option<Vec<String>>,

    /// Write the scan result as JSON to this path instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut scan_config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ScanConfig::default(),
    };
    config::merge_cli_args(
        &mut scan_config,
        cli.target.clone(),
        cli.timeout,
        cli.rate_limit,
        cli.header.clone(),
    );

    let method = cli.method.to_uppercase();
    let param_names = match cli.params.clone() {
        Some(p) => p,
        None => discovered_param_names(&method, &cli.target, &cli.data)?,
    };

    let request = ParameterizedRequest {
        method,
        url: cli.target.clone(),
        form_post_data: cli.data.clone(),
        param_names,
    };

    let client = HttpClient::from_config(&scan_config)?;
    let engine = ScanEngine::with_defaults();
    let result = engine
        .run(&client, &[request], &ScannerOptions::default())
        .await?;

    println!();
    println!(
        "{} {} finding(s), {} HTTP request(s) sent",
        "Scan finished:".bold(),
        result.findings.len(),
        result.total_requests
    );
    let high = result.count_by_severity(&Severity::High);
    if high > 0 {
        println!("{}", format!("  HIGH: {high}").bright_red());
    }

    let json = serde_json::to_string_pretty(&result)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Derives probe candidates from the query string or form body
fn discovered_param_names(method: &str, target: &str, data: &str) -> Result<Vec<String>> {
    let params = if method == "POST" {
        Params::parse(data)
    } else {
        let parsed = Url::parse(target)?;
        Params::parse(parsed.query().unwrap_or(""))
    };
    Ok(params.names().iter().map(|n| n.to_string()).collect())
}

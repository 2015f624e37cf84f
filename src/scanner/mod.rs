//! Scanner engine and trait definitions

pub mod sqli;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{ParameterizedRequest, ScanResult, ScannerOptions, VulnerabilityResult};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{error, info};

/// Trait that all detector modules must implement
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Returns the detector name
    fn name(&self) -> &str;

    /// Probes one parameterized request and returns confirmed findings
    async fn scan(
        &self,
        req: &ParameterizedRequest,
        client: &HttpClient,
        opts: &ScannerOptions,
    ) -> Result<Vec<VulnerabilityResult>>;
}

/// Orchestrates the execution of all registered detectors over the
/// requests produced by the crawler
pub struct ScanEngine {
    scanners: Vec<Arc<dyn Scanner>>,
}

impl ScanEngine {
    /// Creates a new ScanEngine with no registered detectors
    pub fn new() -> Self {
        Self {
            scanners: Vec::new(),
        }
    }

    /// Creates a ScanEngine with all default detectors registered
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register(Arc::new(sqli::SqliScanner::new()));
        engine
    }

    /// Registers a new detector module
    pub fn register(&mut self, scanner: Arc<dyn Scanner>) {
        self.scanners.push(scanner);
    }

    /// Returns the names of all registered detectors
    pub fn list_modules(&self) -> Vec<&str> {
        self.scanners.iter().map(|s| s.name()).collect()
    }

    /// Runs every registered detector against every request, sequentially.
    ///
    /// A failing detector is logged and skipped; it never aborts the run.
    pub async fn run(
        &self,
        client: &HttpClient,
        requests: &[ParameterizedRequest],
        opts: &ScannerOptions,
    ) -> Result<ScanResult> {
        let mut result = ScanResult::new();
        result.requests_scanned = requests.len();

        let pb = ProgressBar::new((requests.len() * self.scanners.len()) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        for req in requests {
            for scanner in &self.scanners {
                pb.set_message(format!("Running {}...", scanner.name()));
                info!("Executing detector '{}' on {}", scanner.name(), req.url);

                match scanner.scan(req, client, opts).await {
                    Ok(findings) => {
                        info!(
                            "Detector '{}' completed: {} findings",
                            scanner.name(),
                            findings.len()
                        );
                        result.findings.extend(findings);
                    }
                    Err(e) => {
                        error!("Detector '{}' failed: {}", scanner.name(), e);
                    }
                }

                pb.inc(1);
            }
        }

        result.total_requests = client.request_count();
        result.finish();
        pb.finish_with_message("Scan complete");

        Ok(result)
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

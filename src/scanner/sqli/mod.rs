//! SQL injection detector
//!
//! Runs five probes per parameter in a fixed priority pipeline:
//! error signature, time delay, boolean differential, content length,
//! and auth bypass. The first probe to confirm a hit wins and the
//! dispatcher moves on to the next parameter.

mod auth;
mod boolean;
pub mod compare;
mod content;
mod error;
pub mod harness;
mod time;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{ParameterizedRequest, ScannerOptions, VulnerabilityResult};
use async_trait::async_trait;
use tracing::debug;

/// Detector name reported to the registry
pub const SCANNER_NAME: &str = "Advanced SQL Injection Scanner";

/// Parameters never probed: anti-CSRF machinery whose values are
/// single-use and trip differential checks
const IGNORED_PARAMS: &[&str] = &["csrf", "token", "_token", "csrf_token", "_csrf_token"];

/// Path substrings with a history of false positives. Login pages stay
/// scannable so the auth-bypass probe can target them.
const EXCLUDED_PATHS: &[&str] = &["/comment", "/register"];

/// Shared per-call context handed to each probe
struct ProbeContext<'a> {
    req: &'a ParameterizedRequest,
    client: &'a HttpClient,
}

/// One detection strategy. Probes hold no state; their only observable
/// effects are HTTP calls and log lines. Transport errors are absorbed
/// as absence of evidence.
#[async_trait]
trait Probe: Sync {
    async fn probe(&self, cx: &ProbeContext<'_>, param: &str) -> Option<VulnerabilityResult>;
}

/// SQL injection detector for parameterized GET/POST requests
pub struct SqliScanner;

impl SqliScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Scanner for SqliScanner {
    fn name(&self) -> &str {
        SCANNER_NAME
    }

    async fn scan(
        &self,
        req: &ParameterizedRequest,
        client: &HttpClient,
        _opts: &ScannerOptions,
    ) -> Result<Vec<VulnerabilityResult>> {
        let mut findings = Vec::new();

        if req.method != "GET" && req.method != "POST" {
            return Ok(findings);
        }
        if EXCLUDED_PATHS.iter().any(|p| req.url.contains(p)) {
            return Ok(findings);
        }

        // Priority reflects confidence: error signatures are the least
        // ambiguous, auth bypass the most heuristic.
        let probes: [&dyn Probe; 5] = [
            &error::ErrorProbe,
            &time::TimeProbe,
            &boolean::BooleanProbe,
            &content::ContentProbe,
            &auth::AuthBypassProbe,
        ];
        let cx = ProbeContext { req, client };

        for param in &req.param_names {
            if IGNORED_PARAMS.contains(&param.to_lowercase().as_str()) {
                continue;
            }

            debug!("SQLi: testing parameter '{}' in {}", param, req.url);

            for probe in probes {
                if let Some(finding) = probe.probe(&cx, param).await {
                    findings.push(finding);
                    break;
                }
            }
        }

        Ok(findings)
    }
}

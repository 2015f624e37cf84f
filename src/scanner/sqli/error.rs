//! Error-signature probe: inject payloads and match database error
//! signatures leaked into the response body

use super::{harness, Probe, ProbeContext, SCANNER_NAME};
use crate::models::VulnerabilityResult;
use crate::payloads::{SQLI_ERROR_PATTERNS, SQLI_ERROR_PAYLOADS};
use async_trait::async_trait;
use tracing::info;

pub(super) struct ErrorProbe;

#[async_trait]
impl Probe for ErrorProbe {
    async fn probe(&self, cx: &ProbeContext<'_>, param: &str) -> Option<VulnerabilityResult> {
        for payload in SQLI_ERROR_PAYLOADS {
            let mut test_params = match harness::original_params(cx.req) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let original_value = test_params.get(param).unwrap_or_default().to_string();
            test_params.set(param, format!("{original_value}{payload}"));

            let (_, body) = match harness::send_request(cx.req, cx.client, &test_params).await {
                Ok(r) => r,
                Err(_) => continue,
            };

            for pattern in SQLI_ERROR_PATTERNS.iter() {
                if let Some(matched) = pattern.find(&body) {
                    info!(
                        "SQLi (Error-Based): found pattern '{}' for param '{}'",
                        pattern.as_str(),
                        param
                    );
                    let test_url = harness::build_components(cx.req, &test_params)
                        .map(|(url, _)| url)
                        .unwrap_or_else(|_| cx.req.url.clone());
                    return Some(
                        VulnerabilityResult::new(
                            "SQL Injection (Error-Based)",
                            test_url,
                            param,
                            *payload,
                            harness::param_location(cx.req),
                            SCANNER_NAME,
                        )
                        .with_details(
                            "A database error message was detected in the response, \
                             indicating a potential SQL injection vulnerability.",
                        )
                        .with_evidence(matched.as_str()),
                    );
                }
            }
        }

        None
    }
}

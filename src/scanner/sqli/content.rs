//! Content-length probe: a successful filter bypass on a listing
//! endpoint returns many extra rows, inflating the body well past the
//! growth threshold

use super::{harness, Probe, ProbeContext, SCANNER_NAME};
use crate::models::VulnerabilityResult;
use async_trait::async_trait;
use tracing::info;

/// Filter-bypass payloads checked for body growth. The overlap with the
/// error catalog is intentional; it widens detection breadth.
const BYPASS_PAYLOADS: &[&str] = &[
    "' OR 1=1--",
    "' OR '1'='1'--",
    " OR 1=1--",
    "') OR 1=1--",
    " OR 1=1#",
    "' OR 1=1#",
];

/// Body growth beyond this ratio counts as a hit
const GROWTH_RATIO: f64 = 1.1;

pub(super) struct ContentProbe;

#[async_trait]
impl Probe for ContentProbe {
    async fn probe(&self, cx: &ProbeContext<'_>, param: &str) -> Option<VulnerabilityResult> {
        let original_params = match harness::original_params(cx.req) {
            Ok(p) => p,
            Err(_) => return None,
        };
        let (_, original_body) =
            match harness::send_request(cx.req, cx.client, &original_params).await {
                Ok(r) => r,
                Err(_) => return None,
            };
        let original_length = original_body.len();
        let original_value = original_params.get(param).unwrap_or_default().to_string();

        for payload in BYPASS_PAYLOADS {
            let mut test_params = original_params.clone();
            test_params.set(param, format!("{original_value}{payload}"));

            let (_, modified_body) =
                match harness::send_request(cx.req, cx.client, &test_params).await {
                    Ok(r) => r,
                    Err(_) => continue,
                };
            let modified_length = modified_body.len();

            if modified_length > original_length
                && modified_length as f64 > original_length as f64 * GROWTH_RATIO
            {
                info!(
                    "SQLi (Content-Based): detected significant content length increase for param '{}'",
                    param
                );
                let test_url = harness::build_components(cx.req, &test_params)
                    .map(|(url, _)| url)
                    .unwrap_or_else(|_| cx.req.url.clone());
                return Some(
                    VulnerabilityResult::new(
                        "SQL Injection (Content-Based)",
                        test_url,
                        param,
                        *payload,
                        harness::param_location(cx.req),
                        SCANNER_NAME,
                    )
                    .with_details(format!(
                        "The response length increased significantly (from {original_length} to \
                         {modified_length} bytes) after injecting a bypass payload, suggesting \
                         the query returned additional data."
                    ))
                    .with_evidence(format!(
                        "Original Length: {original_length}, Injected Length: {modified_length}"
                    )),
                );
            }
        }

        None
    }
}

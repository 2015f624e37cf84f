//! Boolean-differential probe: a TRUE condition must leave the page
//! unchanged while the paired FALSE condition must alter it
//!
//! The two-sided test is the false-positive control: requiring that the
//! TRUE response still looks like the original rules out servers that
//! perturb responses on any input.

use super::{compare, harness, Probe, ProbeContext, SCANNER_NAME};
use crate::models::VulnerabilityResult;
use crate::payloads::BOOLEAN_TESTS;
use async_trait::async_trait;
use tracing::info;

pub(super) struct BooleanProbe;

#[async_trait]
impl Probe for BooleanProbe {
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
        let original_value = original_params.get(param).unwrap_or_default().to_string();

        for test in BOOLEAN_TESTS {
            let mut true_params = original_params.clone();
            true_params.set(param, format!("{original_value}{}", test.true_payload));
            let (_, true_body) = match harness::send_request(cx.req, cx.client, &true_params).await
            {
                Ok(r) => r,
                Err(_) => continue,
            };

            let mut false_params = original_params.clone();
            false_params.set(param, format!("{original_value}{}", test.false_payload));
            let (_, false_body) =
                match harness::send_request(cx.req, cx.client, &false_params).await {
                    Ok(r) => r,
                    Err(_) => continue,
                };

            if !compare::is_different(&original_body, &true_body)
                && compare::is_different(&original_body, &false_body)
            {
                info!(
                    "SQLi (Boolean-Based): detected differential response for param '{}'",
                    param
                );
                let test_url = harness::build_components(cx.req, &true_params)
                    .map(|(url, _)| url)
                    .unwrap_or_else(|_| cx.req.url.clone());
                return Some(
                    VulnerabilityResult::new(
                        "SQL Injection (Boolean-Based)",
                        test_url,
                        param,
                        test.true_payload,
                        harness::param_location(cx.req),
                        SCANNER_NAME,
                    )
                    .with_details(
                        "The application's response was different when a logically false \
                         SQL condition was injected compared to a true one.",
                    )
                    .with_evidence(
                        "Response for TRUE condition was similar to original, while \
                         response for FALSE was different.",
                    ),
                );
            }
        }

        None
    }
}

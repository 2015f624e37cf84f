//! Time-delay probe: inject sleep payloads and compare elapsed time
//! against an uninjected baseline

use super::{harness, Probe, ProbeContext, SCANNER_NAME};
use crate::models::VulnerabilityResult;
use crate::payloads::TIME_BASED_TESTS;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Seconds substituted for the `{DELAY}` token
const DELAY_SECS: u64 = 5;

/// Required excess over the baseline; leaves one second of jitter
/// tolerance against the five-second target
const DELAY_MARGIN: Duration = Duration::from_secs(4);

pub(super) struct TimeProbe;

#[async_trait]
impl Probe for TimeProbe {
    async fn probe(&self, cx: &ProbeContext<'_>, param: &str) -> Option<VulnerabilityResult> {
        // Baseline with the original parameters, no injection
        let baseline = match harness::measure_duration(cx.req, cx.client, None).await {
            Ok(d) => d,
            Err(_) => return None,
        };

        for test in TIME_BASED_TESTS {
            let mut test_params = match harness::original_params(cx.req) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let original_value = test_params.get(param).unwrap_or_default().to_string();
            let payload = test
                .payload_template
                .replace("{DELAY}", &DELAY_SECS.to_string());
            test_params.set(param, format!("{original_value}{payload}"));

            let elapsed =
                match harness::measure_duration(cx.req, cx.client, Some(&test_params)).await {
                    Ok(d) => d,
                    Err(_) => continue,
                };

            if elapsed > baseline + DELAY_MARGIN {
                info!(
                    "SQLi (Time-Based): detected significant delay for param '{}'",
                    param
                );
                let test_url = harness::build_components(cx.req, &test_params)
                    .map(|(url, _)| url)
                    .unwrap_or_else(|_| cx.req.url.clone());
                return Some(
                    VulnerabilityResult::new(
                        "SQL Injection (Time-Based)",
                        test_url,
                        param,
                        payload,
                        harness::param_location(cx.req),
                        SCANNER_NAME,
                    )
                    .with_details(format!(
                        "A time delay of {:.2} seconds was detected (baseline: {:.2} seconds).",
                        elapsed.as_secs_f64(),
                        baseline.as_secs_f64()
                    ))
                    .with_evidence(format!("Response time: {elapsed:?}")),
                );
            }
        }

        None
    }
}

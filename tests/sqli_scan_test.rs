//! End-to-end tests for the SQL injection detector against mock servers

use std::sync::atomic::{AtomicUsize, Ordering};

use vigil::http::HttpClient;
use vigil::models::{
    ParamLocation, ParameterizedRequest, ScanConfig, ScannerOptions, Severity,
};
use vigil::scanner::sqli::{SqliScanner, SCANNER_NAME};
use vigil::scanner::{ScanEngine, Scanner};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn test_config() -> ScanConfig {
    ScanConfig {
        timeout_secs: 10,
        user_agent: "Vigil-Test/0.1.0".to_string(),
        rate_limit: None,
        ..ScanConfig::default()
    }
}

fn test_client() -> HttpClient {
    HttpClient::from_config(&test_config()).expect("Failed to create client")
}

fn get_request(url: String, params: &[&str]) -> ParameterizedRequest {
    ParameterizedRequest {
        method: "GET".to_string(),
        url,
        form_post_data: String::new(),
        param_names: params.iter().map(|p| p.to_string()).collect(),
    }
}

fn post_request(url: String, body: &str, params: &[&str]) -> ParameterizedRequest {
    ParameterizedRequest {
        method: "POST".to_string(),
        url,
        form_post_data: body.to_string(),
        param_names: params.iter().map(|p| p.to_string()).collect(),
    }
}

async fn scan(req: &ParameterizedRequest) -> Vec<vigil::models::VulnerabilityResult> {
    SqliScanner::new()
        .scan(req, &test_client(), &ScannerOptions::default())
        .await
        .expect("Scan failed")
}

/// Responds with a structurally different body on every request,
/// simulating a server that randomizes its output
struct RotatingBody {
    counter: AtomicUsize,
}

impl Respond for RotatingBody {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let letter = (b'a' + (n % 26) as u8) as char;
        ResponseTemplate::new(200).set_body_string(format!(
            "<html><body>{}</body></html>",
            letter.to_string().repeat(200)
        ))
    }
}

/// Echoes the `q` query parameter back inside a fixed-size page without
/// ever executing it
struct EchoQuery;

impl Respond for EchoQuery {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let echoed = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();
        let filler = "x".repeat(500);
        ResponseTemplate::new(200).set_body_string(format!(
            "<html><body><p>Results for: {echoed}</p><p>{filler}</p></body></html>"
        ))
    }
}

// ---------------------------------------------------------------------------
// Error-signature probe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_error_based_hit() {
    let server = MockServer::start().await;

    // The benign value returns a clean page
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Item 1</h1></body></html>"),
        )
        .mount(&server)
        .await;

    // Any injected value leaks a MySQL error
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "You have an error in your SQL syntax; check the manual that corresponds \
             to your MySQL server version",
        ))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/item?id=1", server.uri()), &["id"]);
    let findings = scan(&req).await;

    assert_eq!(findings.len(), 1, "Expected exactly one finding, got: {findings:?}");
    let finding = &findings[0];
    assert_eq!(finding.vulnerability_type, "SQL Injection (Error-Based)");
    assert_eq!(finding.parameter, "id");
    assert!(
        finding.evidence.contains("error in your SQL syntax"),
        "Evidence should carry the matched signature, got: {}",
        finding.evidence
    );
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.location, ParamLocation::Query);
    assert_eq!(finding.scanner_name, SCANNER_NAME);
}

#[tokio::test]
async fn test_error_based_takes_priority_over_content_growth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>"))
        .mount(&server)
        .await;

    // Injected values leak an error AND inflate the body; only the
    // error-based diagnosis may be reported.
    let huge = format!(
        "You have an error in your SQL syntax{}",
        "<tr><td>row</td></tr>".repeat(500)
    );
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(huge))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/item?id=1", server.uri()), &["id"]);
    let findings = scan(&req).await;

    assert_eq!(
        findings.len(),
        1,
        "At most one finding per parameter, got: {:?}",
        findings.iter().map(|f| &f.vulnerability_type).collect::<Vec<_>>()
    );
    assert_eq!(findings[0].vulnerability_type, "SQL Injection (Error-Based)");
}

#[tokio::test]
async fn test_findings_preserve_parameter_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "1"))
        .and(query_param("name", "x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "Warning: mysqli_query(): You have an error in your SQL syntax",
        ))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/item?id=1&name=x", server.uri()), &["id", "name"]);
    let findings = scan(&req).await;

    assert_eq!(findings.len(), 2, "Both parameters are injectable");
    assert_eq!(findings[0].parameter, "id", "Findings must follow param_names order");
    assert_eq!(findings[1].parameter, "name");
}

// ---------------------------------------------------------------------------
// Boolean-differential probe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_boolean_based_hit() {
    let server = MockServer::start().await;

    // The FALSE condition suppresses the profile
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(wiremock::matchers::query_param_contains("uid", "1=2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><h1>Not Found</h1></html>"),
        )
        .mount(&server)
        .await;

    // Everything else shows the profile
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><h1>Alice</h1></html>"))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/profile?uid=7", server.uri()), &["uid"]);
    let findings = scan(&req).await;

    assert_eq!(findings.len(), 1, "Expected a boolean-based finding, got: {findings:?}");
    let finding = &findings[0];
    assert_eq!(finding.vulnerability_type, "SQL Injection (Boolean-Based)");
    assert_eq!(finding.payload, " AND 1=1", "The TRUE payload is reported");
    assert_eq!(finding.parameter, "uid");
}

#[tokio::test]
async fn test_boolean_probe_ignores_randomized_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(RotatingBody {
            counter: AtomicUsize::new(0),
        })
        .mount(&server)
        .await;

    let req = get_request(format!("{}/page?uid=7", server.uri()), &["uid"]);
    let findings = scan(&req).await;

    assert!(
        findings.is_empty(),
        "A server that randomizes every response must not fire, got: {findings:?}"
    );
}

// ---------------------------------------------------------------------------
// Content-length probe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_content_length_hit() {
    let server = MockServer::start().await;

    // A bypassed filter dumps the whole listing
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(wiremock::matchers::query_param_contains("cat", "OR 1=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<html><body>{}</body></html>",
            "<li>row</li>".repeat(500)
        )))
        .mount(&server)
        .await;

    // The normal listing is small
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<html><body>{}</body></html>",
            "<li>row</li>".repeat(40)
        )))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/list?cat=1", server.uri()), &["cat"]);
    let findings = scan(&req).await;

    assert_eq!(findings.len(), 1, "Expected a content-based finding, got: {findings:?}");
    let finding = &findings[0];
    assert_eq!(finding.vulnerability_type, "SQL Injection (Content-Based)");
    assert_eq!(finding.payload, "' OR 1=1--");
    assert!(
        finding.evidence.contains("Original Length"),
        "Evidence should carry both lengths, got: {}",
        finding.evidence
    );
}

// ---------------------------------------------------------------------------
// Auth-bypass probe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_auth_bypass_via_redirect_and_session() {
    let server = MockServer::start().await;

    // The bypass payload logs in: redirect plus a fresh session cookie.
    // The quote arrives form-encoded in the body.
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("admin%27--"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/dashboard")
                .insert_header("Set-Cookie", "SID=abc123; Path=/"),
        )
        .mount(&server)
        .await;

    // Every other login attempt fails in place
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Invalid credentials, please try again.</p></body></html>",
        ))
        .mount(&server)
        .await;

    // The dashboard only renders for the issued session cookie
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("Cookie", "SID=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><a href=\"/logout\">Logout</a></body></html>",
        ))
        .mount(&server)
        .await;

    let url = format!("{}/login", server.uri());
    let req = post_request(url.clone(), "username=x&password=y", &["username", "password"]);
    let findings = scan(&req).await;

    assert_eq!(findings.len(), 1, "Expected one auth bypass finding, got: {findings:?}");
    let finding = &findings[0];
    assert_eq!(finding.vulnerability_type, "SQL Injection (Auth Bypass)");
    assert_eq!(finding.payload, "admin'--");
    assert_eq!(finding.parameter, "username");
    assert_eq!(finding.url, url, "Auth bypass reports the original request URL");
    assert_eq!(finding.location, ParamLocation::Body);
    assert!(
        finding.evidence.contains("/dashboard") && finding.evidence.contains("SID"),
        "Evidence should name the redirect target and cookie, got: {}",
        finding.evidence
    );
}

#[tokio::test]
async fn test_auth_bypass_via_differential_body() {
    let server = MockServer::start().await;

    // No redirect: the server answers 200 with a success page instead
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("admin%27--"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h2>Welcome back, admin!</h2><a href=\"/logout\">Log out</a></body></html>",
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Invalid credentials, please try again.</p></body></html>",
        ))
        .mount(&server)
        .await;

    let req = post_request(
        format!("{}/login", server.uri()),
        "username=x&password=y",
        &["username"],
    );
    let findings = scan(&req).await;

    assert_eq!(findings.len(), 1, "Expected one auth bypass finding, got: {findings:?}");
    let finding = &findings[0];
    assert_eq!(finding.vulnerability_type, "SQL Injection (Auth Bypass)");
    assert_eq!(finding.payload, "admin'--");
    assert!(
        finding.details.contains("success keyword"),
        "Details should explain the differential path, got: {}",
        finding.details
    );
}

// ---------------------------------------------------------------------------
// Dispatcher filters and invariants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_excluded_path_is_skipped_even_when_vulnerable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "You have an error in your SQL syntax",
        ))
        .mount(&server)
        .await;

    let req = post_request(
        format!("{}/register", server.uri()),
        "username=x&password=y",
        &["username"],
    );
    let findings = scan(&req).await;

    assert!(findings.is_empty(), "Paths under /register are never probed");
}

#[tokio::test]
async fn test_ignored_parameters_are_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "You have an error in your SQL syntax",
        ))
        .mount(&server)
        .await;

    let req = get_request(
        format!("{}/form?CSRF_TOKEN=x&_token=y", server.uri()),
        &["CSRF_TOKEN", "_token"],
    );
    let findings = scan(&req).await;

    assert!(
        findings.is_empty(),
        "Anti-CSRF parameters must be skipped regardless of case, got: {findings:?}"
    );
}

#[tokio::test]
async fn test_unsupported_method_returns_empty() {
    let client = test_client();
    let req = ParameterizedRequest {
        method: "PUT".to_string(),
        url: "http://127.0.0.1:1/item?id=1".to_string(),
        form_post_data: String::new(),
        param_names: vec!["id".to_string()],
    };

    let findings = SqliScanner::new()
        .scan(&req, &client, &ScannerOptions::default())
        .await
        .expect("Scan failed");

    assert!(findings.is_empty());
    assert_eq!(client.request_count(), 0, "No HTTP traffic for unsupported methods");
}

#[tokio::test]
async fn test_empty_param_names_returns_empty() {
    let client = test_client();
    let req = get_request("http://127.0.0.1:1/item?id=1".to_string(), &[]);

    let findings = SqliScanner::new()
        .scan(&req, &client, &ScannerOptions::default())
        .await
        .expect("Scan failed");

    assert!(findings.is_empty());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_reflecting_server_produces_no_findings() {
    let server = MockServer::start().await;

    // Payloads come back verbatim inside a realistically sized page,
    // but nothing executes server-side
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(EchoQuery)
        .mount(&server)
        .await;

    let req = get_request(format!("{}/search?q=abc", server.uri()), &["q"]);
    let findings = scan(&req).await;

    assert!(
        findings.is_empty(),
        "Reflection without execution must not fire any probe, got: {findings:?}"
    );
}

#[tokio::test]
async fn test_clean_server_produces_no_findings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>No results found.</p></body></html>",
        ))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/search?q=abc", server.uri()), &["q"]);
    let findings = scan(&req).await;

    assert!(findings.is_empty(), "A stable clean server must not fire, got: {findings:?}");
}

#[tokio::test]
async fn test_scan_does_not_mutate_the_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let req = get_request(format!("{}/item?id=1", server.uri()), &["id"]);
    let before = req.clone();
    let _ = scan(&req).await;

    assert_eq!(req, before, "Scan must not alter the input request");
}

#[tokio::test]
async fn test_scanner_name_constant() {
    assert_eq!(SqliScanner::new().name(), "Advanced SQL Injection Scanner");
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_engine_runs_default_detectors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "You have an error in your SQL syntax",
        ))
        .mount(&server)
        .await;

    let client = test_client();
    let engine = ScanEngine::with_defaults();
    let requests = vec![get_request(format!("{}/item?id=1", server.uri()), &["id"])];

    let result = engine
        .run(&client, &requests, &ScannerOptions::default())
        .await
        .expect("Engine run failed");

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.requests_scanned, 1);
    assert!(result.total_requests > 0, "The engine should report HTTP traffic");
    assert!(result.finished_at.is_some(), "The result must be marked finished");
}

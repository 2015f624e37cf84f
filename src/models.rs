//! Core data models for the Vigil scanner

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Severity level for security findings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Where an injected parameter travels: the query string or the form body
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Body,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Body => write!(f, "body"),
        }
    }
}

/// A request discovered by the upstream crawler, carrying the parameters
/// that detectors may probe.
///
/// For GET requests the URL's query string is the parameter carrier; for
/// POST requests `form_post_data` holds the urlencoded body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterizedRequest {
    /// HTTP method (only GET and POST are probed)
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// URL-encoded form body (meaningful for POST)
    pub form_post_data: String,
    /// Parameter names to probe, in order
    pub param_names: Vec<String>,
}

/// Per-scanner tuning passed through from the caller.
///
/// Reserved: the SQL injection detector currently reads no fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerOptions {}

/// A confirmed vulnerability reported by a detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityResult {
    /// Detection mode, e.g. "SQL Injection (Error-Based)"
    pub vulnerability_type: String,
    /// URL sent when the hit was confirmed
    pub url: String,
    /// Parameter judged vulnerable
    pub parameter: String,
    /// Literal payload that triggered detection
    pub payload: String,
    /// Human-readable diagnosis
    pub details: String,
    /// Technical evidence backing the diagnosis
    pub evidence: String,
    pub severity: Severity,
    pub location: ParamLocation,
    /// Remediation advice
    pub remediation: String,
    /// Name of the detector that produced this finding
    pub scanner_name: String,
}

impl VulnerabilityResult {
    /// Creates a finding with the detector's constant fields filled in
    pub fn new(
        vulnerability_type: impl Into<String>,
        url: impl Into<String>,
        parameter: impl Into<String>,
        payload: impl Into<String>,
        location: ParamLocation,
        scanner_name: impl Into<String>,
    ) -> Self {
        Self {
            vulnerability_type: vulnerability_type.into(),
            url: url.into(),
            parameter: parameter.into(),
            payload: payload.into(),
            details: String::new(),
            evidence: String::new(),
            severity: Severity::High,
            location,
            remediation: "Use parameterized queries (prepared statements).".to_string(),
            scanner_name: scanner_name.into(),
        }
    }

    /// Sets the details for this finding
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Sets the evidence for this finding
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    /// Overrides the remediation advice
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }
}

/// Result of a complete scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique scan identifier
    pub scan_id: String,
    /// Scan start time (local timezone)
    pub started_at: DateTime<Local>,
    /// Scan end time (local timezone)
    pub finished_at: Option<DateTime<Local>>,
    /// All findings discovered
    pub findings: Vec<VulnerabilityResult>,
    /// Number of parameterized requests examined
    pub requests_scanned: usize,
    /// Total HTTP requests made
    pub total_requests: u64,
}

impl ScanResult {
    /// Creates a new empty ScanResult
    pub fn new() -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            started_at: Local::now(),
            finished_at: None,
            findings: Vec::new(),
            requests_scanned: 0,
            total_requests: 0,
        }
    }

    /// Returns count of findings by severity
    pub fn count_by_severity(&self, severity: &Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| &f.severity == severity)
            .count()
    }

    /// Marks the scan as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target URL to scan
    pub target: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Whether the default client follows HTTP redirects
    pub follow_redirects: bool,
    /// HTTP/HTTPS proxy URL
    pub proxy: Option<String>,
    /// Custom HTTP headers sent with every request
    pub headers: HashMap<String, String>,
    /// Maximum requests per second (None = unlimited)
    pub rate_limit: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            timeout_secs: 30,
            user_agent: "Vigil-Scanner/0.1.0".to_string(),
            follow_redirects: true,
            proxy: None,
            headers: HashMap::new(),
            rate_limit: Some(50),
        }
    }
}

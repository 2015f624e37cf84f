//! Configuration management for the Vigil scanner

use crate::error::Result;
use crate::models::ScanConfig;
use serde::Deserialize;
use std::path::Path;

/// File-based configuration structure matching vigil.toml
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    proxy: Option<ProxySection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    follow_redirects: Option<bool>,
    rate_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProxySection {
    url: Option<String>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path)?;
    let file_config: FileConfig = toml::from_str(&content)?;

    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(timeout) = scan.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(ua) = scan.user_agent {
            config.user_agent = ua;
        }
        if let Some(follow) = scan.follow_redirects {
            config.follow_redirects = follow;
        }
        if let Some(rate) = scan.rate_limit {
            config.rate_limit = Some(rate);
        }
    }

    if let Some(proxy) = file_config.proxy {
        config.proxy = proxy.url;
    }

    Ok(config)
}

/// Merges CLI arguments into an existing ScanConfig
pub fn merge_cli_args(
    config: &mut ScanConfig,
    target: String,
    timeout: Option<u64>,
    rate_limit: Option<u32>,
    headers: Option<Vec<String>>,
) {
    config.target = target;

    if let Some(t) = timeout {
        config.timeout_secs = t;
    }
    if let Some(r) = rate_limit {
        config.rate_limit = Some(r);
    }
    if let Some(h) = headers {
        for header in h {
            if let Some((key, value)) = header.split_once(':') {
                config
                    .headers
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
}

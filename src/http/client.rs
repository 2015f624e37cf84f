//! HTTP client wrapper with rate limiting, retries, and request tracking

use crate::error::{Result, VigilError};
use crate::models::ScanConfig;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

/// HTTP client wrapper with rate limiting and request counting.
///
/// Holds two underlying clients: the default one, whose redirect policy
/// follows the scan configuration, and a redirect-inhibited one handed
/// out by [`HttpClient::without_redirects`] so detectors can observe
/// 3xx responses directly.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    no_redirect: Client,
    request_count: Arc<AtomicU64>,
    rate_limiter: Option<Arc<Semaphore>>,
    rate_limit_delay: Option<Duration>,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Creates a new HttpClient from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let client = Self::build_inner(config, config.follow_redirects, true)?;
        let no_redirect = Self::build_inner(config, false, false)?;

        let (rate_limiter, rate_limit_delay) = match config.rate_limit {
            Some(rps) if rps > 0 => (
                Some(Arc::new(Semaphore::new(rps as usize))),
                Some(Duration::from_millis(1000 / u64::from(rps))),
            ),
            _ => (None, None),
        };

        Ok(Self {
            client,
            no_redirect,
            request_count: Arc::new(AtomicU64::new(0)),
            rate_limiter,
            rate_limit_delay,
            extra_headers: config.headers.clone(),
        })
    }

    fn build_inner(config: &ScanConfig, follow_redirects: bool, cookie_store: bool) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .redirect(if follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .cookie_store(cookie_store)
            .danger_accept_invalid_certs(false);

        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| VigilError::ConfigError(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder.build()?)
    }

    /// Returns a variant of this client that does not auto-follow
    /// redirects. Request counting and rate limiting are shared with
    /// the parent client.
    pub fn without_redirects(&self) -> Self {
        Self {
            client: self.no_redirect.clone(),
            no_redirect: self.no_redirect.clone(),
            request_count: Arc::clone(&self.request_count),
            rate_limiter: self.rate_limiter.clone(),
            rate_limit_delay: self.rate_limit_delay,
            extra_headers: self.extra_headers.clone(),
        }
    }

    /// Sends a GET request with rate limiting and retry logic
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request_with_retry(|| self.client.get(url)).await
    }

    /// Sends a GET request carrying the given cookies
    pub async fn get_with_cookies(&self, url: &str, cookies: &[(String, String)]) -> Result<Response> {
        let cookie_header = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.request_with_retry(|| self.client.get(url).header("Cookie", cookie_header.clone()))
            .await
    }

    /// Sends a POST request with an urlencoded form body
    pub async fn post(&self, url: &str, body: &str) -> Result<Response> {
        self.request_with_retry(|| {
            self.client
                .post(url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body.to_string())
        })
        .await
    }

    /// Sends a generic request with a given method, optional headers and body
    pub async fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> Result<Response> {
        self.request_with_retry(|| {
            let mut req = self.client.request(method.clone(), url);
            for (key, value) in headers {
                req = req.header(key.as_str(), value.as_str());
            }
            if let Some(b) = body {
                req = req.body(b.to_string());
            }
            req
        })
        .await
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Executes a request with retry logic and rate limiting
    async fn request_with_retry<F>(&self, build_request: F) -> Result<Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        const MAX_RETRIES: u32 = 2;
        const INITIAL_BACKOFF_MS: u64 = 500;

        if let Some(delay) = self.rate_limit_delay {
            if let Some(ref limiter) = self.rate_limiter {
                let _permit = limiter
                    .acquire()
                    .await
                    .map_err(|_| VigilError::RateLimitExceeded)?;
            }
            sleep(delay).await;
        }

        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let backoff = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1));
                debug!("Retry attempt {attempt}, waiting {backoff:?}");
                sleep(backoff).await;
            }

            self.request_count.fetch_add(1, Ordering::Relaxed);

            let mut req = build_request();
            for (key, value) in &self.extra_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!("Response: {status} for {}", response.url());

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!("Rate limited by server, backing off");
                        last_error = Some(VigilError::RateLimitExceeded);
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    warn!("Request failed (attempt {attempt}): {e}");
                    last_error = Some(VigilError::HttpError(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| VigilError::ScanError("Max retries exceeded".to_string())))
    }
}

//! Request construction and dispatch shared by the SQLi probes

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{ParamLocation, ParameterizedRequest};
use reqwest::Response;
use std::time::{Duration, Instant};
use url::Url;

/// An ordered multimap of request parameters, as parsed from a query
/// string or urlencoded form body. Parameter order and multi-valued
/// keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Parses an `application/x-www-form-urlencoded` string
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// Returns the first value for `name`, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the values of `name` with a single `value`, inserting
    /// the pair if the name is absent. The first occurrence keeps its
    /// position; extra occurrences are dropped.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(pos) = self.0.iter().position(|(k, _)| k == name) {
            self.0[pos].1 = value;
            let mut i = pos + 1;
            while i < self.0.len() {
                if self.0[i].0 == name {
                    self.0.remove(i);
                } else {
                    i += 1;
                }
            }
        } else {
            self.0.push((name.to_string(), value));
        }
    }

    /// Returns each distinct parameter name, in first-seen order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (k, _) in &self.0 {
            if !names.contains(&k.as_str()) {
                names.push(k);
            }
        }
        names
    }

    /// Encodes the parameters back to urlencoded form
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.0 {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Extracts the request's original parameters: the URL query string for
/// GET, the form body for POST
pub fn original_params(req: &ParameterizedRequest) -> Result<Params> {
    if req.method == "GET" {
        let parsed = Url::parse(&req.url)?;
        Ok(Params::parse(parsed.query().unwrap_or("")))
    } else {
        Ok(Params::parse(&req.form_post_data))
    }
}

/// Builds the URL and optional body for a test request. GET requests
/// re-encode the parameters onto the URL; POST requests keep the URL
/// intact and carry the parameters as the body.
pub fn build_components(
    req: &ParameterizedRequest,
    params: &Params,
) -> Result<(String, Option<String>)> {
    if req.method == "GET" {
        let mut parsed = Url::parse(&req.url)?;
        let encoded = params.encode();
        parsed.set_query(if encoded.is_empty() {
            None
        } else {
            Some(&encoded)
        });
        Ok((parsed.to_string(), None))
    } else {
        Ok((req.url.clone(), Some(params.encode())))
    }
}

/// Issues the request built from `params` and returns the raw response.
/// POST bodies are sent with the urlencoded form content type.
pub async fn dispatch(
    req: &ParameterizedRequest,
    client: &HttpClient,
    params: &Params,
) -> Result<Response> {
    let (url, body) = build_components(req, params)?;
    match body {
        Some(body) => client.post(&url, &body).await,
        None => client.get(&url).await,
    }
}

/// Sends a test request and reads the body fully to string
pub async fn send_request(
    req: &ParameterizedRequest,
    client: &HttpClient,
    params: &Params,
) -> Result<(u16, String)> {
    let response = dispatch(req, client, params).await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

/// Measures wall time from send to full body drain. When `params` is
/// None the original parameters are used. The body must be drained so
/// the measurement covers more than header latency.
pub async fn measure_duration(
    req: &ParameterizedRequest,
    client: &HttpClient,
    params: Option<&Params>,
) -> Result<Duration> {
    let fallback;
    let params = match params {
        Some(p) => p,
        None => {
            fallback = original_params(req)?;
            &fallback
        }
    };

    let start = Instant::now();
    let response = dispatch(req, client, params).await?;
    response.text().await?;
    Ok(start.elapsed())
}

/// Returns where this request carries its parameters
pub fn param_location(req: &ParameterizedRequest) -> ParamLocation {
    if req.method == "GET" {
        ParamLocation::Query
    } else {
        ParamLocation::Body
    }
}

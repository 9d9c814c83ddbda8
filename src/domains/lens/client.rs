//! LENS API client.
//!
//! Each call issues a single GET against `base_url + resource path` and
//! unwraps the `result` field of the JSON document the service returns.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::UpstreamError;

/// Relative path of an upstream resource, e.g. `announcements/<uduns>`.
///
/// Segments are kept separate so that a parameter value can never introduce
/// extra path components; they are percent-encoded when the URL is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Create a path pointing at a top-level resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            segments: vec![resource.into()],
        }
    }

    /// Append a parameter segment.
    pub fn with_param(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    /// Iterate over the raw (unencoded) segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Anything able to resolve a resource path to the upstream `result` value.
///
/// Tools only depend on this trait; the production implementation is
/// [`UpstreamClient`].
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch a resource and return the value found under its `result` key.
    ///
    /// A document without a `result` key yields `Value::Null`.
    async fn fetch_resource(&self, path: &ResourcePath) -> Result<Value, UpstreamError>;
}

/// reqwest-backed client for the LENS API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Create a new client for the given base URL.
    ///
    /// `timeout` bounds the whole request, body included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url).map_err(|_| UpstreamError::invalid_url(base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::invalid_url(base_url.as_str()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Build the absolute URL for a resource path.
    pub fn resource_url(&self, path: &ResourcePath) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::invalid_url(self.base_url.as_str()))?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }
}

#[async_trait]
impl ResourceFetcher for UpstreamClient {
    async fn fetch_resource(&self, path: &ResourcePath) -> Result<Value, UpstreamError> {
        let url = self.resource_url(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| UpstreamError::from_request(url.as_str(), e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_request(url.as_str(), e))?;

        // The service reports some failures as a non-2xx status carrying a
        // regular `{ "result": ... }` document; those results pass through.
        let mut fields = match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) if !status.is_success() => {
                return Err(UpstreamError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            Ok(other) => {
                return Err(UpstreamError::parse(
                    url.as_str(),
                    format!("expected a JSON object, got {}", json_kind(&other)),
                ));
            }
            Err(e) => return Err(UpstreamError::parse(url.as_str(), e)),
        };

        if !status.is_success() {
            warn!("Upstream returned {} for {}, using its result", status, url);
        }

        Ok(fields.remove("result").unwrap_or_else(|| {
            warn!("Upstream response from {} has no 'result' field", url);
            Value::Null
        }))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

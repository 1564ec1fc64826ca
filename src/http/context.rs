use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;
use crate::verify::payload::MutationPayload;

use super::method::HttpMethod;
use super::response::ResponseEnvelope;

/// Explicit default instead of inheriting the HTTP client's implicit one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`RequestContext`]: the fixed base origin every
/// request path is resolved against, plus optional extra headers and the
/// per-request timeout.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub base_url: String,
    pub extra_headers: HashMap<String, String>,
    pub timeout: Duration,
}

impl ContextConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            extra_headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A session-scoped handle bound to a base URL. Owns all outgoing requests
/// issued within one test case; create one per case in setup and let it drop
/// on every exit path, including assertion errors propagated with `?`.
///
/// Not meant to be shared across test cases or reused after drop.
#[derive(Debug)]
pub struct RequestContext {
    client: reqwest::Client,
    base_url: Url,
}

impl RequestContext {
    /// Build a context from the given configuration. Invalid base URLs or
    /// headers are setup failures, reported as [`Error::Config`].
    pub fn new(config: &ContextConfig) -> Result<Self, Error> {
        let mut raw = config.base_url.trim().to_string();
        if raw.is_empty() {
            return Err(Error::Config {
                reason: "base URL cannot be empty".to_string(),
            });
        }
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let base_url = Url::parse(&raw).map_err(|e| Error::Config {
            reason: format!("invalid base URL `{raw}`: {e}"),
        })?;

        let headers = build_headers(&config.extra_headers)?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<ResponseEnvelope, Error> {
        self.send(HttpMethod::Get, path, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        payload: &MutationPayload,
    ) -> Result<ResponseEnvelope, Error> {
        self.send(HttpMethod::Post, path, Some(payload)).await
    }

    pub async fn put(
        &self,
        path: &str,
        payload: &MutationPayload,
    ) -> Result<ResponseEnvelope, Error> {
        self.send(HttpMethod::Put, path, Some(payload)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        payload: &MutationPayload,
    ) -> Result<ResponseEnvelope, Error> {
        self.send(HttpMethod::Patch, path, Some(payload)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseEnvelope, Error> {
        self.send(HttpMethod::Delete, path, None).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&MutationPayload>,
    ) -> Result<ResponseEnvelope, Error> {
        let url = self.endpoint_url(path)?;

        let mut req_builder = self.client.request(method.into(), url.clone());
        if let Some(payload) = payload {
            req_builder = req_builder.json(payload);
        }

        let started = Instant::now();
        let response = req_builder.send().await.map_err(|e| Error::Connectivity {
            endpoint: path.to_string(),
            source: e,
        })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| Error::Connectivity {
            endpoint: path.to_string(),
            source: e,
        })?;
        let elapsed = started.elapsed().as_millis();

        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            elapsed_ms = elapsed as u64,
            "request completed"
        );

        Ok(ResponseEnvelope::new(status, elapsed, raw))
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config {
                reason: format!("invalid request path `{path}`: {e}"),
            })
    }
}

fn build_headers(input: &HashMap<String, String>) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| Error::Config {
            reason: format!("invalid header name `{key}`: {e}"),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| Error::Config {
            reason: format!("invalid header value for `{key}`: {e}"),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

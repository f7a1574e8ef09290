//! Outbound JSON calls to sibling services.
//!
//! Upstream services wrap POST results in `{ "response": ... }` and GET results in
//! `{ "data": ... }`; the helpers here unwrap those.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::config::{DEFAULT_HTTP_TIMEOUT_SECS, ServiceConfig};
use crate::errors::ApiError;

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// # Errors
    /// Returns `ApiError::Http` if the underlying client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// # Errors
    /// Returns `ApiError::Http` if the underlying client cannot be built.
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self, ApiError> {
        Self::new(Duration::from_secs(cfg.http_timeout_secs()))
    }

    /// POSTs `body` as JSON and returns the upstream `response` field.
    ///
    /// # Errors
    /// Transport failures, non-2xx statuses, or a body that does not decode to `T`.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(url, body, None).await
    }

    /// Same as [`post_json`](Self::post_json) with a bearer token.
    ///
    /// # Errors
    /// Transport failures, non-2xx statuses, or a body that does not decode to `T`.
    pub async fn post_json_authorized<B, T>(
        &self,
        url: &str,
        token: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(url, body, Some(token)).await
    }

    /// GETs `url` and returns the upstream `data` field.
    ///
    /// # Errors
    /// Transport failures, non-2xx statuses, or a body that does not decode to `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        self.get(url, None).await
    }

    /// Same as [`fetch_json`](Self::fetch_json) with a bearer token.
    ///
    /// # Errors
    /// Transport failures, non-2xx statuses, or a body that does not decode to `T`.
    pub async fn fetch_json_authorized<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.get(url, Some(token)).await
    }

    async fn post<B, T>(&self, url: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self.inner.post(url).header(CONTENT_TYPE, "application/json").json(body);
        if let Some(t) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        let value = check_status(req.send().await?)?.json::<Value>().await?;
        unwrap_envelope(value, "response")
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, token: Option<&str>) -> Result<T, ApiError> {
        let mut req = self.inner.get(url).header(ACCEPT, "application/json");
        if let Some(t) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        let value = check_status(req.send().await?)?.json::<Value>().await?;
        unwrap_envelope(value, "data")
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self {
            inner: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    log::warn!("upstream {} answered {status}", resp.url());
    Err(ApiError::UnexpectedStatus(status.as_u16()))
}

/// Pulls `field` out of an upstream envelope. A missing field decodes as `null`.
///
/// # Errors
/// Returns `ApiError::Json` when the field does not decode to `T`.
pub fn unwrap_envelope<T: DeserializeOwned>(mut value: Value, field: &str) -> Result<T, ApiError> {
    let inner = value.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    Ok(serde_json::from_value(inner)?)
}

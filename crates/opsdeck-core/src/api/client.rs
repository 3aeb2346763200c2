//! Shared HTTP gateway for the operations platform backend.
//!
//! All requests are issued beneath the configured base URL with a fixed
//! timeout. Successful responses pass through untouched; failures are
//! reported to the host (notification, and on `401` a stored-token wipe plus
//! hard redirect) before being returned to the caller.

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::error::NETWORK_FAILURE_MESSAGE;
use super::hooks::{Navigator, Notifier};
use super::ApiError;
use crate::auth::TokenStore;
use crate::config::Config;
use crate::models::HealthStatus;
use crate::router::Route;

pub const HEALTH_PATH: &str = "/health";

/// Request payload variants the backend accepts.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// API client for the operations backend.
/// Clone is cheap and clones share the authorization slot, so the header set
/// through one handle applies to requests made through every other handle.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    authorization: Arc<RwLock<Option<String>>>,
    token_store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        token_store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authorization: Arc::new(RwLock::new(None)),
            token_store,
            notifier,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or remove the bearer token attached to every subsequent request.
    pub fn set_authorization(&self, token: Option<&str>) {
        let value = token.map(|t| format!("Bearer {}", t));
        *self
            .authorization
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Current `Authorization` header value, if any.
    pub fn authorization(&self) -> Option<String> {
        self.authorization
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue a request beneath the base URL. Attempted exactly once.
    ///
    /// `headers` are applied after the authorization header, so a caller may
    /// override it for a single request.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(value) = self.authorization() {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder = builder.headers(headers);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let err = match builder.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                ApiError::from_status(status, &body)
            }
            Err(e) => ApiError::Network(e),
        };

        self.report_failure(&method, &url, &err);
        Err(err)
    }

    /// Host-visible side effects of a failed request.
    fn report_failure(&self, method: &Method, url: &str, err: &ApiError) {
        if !err.has_response() {
            warn!(%method, url, error = %err, "Request failed without a response");
            self.notifier.error(NETWORK_FAILURE_MESSAGE);
            return;
        }

        warn!(%method, url, status = ?err.status(), error = %err, "Request failed");
        self.notifier.error(&err.user_message());

        if err.status() == Some(StatusCode::UNAUTHORIZED) {
            // Session expired: wipe the stored token and reset the host.
            if let Err(e) = self.token_store.clear() {
                warn!(error = %e, "Failed to clear stored token");
            }
            self.navigator.hard_redirect(Route::Login.path());
        }
    }

    /// Read and parse a 2xx body. A body that breaks off mid-read is a
    /// transport failure and is reported like one.
    async fn decode<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let err = ApiError::Network(e);
                self.report_failure(method, &self.url(path), &err);
                return Err(err);
            }
        };
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, path, RequestBody::Empty, HeaderMap::new())
            .await?;
        self.decode(&Method::GET, path, response).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Unserializable body: {}", e)))?;
        let response = self
            .request(Method::POST, path, RequestBody::Json(value), HeaderMap::new())
            .await?;
        self.decode(&Method::POST, path, response).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Unserializable body: {}", e)))?;
        let response = self
            .request(Method::PUT, path, RequestBody::Json(value), HeaderMap::new())
            .await?;
        self.decode(&Method::PUT, path, response).await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let response = self
            .request(Method::POST, path, RequestBody::Form(fields), HeaderMap::new())
            .await?;
        self.decode(&Method::POST, path, response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, RequestBody::Empty, HeaderMap::new())
            .await?;
        Ok(())
    }

    /// Backend reachability probe.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(HEALTH_PATH).await
    }
}

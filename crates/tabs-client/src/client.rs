//! Authenticated request pipeline.
//!
//! Every backend call goes through [`ApiClient::send`]: the current access
//! token is attached as a bearer header, and a 401 response triggers exactly
//! one silent refresh followed by a replay of the original request. A second
//! 401 on the replay is surfaced to the caller untouched.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult, classify_reqwest_error};

/// Refresh endpoint, relative to the base URL.
const REFRESH_PATH: &str = "/token/refresh/";

/// Replay marker for a request travelling through the pipeline.
///
/// A request is replayed at most once; `Replayed` short-circuits any further
/// refresh attempts so a misbehaving backend cannot cause a refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    Fresh,
    Replayed,
}

/// Body of an outbound request.
///
/// Multipart bodies are kept as plain data (not a built form) so the request
/// can be rebuilt for the replay after a refresh.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File { filename: String, bytes: Vec<u8> },
}

/// A fully-specified outbound call: method, target, query, body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    /// Whether to attach the bearer header and run the 401 interception.
    /// Login, registration and the reset flows go out anonymously.
    authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Sends without a bearer header and without 401 interception.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Hook invoked when the session is lost (refresh failed).
///
/// The pipeline carries no navigation dependency; the host decides what
/// returning to the login entry point means.
pub type SessionExpiredHook = Box<dyn Fn() + Send + Sync>;

/// Backend API client wrapping the authenticated request pipeline.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            base_url: crate::config::normalize_base_url(&base_url.into()),
            http: reqwest::Client::new(),
            store,
            on_session_expired: None,
        }
    }

    /// Registers the session-expired hook.
    pub fn with_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Box::new(hook));
        self
    }

    /// The credential store this client reads and mutates.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request through the pipeline and returns the raw response.
    ///
    /// Network-level failures propagate immediately and are never retried.
    /// Only an explicit 401 on an authenticated request enters the refresh
    /// flow:
    /// - no refresh token stored: fails with [`ApiError::Unauthenticated`]
    ///   without touching the network;
    /// - refresh succeeds: the stored access token is overwritten and the
    ///   original request is replayed once with the new header;
    /// - refresh fails: both tokens are cleared, the session-expired hook
    ///   fires, and the caller receives the original 401 response.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult<reqwest::Response> {
        let mut state = RetryState::Fresh;
        loop {
            let response = self.dispatch(request).await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || !request.authenticated
                || state == RetryState::Replayed
            {
                return Ok(response);
            }
            state = RetryState::Replayed;

            let Some(pair) = self.store.get()? else {
                debug!("401 with no stored refresh token");
                return Err(ApiError::Unauthenticated);
            };

            match self.refresh(&pair.refresh).await {
                Ok(access) => {
                    self.store.set_access(&access)?;
                    debug!(path = %request.path, "access token refreshed, replaying request");
                }
                Err(e) => {
                    warn!(error = %e, "token refresh failed, clearing session");
                    self.store.clear()?;
                    if let Some(hook) = &self.on_session_expired {
                        hook();
                    }
                    // The caller sees the original 401, not the refresh error.
                    return Ok(response);
                }
            }
        }
    }

    /// Sends a request and decodes a JSON response body.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("Failed to decode response: {e}")))
    }

    /// Sends a request, expecting a success status and no useful body.
    pub async fn execute_empty(&self, request: &ApiRequest) -> ApiResult<()> {
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }
        Ok(())
    }

    /// Builds and dispatches one network call.
    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if request.authenticated
            && let Some(pair) = self.store.get()?
        {
            builder = builder.bearer_auth(&pair.access);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)),
        };

        builder
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))
    }

    /// Dedicated, unauthenticated refresh call.
    ///
    /// Returns the new access token on success.
    async fn refresh(&self, refresh_token: &str) -> ApiResult<String> {
        #[derive(serde::Deserialize)]
        struct RefreshResponse {
            access: String,
        }

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        let data: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to decode refresh response: {e}")))?;
        Ok(data.access)
    }
}

/// Rebuilds a reqwest multipart form from plain field data.
fn build_form(fields: &[FormField]) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match &field.value {
            FormValue::Text(text) => form.text(field.name.clone(), text.clone()),
            FormValue::File { filename, bytes } => form.part(
                field.name.clone(),
                reqwest::multipart::Part::bytes(bytes.clone()).file_name(filename.clone()),
            ),
        };
    }
    form
}

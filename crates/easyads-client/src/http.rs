// ABOUTME: Single configured HTTP client that every easyads request goes through.
// ABOUTME: Prefixes the API base URL, attaches the current bearer token, and maps failures to ApiError.

use easyads_core::SessionStore;
use reqwest::header::CACHE_CONTROL;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// What a 401 response means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnUnauthorized {
    /// The bearer token was rejected; end the session it belongs to.
    EndSession,
    /// The request body was rejected (e.g. bad credentials); keep the session.
    Report,
}

/// HTTP wrapper bound to one backend and one session. Clones share the
/// connection pool and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &Url, session: SessionStore) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, ...).
    pub fn with_client(http: reqwest::Client, base_url: &Url, session: SessionStore) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/products/`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, OnUnauthorized::EndSession, |req| req)
            .await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, OnUnauthorized::EndSession, |req| {
            req.json(body)
        })
        .await
    }

    /// POST form-encoded credentials. A 401 here means the credentials were
    /// wrong, so an existing session survives it.
    pub async fn post_credentials<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, OnUnauthorized::Report, |req| {
            req.form(body)
        })
        .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, OnUnauthorized::EndSession, move |req| {
            req.multipart(form)
        })
        .await
    }

    /// Build, authorize, and send one request. The token is read from the
    /// session here, once, so the request carries whatever is current when
    /// it leaves. Unless `on_401` says otherwise, a 401 to a request that
    /// carried the current token ends the session.
    async fn send<T, F>(
        &self,
        method: Method,
        path: &str,
        on_401: OnUnauthorized,
        body: F,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = self.session.token();

        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header(CACHE_CONTROL, "no-store");
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        let request = body(request);

        tracing::debug!(%method, path, authenticated = token.is_some(), "sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED
            && on_401 == OnUnauthorized::EndSession
            && let Some(token) = &token
        {
            self.session.invalidate(token);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::InvalidResponse(format!("failed to decode {} response: {}", path, e))
        })
    }
}

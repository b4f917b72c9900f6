use std::sync::Arc;

use api_types::auth::{AccessToken, Credentials, TokenPair, TokenRefresh};
use reqwest::{
    Method, Response, StatusCode, Url,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{ClientError, RefreshError, Result},
    refresh::RefreshCoordinator,
    session::Session,
};

/// Issues a `{access, refresh}` pair for username/password.
pub const TOKEN_ENDPOINT: &str = "/api/token/";
/// Exchanges a refresh token for a new access token.
pub const REFRESH_ENDPOINT: &str = "/api/token/refresh/";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Method, extra headers and JSON body of a request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// Adds a header that overrides the defaults on conflict.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    detail: String,
}

/// Authenticated JSON client for the tally REST backend.
///
/// Clones share the same [`Session`] and refresh coordinator, so concurrent
/// requests from any clone trigger at most one refresh per episode.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Session,
    refresh: Arc<RefreshCoordinator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|err| ClientError::InvalidUrl(format!("{raw}: {err}")))
    }

    /// Sends `options` to `endpoint` and returns the parsed JSON body.
    ///
    /// - 204 or an empty body yields `Ok(None)`.
    /// - A 401 from any endpoint but the token endpoints triggers one refresh
    ///   (shared with concurrent callers) and one retry with the new token.
    /// - If the refresh fails the session is expired and
    ///   [`ClientError::SessionExpired`] is returned.
    /// - Any other non-2xx status fails with [`ClientError::Http`].
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Option<Value>> {
        let token = self.session.access_token();
        let response = self.send(endpoint, &options, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || is_auth_endpoint(endpoint) {
            return read_body(response).await;
        }

        tracing::debug!(endpoint, "access token rejected, refreshing");
        let refresh_url = self.url(REFRESH_ENDPOINT)?;
        let access = match self
            .refresh
            .refresh_if_needed(&self.session, token.as_deref(), |refresh| {
                refresh_access_token(self.http.clone(), refresh_url, refresh)
            })
            .await
        {
            Ok(access) => access,
            Err(err) => {
                tracing::warn!(endpoint, "cannot refresh session: {err}");
                return Err(ClientError::SessionExpired);
            }
        };

        let retry = self.send(endpoint, &options, Some(&access)).await?;
        read_body(retry).await
    }

    async fn send(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response> {
        let url = self.url(endpoint)?;
        let mut req = self
            .http
            .request(options.method.clone(), url)
            .headers(merge_headers(&options.headers, token));
        if let Some(body) = &options.body {
            req = req.body(serde_json::to_vec(body)?);
        }
        Ok(req.send().await?)
    }

    /// Exchanges credentials for a token pair and stores it in the session.
    ///
    /// A rejected login leaves the session as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let body = serde_json::to_value(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let response = self
            .send(TOKEN_ENDPOINT, &RequestOptions::post(body), None)
            .await?;
        let value = read_body(response)
            .await?
            .ok_or_else(|| ClientError::EmptyBody {
                endpoint: TOKEN_ENDPOINT.to_string(),
            })?;
        let pair: TokenPair = serde_json::from_value(value)?;

        self.session.set_tokens(pair.access, pair.refresh)?;
        tracing::info!(username, "logged in");
        Ok(())
    }

    /// Forgets the stored tokens.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        tracing::info!("logged out");
        Ok(())
    }
}

async fn refresh_access_token(
    http: reqwest::Client,
    url: Url,
    refresh: String,
) -> std::result::Result<AccessToken, RefreshError> {
    let res = http
        .post(url)
        .json(&TokenRefresh { refresh })
        .send()
        .await
        .map_err(|err| RefreshError::Transport(err.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        return Err(RefreshError::Rejected(status.as_u16()));
    }
    res.json::<AccessToken>()
        .await
        .map_err(|err| RefreshError::Decode(err.to_string()))
}

fn is_auth_endpoint(endpoint: &str) -> bool {
    let normalize = |path: &str| path.trim_matches('/').to_string();
    let path = normalize(endpoint.split('?').next().unwrap_or(endpoint));
    path == normalize(TOKEN_ENDPOINT) || path == normalize(REFRESH_ENDPOINT)
}

/// Defaults first, then the bearer token, then caller headers, which win on
/// conflict.
fn merge_headers(extra: &HeaderMap, token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = token {
        match HeaderValue::try_from(format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("access token is not a valid header value, sending without it"),
        }
    }

    for name in extra.keys() {
        headers.remove(name);
    }
    for (name, value) in extra {
        headers.append(name.clone(), value.clone());
    }
    headers
}

async fn read_body(response: Response) -> Result<Option<Value>> {
    let status = response.status();
    if !status.is_success() {
        return Err(http_error(response).await);
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

async fn http_error(response: Response) -> ClientError {
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or("").to_string();
    tracing::debug!(status = status.as_u16(), url = %response.url(), "request failed");

    let message = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .map(|body| body.detail)
            .unwrap_or_else(|_| status_text.clone()),
        Err(_) => status_text.clone(),
    };
    ClientError::Http {
        status,
        status_text,
        message,
    }
}

#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    session: Option<Session>,
    http: Option<reqwest::Client>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> ApiClientBuilder {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn session(mut self, session: Session) -> ApiClientBuilder {
        self.session = Some(session);
        self
    }

    pub fn http(mut self, http: reqwest::Client) -> ApiClientBuilder {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("invalid base_url: {err}")))?;

        tracing::debug!(base_url = %base_url, "building api client");
        Ok(ApiClient {
            base_url,
            http: self.http.unwrap_or_default(),
            session: self.session.unwrap_or_else(Session::in_memory),
            refresh: Arc::new(RefreshCoordinator::default()),
        })
    }
}

//! Authenticated API client.
//!
//! Every request carries the stored access token. A 401 from any endpoint
//! other than login/refresh triggers one shared refresh exchange and a single
//! replay of the original request. When the refresh fails the session is
//! cleared and the original 401 is returned; navigation is left to callers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bastion_domain::auth::token_preview;
use bastion_domain::response::{decode_payload, error_message};
use bastion_domain::{
    ApiResponse, AuthEndpoint, BaseUrl, HttpMethod, RequestOptions, TokenPair,
    auth::bearer_header,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::context::RequestContext;
use super::refresh::{RefreshFailure, RefreshOutcome, RefreshSlot};
use crate::error::{ApiError, ApiResult};
use crate::ports::{HttpTransport, TransportError, TransportRequest};
use crate::session::SessionStore;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AUTHORIZATION: &str = "Authorization";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL every request path is appended to.
    pub base_url: BaseUrl,
    /// Default per-request timeout.
    pub timeout: Duration,
}

impl ClientSettings {
    /// Creates settings with the default timeout.
    #[must_use]
    pub const fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the default timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

struct ClientInner<T> {
    transport: T,
    session: SessionStore,
    settings: ClientSettings,
    refresh: RefreshSlot,
}

/// Shared handle to the authenticated HTTP client.
///
/// Cloning is cheap; clones share the transport, the session store and the
/// pending-refresh slot.
pub struct ApiClient<T> {
    inner: Arc<ClientInner<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("settings", &self.inner.settings)
            .field("refresh_pending", &self.inner.refresh.is_pending())
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Creates a client.
    #[must_use]
    pub fn new(transport: T, session: SessionStore, settings: ClientSettings) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                session,
                settings,
                refresh: RefreshSlot::default(),
            }),
        }
    }

    /// Returns the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Returns the connection settings.
    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.inner.settings
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Returns true while a token refresh is in flight.
    #[must_use]
    pub fn refresh_in_flight(&self) -> bool {
        self.inner.refresh.is_pending()
    }

    /// Returns true if an access token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session storage cannot be read.
    pub async fn has_credentials(&self) -> ApiResult<bool> {
        Ok(self.inner.session.access_token().await?.is_some())
    }

    /// Sends a `GET` request and decodes the unwrapped payload.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.send::<R, ()>(HttpMethod::Get, path, None, &RequestOptions::default())
            .await
    }

    /// Sends a `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<R, B>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(HttpMethod::Post, path, Some(body), &RequestOptions::default())
            .await
    }

    /// Sends a `PUT` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<R, B>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(HttpMethod::Put, path, Some(body), &RequestOptions::default())
            .await
    }

    /// Sends a `PATCH` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch<R, B>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(HttpMethod::Patch, path, Some(body), &RequestOptions::default())
            .await
    }

    /// Sends a `DELETE` request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.send::<R, ()>(HttpMethod::Delete, path, None, &RequestOptions::default())
            .await
    }

    /// Sends a request and decodes the payload, unwrapping the
    /// `{ data, message, success }` envelope when present.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthenticated` for a 401 that could not be recovered
    /// - `ApiError::Status` for any other error status
    /// - `ApiError::Transport` when no response arrived
    /// - `ApiError::Rejected` / `ApiError::Decode` for unusable 2xx bodies
    pub async fn send<R, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send_raw(method, path, body, options).await?;
        Ok(decode_payload(&response.body)?)
    }

    /// Sends a request and returns the undecoded 2xx response.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send`], minus the decoding errors.
    pub async fn send_raw<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to serialize body: {e}")))?;
        self.execute(method, path, body.as_deref(), options).await
    }

    /// Refreshes the access token through the shared refresh slot.
    ///
    /// Joins an exchange already in flight. On failure the session is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` describing the refresh failure.
    pub async fn refresh(&self) -> ApiResult<String> {
        match self.refresh_once().await {
            Ok(token) => Ok(token),
            Err(failure) => {
                warn!(error = %failure, "token refresh failed, clearing session");
                self.discard_session().await;
                Err(ApiError::Unauthenticated {
                    message: failure.to_string(),
                })
            }
        }
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.inner.settings.base_url.resolve(path)?;
        let request_id = Uuid::now_v7();
        let mut context = RequestContext::new(self.inner.session.access_token().await?);

        loop {
            debug!(
                %request_id,
                %method,
                %url,
                authenticated = context.token().is_some(),
                retried = !context.can_retry(),
                "dispatching request"
            );
            let response = self
                .dispatch(method, &url, body, options, context.token())
                .await?;
            debug!(
                %request_id,
                status = %response.status,
                elapsed_ms = u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
                "response received"
            );

            if response.status.is_success() {
                return Ok(response);
            }

            let error = ApiError::from_response(&response);
            if !response.status.is_unauthorized()
                || !context.can_retry()
                || AuthEndpoint::bypasses_refresh(path)
            {
                return Err(error);
            }

            match self.renewed_token(context.token()).await {
                Ok(token) => {
                    debug!(%request_id, "replaying request with refreshed token");
                    context.mark_retried(token);
                }
                Err(failure) => {
                    warn!(%request_id, error = %failure, "token refresh failed, clearing session");
                    self.discard_session().await;
                    return Err(error);
                }
            }
        }
    }

    /// Returns a token to replay a 401'd request with.
    ///
    /// Whoever opens a new flight first re-reads the stored token: if it
    /// differs from the one the request carried, an earlier flight already
    /// rotated it and no exchange is made. Tokens are saved before a flight
    /// releases the slot, so a late caller either joins the flight or sees
    /// the rotated token.
    async fn renewed_token(&self, sent_with: Option<&str>) -> RefreshOutcome {
        self.inner
            .refresh
            .run(|| async move {
                let current = self
                    .inner
                    .session
                    .access_token()
                    .await
                    .map_err(RefreshFailure::storage)?;

                if let Some(current) = current
                    && sent_with != Some(current.as_str())
                {
                    debug!("access token changed since dispatch, reusing it");
                    return Ok(current);
                }

                self.exchange_refresh_token().await
            })
            .await
    }

    async fn refresh_once(&self) -> RefreshOutcome {
        self.inner
            .refresh
            .run(|| self.exchange_refresh_token())
            .await
    }

    async fn exchange_refresh_token(&self) -> RefreshOutcome {
        let refresh_token = self
            .inner
            .session
            .refresh_token()
            .await
            .map_err(RefreshFailure::storage)?
            .ok_or(RefreshFailure::MissingRefreshToken)?;

        info!("refreshing access token");

        let url = self
            .inner
            .settings
            .base_url
            .resolve(AuthEndpoint::Refresh.path())
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;
        let body = serde_json::to_vec(&RefreshRequest {
            refresh_token: &refresh_token,
        })
        .map_err(|e| RefreshFailure::Malformed(e.to_string()))?;

        let response = self
            .dispatch(
                HttpMethod::Post,
                &url,
                Some(body.as_slice()),
                &RequestOptions::default(),
                None,
            )
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        if !response.status.is_success() {
            return Err(RefreshFailure::Rejected {
                status: response.status.as_u16(),
                message: error_message(&response.body)
                    .unwrap_or_else(|| response.status.reason_phrase().to_string()),
            });
        }

        let tokens: TokenPair = decode_payload(&response.body)
            .map_err(|e| RefreshFailure::Malformed(e.to_string()))?;
        self.inner
            .session
            .save_tokens(&tokens)
            .await
            .map_err(RefreshFailure::storage)?;

        info!(token = %token_preview(&tokens.access_token), "access token refreshed");
        Ok(tokens.access_token)
    }

    async fn discard_session(&self) {
        if let Err(e) = self.inner.session.clear().await {
            warn!(error = %e, "failed to clear session storage");
        }
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&[u8]>,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let request = TransportRequest {
            method,
            url: url.clone(),
            headers: build_headers(options, token),
            body: body.map(<[u8]>::to_vec),
            timeout: options.timeout.unwrap_or(self.inner.settings.timeout),
        };

        let start = Instant::now();
        let response = self.inner.transport.execute(&request).await?;
        Ok(response.with_duration(start.elapsed()))
    }
}

/// Default JSON headers, then per-call overrides, then the bearer token.
fn build_headers(options: &RequestOptions, token: Option<&str>) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = vec![
        ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
        ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
    ];

    for (name, value) in &options.headers {
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            continue;
        }
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }

    if let Some(token) = token {
        headers.push((AUTHORIZATION.to_string(), bearer_header(token)));
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_headers_without_token() {
        let headers = build_headers(&RequestOptions::default(), None);
        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_headers_overrides_and_token() {
        let options = RequestOptions::new()
            .header("accept", "text/csv")
            .header("Authorization", "Basic ignored")
            .header("X-Tenant-Id", "t-1");

        let headers = build_headers(&options, Some("abc"));
        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "text/csv".to_string()),
                ("X-Tenant-Id".to_string(), "t-1".to_string()),
                ("Authorization".to_string(), "Bearer abc".to_string()),
            ]
        );
    }
}

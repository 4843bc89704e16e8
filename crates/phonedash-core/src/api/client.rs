//! API client for the phone-data REST API.
//!
//! This module provides the `ApiClient` struct for exchanging credentials
//! for a bearer token and for making authenticated requests.

use std::sync::Arc;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::config::{ClientConfig, UnauthorizedPolicy};
use crate::models::{DevicePoolList, JobStatus, PhoneInfo, PhoneScraper, TokenResponse, TriggerResult};

use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

const TOKEN_PATH: &str = "/auth/get_token";
const PHONE_INFO_PATH: &str = "/phonedata/info";
const PHONE_SCRAPER_PATH: &str = "/phonedata/scraper";
const DEVICE_POOLS_PATH: &str = "/phonedata/device_pool_list";
const JOB_STATUS_PATH: &str = "/phonedata/jobstatus";
const POLL_CUCM_PATH: &str = "/phonedata/poll_cucm_now";
const PHONE_SCRAPE_PATH: &str = "/phonedata/initiate_phone_scrape_now";

/// API client for the phone-data service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and every clone shares the same session.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
    session: SessionStore,
}

impl ApiClient {
    /// Create a new API client bound to `session`
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ===== Session Transitions =====

    /// Exchange credentials for a bearer token and record it in the session.
    ///
    /// The session is LOADING while the request is in flight, then
    /// AUTHENTICATED or ERROR. If a logout or another login happens in the
    /// meantime, the result is discarded and `LoginSuperseded` is returned.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let ticket = self.session.begin_login();

        match self.exchange_credentials(user_id, password).await {
            Ok(auth) => {
                let applied = self.session.complete_login(
                    ticket,
                    auth.access_token.clone(),
                    auth.user_name.clone(),
                    auth.expires_at(),
                );
                if applied {
                    Ok(auth)
                } else {
                    Err(ApiError::LoginSuperseded)
                }
            }
            Err(e) => {
                warn!(error = %e, user_id = user_id, "Login failed");
                if self.session.fail_login(ticket) {
                    Err(e)
                } else {
                    Err(ApiError::LoginSuperseded)
                }
            }
        }
    }

    /// End the session. Always succeeds.
    pub fn logout(&self) {
        self.session.logout();
    }

    async fn exchange_credentials(&self, user_id: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let url = self.config.url(TOKEN_PATH);
        debug!(url = %url, "Requesting token");

        // Not intercepted: a 401 here is a failed login, not an expired session
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(&[("username", user_id), ("password", password)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    // ===== Authenticated Requests =====

    /// Start a request against an API path. Send it with `execute` so the
    /// session's bearer token is attached and the response is intercepted.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.config.url(path))
    }

    /// Send a request built by `request` through the interceptor.
    ///
    /// Returns `Ok(None)` when the server answered 401 and the policy is
    /// `Absorb`; the session has been logged out in that case.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Option<Response>, ApiError> {
        let (headers, generation) = self.auth_headers()?;
        let response = builder.headers(headers).send().await?;
        self.intercept(response, generation).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        match self.execute(self.request(Method::GET, path)).await? {
            Some(response) => Self::parse_json(response).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError> {
        match self.execute(self.request(Method::POST, path).json(body)).await? {
            Some(response) => Self::parse_json(response).await.map(Some),
            None => Ok(None),
        }
    }

    /// Header map for the current session (empty when logged out) and the
    /// session generation it was built from.
    fn auth_headers(&self) -> Result<(header::HeaderMap, u64), ApiError> {
        let (bearer, generation) = self.session.bearer_with_generation();
        let mut headers = header::HeaderMap::new();
        if let Some(bearer) = bearer {
            let mut value = header::HeaderValue::from_str(&bearer).map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok((headers, generation))
    }

    /// Response interceptor.
    /// Success passes through; 401 logs the session out unless a newer
    /// session replaced the one the request was sent with; anything else is
    /// returned to the caller as an error with no session change.
    async fn intercept(&self, response: Response, generation: u64) -> Result<Option<Response>, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }

        if status == StatusCode::UNAUTHORIZED {
            if self.session.logout_if_current(generation) {
                warn!(url = %response.url(), "Logged user out due to 401");
            } else {
                debug!(url = %response.url(), "401 for a superseded session, keeping current session");
            }
            return match self.config.unauthorized_policy {
                UnauthorizedPolicy::Absorb => Ok(None),
                UnauthorizedPolicy::Propagate => Err(ApiError::Unauthorized),
            };
        }

        debug!(url = %response.url(), status = %status, "Request failed");
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e)))
    }

    // ===== Phone Data =====

    /// Fetch every phone known to the inventory
    pub async fn fetch_phone_info(&self) -> Result<Option<Vec<PhoneInfo>>, ApiError> {
        self.get(PHONE_INFO_PATH).await
    }

    /// Fetch per-phone details scraped from the phones' own web pages
    pub async fn fetch_phone_scraper(&self) -> Result<Option<Vec<PhoneScraper>>, ApiError> {
        self.get(PHONE_SCRAPER_PATH).await
    }

    /// Fetch the distinct device pools in the phone inventory
    pub async fn fetch_device_pools(&self) -> Result<Option<Vec<String>>, ApiError> {
        let list: Option<DevicePoolList> = self.get(DEVICE_POOLS_PATH).await?;
        Ok(list.map(|l| l.device_pool_list))
    }

    /// Fetch sync job results and scrape queue counters
    pub async fn fetch_job_status(&self) -> Result<Option<JobStatus>, ApiError> {
        self.get(JOB_STATUS_PATH).await
    }

    /// Queue an immediate CUCM phone sync
    pub async fn trigger_cucm_poll(&self) -> Result<Option<TriggerResult>, ApiError> {
        self.get(POLL_CUCM_PATH).await
    }

    /// Queue an immediate phone web-page scrape
    pub async fn trigger_phone_scrape(&self) -> Result<Option<TriggerResult>, ApiError> {
        self.get(PHONE_SCRAPE_PATH).await
    }
}

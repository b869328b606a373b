//! Per-request client for the hosted auth (GoTrue) and data (PostgREST) APIs.
//!
//! [`Supabase`] pairs the shared [`SupabaseClient`] with the request's cookies,
//! so sessions are read from the incoming request and any refreshed or
//! cleared session is written to the outgoing response.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse as _, Response},
};
use color_eyre::eyre::Context as _;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tower_cookies::Cookies;
use tracing::error;

mod auth;
mod error;
pub mod pkce;
mod rest;
pub mod storage;
mod types;

pub use auth::Auth;
pub use error::{SupabaseError, SupabaseResult};
pub use rest::QueryBuilder;
pub use storage::SessionStorage;
pub use types::{
    AuthResponse, OAuthResponse, OtpType, Provider, Session, User, UserAttributes,
    VerifyOtpParams,
};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_env() -> color_eyre::Result<Self> {
        let url = std::env::var("SUPABASE_URL").wrap_err("SUPABASE_URL must be set")?;
        let anon_key =
            std::env::var("SUPABASE_ANON_KEY").wrap_err("SUPABASE_ANON_KEY must be set")?;

        Ok(Self::new(url, anon_key))
    }

    /// First label of the API host, e.g. `abcd` for `https://abcd.supabase.co`
    pub fn project_ref(&self) -> &str {
        let without_scheme = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(self.url.as_str());

        let host = without_scheme
            .split(['/', ':'])
            .next()
            .unwrap_or(without_scheme);

        host.split('.').next().unwrap_or(host)
    }

    /// Name of the cookie holding the session
    pub fn storage_key(&self) -> String {
        format!("sb-{}-auth-token", self.project_ref())
    }
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: Arc<SupabaseConfig>,
    secure_cookies: bool,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig, secure_cookies: bool) -> color_eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            http,
            config: Arc::new(config),
            secure_cookies,
        })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.config.url))
            .header("apikey", &self.config.anon_key)
    }
}

pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> SupabaseResult<T> {
    if !response.status().is_success() {
        return Err(SupabaseError::from_response(response).await);
    }

    let body = response.text().await?;
    let body = if body.trim().is_empty() { "null" } else { &body };

    Ok(serde_json::from_str(body)?)
}

/// Client bound to the current request's cookies
#[derive(Clone)]
pub struct Supabase {
    client: SupabaseClient,
    storage: SessionStorage,
}

impl Supabase {
    pub fn new(client: SupabaseClient, cookies: Cookies) -> Self {
        let storage = SessionStorage::new(cookies, client.secure_cookies);
        Self { client, storage }
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, table)
    }

    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }

    pub(crate) fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// The session's access token, or the anon key for anonymous requests
    pub(crate) async fn bearer(&self) -> SupabaseResult<String> {
        Ok(self
            .auth()
            .get_session()
            .await?
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.client.config.anon_key.clone()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Supabase
where
    SupabaseClient: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = match Cookies::from_request_parts(parts, state).await {
            Ok(cookies) => cookies,
            Err(_) => {
                error!("Failed to extract cookies from request");
                return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }
        };

        Ok(Supabase::new(SupabaseClient::from_ref(state), cookies))
    }
}

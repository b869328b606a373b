//! In-memory stand-in for the hosted auth + data platform.
//!
//! Implements the slice of the GoTrue (`/auth/v1`) and PostgREST (`/rest/v1`)
//! protocols the app talks to, plus a `/__fixtures` surface for reading the
//! outbox from tests.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{info, warn};

mod auth;
mod rest;
pub mod store;

pub use store::{FakeUser, Mail, ProfileInfoRow, ProfileRow, Store};

pub const DEFAULT_ANON_KEY: &str = "fixture-anon-key";

#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub anon_key: String,
    /// Lifetime of issued access tokens
    pub session_ttl_secs: i64,
    /// Skip the confirmation mail on email signups
    pub autoconfirm: bool,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            anon_key: DEFAULT_ANON_KEY.to_string(),
            session_ttl_secs: 3600,
            autoconfirm: false,
        }
    }
}

#[derive(Clone)]
pub struct FixtureState {
    pub config: Arc<FixtureConfig>,
    store: Arc<Mutex<Store>>,
}

impl FixtureState {
    pub fn new(config: FixtureConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(Store::default())),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        // Poisoning only means a handler panicked mid-request
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn router(state: FixtureState) -> Router {
    let api = Router::new()
        .route("/auth/v1/signup", post(auth::signup))
        .route("/auth/v1/token", post(auth::token))
        .route("/auth/v1/otp", post(auth::otp))
        .route("/auth/v1/verify", post(auth::verify))
        .route("/auth/v1/recover", post(auth::recover))
        .route("/auth/v1/user", get(auth::get_user).put(auth::update_user))
        .route("/auth/v1/logout", post(auth::logout))
        .route("/rest/v1/profiles", get(rest::select_profiles))
        .route("/rest/v1/rpc/update_profile", post(rest::update_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_apikey,
        ));

    Router::new()
        .merge(api)
        // Browser-facing, so no apikey header
        .route("/auth/v1/authorize", get(auth::authorize))
        .route("/__fixtures/mailbox", get(mailbox))
        .with_state(state)
}

async fn require_apikey(
    State(state): State<FixtureState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get("apikey")
        .and_then(|v| v.to_str().ok());

    if provided != Some(state.config.anon_key.as_str()) {
        warn!("Rejecting request to {} without a valid apikey", request.uri());
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response();
    }

    next.run(request).await
}

pub(crate) fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[derive(serde::Deserialize)]
struct MailboxQuery {
    email: String,
}

async fn mailbox(
    State(state): State<FixtureState>,
    axum::extract::Query(query): axum::extract::Query<MailboxQuery>,
) -> Response {
    match state.store().last_mail(&query.email) {
        Some(mail) => Json(mail.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A fixture server running on a background task
pub struct FixtureHandle {
    pub base_url: String,
    pub anon_key: String,
    state: FixtureState,
    task: JoinHandle<()>,
}

impl FixtureHandle {
    pub fn last_mail(&self, email: &str) -> Option<Mail> {
        self.state.store().last_mail(email).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<FakeUser> {
        self.state.store().user_by_email(email).cloned()
    }

    pub fn refresh_count(&self) -> usize {
        self.state.store().refresh_count
    }

    pub fn state(&self) -> &FixtureState {
        &self.state
    }
}

impl Drop for FixtureHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start the fixture on an ephemeral localhost port
pub async fn spawn(config: FixtureConfig) -> anyhow::Result<FixtureHandle> {
    let anon_key = config.anon_key.clone();
    let state = FixtureState::new(config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state.clone());

    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            warn!("Fixture server stopped: {err}");
        }
    });

    info!("Supabase fixture listening on {addr}");

    Ok(FixtureHandle {
        base_url: format!("http://{addr}"),
        anon_key,
        state,
        task,
    })
}

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse as _, Response},
};
use tower_cookies::{Cookies, PrivateCookies};
use tracing::error;

pub use tower_cookies::Cookie;

use crate::state::AppState;

/// Cookies encrypted with [`AppState::cookie_key`]. Used for app-owned
/// state such as the password-update flag; the auth cookies are plain.
pub struct CookieJar {
    cookies: Cookies,
    state: AppState,
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for CookieJar {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(cookies) = Cookies::from_request_parts(parts, state).await else {
            error!("CookieManagerLayer is missing, cannot read cookies");
            return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        };

        Ok(CookieJar {
            cookies,
            state: state.clone(),
        })
    }
}

impl CookieJar {
    fn private(&self) -> PrivateCookies<'_> {
        self.cookies.private(&self.state.cookie_key)
    }

    pub fn add(&self, cookie: Cookie<'static>) {
        self.private().add(cookie);
    }

    /// Tampered or undecryptable values read as missing
    pub fn get(&self, name: &str) -> Option<Cookie<'static>> {
        self.private().get(name)
    }

    pub fn remove(&self, cookie: Cookie<'static>) {
        self.private().remove(cookie);
    }

    /// Whether cookies we set should carry `Secure`
    pub fn secure(&self) -> bool {
        self.state.secure_cookies()
    }
}

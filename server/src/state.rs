use std::env;

use axum::extract::FromRef;
use base64::Engine as _;
use color_eyre::eyre::{eyre, Context as _};
use tower_cookies::Key;
use tracing::warn;

use crate::supabase::{SupabaseClient, SupabaseConfig};

#[derive(Clone)]
pub struct AppState {
    pub supabase: SupabaseClient,
    /// Encrypts the private cookies
    pub cookie_key: Key,
    /// Public host of this app, including any port
    pub domain: String,
    pub protocol: String,
}

impl AppState {
    pub fn from_env() -> color_eyre::Result<Self> {
        let supabase = SupabaseConfig::from_env()?;
        let domain = env::var("DOMAIN").wrap_err("DOMAIN must be set")?;
        let protocol = env::var("PROTO").unwrap_or_else(|_| "https".to_owned());

        Self::new(supabase, cookie_key_from_env()?, domain, protocol)
    }

    pub fn new(
        supabase: SupabaseConfig,
        cookie_key: Key,
        domain: impl Into<String>,
        protocol: impl Into<String>,
    ) -> color_eyre::Result<Self> {
        let protocol = protocol.into();
        let secure = protocol == "https";

        Ok(Self {
            supabase: SupabaseClient::new(supabase, secure)?,
            cookie_key,
            domain: domain.into(),
            protocol,
        })
    }

    /// `PROTO://DOMAIN`
    pub fn origin(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }

    pub fn secure_cookies(&self) -> bool {
        self.protocol == "https"
    }
}

impl FromRef<AppState> for SupabaseClient {
    fn from_ref(state: &AppState) -> Self {
        state.supabase.clone()
    }
}

/// `COOKIE_KEY` is 64 bytes of base64. Without it a fresh key is generated,
/// which logs everyone out on restart.
fn cookie_key_from_env() -> color_eyre::Result<Key> {
    let Ok(encoded) = env::var("COOKIE_KEY") else {
        warn!("COOKIE_KEY not set, generating a temporary key");
        return Ok(Key::generate());
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .wrap_err("COOKIE_KEY is not valid base64")?;

    Key::try_from(bytes.as_slice())
        .map_err(|err| eyre!("COOKIE_KEY must decode to at least 64 bytes: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(protocol: &str) -> AppState {
        AppState::new(
            SupabaseConfig::new("http://localhost:54321", "anon"),
            Key::generate(),
            "localhost:3000",
            protocol,
        )
        .unwrap()
    }

    #[test]
    fn origin_joins_protocol_and_domain() {
        assert_eq!(state("http").origin(), "http://localhost:3000");
        assert_eq!(state("https").origin(), "https://localhost:3000");
    }

    #[test]
    fn only_https_marks_cookies_secure() {
        assert!(state("https").secure_cookies());
        assert!(!state("http").secure_cookies());
    }
}

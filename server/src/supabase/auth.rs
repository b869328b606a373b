use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    parse_json, pkce,
    types::{AuthResponse, OAuthResponse, Provider, Session, User, UserAttributes},
    Supabase, SupabaseClient, SupabaseError, SupabaseResult, VerifyOtpParams,
};

/// Refresh sessions this close to expiry
const EXPIRY_MARGIN_SECS: i64 = 90;

/// The GoTrue half of the client
pub struct Auth<'a> {
    supabase: &'a Supabase,
}

fn auth_response(body: Value) -> SupabaseResult<AuthResponse> {
    if body.get("access_token").is_some() {
        let session = serde_json::from_value::<Session>(body)?.with_expiry();
        return Ok(AuthResponse {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    if body.get("id").is_some() {
        return Ok(AuthResponse {
            user: Some(serde_json::from_value(body)?),
            session: None,
        });
    }

    Ok(AuthResponse::default())
}

impl<'a> Auth<'a> {
    pub(crate) fn new(supabase: &'a Supabase) -> Self {
        Self { supabase }
    }

    fn client(&self) -> &SupabaseClient {
        self.supabase.client()
    }

    fn storage_key(&self) -> String {
        self.client().config().storage_key()
    }

    fn verifier_key(&self) -> String {
        format!("{}-code-verifier", self.storage_key())
    }

    fn save_session(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(json) => self.supabase.storage().set_item(&self.storage_key(), &json),
            Err(err) => warn!("Failed to serialize session: {err}"),
        }
    }

    fn remove_session(&self) {
        self.supabase.storage().remove_item(&self.storage_key());
    }

    fn load_session(&self) -> Option<Session> {
        let raw = self.supabase.storage().get_item(&self.storage_key())?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session.with_expiry()),
            Err(err) => {
                warn!("Ignoring stored session that could not be parsed: {err}");
                None
            }
        }
    }

    fn store_response(&self, response: &AuthResponse) {
        if let Some(session) = &response.session {
            self.save_session(session);
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> SupabaseResult<AuthResponse> {
        let response = self
            .client()
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = auth_response(parse_json(response).await?)?;
        self.store_response(&response);

        info!(
            has_session = response.session.is_some(),
            "Signed up new user"
        );
        Ok(response)
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> SupabaseResult<Session> {
        let response = self
            .client()
            .request(Method::POST, "/auth/v1/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session = parse_json::<Session>(response).await?.with_expiry();
        self.save_session(&session);

        info!(user_id = %session.user.id, "Signed in with password");
        Ok(session)
    }

    /// Sends a magic link, creating the user if needed
    #[instrument(skip(self))]
    pub async fn sign_in_with_otp(&self, email: &str) -> SupabaseResult<()> {
        let response = self
            .client()
            .request(Method::POST, "/auth/v1/otp")
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await?;

        parse_json::<Value>(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn sign_in_anonymously(&self) -> SupabaseResult<AuthResponse> {
        let response = self
            .client()
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({}))
            .send()
            .await?;

        let response = auth_response(parse_json(response).await?)?;
        self.store_response(&response);
        Ok(response)
    }

    /// Builds the provider's authorize URL. The PKCE verifier is kept in a
    /// cookie until the callback exchanges the code.
    #[instrument(skip(self))]
    pub fn sign_in_with_oauth(
        &self,
        provider: &str,
        redirect_to: &str,
    ) -> SupabaseResult<OAuthResponse> {
        let provider: Provider = provider.parse()?;
        let (code_verifier, code_challenge) = pkce::generate_pkce_codes();

        self.supabase
            .storage()
            .set_item(&self.verifier_key(), &code_verifier);

        let url = format!(
            "{}/auth/v1/authorize?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            self.client().config().url,
            provider,
            urlencoding::encode(redirect_to),
            code_challenge,
        );

        Ok(OAuthResponse { provider, url })
    }

    #[instrument(skip(self, code))]
    pub async fn exchange_code_for_session(&self, code: &str) -> SupabaseResult<Session> {
        let code_verifier = self
            .supabase
            .storage()
            .get_item(&self.verifier_key())
            .ok_or(SupabaseError::CodeVerifierMissing)?;

        let response = self
            .client()
            .request(Method::POST, "/auth/v1/token?grant_type=pkce")
            .json(&json!({ "auth_code": code, "code_verifier": code_verifier }))
            .send()
            .await?;

        let session = parse_json::<Session>(response).await?.with_expiry();
        self.supabase.storage().remove_item(&self.verifier_key());
        self.save_session(&session);

        info!(user_id = %session.user.id, "Exchanged code for session");
        Ok(session)
    }

    #[instrument(skip(self, params))]
    pub async fn verify_otp(&self, params: VerifyOtpParams) -> SupabaseResult<AuthResponse> {
        let response = self
            .client()
            .request(Method::POST, "/auth/v1/verify")
            .json(&params)
            .send()
            .await?;

        let response = auth_response(parse_json(response).await?)?;
        self.store_response(&response);
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> SupabaseResult<()> {
        let path = format!(
            "/auth/v1/recover?redirect_to={}",
            urlencoding::encode(redirect_to)
        );
        let response = self
            .client()
            .request(Method::POST, &path)
            .json(&json!({ "email": email }))
            .send()
            .await?;

        parse_json::<Value>(response).await?;
        Ok(())
    }

    #[instrument(skip(self, attributes))]
    pub async fn update_user(&self, attributes: &UserAttributes) -> SupabaseResult<User> {
        let session = self
            .get_session()
            .await?
            .ok_or(SupabaseError::SessionMissing)?;

        let response = self
            .client()
            .request(Method::PUT, "/auth/v1/user")
            .bearer_auth(&session.access_token)
            .json(attributes)
            .send()
            .await?;

        let user: User = parse_json(response).await?;
        self.save_session(&Session {
            user: user.clone(),
            ..session
        });

        Ok(user)
    }

    /// The stored session, refreshed first when it is about to expire.
    ///
    /// This trusts the cookie; use [`Auth::get_user`] to have the server
    /// validate the token.
    pub async fn get_session(&self) -> SupabaseResult<Option<Session>> {
        let Some(session) = self.load_session() else {
            return Ok(None);
        };

        if session.expires_within() > EXPIRY_MARGIN_SECS {
            return Ok(Some(session));
        }

        info!(user_id = %session.user.id, "Session is about to expire, refreshing");
        match self.refresh_session(&session.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(err) if err.status().is_some_and(|s| (400..500).contains(&s)) => {
                warn!("Refresh token rejected, clearing session: {err}");
                self.remove_session();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> SupabaseResult<Session> {
        let response = self
            .client()
            .request(Method::POST, "/auth/v1/token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let session = parse_json::<Session>(response).await?.with_expiry();
        self.save_session(&session);
        Ok(session)
    }

    /// Fetch the user for the current session, validating the JWT remotely
    #[instrument(skip(self))]
    pub async fn get_user(&self) -> SupabaseResult<User> {
        let session = self
            .get_session()
            .await?
            .ok_or(SupabaseError::SessionMissing)?;

        let response = self
            .client()
            .request(Method::GET, "/auth/v1/user")
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        parse_json(response).await
    }

    /// Revokes every session of the user. Cookies are cleared even when the
    /// remote call fails.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> SupabaseResult<()> {
        let session = self.load_session();
        self.remove_session();
        self.supabase.storage().remove_item(&self.verifier_key());

        let Some(session) = session else {
            return Ok(());
        };

        let response = self
            .client()
            .request(Method::POST, "/auth/v1/logout?scope=global")
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                info!(user_id = %session.user.id, "Signed out");
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                info!(user_id = %session.user.id, "Session was already gone remotely");
                Ok(())
            }
            _ => Err(SupabaseError::from_response(response).await),
        }
    }
}

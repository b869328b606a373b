use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{error, info};

use crate::{
    cookies::{Cookie, CookieJar},
    state::AppState,
    supabase::{Session, Supabase, User},
};

/// Private cookie holding [`PasswordFlag`]
pub const PASSWORD_FLAG_COOKIE: &str = "__sb_by_example";

const PASSWORD_FLAG_MAX_AGE_DAYS: i64 = 7;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PasswordFlag {
    #[serde(default)]
    password_update_required: bool,
}

/// A signed-in user whose token the auth server has just validated
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub session: Session,
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let supabase = Supabase::from_request_parts(parts, state).await?;
        let auth = supabase.auth();

        let session = match auth.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("No session found, redirecting to sign in");
                return Err(Redirect::to("/auth/signin").into_response());
            }
            Err(err) => {
                error!("Failed to load session: {err:?}");
                return Err(Redirect::to("/auth/signin").into_response());
            }
        };

        let user = match auth.get_user().await {
            Ok(user) => user,
            Err(err) => {
                info!(user_id = %session.user.id, "JWT validation failed: {err}");
                return Err(Redirect::to("/auth/signin").into_response());
            }
        };

        Ok(AuthUser { session, user })
    }
}

/// An [`AuthUser`] who is not in the middle of a forced password reset
#[derive(Debug, Clone)]
pub struct ActiveUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        let jar = CookieJar::from_request_parts(parts, state).await?;

        if is_password_update_required(&jar) {
            info!(user_id = %auth_user.user.id, "Password update required");
            return Err(Redirect::to("/account/update-password").into_response());
        }

        Ok(ActiveUser(auth_user))
    }
}

fn flag_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(PASSWORD_FLAG_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_max_age(Duration::days(PASSWORD_FLAG_MAX_AGE_DAYS));
    cookie
}

/// Force the next gated page to send the user to update their password
pub fn password_update_required(jar: &CookieJar) {
    let flag = PasswordFlag {
        password_update_required: true,
    };

    match serde_json::to_string(&flag) {
        Ok(value) => jar.add(flag_cookie(value, jar.secure())),
        Err(err) => error!("Failed to serialize password flag: {err}"),
    }
}

pub fn clear_password_update_cookie(jar: &CookieJar) {
    jar.remove(flag_cookie(String::new(), jar.secure()));
}

pub fn is_password_update_required(jar: &CookieJar) -> bool {
    jar.get(PASSWORD_FLAG_COOKIE)
        .and_then(|cookie| serde_json::from_str::<PasswordFlag>(cookie.value()).ok())
        .is_some_and(|flag| flag.password_update_required)
}

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use super::{bearer, store::FakeUser, FixtureState};

const MIN_PASSWORD_LENGTH: usize = 6;
const SUPPORTED_PROVIDERS: &[&str] = &["github", "google"];

fn auth_error(status: StatusCode, error_code: &str, msg: &str) -> Response {
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "error_code": error_code,
            "msg": msg,
        })),
    )
        .into_response()
}

fn weak_password() -> Response {
    auth_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "weak_password",
        "Password should be at least 6 characters.",
    )
}

fn bad_jwt() -> Response {
    auth_error(
        StatusCode::UNAUTHORIZED,
        "bad_jwt",
        "invalid JWT: unable to parse or verify signature, token is expired",
    )
}

fn session_response(state: &FixtureState, user_id: Uuid) -> Response {
    let ttl = state.config.session_ttl_secs;
    match state.store().issue_session(user_id, ttl) {
        Some(session) => Json(session).into_response(),
        None => auth_error(StatusCode::NOT_FOUND, "user_not_found", "User not found"),
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupBody {
    email: Option<String>,
    password: Option<String>,
}

pub async fn signup(State(state): State<FixtureState>, Json(body): Json<SignupBody>) -> Response {
    let email = body.email.filter(|e| !e.is_empty());

    let Some(email) = email else {
        let id = state.store().insert_user(FakeUser {
            id: Uuid::new_v4(),
            email: None,
            password: None,
            confirmed: true,
            is_anonymous: true,
            provider: "anonymous".to_string(),
        });
        info!("Signed up anonymous user {id}");
        return session_response(&state, id);
    };

    let password = body.password.unwrap_or_default();
    if password.len() < MIN_PASSWORD_LENGTH {
        return weak_password();
    }

    let user = {
        let mut store = state.store();
        if store.user_by_email(&email).is_some() {
            return auth_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "user_already_exists",
                "User already registered",
            );
        }

        let user = FakeUser {
            id: Uuid::new_v4(),
            email: Some(email.clone()),
            password: Some(password),
            confirmed: state.config.autoconfirm,
            is_anonymous: false,
            provider: "email".to_string(),
        };
        store.insert_user(user.clone());
        if !state.config.autoconfirm {
            store.send_mail(&email, "signup", None);
        }
        user
    };

    info!("Signed up {email}");
    if state.config.autoconfirm {
        session_response(&state, user.id)
    } else {
        Json(user.to_json()).into_response()
    }
}

fn str_field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

#[derive(Deserialize)]
pub struct TokenQuery {
    grant_type: String,
}

pub async fn token(
    State(state): State<FixtureState>,
    Query(query): Query<TokenQuery>,
    Json(body): Json<Value>,
) -> Response {
    let field = |name| str_field(&body, name);

    match query.grant_type.as_str() {
        "password" => {
            let user = state.store().user_by_email(field("email")).cloned();
            let Some(user) = user.filter(|u| u.password.as_deref() == Some(field("password")))
            else {
                return auth_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_credentials",
                    "Invalid login credentials",
                );
            };
            if !user.confirmed {
                return auth_error(
                    StatusCode::BAD_REQUEST,
                    "email_not_confirmed",
                    "Email not confirmed",
                );
            }
            session_response(&state, user.id)
        }
        "refresh_token" => {
            let user_id = state.store().take_refresh_token(field("refresh_token"));
            match user_id {
                Some(id) => session_response(&state, id),
                None => auth_error(
                    StatusCode::BAD_REQUEST,
                    "refresh_token_not_found",
                    "Invalid Refresh Token: Refresh Token Not Found",
                ),
            }
        }
        "pkce" => {
            let code = state.store().take_code(field("auth_code"));
            let Some(code) = code else {
                return auth_error(
                    StatusCode::NOT_FOUND,
                    "flow_state_not_found",
                    "invalid flow state, no valid flow state found",
                );
            };

            let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(field("code_verifier")));
            if challenge != code.challenge {
                return auth_error(
                    StatusCode::BAD_REQUEST,
                    "bad_code_verifier",
                    "code challenge does not match previously saved code verifier",
                );
            }
            session_response(&state, code.user_id)
        }
        other => auth_error(
            StatusCode::BAD_REQUEST,
            "validation_failed",
            &format!("unsupported_grant_type: {other}"),
        ),
    }
}

#[derive(Deserialize)]
pub struct OtpBody {
    email: String,
    #[serde(default)]
    create_user: bool,
}

pub async fn otp(State(state): State<FixtureState>, Json(body): Json<OtpBody>) -> Response {
    let mut store = state.store();

    if store.user_by_email(&body.email).is_none() {
        if !body.create_user {
            return auth_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "otp_disabled",
                "Signups not allowed for otp",
            );
        }
        store.insert_user(FakeUser {
            id: Uuid::new_v4(),
            email: Some(body.email.clone()),
            password: None,
            confirmed: false,
            is_anonymous: false,
            provider: "email".to_string(),
        });
    }

    store.send_mail(&body.email, "magiclink", None);
    info!("Sent magic link to {}", body.email);

    Json(json!({})).into_response()
}

#[derive(Deserialize)]
pub struct VerifyBody {
    #[serde(rename = "type")]
    otp_type: String,
    token_hash: Option<String>,
    email: Option<String>,
    token: Option<String>,
}

pub async fn verify(State(state): State<FixtureState>, Json(body): Json<VerifyBody>) -> Response {
    let user_id = {
        let mut store = state.store();
        let mail = store.take_mail(
            &body.otp_type,
            body.token_hash.as_deref(),
            body.email.as_deref(),
            body.token.as_deref(),
        );

        let user_id = mail
            .and_then(|mail| store.user_by_email(&mail.email).map(|u| u.id));
        if let Some(id) = user_id {
            if let Some(user) = store.user_mut(id) {
                user.confirmed = true;
            }
        }
        user_id
    };

    match user_id {
        Some(id) => session_response(&state, id),
        None => auth_error(
            StatusCode::FORBIDDEN,
            "otp_expired",
            "Token has expired or is invalid",
        ),
    }
}

#[derive(Deserialize)]
pub struct RecoverQuery {
    redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct RecoverBody {
    email: String,
}

pub async fn recover(
    State(state): State<FixtureState>,
    Query(query): Query<RecoverQuery>,
    Json(body): Json<RecoverBody>,
) -> Response {
    let mut store = state.store();
    if store.user_by_email(&body.email).is_some() {
        store.send_mail(&body.email, "recovery", query.redirect_to);
        info!("Sent recovery mail to {}", body.email);
    }

    Json(json!({})).into_response()
}

pub async fn get_user(State(state): State<FixtureState>, headers: HeaderMap) -> Response {
    let store = state.store();
    let user = bearer(&headers)
        .and_then(|token| store.user_for_access_token(&token))
        .and_then(|id| store.user(id));

    match user {
        Some(user) => Json(user.to_json()).into_response(),
        None => bad_jwt(),
    }
}

#[derive(Deserialize)]
pub struct UpdateUserBody {
    email: Option<String>,
    password: Option<String>,
}

pub async fn update_user(
    State(state): State<FixtureState>,
    headers: HeaderMap,
    Json(body): Json<UpdateUserBody>,
) -> Response {
    let mut store = state.store();
    let Some(id) = bearer(&headers).and_then(|token| store.user_for_access_token(&token)) else {
        return bad_jwt();
    };

    if let Some(email) = &body.email {
        if store.user_by_email(email).is_some_and(|u| u.id != id) {
            return auth_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "email_exists",
                "A user with this email address has already been registered",
            );
        }
    }

    let Some(user) = store.user_mut(id) else {
        return bad_jwt();
    };

    if let Some(password) = body.password {
        if password.len() < MIN_PASSWORD_LENGTH {
            return weak_password();
        }
        if user.password.as_deref() == Some(password.as_str()) {
            return auth_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "same_password",
                "New password should be different from the old password.",
            );
        }
        user.password = Some(password);
    }

    if let Some(email) = body.email {
        user.email = Some(email);
    }

    Json(user.to_json()).into_response()
}

pub async fn logout(State(state): State<FixtureState>, headers: HeaderMap) -> Response {
    let mut store = state.store();
    let Some(id) = bearer(&headers).and_then(|token| store.user_for_access_token(&token)) else {
        return bad_jwt();
    };

    store.revoke_all(id);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
pub struct AuthorizeQuery {
    provider: String,
    redirect_to: String,
    code_challenge: String,
}

#[derive(Serialize)]
struct CallbackParams<'a> {
    code: &'a str,
}

/// Stands in for both the platform and the upstream provider: the "user"
/// consents immediately and is sent back with a code.
pub async fn authorize(
    State(state): State<FixtureState>,
    Query(query): Query<AuthorizeQuery>,
) -> Response {
    if !SUPPORTED_PROVIDERS.contains(&query.provider.as_str()) {
        return auth_error(
            StatusCode::BAD_REQUEST,
            "validation_failed",
            "Unsupported provider: Provider is not enabled",
        );
    }

    let code = {
        let mut store = state.store();
        let email = format!("{}-user@example.test", query.provider);
        let user_id = match store.user_by_email(&email) {
            Some(user) => user.id,
            None => store.insert_user(FakeUser {
                id: Uuid::new_v4(),
                email: Some(email),
                password: None,
                confirmed: true,
                is_anonymous: false,
                provider: query.provider.clone(),
            }),
        };
        store.insert_code(user_id, query.code_challenge)
    };

    let params = serde_urlencoded::to_string(CallbackParams { code: &code }).unwrap_or_default();
    let separator = if query.redirect_to.contains('?') { '&' } else { '?' };

    Redirect::to(&format!("{}{separator}{params}", query.redirect_to)).into_response()
}

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_cookies::CookieManagerLayer;

use crate::{outcome::FormOutcome, state::AppState, supabase::SupabaseError};

pub mod account;
pub mod auth;
mod home;
mod profile;

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Try again later.";

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home_page))
        .route("/healthz", get(healthz))
        // Account pages
        .route("/account", get(account::index::account_page))
        .route(
            "/account/update",
            get(account::update::update_page).post(account::update::update_action),
        )
        .route(
            "/account/update-email",
            get(account::update_email::update_email_page)
                .post(account::update_email::update_email_action),
        )
        .route(
            "/account/update-password",
            get(account::update_password::update_password_page)
                .post(account::update_password::update_password_action),
        )
        // Auth screens and actions
        .route(
            "/auth/signin",
            get(auth::signin::signin_page).post(auth::signin::signin_action),
        )
        .route(
            "/auth/signup",
            get(auth::signup::signup_page).post(auth::signup::signup_action),
        )
        .route(
            "/auth/forgotpassword",
            get(auth::forgot_password::forgot_password_page)
                .post(auth::forgot_password::forgot_password_action),
        )
        .route(
            "/auth/verify-token",
            get(auth::verify_token::verify_token_page)
                .post(auth::verify_token::verify_token_action),
        )
        .route("/auth/confirm", get(auth::confirm::confirm))
        .route("/auth/callback", get(auth::callback::callback))
        .route("/auth/anonymous", get(auth::anonymous::anonymous))
        .route(
            "/auth/signout",
            get(auth::signout::signout_redirect).post(auth::signout::signout),
        )
        .route("/auth/:provider", get(auth::oauth::oauth_redirect))
        // Public profiles
        .route("/u/:slug", get(profile::public_profile))
        .layer(CookieManagerLayer::new())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(sentry_tower::NewSentryLayer::<Request>::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::with_transaction())
        .with_state(app_state)
}

async fn healthz() -> &'static str {
    "OK"
}

/// Message shown for a failed auth call. A 400 from the auth API means the
/// credentials were wrong, and the detail is not shown.
pub(crate) fn failure_message(err: &SupabaseError) -> String {
    if err.is_bad_request() {
        "Invalid credentials.".to_string()
    } else {
        err.to_string()
    }
}

/// Fault body for endpoints that have no page to render
pub(crate) fn json_fault(status: StatusCode, message: &str) -> Response {
    (status, Json(FormOutcome::fault(message, None, ()))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use tower::ServiceExt as _;
    use tower_cookies::Key;

    use super::*;
    use crate::supabase::SupabaseConfig;

    fn app() -> Router {
        // Nothing listens here; these routes must not reach the platform
        let config = SupabaseConfig::new("http://127.0.0.1:9", "anon-key");
        let state = AppState::new(config, Key::generate(), "localhost:3000", "http").unwrap();
        routes(state)
    }

    async fn get(path: &str) -> Response {
        app()
            .oneshot(axum::http::Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(get("/healthz").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn gated_pages_redirect_without_a_session() {
        for path in ["/", "/account", "/account/update", "/account/update-password"] {
            let response = get(path).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(response.headers()["location"], "/auth/signin", "{path}");
        }
    }

    #[tokio::test]
    async fn oauth_redirect_sets_the_verifier_cookie() {
        let response = get("/auth/github").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("http://127.0.0.1:9/auth/v1/authorize?provider=github"));
        assert!(location.contains("redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));

        let cookies = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>();
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("sb-127-auth-token-code-verifier=")));
    }

    #[tokio::test]
    async fn unknown_provider_is_a_json_fault() {
        let response = get("/auth/myspace").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn confirm_ignores_next_with_control_characters() {
        for next in ["%2Fhome%0Aevil", "%2F%09%2Fevil.example.com"] {
            let response = get(&format!("/auth/confirm?next={next}")).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{next}");
            assert_eq!(
                response.headers()["location"],
                "http://localhost:3000",
                "{next}"
            );
        }
    }

    #[tokio::test]
    async fn signout_get_goes_home() {
        let response = get("/auth/signout").await;
        assert_eq!(response.headers()["location"], "/");
    }

    #[test]
    fn bad_requests_hide_the_remote_message() {
        let err = SupabaseError::Api {
            status: 400,
            code: Some("invalid_credentials".to_string()),
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(failure_message(&err), "Invalid credentials.");

        let err = SupabaseError::Api {
            status: 422,
            code: Some("same_password".to_string()),
            message: "New password should be different from the old password.".to_string(),
        };
        assert_eq!(
            failure_message(&err),
            "New password should be different from the old password."
        );
    }
}

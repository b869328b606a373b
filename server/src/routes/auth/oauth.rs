use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{error, info};

use crate::{
    routes::{json_fault, SERVER_ERROR_MESSAGE},
    state::AppState,
    supabase::Supabase,
};

pub async fn oauth_redirect(
    State(state): State<AppState>,
    supabase: Supabase,
    Path(provider): Path<String>,
) -> Response {
    let redirect_to = format!("{}/auth/callback", state.origin());

    match supabase.auth().sign_in_with_oauth(&provider, &redirect_to) {
        Ok(oauth) => {
            info!(provider = %oauth.provider, "Redirecting to OAuth provider");
            Redirect::to(&oauth.url).into_response()
        }
        Err(err) => {
            error!(%provider, "OAuth sign in failed: {err}");
            json_fault(StatusCode::NOT_FOUND, SERVER_ERROR_MESSAGE)
        }
    }
}

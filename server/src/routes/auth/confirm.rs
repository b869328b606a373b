use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    cookies::CookieJar,
    routes::auth::safe_next,
    session::password_update_required,
    state::AppState,
    supabase::{OtpType, Supabase, VerifyOtpParams},
};

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    token_hash: Option<String>,
    #[serde(rename = "type")]
    otp_type: Option<String>,
    next: Option<String>,
}

/// Landing page for the links in auth emails
pub async fn confirm(
    State(state): State<AppState>,
    supabase: Supabase,
    jar: CookieJar,
    Query(query): Query<ConfirmQuery>,
) -> Redirect {
    let origin = state.origin();
    let next = safe_next(&origin, query.next.as_deref(), &origin);

    let Some(token_hash) = query.token_hash.filter(|t| !t.is_empty()) else {
        return Redirect::to(&next);
    };

    let otp_type = OtpType::parse_or_email(query.otp_type.as_deref());
    if otp_type == OtpType::Recovery {
        password_update_required(&jar);
    }

    let params = VerifyOtpParams::TokenHash {
        token_hash,
        otp_type,
    };
    match supabase.auth().verify_otp(params).await {
        Ok(_) => info!(%otp_type, "Email link verified"),
        Err(err) => warn!(%otp_type, "Email link verification failed: {err}"),
    }

    Redirect::to(&next)
}

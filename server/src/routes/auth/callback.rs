use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::warn;

use crate::{routes::auth::safe_next, state::AppState, supabase::Supabase};

const CALLBACK_FAILED: &str =
    "There was a problem with your authentication. Please report this to our support team.";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    next: Option<String>,
}

/// OAuth redirect target. Swaps the code for a session.
pub async fn callback(
    State(state): State<AppState>,
    supabase: Supabase,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let origin = state.origin();

    if let Some(code) = query.code.filter(|c| !c.is_empty()) {
        match supabase.auth().exchange_code_for_session(&code).await {
            Ok(_) => return Redirect::to(&safe_next(&origin, query.next.as_deref(), &origin)),
            Err(err) => warn!("Code exchange failed: {err}"),
        }
    }

    Redirect::to(&format!(
        "/auth/signin?error_message={}",
        urlencoding::encode(CALLBACK_FAILED)
    ))
}

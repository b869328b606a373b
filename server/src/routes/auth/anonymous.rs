use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::{
    routes::{json_fault, SERVER_ERROR_MESSAGE},
    supabase::Supabase,
};

pub async fn anonymous(supabase: Supabase) -> Response {
    match supabase.auth().sign_in_anonymously().await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => {
            error!("Anonymous sign in failed: {err}");
            json_fault(StatusCode::BAD_GATEWAY, SERVER_ERROR_MESSAGE)
        }
    }
}

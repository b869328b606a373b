use axum::response::Redirect;
use tracing::warn;

use crate::{cookies::CookieJar, session::clear_password_update_cookie, supabase::Supabase};

pub async fn signout_redirect() -> Redirect {
    Redirect::to("/")
}

pub async fn signout(supabase: Supabase, jar: CookieJar) -> Redirect {
    if let Err(err) = supabase.auth().sign_out().await {
        warn!("Sign out failed: {err}");
    }
    clear_password_update_cookie(&jar);

    Redirect::to("/")
}

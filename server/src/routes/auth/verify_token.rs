use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use maud::html;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    components::{
        form::InputField,
        layout::{AuthPanel, Page, SITE_TITLE},
        ui::{alert::Alert, button::Button, heading::Heading},
    },
    forms::VerifyTokenForm,
    outcome::FormOutcome,
    routes::{auth::safe_next, failure_message},
    state::AppState,
    supabase::{OtpType, Supabase, VerifyOtpParams},
};

#[derive(Debug, Default, Deserialize)]
pub struct VerifyTokenQuery {
    #[serde(rename = "type")]
    otp_type: Option<String>,
    next: Option<String>,
}

pub async fn verify_token_page() -> Page {
    render(None)
}

pub async fn verify_token_action(
    State(state): State<AppState>,
    supabase: Supabase,
    Query(query): Query<VerifyTokenQuery>,
    Form(form): Form<VerifyTokenForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        return render(Some(FormOutcome::invalid(&errors, form))).into_response();
    }

    let params = VerifyOtpParams::Email {
        email: form.email.clone(),
        token: form.token.clone(),
        otp_type: OtpType::parse_or_email(query.otp_type.as_deref()),
    };

    match supabase.auth().verify_otp(params).await {
        Ok(_) => {
            let next = safe_next(&state.origin(), query.next.as_deref(), "/");
            Redirect::to(&next).into_response()
        }
        Err(err) => {
            info!("Token verification failed: {err}");
            let data = VerifyTokenForm {
                token: String::new(),
                ..form
            };
            render(Some(FormOutcome::fault(failure_message(&err), None, data))).into_response()
        }
    }
}

fn render(outcome: Option<FormOutcome<VerifyTokenForm>>) -> Page {
    let alert = Alert::for_outcome(outcome.as_ref());
    let data = outcome.as_ref().map(|o| o.data.clone()).unwrap_or_default();
    let error_for = |field| outcome.as_ref().and_then(|o| o.error_for(field));

    // An empty action posts back to this URL, query string included
    let content = html! {
        @if let Some(alert) = alert {
            (alert)
        }
        (Heading::h1("Verify token"))
        p class="mb-4 text-gray-600" { "Enter the 6 digit code from your email." }
        form method="post" action="" {
            (InputField::new("email").label("Email").value(&data.email).error(error_for("email")))
            (InputField::new("token")
                .label("Token")
                .placeholder("123456")
                .value(&data.token)
                .error(error_for("token")))
            div class="mt-6" {
                (Button::primary("Verify").full_width(true))
            }
        }
    };

    Page::new(format!("Verify token | {SITE_TITLE}"), AuthPanel::new(content))
}

use axum::{extract::State, Form};
use maud::html;
use tracing::info;
use validator::Validate;

use crate::{
    components::{
        form::InputField,
        layout::{AuthPanel, Page, SITE_TITLE},
        ui::{
            alert::Alert,
            button::{Button, ButtonVariant},
            heading::Heading,
        },
    },
    forms::EmailForm,
    outcome::FormOutcome,
    routes::failure_message,
    state::AppState,
    supabase::Supabase,
};

const RESET_LINK_SENT: &str =
    "Please check your email for a password reset link to log into the website.";

pub async fn forgot_password_page() -> Page {
    render(None)
}

pub async fn forgot_password_action(
    State(state): State<AppState>,
    supabase: Supabase,
    Form(form): Form<EmailForm>,
) -> Page {
    if let Err(errors) = form.validate() {
        return render(Some(FormOutcome::invalid(&errors, form)));
    }

    let redirect_to = format!("{}/account/update-password", state.origin());
    let outcome = match supabase
        .auth()
        .reset_password_for_email(&form.email, &redirect_to)
        .await
    {
        Ok(()) => FormOutcome::success(RESET_LINK_SENT, EmailForm::default()),
        Err(err) => {
            info!("Password reset request failed: {err}");
            FormOutcome::fault(failure_message(&err), None, form)
        }
    };

    render(Some(outcome))
}

fn render(outcome: Option<FormOutcome<EmailForm>>) -> Page {
    let alert = Alert::for_outcome(outcome.as_ref());
    let email = outcome
        .as_ref()
        .map(|o| o.data.email.clone())
        .unwrap_or_default();
    let error = outcome
        .as_ref()
        .and_then(|o| o.error_for("email"))
        .map(str::to_string);

    let content = html! {
        @if let Some(alert) = alert {
            (alert)
        }
        (Heading::h1("Forgot password"))
        p class="mb-4 text-gray-600" { "Enter your email and we will send you a link to reset your password." }
        form method="post" action="/auth/forgotpassword" {
            (InputField::new("email").label("Email").value(&email).error(error.as_deref()))
            div class="mt-6" {
                (Button::primary("Send reset link").full_width(true))
            }
        }
        div class="pt-4 text-center" {
            (Button::primary("Back to sign in").href("/auth/signin").variant(ButtonVariant::Link))
        }
    };

    Page::new(format!("Forgot password | {SITE_TITLE}"), AuthPanel::new(content))
}

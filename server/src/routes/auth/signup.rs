use axum::Form;
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
    forms::AuthUserForm,
    outcome::FormOutcome,
    routes::{auth::signin::MAGIC_LINK_SENT, failure_message},
    supabase::Supabase,
};

pub async fn signup_page() -> Page {
    render(None)
}

pub async fn signup_action(supabase: Supabase, Form(form): Form<AuthUserForm>) -> Page {
    if let Err(errors) = form.validate() {
        return render(Some(FormOutcome::invalid(&errors, form)));
    }

    let outcome = match supabase.auth().sign_up(&form.email, &form.password).await {
        Ok(_) => FormOutcome::success(MAGIC_LINK_SENT, AuthUserForm::default()),
        Err(err) => {
            info!("Sign up failed: {err}");
            let data = AuthUserForm {
                password: String::new(),
                ..form
            };
            FormOutcome::fault(failure_message(&err), None, data)
        }
    };

    render(Some(outcome))
}

fn render(outcome: Option<FormOutcome<AuthUserForm>>) -> Page {
    let alert = Alert::for_outcome(outcome.as_ref());
    let data = outcome.as_ref().map(|o| &o.data);
    let error_for = |field| outcome.as_ref().and_then(|o| o.error_for(field));

    let content = html! {
        @if let Some(alert) = alert {
            (alert)
        }
        (Heading::h1("Sign up"))
        p class="font-medium mb-4" { "Create an account to continue" }
        form method="post" action="/auth/signup" {
            (InputField::new("email")
                .label("Email")
                .value(data.map(|d| d.email.as_str()).unwrap_or_default())
                .error(error_for("email")))
            (InputField::new("password")
                .label("Password")
                .input_type("password")
                .value(data.map(|d| d.password.as_str()).unwrap_or_default())
                .error(error_for("password")))
            div class="mt-6" {
                (Button::primary("Sign up").full_width(true))
            }
        }
        div class="pt-4 text-center" {
            "Already have an account? "
            (Button::primary("Sign in").href("/auth/signin").variant(ButtonVariant::Link))
        }
    };

    Page::new(format!("Sign up | {SITE_TITLE}"), AuthPanel::new(content))
}

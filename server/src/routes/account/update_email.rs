use axum::Form;
use maud::html;
use tracing::info;
use validator::Validate;

use crate::{
    components::{
        form::InputField,
        layout::{AppShell, Card, Page, SITE_TITLE},
        ui::{alert::Alert, button::Button, heading::Heading},
    },
    forms::UpdateEmailForm,
    outcome::FormOutcome,
    routes::failure_message,
    session::ActiveUser,
    supabase::{Supabase, UserAttributes},
};

const EMAIL_UPDATED: &str = "Your email was updated successfully.";

pub async fn update_email_page(_user: ActiveUser) -> Page {
    render(None)
}

pub async fn update_email_action(
    _user: ActiveUser,
    supabase: Supabase,
    Form(form): Form<UpdateEmailForm>,
) -> Page {
    if let Err(errors) = form.validate() {
        return render(Some(FormOutcome::invalid(&errors, form)));
    }

    let attributes = UserAttributes {
        email: Some(form.email.clone()),
        ..Default::default()
    };
    let outcome = match supabase.auth().update_user(&attributes).await {
        Ok(_) => FormOutcome::success(EMAIL_UPDATED, UpdateEmailForm::default()),
        Err(err) => {
            info!("Email update failed: {err}");
            FormOutcome::fault(failure_message(&err), None, form)
        }
    };

    render(Some(outcome))
}

fn render(outcome: Option<FormOutcome<UpdateEmailForm>>) -> Page {
    let alert = Alert::for_outcome(outcome.as_ref());
    let data = outcome.as_ref().map(|o| o.data.clone()).unwrap_or_default();
    let error_for = |field| outcome.as_ref().and_then(|o| o.error_for(field));

    let content = html! {
        @if let Some(alert) = alert {
            (alert)
        }
        (Heading::h1("Update Email"))
        form method="post" action="/account/update-email" {
            (InputField::new("email")
                .label("New Email")
                .input_type("email")
                .value(&data.email)
                .error(error_for("email")))
            (InputField::new("email_confirm")
                .label("Confirm Email")
                .input_type("email")
                .value(&data.email_confirm)
                .error(error_for("email_confirm")))
            div class="mt-6" {
                (Button::primary("Update Email").full_width(true))
            }
        }
    };

    Page::new(format!("Update Email | {SITE_TITLE}"), AppShell::new(Card::new(content)))
}

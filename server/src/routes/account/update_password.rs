use axum::Form;
use maud::html;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    components::{
        form::InputField,
        layout::{AppShell, Card, Page, SITE_TITLE},
        ui::{alert::Alert, button::Button, heading::Heading},
    },
    cookies::CookieJar,
    forms::UpdatePasswordForm,
    outcome::FormOutcome,
    profile::{get_profile, ProfileMatch},
    routes::failure_message,
    session::{clear_password_update_cookie, is_password_update_required, AuthUser},
    supabase::{Supabase, UserAttributes},
};

const PASSWORD_UPDATED: &str = "Your password was updated successfully.";

// Only `AuthUser` here: this is where the password flag sends people.
pub async fn update_password_page(user: AuthUser, supabase: Supabase, jar: CookieJar) -> Page {
    let name = greeting_name(&user, &supabase).await;
    render(&name, is_password_update_required(&jar), None)
}

pub async fn update_password_action(
    user: AuthUser,
    supabase: Supabase,
    jar: CookieJar,
    Form(form): Form<UpdatePasswordForm>,
) -> Page {
    let name = greeting_name(&user, &supabase).await;

    if let Err(errors) = form.validate() {
        let required = is_password_update_required(&jar);
        return render(&name, required, Some(FormOutcome::invalid(&errors, form)));
    }

    let attributes = UserAttributes {
        password: Some(form.password.clone()),
        ..Default::default()
    };
    match supabase.auth().update_user(&attributes).await {
        Ok(_) => {
            clear_password_update_cookie(&jar);
            let outcome = FormOutcome::success(PASSWORD_UPDATED, UpdatePasswordForm::default());
            render(&name, false, Some(outcome))
        }
        Err(err) => {
            info!("Password update failed: {err}");
            let outcome = FormOutcome::fault(
                failure_message(&err),
                None,
                UpdatePasswordForm::default(),
            );
            render(&name, is_password_update_required(&jar), Some(outcome))
        }
    }
}

/// Display name when the user has set one, otherwise their email. A failed
/// profile lookup only costs the greeting.
async fn greeting_name(user: &AuthUser, supabase: &Supabase) -> String {
    let display_name = match get_profile(supabase, ProfileMatch::Session).await {
        Ok(lookup) => lookup
            .profile
            .as_ref()
            .and_then(|p| p.display_name())
            .map(str::to_string),
        Err(err) => {
            warn!("Profile lookup for greeting failed: {err}");
            None
        }
    };

    display_name
        .or_else(|| user.user.email().map(str::to_string))
        .unwrap_or_default()
}

fn render(name: &str, required: bool, outcome: Option<FormOutcome<UpdatePasswordForm>>) -> Page {
    let alert = Alert::for_outcome(outcome.as_ref());
    let data = outcome.as_ref().map(|o| o.data.clone()).unwrap_or_default();
    let error_for = |field| outcome.as_ref().and_then(|o| o.error_for(field));

    let content = html! {
        @if let Some(alert) = alert {
            (alert)
        } @else if required {
            (Alert::info("Please set a new password to continue."))
        }
        (Heading::h1("Update Password"))
        p class="mb-4 text-gray-600" {
            "Hi " (name) ", Enter your new password below and confirm it"
        }
        form method="post" action="/account/update-password" {
            (InputField::new("password")
                .label("New Password")
                .input_type("password")
                .value(&data.password)
                .error(error_for("password")))
            (InputField::new("password_confirm")
                .label("Confirm Password")
                .input_type("password")
                .value(&data.password_confirm)
                .error(error_for("password_confirm")))
            div class="mt-6" {
                (Button::primary("Update Password").full_width(true))
            }
        }
    };

    Page::new(format!("Update Password | {SITE_TITLE}"), AppShell::new(Card::new(content)))
}

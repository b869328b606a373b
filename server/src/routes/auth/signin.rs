use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use maud::{html, Markup};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    components::{
        form::{Checkbox, InputField},
        layout::{AuthPanel, Page, SITE_TITLE},
        ui::{
            alert::Alert,
            button::{Button, ButtonVariant},
            heading::Heading,
        },
    },
    forms::{AuthUserForm, EmailForm},
    outcome::FormOutcome,
    routes::failure_message,
    supabase::Supabase,
};

pub const MAGIC_LINK_SENT: &str =
    "Please check your email for a magic link to log into the website.";

#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    auth_type: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    email: String,
    password: String,
    magiclink: Option<String>,
}

pub async fn signin_page(Query(query): Query<SignInQuery>) -> Page {
    let magic_link = query.auth_type.as_deref() == Some("magic_link");
    let error = query.error_message.as_deref().map(Alert::error);

    render(magic_link, error, None)
}

pub async fn signin_action(supabase: Supabase, Form(form): Form<SignInForm>) -> Response {
    if form.magiclink.is_some() {
        return render_outcome(true, send_magic_link(&supabase, form.email).await);
    }

    let credentials = AuthUserForm {
        email: form.email,
        password: form.password,
    };
    if let Err(errors) = credentials.validate() {
        return render_outcome(false, FormOutcome::invalid(&errors, credentials));
    }

    match supabase
        .auth()
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
    {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => {
            info!("Password sign in failed: {err}");
            let data = AuthUserForm {
                password: String::new(),
                ..credentials
            };
            render_outcome(false, FormOutcome::fault(failure_message(&err), None, data))
        }
    }
}

async fn send_magic_link(supabase: &Supabase, email: String) -> FormOutcome<AuthUserForm> {
    let data = AuthUserForm {
        email,
        password: String::new(),
    };

    let form = EmailForm {
        email: data.email.clone(),
    };
    if let Err(errors) = form.validate() {
        return FormOutcome::invalid(&errors, data);
    }

    match supabase.auth().sign_in_with_otp(&form.email).await {
        Ok(()) => FormOutcome::success(MAGIC_LINK_SENT, AuthUserForm::default()),
        Err(err) => {
            info!("Magic link request failed: {err}");
            FormOutcome::fault(failure_message(&err), None, data)
        }
    }
}

fn render_outcome(magic_link: bool, outcome: FormOutcome<AuthUserForm>) -> Response {
    let alert = Alert::for_outcome(Some(&outcome));
    render(magic_link, alert, Some(&outcome)).into_response()
}

fn render(magic_link: bool, alert: Option<Alert>, outcome: Option<&FormOutcome<AuthUserForm>>) -> Page {
    let email = outcome.map(|o| o.data.email.as_str()).unwrap_or_default();
    let password = outcome.map(|o| o.data.password.as_str()).unwrap_or_default();
    let error_for = |field| outcome.and_then(|o| o.error_for(field));

    let content: Markup = html! {
        @if let Some(alert) = alert {
            (alert)
        }
        (Heading::h1("Sign in"))
        p class="font-medium mb-4" { "Hi, Welcome back" }
        div class="space-y-2" {
            (Button::outline("Continue Anonymously").href("/auth/anonymous").full_width(true))
            (Button::outline("Continue with GitHub").href("/auth/github").full_width(true))
            (Button::outline("Continue with Google").href("/auth/google").full_width(true))
        }
        div class="my-6 text-center text-sm text-gray-400" { "or continue with Email" }
        form method="post" action="/auth/signin" {
            (InputField::new("email").label("Email").value(email).error(error_for("email")))
            @if !magic_link {
                (InputField::new("password")
                    .label("Password")
                    .input_type("password")
                    .value(password)
                    .error(error_for("password")))
            }
            div class="flex flex-row items-center justify-between pt-4" {
                (Checkbox::new("magiclink", "Magic link login", magic_link))
                @if magic_link {
                    a href="/auth/signin" class="block py-2 text-blue-500" { "Use password" }
                } @else {
                    a href="/auth/forgotpassword" class="block py-2 text-blue-500" { "Forgot Password?" }
                }
            }
            div class="mt-6" {
                (Button::primary("Sign in").full_width(true))
            }
        }
        div class="pt-4 text-center" {
            "Not registered yet? "
            (Button::primary("Create an account").href("/auth/signup").variant(ButtonVariant::Link))
        }
        @if !magic_link {
            p class="pt-2 text-center text-sm" {
                a href="/auth/signin?auth_type=magic_link" class="text-blue-500 hover:underline" {
                    "Sign in with a magic link instead"
                }
            }
        }
    };

    Page::new(format!("Sign in | {SITE_TITLE}"), AuthPanel::new(content))
}

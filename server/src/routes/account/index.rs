use maud::html;

use crate::{
    components::{
        layout::{AppShell, Card, Page, SITE_TITLE},
        ui::{button::Button, heading::Heading},
    },
    session::ActiveUser,
};

pub async fn account_page(ActiveUser(auth_user): ActiveUser) -> Page {
    let content = html! {
        (Heading::h1("Account"))
        @if let Some(email) = auth_user.user.email() {
            p class="mb-6 text-gray-600" { "Signed in as " (email) }
        }
        div class="space-y-2" {
            (Button::outline("Update Profile").href("/account/update").full_width(true))
            (Button::outline("Update Email").href("/account/update-email").full_width(true))
            (Button::outline("Update Password").href("/account/update-password").full_width(true))
        }
    };

    Page::new(format!("Account | {SITE_TITLE}"), AppShell::new(Card::new(content)))
}

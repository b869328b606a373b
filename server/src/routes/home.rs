use axum::{extract::State, http::StatusCode};
use maud::html;

use crate::{
    components::{
        layout::{AppShell, Card, Page, SITE_TITLE},
        ui::{badge::Badge, button::Button, heading::Heading},
    },
    errors::ServerResult,
    profile::{get_profile, ProfileMatch},
    session::ActiveUser,
    state::AppState,
    supabase::Supabase,
};

pub async fn home_page(
    State(state): State<AppState>,
    ActiveUser(auth_user): ActiveUser,
    supabase: Supabase,
) -> ServerResult<Page, StatusCode> {
    let lookup = get_profile(&supabase, ProfileMatch::Session).await?;
    let profile = lookup.profile.as_ref();
    let info = lookup.info().cloned().unwrap_or_default();

    let display_name = profile.and_then(|p| p.display_name());
    let greeting = display_name
        .or_else(|| auth_user.user.email())
        .unwrap_or("there");
    let full_name = [info.first_name.as_deref(), info.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let content = html! {
        (Heading::h1(&format!("Welcome {greeting}")))
        @if auth_user.user.is_anonymous {
            (Badge::new("Anonymous"))
        }
        @if let (Some(profile), Some(display_name)) = (profile, display_name) {
            dl class="mt-4 space-y-2" {
                div { dt class="font-semibold" { "Name" } dd { (full_name) } }
                div { dt class="font-semibold" { "Display Name" } dd { (display_name) } }
                div { dt class="font-semibold" { "Date of Birth" } dd { (info.dob.as_deref().unwrap_or_default()) } }
                div { dt class="font-semibold" { "Location" } dd { (info.profile_location.as_deref().unwrap_or_default()) } }
                div { dt class="font-semibold" { "Bio" } dd { (profile.bio.as_deref().unwrap_or_default()) } }
            }
            @if let Some(slug) = &profile.slug {
                div class="mt-6" {
                    (Button::primary("View Profile").href(&format!("{}/u/{slug}", state.origin())))
                }
            }
        } @else {
            p class="mt-4 text-gray-600" {
                "Your profile is empty. "
                a href="/account/update" class="text-blue-500 hover:underline" { "Add your details" }
            }
        }
    };

    Ok(Page::new(
        format!("Home | {SITE_TITLE}"),
        AppShell::new(Card::new(content).with_max_width("max-w-2xl")),
    ))
}

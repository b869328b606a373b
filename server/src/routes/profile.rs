use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use maud::html;

use crate::{
    components::{
        layout::{Card, Page, SITE_TITLE},
        ui::heading::Heading,
    },
    errors::{ServerResult, WithStatus as _},
    profile::{get_profile, ProfileMatch},
    state::AppState,
    supabase::Supabase,
};

/// Public page for a profile, found by its slug
pub async fn public_profile(
    State(state): State<AppState>,
    supabase: Supabase,
    Path(slug): Path<String>,
) -> ServerResult<Page, StatusCode> {
    let lookup = get_profile(&supabase, ProfileMatch::Slug(slug))
        .await
        .with_status(StatusCode::BAD_GATEWAY)?;

    let Some(profile) = lookup.profile.as_ref() else {
        let content = html! {
            (Heading::h2("No Profile found!").with_classes("text-center"))
        };
        return Ok(Page::new(
            format!("Profile | {SITE_TITLE}"),
            page_body(Card::new(content)),
        ));
    };

    let info = lookup.info().cloned().unwrap_or_default();
    let display_name = profile.display_name().unwrap_or_default().to_string();
    let profile_url = format!(
        "{}/u/{}",
        state.origin(),
        profile.slug.as_deref().unwrap_or_default()
    );

    let content = html! {
        div class="font-mono text-sm" {
            p { span class="text-pink-600" { "display_name" } ": " (display_name) }
            p { span class="text-pink-600" { "first_name" } ": " (info.first_name.as_deref().unwrap_or_default()) }
            p { span class="text-pink-600" { "last_name" } ": " (info.last_name.as_deref().unwrap_or_default()) }
            p {
                span class="text-pink-600" { "url" } ": "
                a href=(profile_url) class="text-blue-600 hover:underline" { (profile_url) }
            }
            p { span class="text-pink-600" { "bio" } ": " (profile.bio.as_deref().unwrap_or_default()) }
        }
    };

    Ok(Page::new(
        format!("{display_name}'s Profile | {SITE_TITLE}"),
        page_body(Card::new(content).with_max_width("max-w-2xl")),
    )
    .description(format!("Public profile of {display_name}")))
}

fn page_body(card: Card) -> maud::Markup {
    html! {
        div class="grid place-items-center min-h-screen bg-gray-900 px-2" {
            (card)
        }
    }
}

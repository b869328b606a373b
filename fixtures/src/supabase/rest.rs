use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{
    bearer,
    store::{slugify, ProfileInfoRow},
    FixtureState,
};

fn rest_error(status: StatusCode, code: &str, message: &str, details: Option<String>) -> Response {
    (
        status,
        Json(json!({
            "code": code,
            "details": details,
            "hint": null,
            "message": message,
        })),
    )
        .into_response()
}

/// `GET /rest/v1/profiles?select=...&id=eq.<uuid>` (or `slug=eq.<slug>`)
pub async fn select_profiles(
    State(state): State<FixtureState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let embed_info = params
        .get("select")
        .is_some_and(|select| select.contains("profiles_info"));

    let mut filters = Vec::new();
    for column in ["id", "slug"] {
        if let Some(filter) = params.get(column) {
            let Some(value) = filter.strip_prefix("eq.") else {
                return rest_error(
                    StatusCode::BAD_REQUEST,
                    "PGRST100",
                    "\"failed to parse filter\"",
                    Some(filter.clone()),
                );
            };
            filters.push((column, value.to_string()));
        }
    }

    let store = state.store();
    let rows: Vec<Value> = store
        .profiles
        .iter()
        .filter(|profile| {
            filters.iter().all(|(column, value)| match *column {
                "id" => profile.id.to_string() == *value,
                _ => profile.slug.as_deref() == Some(value.as_str()),
            })
        })
        .map(|profile| store.profile_json(profile, embed_info))
        .collect();

    Json(rows).into_response()
}

#[derive(Deserialize)]
pub struct UpdateProfileArgs {
    display_name: String,
    bio: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    dob: Option<String>,
    profile_location: Option<String>,
}

/// `POST /rest/v1/rpc/update_profile`, scoped to the bearer's user
pub async fn update_profile(
    State(state): State<FixtureState>,
    headers: HeaderMap,
    Json(args): Json<UpdateProfileArgs>,
) -> Response {
    let mut store = state.store();
    let Some(user_id) = bearer(&headers).and_then(|token| store.user_for_access_token(&token))
    else {
        return rest_error(StatusCode::UNAUTHORIZED, "PGRST301", "JWT expired", None);
    };

    let slug = slugify(&args.display_name);
    if slug.is_empty() {
        return rest_error(
            StatusCode::BAD_REQUEST,
            "23514",
            "new row for relation \"profiles\" violates check constraint \"profiles_slug_check\"",
            None,
        );
    }

    // Names that differ only in case or punctuation share a slug
    let taken = store
        .profiles
        .iter()
        .any(|p| p.id != user_id && p.slug.as_deref() == Some(slug.as_str()));
    if taken {
        return rest_error(
            StatusCode::CONFLICT,
            "23505",
            "duplicate key value violates unique constraint \"profiles_slug_key\"",
            Some(format!("Key (slug)=({slug}) already exists.")),
        );
    }

    match store.profiles.iter_mut().find(|p| p.id == user_id) {
        Some(profile) => {
            profile.display_name = Some(args.display_name.clone());
            profile.slug = Some(slug);
            profile.bio = args.bio.clone();
        }
        None => {
            return rest_error(
                StatusCode::BAD_REQUEST,
                "P0002",
                "profile not found",
                None,
            )
        }
    }

    let info = ProfileInfoRow {
        id: user_id,
        first_name: args.first_name,
        last_name: args.last_name,
        dob: args.dob,
        profile_location: args.profile_location,
    };
    store.profile_infos.retain(|i| i.id != user_id);
    store.profile_infos.push(info);

    info!("Updated profile for {user_id}");
    StatusCode::NO_CONTENT.into_response()
}

use axum::{http::StatusCode, Form};
use maud::html;
use validator::Validate;

use crate::{
    components::{
        form::{InputField, TextArea},
        layout::{AppShell, Card, Page, SITE_TITLE},
        ui::{alert::Alert, button::Button, heading::Heading},
    },
    errors::ServerResult,
    forms::UpdateProfileForm,
    outcome::{FieldErrors, FormOutcome},
    profile::{get_profile, update_profile, ProfileLookup, ProfileMatch, ProfileUpdateError},
    routes::SERVER_ERROR_MESSAGE,
    session::ActiveUser,
    supabase::Supabase,
};

const PROFILE_UPDATED: &str = "Your profile was updated successfully.";
const DUPLICATE_DISPLAY_NAME: &str =
    "Display Name is already in use, please choose a different name";

pub async fn update_page(
    _user: ActiveUser,
    supabase: Supabase,
) -> ServerResult<Page, StatusCode> {
    let lookup = get_profile(&supabase, ProfileMatch::Session).await?;

    Ok(render(&prefill(&lookup), None))
}

pub async fn update_action(
    _user: ActiveUser,
    supabase: Supabase,
    Form(form): Form<UpdateProfileForm>,
) -> Page {
    if let Err(errors) = form.validate() {
        let outcome = FormOutcome::invalid(&errors, form);
        return render(&outcome.data, Some(&outcome));
    }

    let outcome = match update_profile(&supabase, &form).await {
        Ok(()) => FormOutcome::success(PROFILE_UPDATED, form),
        Err(ProfileUpdateError::DuplicateDisplayName) => {
            let errors = FieldErrors::from([(
                "display_name".to_string(),
                DUPLICATE_DISPLAY_NAME.to_string(),
            )]);
            FormOutcome::fault("", Some(errors), form)
        }
        Err(ProfileUpdateError::Supabase(err)) => {
            tracing::error!("Profile update failed: {err}");
            FormOutcome::fault(SERVER_ERROR_MESSAGE, None, form)
        }
    };

    render(&outcome.data, Some(&outcome))
}

fn prefill(lookup: &ProfileLookup) -> UpdateProfileForm {
    let Some(profile) = &lookup.profile else {
        return UpdateProfileForm::default();
    };
    let info = lookup.info().cloned().unwrap_or_default();

    UpdateProfileForm {
        display_name: profile.display_name.clone().unwrap_or_default(),
        bio: profile.bio.clone().unwrap_or_default(),
        first_name: info.first_name.unwrap_or_default(),
        last_name: info.last_name.unwrap_or_default(),
        dob: info.dob.unwrap_or_default(),
        profile_location: info.profile_location.unwrap_or_default(),
    }
}

fn render(data: &UpdateProfileForm, outcome: Option<&FormOutcome<UpdateProfileForm>>) -> Page {
    let alert = Alert::for_outcome(outcome);
    let error_for = |field| outcome.and_then(|o| o.error_for(field));

    let content = html! {
        @if let Some(alert) = alert {
            (alert)
        }
        (Heading::h1("Update Profile"))
        form method="post" action="/account/update" {
            (InputField::new("display_name")
                .label("Display Name")
                .value(&data.display_name)
                .error(error_for("display_name")))
            (InputField::new("first_name")
                .label("First Name")
                .value(&data.first_name)
                .error(error_for("first_name")))
            (InputField::new("last_name")
                .label("Last Name")
                .value(&data.last_name)
                .error(error_for("last_name")))
            (InputField::new("dob")
                .label("Date of Birth")
                .input_type("date")
                .value(&data.dob)
                .error(error_for("dob")))
            (InputField::new("profile_location")
                .label("Location")
                .value(&data.profile_location)
                .error(error_for("profile_location")))
            (TextArea::new("bio", "Bio").value(&data.bio).error(error_for("bio")))
            div class="mt-6" {
                (Button::primary("Save").full_width(true))
            }
        }
    };

    Page::new(
        format!("Update Profile | {SITE_TITLE}"),
        AppShell::new(Card::new(content).with_max_width("max-w-xl")),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::profile::Profile;

    #[test]
    fn prefill_reads_profile_and_info() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "8d0c9d2e-2b4a-4bb5-8f0e-6f3c1c0a5e11",
            "slug": "jane-doe",
            "display_name": "Jane Doe",
            "bio": "Hello",
            "profiles_info": [{ "first_name": "Jane", "dob": "1990-01-01" }],
        }))
        .unwrap();
        let lookup = ProfileLookup {
            profile: Some(profile),
            session: None,
        };

        let form = prefill(&lookup);

        assert_eq!(form.display_name, "Jane Doe");
        assert_eq!(form.bio, "Hello");
        assert_eq!(form.first_name, "Jane");
        assert_eq!(form.last_name, "");
        assert_eq!(form.dob, "1990-01-01");
    }

    #[test]
    fn prefill_without_profile_is_empty() {
        let form = prefill(&ProfileLookup::default());
        assert_eq!(form.display_name, "");
    }

    #[test]
    fn duplicate_name_renders_under_the_field() {
        let errors = FieldErrors::from([(
            "display_name".to_string(),
            DUPLICATE_DISPLAY_NAME.to_string(),
        )]);
        let outcome = FormOutcome::fault("", Some(errors), UpdateProfileForm::default());

        let markup = maud::Render::render(&render(&outcome.data, Some(&outcome))).into_string();

        assert!(markup.contains(DUPLICATE_DISPLAY_NAME));
        assert!(!markup.contains("mb-10 rounded-lg border"));
    }
}

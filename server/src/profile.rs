use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    forms::UpdateProfileForm,
    supabase::{Session, Supabase, SupabaseError, SupabaseResult},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub profile_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub profiles_info: Option<ProfileInfo>,
}

impl Profile {
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// The embedded relation comes back as an object or a list depending on how
/// the foreign key is declared
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<ProfileInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ProfileInfo>),
        One(ProfileInfo),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(info)) => Some(info),
        Some(OneOrMany::Many(infos)) => infos.into_iter().next(),
    })
}

pub enum ProfileMatch {
    Slug(String),
    /// The profile of whoever holds the current session
    Session,
}

#[derive(Debug, Default)]
pub struct ProfileLookup {
    pub profile: Option<Profile>,
    pub session: Option<Session>,
}

impl ProfileLookup {
    pub fn info(&self) -> Option<&ProfileInfo> {
        self.profile.as_ref()?.profiles_info.as_ref()
    }
}

#[instrument(skip(supabase, by))]
pub async fn get_profile(supabase: &Supabase, by: ProfileMatch) -> SupabaseResult<ProfileLookup> {
    let session = supabase.auth().get_session().await?;

    let query = supabase.from("profiles").select("*, profiles_info(*)");
    let query = match by {
        ProfileMatch::Slug(slug) => query.eq("slug", slug),
        ProfileMatch::Session => match &session {
            Some(session) => query.eq("id", session.user.id),
            None => return Ok(ProfileLookup::default()),
        },
    };

    let profile = query.maybe_single::<Profile>().await?;

    Ok(ProfileLookup { profile, session })
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileUpdateError {
    #[error("display name is already taken")]
    DuplicateDisplayName,
    #[error(transparent)]
    Supabase(#[from] SupabaseError),
}

#[derive(Serialize)]
struct UpdateProfileArgs<'a> {
    display_name: &'a str,
    bio: Option<&'a str>,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    dob: Option<&'a str>,
    profile_location: Option<&'a str>,
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

impl<'a> From<&'a UpdateProfileForm> for UpdateProfileArgs<'a> {
    fn from(form: &'a UpdateProfileForm) -> Self {
        Self {
            display_name: form.display_name.trim(),
            bio: non_empty(&form.bio),
            first_name: non_empty(&form.first_name),
            last_name: non_empty(&form.last_name),
            dob: non_empty(&form.dob),
            profile_location: non_empty(&form.profile_location),
        }
    }
}

#[instrument(skip_all)]
pub async fn update_profile(
    supabase: &Supabase,
    form: &UpdateProfileForm,
) -> Result<(), ProfileUpdateError> {
    let args = UpdateProfileArgs::from(form);

    match supabase.rpc("update_profile", &args).await {
        Ok(_) => {
            info!("Profile updated");
            Ok(())
        }
        Err(err) if err.code() == Some("23505") || err.to_string().contains("duplicate") => {
            warn!("Display name already in use: {err}");
            Err(ProfileUpdateError::DuplicateDisplayName)
        }
        Err(err) => Err(err.into()),
    }
}

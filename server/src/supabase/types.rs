use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::SupabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub app_metadata: Value,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// The email, if the user has a non-empty one
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Unix seconds. Filled in from `expires_in` when the server omits it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: User,
}

impl Session {
    pub(crate) fn with_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// Seconds until the access token expires
    pub fn expires_within(&self) -> i64 {
        self.expires_at.unwrap_or_default() - Utc::now().timestamp()
    }
}

/// Result of the calls that may or may not start a session
#[derive(Debug, Clone, Default)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone)]
pub struct OAuthResponse {
    pub provider: Provider,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::Signup => "signup",
            OtpType::Invite => "invite",
            OtpType::Magiclink => "magiclink",
            OtpType::Recovery => "recovery",
            OtpType::EmailChange => "email_change",
            OtpType::Email => "email",
        }
    }

    /// Lenient parse for query strings. Anything unrecognised is `Email`.
    pub fn parse_or_email(value: Option<&str>) -> Self {
        match value {
            Some("signup") => OtpType::Signup,
            Some("invite") => OtpType::Invite,
            Some("magiclink") => OtpType::Magiclink,
            Some("recovery") => OtpType::Recovery,
            Some("email_change") => OtpType::EmailChange,
            _ => OtpType::Email,
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VerifyOtpParams {
    TokenHash {
        token_hash: String,
        #[serde(rename = "type")]
        otp_type: OtpType,
    },
    Email {
        email: String,
        token: String,
        #[serde(rename = "type")]
        otp_type: OtpType,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Apple,
    Azure,
    Bitbucket,
    Discord,
    Facebook,
    Figma,
    Github,
    Gitlab,
    Google,
    Keycloak,
    Linkedin,
    Notion,
    Slack,
    Spotify,
    Twitch,
    Twitter,
    Workos,
    Zoom,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Apple => "apple",
            Provider::Azure => "azure",
            Provider::Bitbucket => "bitbucket",
            Provider::Discord => "discord",
            Provider::Facebook => "facebook",
            Provider::Figma => "figma",
            Provider::Github => "github",
            Provider::Gitlab => "gitlab",
            Provider::Google => "google",
            Provider::Keycloak => "keycloak",
            Provider::Linkedin => "linkedin",
            Provider::Notion => "notion",
            Provider::Slack => "slack",
            Provider::Spotify => "spotify",
            Provider::Twitch => "twitch",
            Provider::Twitter => "twitter",
            Provider::Workos => "workos",
            Provider::Zoom => "zoom",
        }
    }
}

impl FromStr for Provider {
    type Err = SupabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let provider = match s {
            "apple" => Provider::Apple,
            "azure" => Provider::Azure,
            "bitbucket" => Provider::Bitbucket,
            "discord" => Provider::Discord,
            "facebook" => Provider::Facebook,
            "figma" => Provider::Figma,
            "github" => Provider::Github,
            "gitlab" => Provider::Gitlab,
            "google" => Provider::Google,
            "keycloak" => Provider::Keycloak,
            "linkedin" => Provider::Linkedin,
            "notion" => Provider::Notion,
            "slack" => Provider::Slack,
            "spotify" => Provider::Spotify,
            "twitch" => Provider::Twitch,
            "twitter" => Provider::Twitter,
            "workos" => Provider::Workos,
            "zoom" => Provider::Zoom,
            other => return Err(SupabaseError::UnknownProvider(other.to_string())),
        };
        Ok(provider)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_otp_types_fall_back_to_email() {
        assert_eq!(OtpType::parse_or_email(Some("recovery")), OtpType::Recovery);
        assert_eq!(OtpType::parse_or_email(Some("bogus")), OtpType::Email);
        assert_eq!(OtpType::parse_or_email(None), OtpType::Email);
    }

    #[test]
    fn provider_round_trips_through_its_name() {
        let provider: Provider = "github".parse().unwrap();
        assert_eq!(provider, Provider::Github);
        assert_eq!(provider.to_string(), "github");

        assert!(matches!(
            "myspace".parse::<Provider>(),
            Err(SupabaseError::UnknownProvider(name)) if name == "myspace"
        ));
    }

    #[test]
    fn verify_params_serialize_to_either_shape() {
        let by_hash = VerifyOtpParams::TokenHash {
            token_hash: "abc".to_string(),
            otp_type: OtpType::Recovery,
        };
        assert_eq!(
            serde_json::to_value(&by_hash).unwrap(),
            json!({ "token_hash": "abc", "type": "recovery" })
        );

        let by_token = VerifyOtpParams::Email {
            email: "a@example.com".to_string(),
            token: "123456".to_string(),
            otp_type: OtpType::Email,
        };
        assert_eq!(
            serde_json::to_value(&by_token).unwrap(),
            json!({ "email": "a@example.com", "token": "123456", "type": "email" })
        );
    }

    #[test]
    fn sessions_without_expires_at_get_one() {
        let session: Session = serde_json::from_value(json!({
            "access_token": "a",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": { "id": "8d0c9d2e-2b4a-4bb5-8f0e-6f3c1c0a5e11" },
        }))
        .unwrap();

        let session = session.with_expiry();
        assert!(session.expires_within() > 3500);
        assert_eq!(session.user.email(), None);
    }
}

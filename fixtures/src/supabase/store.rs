use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub(crate) fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn opaque_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct FakeUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    pub confirmed: bool,
    pub is_anonymous: bool,
    pub provider: String,
}

impl FakeUser {
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": self.email.clone().unwrap_or_default(),
            "phone": "",
            "is_anonymous": self.is_anonymous,
            "app_metadata": {
                "provider": self.provider,
                "providers": [self.provider],
            },
            "user_metadata": {},
            "created_at": "2025-01-01T00:00:00Z",
        })
    }
}

/// A message the fake platform "sent" to a user
#[derive(Debug, Clone, Serialize)]
pub struct Mail {
    pub email: String,
    pub kind: String,
    pub token_hash: String,
    pub token: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct IssuedSession {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub revoked: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PkceCode {
    pub code: String,
    pub user_id: Uuid,
    pub challenge: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub slug: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileInfoRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub profile_location: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<FakeUser>,
    pub outbox: Vec<Mail>,
    pub profiles: Vec<ProfileRow>,
    pub profile_infos: Vec<ProfileInfoRow>,
    pub refresh_count: usize,
    pub(crate) sessions: Vec<IssuedSession>,
    pub(crate) codes: Vec<PkceCode>,
}

impl Store {
    pub fn user_by_email(&self, email: &str) -> Option<&FakeUser> {
        self.users
            .iter()
            .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
    }

    pub fn user(&self, id: Uuid) -> Option<&FakeUser> {
        self.users.iter().find(|u| u.id == id)
    }

    pub(crate) fn user_mut(&mut self, id: Uuid) -> Option<&mut FakeUser> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Every user gets an empty profile row, the way a signup trigger would
    pub(crate) fn insert_user(&mut self, user: FakeUser) -> Uuid {
        let id = user.id;
        self.profiles.push(ProfileRow {
            id,
            slug: None,
            display_name: None,
            bio: None,
        });
        self.users.push(user);
        id
    }

    pub(crate) fn send_mail(&mut self, email: &str, kind: &str, redirect_to: Option<String>) {
        let token = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        self.outbox.push(Mail {
            email: email.to_string(),
            kind: kind.to_string(),
            token_hash: opaque_token(),
            token,
            redirect_to,
        });
    }

    pub fn last_mail(&self, email: &str) -> Option<&Mail> {
        self.outbox
            .iter()
            .rev()
            .find(|m| m.email.eq_ignore_ascii_case(email))
    }

    pub(crate) fn issue_session(&mut self, user_id: Uuid, ttl_secs: i64) -> Option<Value> {
        let user = self.user(user_id)?.to_json();
        let issued = IssuedSession {
            user_id,
            access_token: opaque_token(),
            refresh_token: opaque_token(),
            expires_at: now() + ttl_secs,
            revoked: false,
        };

        let body = json!({
            "access_token": issued.access_token,
            "token_type": "bearer",
            "expires_in": ttl_secs,
            "expires_at": issued.expires_at,
            "refresh_token": issued.refresh_token,
            "user": user,
        });
        self.sessions.push(issued);

        Some(body)
    }

    /// Resolve a bearer token to its user when it is live
    pub(crate) fn user_for_access_token(&self, token: &str) -> Option<Uuid> {
        self.sessions
            .iter()
            .find(|s| s.access_token == token && !s.revoked && s.expires_at > now())
            .map(|s| s.user_id)
    }

    /// Rotates the pair; the old refresh token cannot be used twice
    pub(crate) fn take_refresh_token(&mut self, token: &str) -> Option<Uuid> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.refresh_token == token && !s.revoked)?;
        session.revoked = true;
        self.refresh_count += 1;
        Some(session.user_id)
    }

    pub(crate) fn revoke_all(&mut self, user_id: Uuid) {
        for session in self.sessions.iter_mut().filter(|s| s.user_id == user_id) {
            session.revoked = true;
        }
    }

    pub(crate) fn insert_code(&mut self, user_id: Uuid, challenge: String) -> String {
        let code = opaque_token();
        self.codes.push(PkceCode {
            code: code.clone(),
            user_id,
            challenge,
        });
        code
    }

    pub(crate) fn take_code(&mut self, code: &str) -> Option<PkceCode> {
        let index = self.codes.iter().position(|c| c.code == code)?;
        Some(self.codes.remove(index))
    }

    /// Consume a mail that matches either the hashed link or the typed OTP
    pub(crate) fn take_mail(
        &mut self,
        otp_type: &str,
        token_hash: Option<&str>,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Option<Mail> {
        let index = self.outbox.iter().position(|mail| {
            let type_matches =
                mail.kind == otp_type || (otp_type == "email" && mail.kind != "recovery");
            let by_hash = token_hash.is_some_and(|h| h == mail.token_hash);
            let by_token = match (email, token) {
                (Some(email), Some(token)) => {
                    mail.email.eq_ignore_ascii_case(email) && mail.token == token
                }
                _ => false,
            };
            type_matches && (by_hash || by_token)
        })?;

        Some(self.outbox.remove(index))
    }

    pub fn profile_json(&self, profile: &ProfileRow, embed_info: bool) -> Value {
        let mut row = json!({
            "id": profile.id,
            "slug": profile.slug,
            "display_name": profile.display_name,
            "bio": profile.bio,
        });
        if embed_info {
            let info = self
                .profile_infos
                .iter()
                .find(|i| i.id == profile.id)
                .map(|i| json!(i))
                .unwrap_or(Value::Null);
            row["profiles_info"] = info;
        }
        row
    }
}

/// Lowercase, ascii-alphanumeric words joined with dashes
pub fn slugify(value: &str) -> String {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> FakeUser {
        FakeUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            password: Some("secret123".to_string()),
            confirmed: true,
            is_anonymous: false,
            provider: "email".to_string(),
        }
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Jane   Doe!! "), "jane-doe");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn refresh_tokens_rotate() {
        let mut store = Store::default();
        let id = store.insert_user(user("a@example.test"));
        let session = store.issue_session(id, 3600).unwrap();
        let refresh = session["refresh_token"].as_str().unwrap().to_string();

        assert_eq!(store.take_refresh_token(&refresh), Some(id));
        assert_eq!(store.take_refresh_token(&refresh), None);
        assert_eq!(store.refresh_count, 1);
    }

    #[test]
    fn recovery_mail_is_not_accepted_as_plain_email_otp() {
        let mut store = Store::default();
        store.insert_user(user("a@example.test"));
        store.send_mail("a@example.test", "recovery", None);
        let hash = store.last_mail("a@example.test").unwrap().token_hash.clone();

        assert!(store.take_mail("email", Some(&hash), None, None).is_none());
        assert!(store.take_mail("recovery", Some(&hash), None, None).is_some());
    }

    #[test]
    fn signup_creates_an_empty_profile() {
        let mut store = Store::default();
        let id = store.insert_user(user("a@example.test"));

        let profile = store.profiles.iter().find(|p| p.id == id).unwrap();
        assert!(profile.display_name.is_none());
        assert_eq!(store.profile_json(profile, true)["profiles_info"], Value::Null);
    }
}

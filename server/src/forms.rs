use std::borrow::Cow;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid regex"));

/// Sign in and sign up
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct AuthUserForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Magic link and forgot password
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct EmailForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct VerifyTokenForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(regex(path = "TOKEN_RE", message = "Token must be 6 digits"))]
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct UpdateEmailForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(must_match(other = "email", message = "Emails do not match"))]
    pub email_confirm: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct UpdatePasswordForm {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct UpdateProfileForm {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Display name must be between 3 and 50 characters"
    ))]
    pub display_name: String,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: String,
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: String,
    #[validate(custom(function = "validate_dob"))]
    pub dob: String,
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub profile_location: String,
}

/// Empty, or a real `YYYY-MM-DD` date
fn validate_dob(dob: &str) -> Result<(), ValidationError> {
    if dob.is_empty() {
        return Ok(());
    }

    if dob.len() == 10 && NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_ok() {
        return Ok(());
    }

    let mut err = ValidationError::new("dob");
    err.message = Some(Cow::from("Date of birth must be a date like 1990-12-31"));
    Err(err)
}

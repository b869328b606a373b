use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidationErrors;

/// Field name to the message shown under that input
pub type FieldErrors = BTreeMap<String, String>;

/// What a form action hands back to the page it re-renders
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormOutcome<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub data: T,
}

impl<T> FormOutcome<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
            data,
        }
    }

    pub fn fault(message: impl Into<String>, errors: Option<FieldErrors>, data: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors,
            data,
        }
    }

    /// A fault carrying only field errors
    pub fn invalid(errors: &ValidationErrors, data: T) -> Self {
        Self::fault("", Some(format_errors(errors)), data)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.get(field))
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// The message, unless it is empty
    pub fn message(&self) -> Option<&str> {
        Some(self.message.as_str()).filter(|m| !m.is_empty())
    }
}

/// Keep the first message reported for each field
pub fn format_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut formatted = FieldErrors::new();

    for (field, field_errors) in errors.field_errors() {
        let Some(first) = field_errors.first() else {
            continue;
        };

        let message = first
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Invalid {}", field.replace('_', " ")));

        formatted.entry(field.to_string()).or_insert(message);
    }

    formatted
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use validator::ValidationError;

    use super::*;

    fn error(code: &'static str, message: Option<&'static str>) -> ValidationError {
        let mut err = ValidationError::new(code);
        err.message = message.map(Cow::Borrowed);
        err
    }

    #[test]
    fn success_never_carries_errors() {
        let outcome = FormOutcome::success("Saved", ());

        assert!(outcome.is_success());
        assert_eq!(outcome.errors, None);
        assert_eq!(outcome.message(), Some("Saved"));
    }

    #[test]
    fn fault_keeps_message_and_errors() {
        let errors = FieldErrors::from([("email".to_string(), "Bad email".to_string())]);
        let outcome = FormOutcome::fault("Nope", Some(errors), "data");

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_for("email"), Some("Bad email"));
        assert_eq!(outcome.error_for("password"), None);
        assert_eq!(outcome.data, "data");
    }

    #[test]
    fn format_errors_keeps_the_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("password", error("length", Some("Too short")));
        errors.add("password", error("other", Some("Second")));
        errors.add("email", error("email", None));

        let formatted = format_errors(&errors);

        assert_eq!(formatted["password"], "Too short");
        assert_eq!(formatted["email"], "Invalid email");
        assert_eq!(formatted.len(), 2);
    }

    #[test]
    fn empty_field_messages_are_not_shown() {
        let errors = FieldErrors::from([("display_name".to_string(), String::new())]);
        let outcome = FormOutcome::fault("", Some(errors), ());

        assert_eq!(outcome.error_for("display_name"), None);
        assert_eq!(outcome.message(), None);
    }

    #[test]
    fn serializes_like_the_wire_shape() {
        let json = serde_json::to_value(FormOutcome::success("ok", ())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "message": "ok", "data": null })
        );
    }
}

pub mod anonymous;
pub mod callback;
pub mod confirm;
pub mod forgot_password;
pub mod oauth;
pub mod signin;
pub mod signout;
pub mod signup;
pub mod verify_token;

/// Where to send the user after an auth step. Only relative paths and URLs
/// on our own origin are followed, anything else goes to `fallback`.
pub(crate) fn safe_next(origin: &str, next: Option<&str>, fallback: &str) -> String {
    let Some(next) = next.map(str::trim).filter(|n| !n.is_empty()) else {
        return fallback.to_string();
    };

    // Browsers drop tabs and newlines from URLs, and they are not valid in a
    // Location header
    if next.chars().any(|c| c.is_ascii_control()) {
        tracing::warn!(next, "Ignoring redirect target with control characters");
        return fallback.to_string();
    }

    let is_relative = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    if is_relative {
        return next.to_string();
    }

    let same_origin = next
        .strip_prefix(origin)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']));
    if same_origin {
        return next.to_string();
    }

    tracing::warn!(next, "Ignoring off-site redirect target");
    fallback.to_string()
}

//! Session persistence in request/response cookies.
//!
//! The session is stored as `base64-<urlsafe base64 of the JSON>` and split
//! across `<name>.0`, `<name>.1`, ... when it does not fit in one cookie.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::{debug, warn};

pub const MAX_CHUNK_SIZE: usize = 3180;
const BASE64_PREFIX: &str = "base64-";
const COOKIE_MAX_AGE_DAYS: i64 = 400;

pub fn encode_value(raw: &str) -> String {
    format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(raw))
}

/// Values without the prefix are taken as-is
pub fn decode_value(stored: &str) -> Option<String> {
    let Some(encoded) = stored.strip_prefix(BASE64_PREFIX) else {
        return Some(stored.to_string());
    };

    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

pub fn chunk(name: &str, value: &str) -> Vec<(String, String)> {
    if value.len() <= MAX_CHUNK_SIZE {
        return vec![(name.to_string(), value.to_string())];
    }

    value
        .as_bytes()
        .chunks(MAX_CHUNK_SIZE)
        .enumerate()
        .map(|(i, part)| {
            (
                format!("{name}.{i}"),
                String::from_utf8_lossy(part).into_owned(),
            )
        })
        .collect()
}

/// Prefers the unchunked cookie, otherwise joins chunks until the first gap
pub fn combine(name: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    if let Some(value) = lookup(name) {
        return Some(value);
    }

    let mut combined = String::new();
    for i in 0.. {
        match lookup(&format!("{name}.{i}")) {
            Some(part) => combined.push_str(&part),
            None => break,
        }
    }

    (!combined.is_empty()).then_some(combined)
}

fn is_chunk_of(cookie_name: &str, name: &str) -> bool {
    cookie_name == name
        || cookie_name
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|index| index.parse::<usize>().is_ok())
}

#[derive(Clone)]
pub struct SessionStorage {
    cookies: Cookies,
    secure: bool,
}

impl SessionStorage {
    pub fn new(cookies: Cookies, secure: bool) -> Self {
        Self { cookies, secure }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        let stored = combine(key, |name| {
            self.cookies.get(name).map(|c| c.value().to_string())
        })?;

        let decoded = decode_value(&stored);
        if decoded.is_none() {
            warn!(key, "Ignoring auth cookie that could not be decoded");
        }
        decoded
    }

    pub fn set_item(&self, key: &str, value: &str) {
        let chunks = chunk(key, &encode_value(value));

        for stale in self.cookies.list() {
            let name = stale.name();
            if is_chunk_of(name, key) && !chunks.iter().any(|(chunk, _)| chunk == name) {
                self.cookies.remove(self.cookie(name.to_string(), String::new()));
            }
        }

        debug!(key, chunks = chunks.len(), "Storing auth cookie");
        for (name, value) in chunks {
            self.cookies.add(self.cookie(name, value));
        }
    }

    pub fn remove_item(&self, key: &str) {
        for cookie in self.cookies.list() {
            if is_chunk_of(cookie.name(), key) {
                self.cookies
                    .remove(self.cookie(cookie.name().to_string(), String::new()));
            }
        }
    }

    fn cookie(&self, name: String, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        cookie.set_max_age(Duration::days(COOKIE_MAX_AGE_DAYS));
        cookie
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(map: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        |name| map.get(name).cloned()
    }

    #[test]
    fn values_are_prefixed_urlsafe_base64() {
        let encoded = encode_value(r#"{"a":"b?c"}"#);

        assert!(encoded.starts_with("base64-"));
        assert!(!encoded.contains('='));
        assert_eq!(decode_value(&encoded).as_deref(), Some(r#"{"a":"b?c"}"#));
    }

    #[test]
    fn unprefixed_values_pass_through() {
        assert_eq!(decode_value("{}").as_deref(), Some("{}"));
    }

    #[test]
    fn garbage_after_prefix_does_not_decode() {
        assert_eq!(decode_value("base64-!!!not base64!!!"), None);
    }

    #[test]
    fn short_values_use_a_single_cookie() {
        let chunks = chunk("sb-abc-auth-token", "short");
        assert_eq!(
            chunks,
            vec![("sb-abc-auth-token".to_string(), "short".to_string())]
        );
    }

    #[test]
    fn long_values_are_split_and_rejoined() {
        let value = "x".repeat(MAX_CHUNK_SIZE * 2 + 10);
        let chunks = chunk("token", &value);

        let names: Vec<_> = chunks.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["token.0", "token.1", "token.2"]);
        assert!(chunks.iter().all(|(_, v)| v.len() <= MAX_CHUNK_SIZE));

        let map: HashMap<_, _> = chunks.into_iter().collect();
        assert_eq!(combine("token", lookup_in(&map)), Some(value));
    }

    #[test]
    fn combine_stops_at_first_missing_chunk() {
        let map = HashMap::from([
            ("token.0".to_string(), "ab".to_string()),
            ("token.2".to_string(), "ef".to_string()),
        ]);

        assert_eq!(combine("token", lookup_in(&map)).as_deref(), Some("ab"));
        assert_eq!(combine("other", lookup_in(&map)), None);
    }

    #[test]
    fn chunk_names_do_not_match_sibling_keys() {
        assert!(is_chunk_of("sb-abc-auth-token", "sb-abc-auth-token"));
        assert!(is_chunk_of("sb-abc-auth-token.3", "sb-abc-auth-token"));
        assert!(!is_chunk_of(
            "sb-abc-auth-token-code-verifier",
            "sb-abc-auth-token"
        ));
        assert!(!is_chunk_of("sb-abc-auth-token.x", "sb-abc-auth-token"));
    }
}

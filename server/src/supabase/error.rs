use serde_json::Value;

pub type SupabaseResult<T> = Result<T, SupabaseError>;

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// Non-2xx reply from the auth or data API
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("Auth session missing!")]
    SessionMissing,
    #[error("PKCE code verifier not found in storage")]
    CodeVerifierMissing,
    #[error("Unsupported provider: {0}")]
    UnknownProvider(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl SupabaseError {
    /// The remote rejected the request as malformed, which the auth API uses
    /// for bad credentials
    pub fn is_bad_request(&self) -> bool {
        matches!(self, SupabaseError::Api { status: 400, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SupabaseError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            SupabaseError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|v| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("Request failed with status {status}")
                } else {
                    body.to_string()
                }
            });

        let code = parsed.as_ref().and_then(|v| {
            ["error_code", "code"].iter().find_map(|key| match v.get(*key)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        });

        SupabaseError::Api {
            status,
            code,
            message,
        }
    }

    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Self::from_body(status, &body),
            Err(err) => SupabaseError::Http(err),
        }
    }
}

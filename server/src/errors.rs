use std::fmt::Debug;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use color_eyre::Report;

/// A handler failure plus the response to send for it
#[derive(Debug)]
pub struct ServerError<R: IntoResponse>(pub(crate) Report, pub(crate) R);

pub type ServerResult<S, F = Response> = Result<S, ServerError<F>>;

fn is_development_mode() -> bool {
    std::env::var("DEVELOPMENT_MODE")
        .map(|v| v == "1")
        .unwrap_or(false)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn development_error_page(report: &Report) -> Response {
    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Development Error - 500</title>
    <style>
        body {{ font-family: monospace; margin: 20px; background: #1a1a1a; color: #fff; }}
        .error-title {{ color: #ff6b6b; font-size: 24px; margin-bottom: 20px; }}
        pre {{ background: #000; padding: 15px; border-radius: 4px; white-space: pre-wrap; word-wrap: break-word; }}
    </style>
</head>
<body>
    <div class="error-title">Development Mode - Internal Server Error</div>
    <pre>{}</pre>
</body>
</html>"#,
        escape_html(&format!("{report:?}"))
    );

    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}

impl<R: IntoResponse> IntoResponse for ServerError<R> {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Request Error");

        let response = self.1.into_response();
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR && is_development_mode() {
            return development_error_page(&self.0);
        }

        response
    }
}

impl<E> From<E> for ServerError<StatusCode>
where
    E: Into<Report>,
{
    fn from(err: E) -> Self {
        ServerError(err.into(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub(crate) trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError<StatusCode>>;
}

impl<T, E: Into<Report>> WithStatus<T> for Result<T, E> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError<StatusCode>> {
        self.map_err(|err| ServerError(err.into(), status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn with_status_keeps_the_status() {
        let result: Result<(), _> = Err(eyre!("boom"));
        let err = result.with_status(StatusCode::BAD_GATEWAY).unwrap_err();

        assert_eq!(err.1, StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}

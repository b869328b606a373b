#![allow(dead_code)]

use std::sync::Arc;

use fixtures::supabase::{spawn, FixtureConfig, FixtureHandle, Mail};
use reqwest::{cookie::Jar, redirect::Policy, Client, Response};
use sb_by_example::{
    routes::routes, server::serve, state::AppState, supabase::SupabaseConfig,
};
use tokio::net::TcpListener;
use tower_cookies::Key;

pub const PASSWORD: &str = "secret123";

/// The app and the fake platform it talks to, both on ephemeral ports
pub struct TestApp {
    pub fixture: FixtureHandle,
    pub base_url: String,
    _server: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn start() -> Self {
        Self::start_with(FixtureConfig::default()).await
    }

    pub async fn start_with(config: FixtureConfig) -> Self {
        let fixture = spawn(config).await.expect("Failed to start fixture");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state = AppState::new(
            SupabaseConfig::new(&fixture.base_url, &fixture.anon_key),
            Key::generate(),
            format!("127.0.0.1:{port}"),
            "http",
        )
        .unwrap();

        let server = tokio::spawn(async move {
            serve(listener, routes(state)).await.unwrap();
        });

        TestApp {
            fixture,
            base_url: format!("http://127.0.0.1:{port}"),
            _server: server,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn browser(&self) -> Browser {
        Browser::new(self.base_url.clone())
    }

    pub fn mail(&self, email: &str) -> Mail {
        self.fixture
            .last_mail(email)
            .unwrap_or_else(|| panic!("No mail sent to {email}"))
    }

    /// Sign up through the app and follow the emailed confirmation link,
    /// leaving `browser` signed in
    pub async fn register(&self, browser: &Browser, email: &str) {
        let page = browser
            .post_form("/auth/signup", &[("email", email), ("password", PASSWORD)])
            .await;
        assert!(page.contains("Please check your email"), "{page}");

        let mail = self.mail(email);
        let response = browser
            .get_raw(&format!(
                "/auth/confirm?token_hash={}&type=signup&next=/",
                mail.token_hash
            ))
            .await;
        assert_eq!(response.headers()["location"], "/");
    }
}

/// Where a followed request ended up
#[derive(Debug)]
pub struct Page {
    pub status: reqwest::StatusCode,
    pub path: String,
    pub body: String,
}

/// Two clients sharing one cookie jar: one follows redirects, one does not
pub struct Browser {
    base_url: String,
    pub follow: Client,
    pub manual: Client,
}

impl Browser {
    fn new(base_url: String) -> Self {
        let jar = Arc::new(Jar::default());
        let build = |policy| {
            Client::builder()
                .cookie_provider(jar.clone())
                .redirect(policy)
                .build()
                .unwrap()
        };

        Browser {
            base_url,
            follow: build(Policy::limited(10)),
            manual: build(Policy::none()),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{path}", self.base_url)
        }
    }

    /// GET following redirects
    pub async fn get(&self, path: &str) -> Page {
        let response = self.follow.get(self.url(path)).send().await.unwrap();

        Page {
            status: response.status(),
            path: response.url().path().to_string(),
            body: response.text().await.unwrap(),
        }
    }

    pub async fn get_raw(&self, path: &str) -> Response {
        self.manual.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> String {
        self.follow
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    pub async fn post_raw(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.manual
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }
}

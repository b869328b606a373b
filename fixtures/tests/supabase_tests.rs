use fixtures::supabase::{spawn, FixtureConfig, FixtureHandle};
use serde_json::{json, Value};

async fn start() -> FixtureHandle {
    spawn(FixtureConfig::default())
        .await
        .expect("Failed to start fixture")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn post(fixture: &FixtureHandle, path: &str, body: Value) -> reqwest::Response {
    client()
        .post(format!("{}{path}", fixture.base_url))
        .header("apikey", &fixture.anon_key)
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_requests_without_apikey_are_rejected() {
    let fixture = start().await;

    let response = client()
        .post(format!("{}/auth/v1/signup", fixture.base_url))
        .json(&json!({ "email": "a@example.test", "password": "secret123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_requires_confirmation_before_password_login() {
    let fixture = start().await;

    let response = post(
        &fixture,
        "/auth/v1/signup",
        json!({ "email": "new@example.test", "password": "secret123" }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["email"], "new@example.test");
    assert!(user.get("access_token").is_none());

    let response = post(
        &fixture,
        "/auth/v1/token?grant_type=password",
        json!({ "email": "new@example.test", "password": "secret123" }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error_code"], "email_not_confirmed");

    let mail = fixture.last_mail("new@example.test").unwrap();
    assert_eq!(mail.kind, "signup");

    let response = post(
        &fixture,
        "/auth/v1/verify",
        json!({ "type": "email", "token_hash": mail.token_hash }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = post(
        &fixture,
        "/auth/v1/token?grant_type=password",
        json!({ "email": "new@example.test", "password": "secret123" }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let session: Value = response.json().await.unwrap();
    assert_eq!(session["token_type"], "bearer");
    assert!(session["access_token"].is_string());
    assert!(session["refresh_token"].is_string());
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    let fixture = start().await;
    let body = json!({ "email": "dup@example.test", "password": "secret123" });

    post(&fixture, "/auth/v1/signup", body.clone()).await;
    let response = post(&fixture, "/auth/v1/signup", body).await;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error_code"], "user_already_exists");
}

#[tokio::test]
async fn test_authorize_redirects_back_with_code() {
    let fixture = start().await;

    let response = client()
        .get(format!("{}/auth/v1/authorize", fixture.base_url))
        .query(&[
            ("provider", "github"),
            ("redirect_to", "http://localhost:3000/auth/callback"),
            ("code_challenge", "abc"),
            ("code_challenge_method", "s256"),
        ])
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("http://localhost:3000/auth/callback?code="));
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let fixture = start().await;

    let response = client()
        .get(format!("{}/auth/v1/authorize", fixture.base_url))
        .query(&[
            ("provider", "myspace"),
            ("redirect_to", "http://localhost:3000/auth/callback"),
            ("code_challenge", "abc"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anonymous_user_can_set_up_profile() {
    let fixture = start().await;

    let session: Value = post(&fixture, "/auth/v1/signup", json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(session["user"]["is_anonymous"], true);
    let token = session["access_token"].as_str().unwrap();
    let user_id = session["user"]["id"].as_str().unwrap();

    let response = client()
        .post(format!("{}/rest/v1/rpc/update_profile", fixture.base_url))
        .header("apikey", &fixture.anon_key)
        .bearer_auth(token)
        .json(&json!({
            "display_name": "Ghost Writer",
            "bio": "boo",
            "first_name": null,
            "last_name": null,
            "dob": null,
            "profile_location": null,
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let rows: Value = client()
        .get(format!("{}/rest/v1/profiles", fixture.base_url))
        .header("apikey", &fixture.anon_key)
        .query(&[("select", "*,profiles_info(*)"), ("id", &format!("eq.{user_id}"))])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rows[0]["display_name"], "Ghost Writer");
    assert_eq!(rows[0]["slug"], "ghost-writer");
    assert_eq!(rows[0]["profiles_info"]["first_name"], Value::Null);
}

async fn anonymous_token(fixture: &FixtureHandle) -> String {
    let session: Value = post(fixture, "/auth/v1/signup", json!({}))
        .await
        .json()
        .await
        .unwrap();
    session["access_token"].as_str().unwrap().to_string()
}

async fn set_display_name(fixture: &FixtureHandle, token: &str, name: &str) -> reqwest::Response {
    client()
        .post(format!("{}/rest/v1/rpc/update_profile", fixture.base_url))
        .header("apikey", &fixture.anon_key)
        .bearer_auth(token)
        .json(&json!({ "display_name": name }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_display_names_sharing_a_slug_conflict() {
    let fixture = start().await;
    let jane = anonymous_token(&fixture).await;
    let other = anonymous_token(&fixture).await;

    assert!(set_display_name(&fixture, &jane, "Jane Doe").await.status().is_success());
    // Renaming to the same slug is fine for the owner
    assert!(set_display_name(&fixture, &jane, "jane doe").await.status().is_success());

    let response = set_display_name(&fixture, &other, "JANE  doe!").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "23505");
}

#[tokio::test]
async fn test_display_name_without_a_slug_is_rejected() {
    let fixture = start().await;
    let token = anonymous_token(&fixture).await;

    let response = set_display_name(&fixture, &token, "!!!").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "23514");
}

mod common;

use common::{TestApp, PASSWORD};
use reqwest::StatusCode;

const PROFILE: &[(&str, &str)] = &[
    ("display_name", "Jane Doe"),
    ("first_name", "Jane"),
    ("last_name", "Doe"),
    ("dob", "1990-04-01"),
    ("profile_location", "Lisbon"),
    ("bio", "Writes Rust."),
];

#[tokio::test]
async fn test_account_links() {
    let app = TestApp::start().await;
    let browser = app.browser();
    app.register(&browser, "jane@example.test").await;

    let page = browser.get("/account").await;

    assert!(page.body.contains("href=\"/account/update\""));
    assert!(page.body.contains("href=\"/account/update-email\""));
    assert!(page.body.contains("href=\"/account/update-password\""));
    assert!(page.body.contains("action=\"/auth/signout\""));
}

#[tokio::test]
async fn test_update_profile_and_view_it_publicly() {
    let app = TestApp::start().await;
    let browser = app.browser();
    app.register(&browser, "jane@example.test").await;

    let page = browser.post_form("/account/update", PROFILE).await;
    assert!(page.contains("Your profile was updated successfully."), "{page}");

    let page = browser.get("/account/update").await;
    assert!(page.body.contains("value=\"Lisbon\""));
    assert!(page.body.contains("Writes Rust."));

    let page = browser.get("/").await;
    assert!(page.body.contains("Welcome Jane Doe"));
    assert!(page.body.contains("1990-04-01"));
    assert!(page.body.contains(&format!("{}/u/jane-doe", app.base_url)));

    // Public pages work without a session
    let page = app.browser().get("/u/jane-doe").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("s Profile | Supabase by example"));
    assert!(page.body.contains("Jane Doe"));
    assert!(page.body.contains("Writes Rust."));
}

#[tokio::test]
async fn test_missing_public_profile() {
    let app = TestApp::start().await;

    let page = app.browser().get("/u/nobody-here").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No Profile found!"));
}

#[tokio::test]
async fn test_profile_validation_errors() {
    let app = TestApp::start().await;
    let browser = app.browser();
    app.register(&browser, "jane@example.test").await;

    let page = browser
        .post_form("/account/update", &[("display_name", "ab"), ("dob", "1990-13-01")])
        .await;

    assert!(page.contains("Display name must be between 3 and 50 characters"));
    assert!(page.contains("Date of birth must be a date like 1990-12-31"));
    assert!(page.contains("value=\"ab\""));
}

#[tokio::test]
async fn test_duplicate_display_name() {
    let app = TestApp::start().await;

    let jane = app.browser();
    app.register(&jane, "jane@example.test").await;
    jane.post_form("/account/update", PROFILE).await;

    let other = app.browser();
    app.register(&other, "other@example.test").await;
    let page = other
        .post_form("/account/update", &[("display_name", "Jane Doe")])
        .await;

    assert!(page.contains("Display Name is already in use, please choose a different name"));
    assert!(!page.contains("Your profile was updated successfully."));
}

#[tokio::test]
async fn test_update_email() {
    let app = TestApp::start().await;
    let browser = app.browser();
    app.register(&browser, "old@example.test").await;

    let page = browser
        .post_form(
            "/account/update-email",
            &[("email", "new@example.test"), ("email_confirm", "other@example.test")],
        )
        .await;
    assert!(page.contains("Emails do not match"));

    let page = browser
        .post_form(
            "/account/update-email",
            &[("email", "new@example.test"), ("email_confirm", "new@example.test")],
        )
        .await;
    assert!(page.contains("Your email was updated successfully."));
    assert!(app.fixture.user_by_email("new@example.test").is_some());
}

#[tokio::test]
async fn test_update_password_greets_by_display_name_or_email() {
    let app = TestApp::start().await;
    let browser = app.browser();
    app.register(&browser, "jane@example.test").await;

    let page = browser.get("/account/update-password").await;
    assert!(
        page.body
            .contains("Hi jane@example.test, Enter your new password below and confirm it"),
        "{}",
        page.body
    );

    browser.post_form("/account/update", PROFILE).await;
    let page = browser.get("/account/update-password").await;
    assert!(page.body.contains("Hi Jane Doe, Enter your new password"));
}

#[tokio::test]
async fn test_update_password_rejects_the_same_password() {
    let app = TestApp::start().await;
    let browser = app.browser();
    app.register(&browser, "jane@example.test").await;

    let page = browser
        .post_form(
            "/account/update-password",
            &[("password", PASSWORD), ("password_confirm", PASSWORD)],
        )
        .await;

    assert!(page.contains("New password should be different from the old password."));
}

#[tokio::test]
async fn test_recovery_forces_a_password_update() {
    let app = TestApp::start().await;
    app.register(&app.browser(), "lost@example.test").await;

    let browser = app.browser();
    let page = browser
        .post_form("/auth/forgotpassword", &[("email", "lost@example.test")])
        .await;
    assert!(page.contains(
        "Please check your email for a password reset link to log into the website."
    ));

    let mail = app.mail("lost@example.test");
    assert_eq!(mail.kind, "recovery");
    let redirect_to = mail.redirect_to.clone().unwrap();
    assert_eq!(redirect_to, app.url("/account/update-password"));

    let page = browser
        .get(&format!(
            "/auth/confirm?token_hash={}&type=recovery&next={}",
            mail.token_hash,
            urlencoding::encode(&redirect_to)
        ))
        .await;
    assert_eq!(page.path, "/account/update-password");

    // Every other gated page bounces back until the password changes
    let response = browser.get_raw("/").await;
    assert_eq!(response.headers()["location"], "/account/update-password");
    let response = browser.get_raw("/account").await;
    assert_eq!(response.headers()["location"], "/account/update-password");

    let page = browser
        .post_form(
            "/account/update-password",
            &[("password", "brand-new-pass"), ("password_confirm", "brand-new-pass")],
        )
        .await;
    assert!(page.contains("Your password was updated successfully."));

    let page = browser.get("/").await;
    assert_eq!(page.path, "/");
    assert!(page.body.contains("Welcome lost@example.test"));

    let response = app
        .browser()
        .post_raw(
            "/auth/signin",
            &[("email", "lost@example.test"), ("password", "brand-new-pass")],
        )
        .await;
    assert_eq!(response.headers()["location"], "/");
}

use std::net::TcpListener;
use std::sync::Arc;

use menu_auth::auth::TokenCodec;
use menu_auth::configuration::AuthSettings;
use menu_auth::startup::run;
use menu_auth::users::InMemoryUserStore;
use serde_json::{json, Value};
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub settings: AuthSettings,
}

fn test_auth_settings() -> AuthSettings {
    AuthSettings::with_secrets(
        "test-access-secret-at-least-32-chars!".to_string(),
        "test-refresh-secret-at-least-32-char!".to_string(),
    )
}

fn spawn_app_with(settings: AuthSettings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryUserStore::new());
    let server = run(listener, store, settings.clone()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, settings }
}

fn spawn_app() -> TestApp {
    spawn_app_with(test_auth_settings())
}

async fn register_user(app: &TestApp, email: &str, username: &str, password: &str) -> Value {
    let client = reqwest::Client::new();
    let body = json!({
        "email": email,
        "username": username,
        "password": password,
    });

    let response = client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    response.json().await.expect("Failed to parse response")
}

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_for_valid_credentials() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let body = json!({
        "email": "a@x.com",
        "username": "a",
        "password": "password123"
    });

    let response = client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["user"]["email"], "a@x.com");
    assert!(response_body["user"].get("password").is_none());
    assert!(response_body["user"].get("passwordHash").is_none());

    let access = response_body["tokens"]["accessToken"]
        .as_str()
        .expect("No access token in response");
    let refresh = response_body["tokens"]["refreshToken"]
        .as_str()
        .expect("No refresh token in response");
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    assert_ne!(access, refresh);
}

#[tokio::test]
async fn register_returns_400_for_missing_fields() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let test_cases = vec![
        (json!({"username": "a", "password": "password123"}), "missing email"),
        (json!({"email": "a@x.com", "password": "password123"}), "missing username"),
        (json!({"email": "a@x.com", "username": "a"}), "missing password"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = client
            .post(&format!("{}/api/auth/register", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

#[tokio::test]
async fn register_returns_400_for_short_password() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let body = json!({
        "email": "a@x.com",
        "username": "a",
        "password": "short"
    });

    let response = client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"]
        .as_str()
        .unwrap()
        .contains("at least 8 characters"));
}

#[tokio::test]
async fn register_returns_400_for_invalid_email() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let invalid_emails = vec!["notanemail", "user@", "@example.com", "user@@example.com"];

    for invalid_email in invalid_emails {
        let body = json!({
            "email": invalid_email,
            "username": "a",
            "password": "password123"
        });

        let response = client
            .post(&format!("{}/api/auth/register", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(),
            "Should reject invalid email: {}", invalid_email);
    }
}

#[tokio::test]
async fn register_returns_400_for_duplicate_email() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    register_user(&app, "a@x.com", "a", "password123").await;

    let body = json!({
        "email": "a@x.com",
        "username": "b",
        "password": "password456"
    });

    let response = client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"].as_str().unwrap().contains("already exists"));
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_200_for_valid_credentials() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;

    let login_body = json!({
        "emailOrUsername": "a@x.com",
        "password": "password123"
    });

    let response = client
        .post(&format!("{}/api/auth/login", &app.address))
        .json(&login_body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["user"]["id"], registered["user"]["id"]);
    assert!(response_body["tokens"]["accessToken"].is_string());
    assert!(response_body["tokens"]["refreshToken"].is_string());
}

#[tokio::test]
async fn login_accepts_username_as_identifier() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    register_user(&app, "a@x.com", "a", "password123").await;

    let login_body = json!({
        "emailOrUsername": "a",
        "password": "password123"
    });

    let response = client
        .post(&format!("{}/api/auth/login", &app.address))
        .json(&login_body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    register_user(&app, "a@x.com", "a", "password123").await;

    let wrong_password = client
        .post(&format!("{}/api/auth/login", &app.address))
        .json(&json!({"emailOrUsername": "a@x.com", "password": "wrong-password"}))
        .send()
        .await
        .expect("Failed to execute request.");

    let unknown_user = client
        .post(&format!("{}/api/auth/login", &app.address))
        .json(&json!({"emailOrUsername": "ghost@x.com", "password": "password123"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());

    let body_wrong: Value = wrong_password.json().await.unwrap();
    let body_unknown: Value = unknown_user.json().await.unwrap();
    assert_eq!(body_wrong, body_unknown);
    assert!(body_wrong["error"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn login_returns_400_for_missing_fields() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let test_cases = vec![
        (json!({"emailOrUsername": "a@x.com"}), "missing password"),
        (json!({"password": "password123"}), "missing identifier"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = client
            .post(&format!("{}/api/auth/login", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

// --- Token Refresh Tests ---

#[tokio::test]
async fn refresh_returns_200_and_rotates_the_pair() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let old_refresh_token = registered["tokens"]["refreshToken"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/auth/refresh", &app.address))
        .json(&json!({"refreshToken": old_refresh_token}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let new_refresh_token = response_body["tokens"]["refreshToken"].as_str().unwrap();
    assert!(response_body["tokens"]["accessToken"].is_string());
    assert_ne!(old_refresh_token, new_refresh_token,
        "Refresh token should be rotated on each refresh");
}

#[tokio::test]
async fn refresh_returns_400_for_missing_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/refresh", &app.address))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn refresh_returns_401_for_garbage_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/refresh", &app.address))
        .json(&json!({"refreshToken": "definitely.not.valid"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn refresh_returns_401_for_foreign_signed_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let user_id = Uuid::parse_str(registered["user"]["id"].as_str().unwrap()).unwrap();

    let foreign = TokenCodec::new(&AuthSettings::with_secrets(
        "another-access-secret-entirely-here!!".to_string(),
        "another-refresh-secret-entirely-no!!!".to_string(),
    ));
    let forged = foreign.issue_refresh(user_id).unwrap();

    let response = client
        .post(&format!("{}/api/auth/refresh", &app.address))
        .json(&json!({"refreshToken": forged}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn access_token_is_rejected_as_refresh_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let access_token = registered["tokens"]["accessToken"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/auth/refresh", &app.address))
        .json(&json!({"refreshToken": access_token}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Profile Tests ---

#[tokio::test]
async fn profile_returns_401_without_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/profile", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"].as_str().unwrap().contains("token"));
}

#[tokio::test]
async fn profile_returns_403_for_foreign_signed_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let user_id = Uuid::parse_str(registered["user"]["id"].as_str().unwrap()).unwrap();

    let foreign = TokenCodec::new(&AuthSettings::with_secrets(
        "another-access-secret-entirely-here!!".to_string(),
        "another-refresh-secret-entirely-no!!!".to_string(),
    ));
    let forged = foreign
        .issue_access(&menu_auth::users::AuthUser {
            id: user_id,
            email: "a@x.com".to_string(),
        })
        .unwrap();

    let response = client
        .get(&format!("{}/api/auth/profile", &app.address))
        .header("Authorization", format!("Bearer {}", forged))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(403, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn profile_returns_200_with_valid_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let access_token = registered["tokens"]["accessToken"].as_str().unwrap();

    let response = client
        .get(&format!("{}/api/auth/profile", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["user"]["email"], "a@x.com");
    assert!(response_body["user"].get("password").is_none());
}

#[tokio::test]
async fn profile_returns_404_for_deleted_subject() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    // Validly signed token for a subject that was never stored.
    let codec = TokenCodec::new(&app.settings);
    let token = codec
        .issue_access(&menu_auth::users::AuthUser {
            id: Uuid::new_v4(),
            email: "ghost@x.com".to_string(),
        })
        .unwrap();

    let response = client
        .get(&format!("{}/api/auth/profile", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn profile_rejects_malformed_authorization_header() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let malformed_headers = vec![
        "Bearer",             // missing token
        "Basic dXNlcjpwYXNz", // not Bearer
        "BearerToken",        // missing space
        "",                   // empty
    ];

    for header in malformed_headers {
        let response = client
            .get(&format!("{}/api/auth/profile", &app.address))
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16(),
            "Should reject malformed header: {}", header);
    }
}

// --- Logout Tests ---

#[tokio::test]
async fn logout_returns_200_with_valid_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let access_token = registered["tokens"]["accessToken"].as_str().unwrap();

    let response = client
        .post(&format!("{}/api/auth/logout", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["message"]
        .as_str()
        .unwrap()
        .contains("Logout successful"));
}

#[tokio::test]
async fn logout_is_advisory_tokens_stay_valid() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let access_token = registered["tokens"]["accessToken"].as_str().unwrap();

    let logout = client
        .post(&format!("{}/api/auth/logout", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, logout.status().as_u16());

    // No revocation store: the same token still works until expiry.
    let profile = client
        .get(&format!("{}/api/auth/profile", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, profile.status().as_u16());
}

#[tokio::test]
async fn logout_requires_authentication() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/logout", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Optional Gate Tests ---

#[tokio::test]
async fn welcome_works_without_identity() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/welcome", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["user"].is_null());
}

#[tokio::test]
async fn welcome_attaches_identity_when_token_is_valid() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let registered = register_user(&app, "a@x.com", "a", "password123").await;
    let access_token = registered["tokens"]["accessToken"].as_str().unwrap();

    let response = client
        .get(&format!("{}/welcome", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn welcome_ignores_invalid_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/welcome", &app.address))
        .header("Authorization", "Bearer invalid.token.here")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["user"].is_null());
}

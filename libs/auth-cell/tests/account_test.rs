use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};

use auth_cell::{AccountService, LoginForm, Registration, SessionStore};
use shared_models::error::AppError;
use shared_utils::test_utils::{MockStoreResponses, TestConfig, TestUser};

async fn mount_password_grant(server: &MockServer, user: &TestUser, secret: &str, password: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_partial_json(json!({ "email": user.email, "password": password })))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(MockStoreResponses::token_response(user, secret)))
        .mount(server)
        .await;
}

async fn mount_rejected_grant(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            MockStoreResponses::error_response("Invalid login credentials", "invalid_grant"),
        ))
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer, user: &TestUser) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id).as_str()))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([MockStoreResponses::user_profile_document(user)])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_in_publishes_session_to_subscribers() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let user = TestUser::patient("kabo@example.com");
    mount_password_grant(&server, &user, &config.jwt_secret, "secret1").await;

    let sessions = SessionStore::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    sessions.subscribe(move |session| {
        log.lock().unwrap().push(session.is_some());
    });

    let account = AccountService::new(&config.to_app_config(), sessions.clone());
    let mut form = LoginForm::new("kabo@example.com", "secret1");
    let session = account.sign_in(&mut form).await.unwrap();

    assert_eq!(session.user_id(), user.id);
    assert_eq!(sessions.current().map(|s| s.user.id), Some(user.id.clone()));
    assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    assert_eq!(form.email, "kabo@example.com");
}

#[tokio::test]
async fn test_failed_sign_in_clears_credentials() {
    let server = MockServer::start().await;
    mount_rejected_grant(&server).await;

    let sessions = SessionStore::new();
    let account = AccountService::new(
        &TestConfig::with_server(&server.uri()).to_app_config(),
        sessions.clone(),
    );
    let mut form = LoginForm::new("kabo@example.com", "wrong");

    let err = account.sign_in(&mut form).await.unwrap_err();
    assert_eq!(err, AppError::Auth("Invalid email or password.".to_string()));
    assert_eq!(form, LoginForm::default());
    assert!(sessions.current().is_none());
}

#[tokio::test]
async fn test_admin_sign_in_accepts_admin_role() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let admin = TestUser::admin("admin@example.com");
    mount_password_grant(&server, &admin, &config.jwt_secret, "adminpass").await;
    mount_profile(&server, &admin).await;

    let sessions = SessionStore::new();
    let account = AccountService::new(&config.to_app_config(), sessions.clone());
    let mut form = LoginForm::new("admin@example.com", "adminpass");

    let (_, profile) = account.admin_sign_in(&mut form).await.unwrap();
    assert!(profile.is_admin());
    assert!(sessions.current().is_some());
}

#[tokio::test]
async fn test_admin_sign_in_rejects_patient_and_signs_out() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let patient = TestUser::patient("kabo@example.com");
    mount_password_grant(&server, &patient, &config.jwt_secret, "secret1").await;
    mount_profile(&server, &patient).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let account = AccountService::new(&config.to_app_config(), sessions.clone());
    let mut form = LoginForm::new("kabo@example.com", "secret1");

    let result = account.admin_sign_in(&mut form).await;
    assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Access denied: Not an admin.");
    assert!(sessions.current().is_none());
}

#[tokio::test]
async fn test_register_creates_user_profile() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let user = TestUser::patient("new@example.com");

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(MockStoreResponses::token_response(&user, &config.jwt_secret)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({
            "id": user.id,
            "firstName": "Naledi",
            "lastName": "Sebina",
            "email": "new@example.com",
            "phone": "71234567",
            "role": "user"
        })))
        .respond_with(ResponseTemplate::new(201)
            .set_body_json(json!([MockStoreResponses::user_profile_document(&user)])))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let account = AccountService::new(&config.to_app_config(), sessions.clone());
    let registration = Registration {
        email: "new@example.com".to_string(),
        password: "secret1".to_string(),
        first_name: "Naledi".to_string(),
        last_name: "Sebina".to_string(),
        phone: "71234567".to_string(),
    };

    let session = account.register(&registration).await.unwrap();
    assert_eq!(session.user_id(), user.id);
    assert!(sessions.current().is_some());
}

#[tokio::test]
async fn test_register_rejects_phone_under_registration_policy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let account = AccountService::new(
        &TestConfig::with_server(&server.uri()).to_app_config(),
        SessionStore::new(),
    );
    let registration = Registration {
        email: "new@example.com".to_string(),
        password: "secret1".to_string(),
        first_name: "Naledi".to_string(),
        last_name: "Sebina".to_string(),
        // seven digits pass the profile rule but not the registration rule
        phone: "7123456".to_string(),
    };

    let err = account.register(&registration).await.unwrap_err();
    assert_eq!(err.user_message(), "Please enter a valid phone number");
}

#[tokio::test]
async fn test_change_password_reauthenticates_then_updates() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let user = TestUser::patient("kabo@example.com");
    mount_password_grant(&server, &user, &config.jwt_secret, "oldpass").await;
    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(body_partial_json(json!({ "password": "newpass1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": user.id })))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    sessions.set(user.to_session(&config.jwt_secret));
    let account = AccountService::new(&config.to_app_config(), sessions);

    assert!(account.change_password("oldpass", "newpass1", "newpass1").await.is_ok());
}

#[tokio::test]
async fn test_change_password_wrong_current_password() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    mount_rejected_grant(&server).await;
    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let user = TestUser::patient("kabo@example.com");
    sessions.set(user.to_session(&config.jwt_secret));
    let account = AccountService::new(&config.to_app_config(), sessions.clone());

    let err = account.change_password("nope", "newpass1", "newpass1").await.unwrap_err();
    assert_eq!(err, AppError::Auth("Current password is incorrect".to_string()));
    assert!(sessions.current().is_some());
}

#[tokio::test]
async fn test_change_password_local_validation() {
    let account = AccountService::new(&TestConfig::default().to_app_config(), SessionStore::new());

    let cases = [
        (("", "newpass1", "newpass1"), "All password fields are required"),
        (("old", "newpass1", "newpass2"), "New passwords do not match"),
        (("old", "short", "short"), "Password must be at least 6 characters"),
    ];
    for ((current, new, confirm), expected) in cases {
        let err = account.change_password(current, new, confirm).await.unwrap_err();
        assert_eq!(err, AppError::Validation(expected.to_string()));
    }
}

#[tokio::test]
async fn test_delete_account_removes_profile_and_user() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let user = TestUser::patient("kabo@example.com");
    mount_password_grant(&server, &user, &config.jwt_secret, "secret1").await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    sessions.set(user.to_session(&config.jwt_secret));
    let account = AccountService::new(&config.to_app_config(), sessions.clone());

    account.delete_account("secret1").await.unwrap();
    assert!(sessions.current().is_none());
}

#[tokio::test]
async fn test_delete_account_wrong_password_keeps_everything() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    mount_rejected_grant(&server).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    sessions.set(TestUser::patient("kabo@example.com").to_session(&config.jwt_secret));
    let account = AccountService::new(&config.to_app_config(), sessions.clone());

    let err = account.delete_account("wrong").await.unwrap_err();
    assert_eq!(err.user_message(), "Incorrect password");
    assert!(sessions.current().is_some());
}

#[tokio::test]
async fn test_sign_out_clears_session_even_if_revocation_fails() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    sessions.set(TestUser::default().to_session(&config.jwt_secret));
    let account = AccountService::new(&config.to_app_config(), sessions.clone());

    account.sign_out().await;
    assert!(sessions.current().is_none());
}

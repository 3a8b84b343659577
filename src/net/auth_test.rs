use futures::executor::block_on;

use super::*;
use crate::net::test_support::{make_client, make_user};

// =============================================================
// Profile shaping
// =============================================================

#[test]
fn email_local_part_splits_on_at() {
    assert_eq!(email_local_part("a@b.com"), "a");
    assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
}

#[test]
fn build_user_defaults_from_email() {
    let creds = Credentials::new("a@b.com", "secret");
    let user = build_user(&creds, &LoginResponse { access_token: Some("t".to_owned()), user: None });
    assert_eq!(user.name, "a");
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.id, "local:a@b.com");
    assert!(user.roles.is_empty());
}

#[test]
fn build_user_prefers_server_profile() {
    let creds = Credentials::new("a@b.com", "secret");
    let response: LoginResponse = serde_json::from_str(
        r#"{"access_token": "t", "user": {"id": 9, "name": "Ana", "email": "ana@b.com", "role": "ADMIN"}}"#,
    )
    .unwrap();
    let user = build_user(&creds, &response);
    assert_eq!(user.id, "9");
    assert_eq!(user.name, "Ana");
    assert_eq!(user.email, "ana@b.com");
    assert_eq!(user.roles, vec!["ADMIN".to_owned()]);
}

#[test]
fn build_user_blank_name_falls_back() {
    let creds = Credentials::new("maria@x.com", "secret");
    let response: LoginResponse =
        serde_json::from_str(r#"{"access_token": "t", "user": {"name": " "}}"#).unwrap();
    assert_eq!(build_user(&creds, &response).name, "maria");
}

#[test]
fn credentials_debug_redacts_password() {
    let rendered = format!("{:?}", Credentials::new("a@b.com", "secret"));
    assert!(rendered.contains("a@b.com"));
    assert!(!rendered.contains("secret"));
}

#[test]
fn password_endpoint_formats_expected_path() {
    assert_eq!(password_endpoint("u123"), "/users/u123/password");
}

// =============================================================
// login
// =============================================================

#[test]
fn login_success_returns_token_and_derived_user() {
    let (client, transport, memory) = make_client();
    transport.reply(200, r#"{"access_token": "tok123"}"#);
    let auth = AuthService::new(client);

    let (token, user) = block_on(auth.login(&Credentials::new("a@b.com", "secret"))).unwrap();
    assert_eq!(token, "tok123");
    assert_eq!(user.name, "a");
    assert!(memory.is_empty(), "auth service must not persist");

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, LOGIN_ENDPOINT);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(request.body.as_deref().unwrap()).unwrap(),
        serde_json::json!({"email": "a@b.com", "password": "secret"})
    );
}

#[test]
fn login_bad_request_is_invalid_credentials() {
    let (client, transport, _) = make_client();
    transport.reply(400, r#"{"message": "bad"}"#);
    let auth = AuthService::new(client);
    let result = block_on(auth.login(&Credentials::new("a@b.com", "wrong")));
    assert_eq!(result, Err(AuthError::InvalidCredentials));
}

#[test]
fn login_unauthorized_does_not_clear_existing_store() {
    let (client, transport, memory) = make_client();
    client.tokens().write("old", &make_user("USER")).unwrap();
    let before = memory.snapshot();
    transport.reply(401, "");
    let auth = AuthService::new(client);
    let result = block_on(auth.login(&Credentials::new("a@b.com", "wrong")));
    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert_eq!(memory.snapshot(), before);
}

#[test]
fn login_without_access_token_is_invalid_credentials() {
    let (client, transport, _) = make_client();
    transport.reply(200, r#"{"user": {"id": 1}}"#);
    let auth = AuthService::new(client);
    let result = block_on(auth.login(&Credentials::new("a@b.com", "secret")));
    assert_eq!(result, Err(AuthError::InvalidCredentials));
}

#[test]
fn login_with_empty_access_token_is_invalid_credentials() {
    let (client, transport, _) = make_client();
    transport.reply(200, r#"{"access_token": ""}"#);
    let auth = AuthService::new(client);
    let result = block_on(auth.login(&Credentials::new("a@b.com", "secret")));
    assert_eq!(result, Err(AuthError::InvalidCredentials));
}

#[test]
fn login_network_failure_is_network_error() {
    let (client, transport, _) = make_client();
    transport.fail("offline");
    let auth = AuthService::new(client);
    let result = block_on(auth.login(&Credentials::new("a@b.com", "secret")));
    assert!(matches!(result, Err(AuthError::Network(_))));
    assert_eq!(transport.request_count(), 1, "no retry");
}

// =============================================================
// logout / change_password
// =============================================================

#[test]
fn logout_clears_store() {
    let (client, _, memory) = make_client();
    client.tokens().write("tok", &make_user("USER")).unwrap();
    AuthService::new(client).logout();
    assert!(memory.is_empty());
}

#[test]
fn change_password_puts_camel_case_body_with_bearer() {
    let (client, transport, _) = make_client();
    client.tokens().write("tok", &make_user("USER")).unwrap();
    transport.reply(204, "");
    let auth = AuthService::new(client);
    block_on(auth.change_password("u1", "old", "new")).unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/users/u1/password");
    assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(request.body.as_deref().unwrap()).unwrap(),
        serde_json::json!({"currentPassword": "old", "newPassword": "new"})
    );
}

#[test]
fn change_password_surfaces_server_message() {
    let (client, transport, _) = make_client();
    transport.reply(400, r#"{"message": "Senha atual incorreta"}"#);
    let auth = AuthService::new(client);
    let err = block_on(auth.change_password("u1", "bad", "new")).unwrap_err();
    assert_eq!(err.user_message(), "Senha atual incorreta");
}

#[test]
fn placeholder_ids_are_recognised() {
    assert!(is_placeholder_user_id(&placeholder_user_id("a@b.com")));
    assert!(!is_placeholder_user_id("42"));
}

#[test]
fn change_password_refuses_placeholder_id() {
    let (client, transport, _) = make_client();
    let auth = AuthService::new(client);
    let result = block_on(auth.change_password("local:a@b.com", "old-secret", "new-secret"));
    assert_eq!(result, Err(ApiError::MissingUserId));
    assert_eq!(transport.request_count(), 0);
}

//! Login, registration and session restore against the mock backend.

mod common;

use std::sync::Arc;

use budgetly_client::{AuthClient, FileTokenStore, MemoryTokenStore, SessionContext, TokenStore};
use budgetly_shared::AppError;

use common::{EMAIL, MockBackend, PASSWORD, TOKEN};

#[tokio::test]
async fn test_login_establishes_and_persists_session() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("session.json")));
    let session = SessionContext::new(store.clone());
    let auth = AuthClient::new(backend.client(session.clone()));

    let user = auth.login(EMAIL, PASSWORD).await.unwrap();

    assert_eq!(user.name, "Asha");
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some(TOKEN));
    assert_eq!(store.load().unwrap().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_login_rejected_reports_backend_message() {
    let backend = MockBackend::start().await;
    let session = SessionContext::in_memory();
    let auth = AuthClient::new(backend.client(session.clone()));

    let err = auth.login(EMAIL, "wrong-password").await.unwrap_err();

    assert_eq!(
        err,
        AppError::Api {
            status: 401,
            message: "Invalid email or password".to_string()
        }
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_validates_before_sending() {
    let backend = MockBackend::start().await;
    let auth = AuthClient::new(backend.client(SessionContext::in_memory()));

    let err = auth.login("not-an-email", "123").await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_does_not_log_in() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionContext::new(store.clone());
    let auth = AuthClient::new(backend.client(session.clone()));

    auth.register("new@example.com", "secret1", "Ravi").await.unwrap();

    assert!(!session.is_authenticated());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_register_duplicate_surfaces_message() {
    let backend = MockBackend::start().await;
    let auth = AuthClient::new(backend.client(SessionContext::in_memory()));

    let err = auth.register(EMAIL, PASSWORD, "Asha").await.unwrap_err();
    assert_eq!(err.user_message(), "User already exists");
}

#[tokio::test]
async fn test_restore_valid_token() {
    let backend = MockBackend::start().await;
    let session = SessionContext::new(Arc::new(MemoryTokenStore::with_token(TOKEN)));
    let auth = AuthClient::new(backend.client(session.clone()));

    let user = auth.restore().await.unwrap().unwrap();

    assert_eq!(user.email, EMAIL);
    assert_eq!(session.user().map(|u| u.name), Some("Asha".to_string()));
}

#[tokio::test]
async fn test_restore_stale_token_clears_it() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryTokenStore::with_token("expired"));
    let session = SessionContext::new(store.clone());
    let auth = AuthClient::new(backend.client(session.clone()));

    let err = auth.restore().await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(!session.is_authenticated());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_restore_without_token() {
    let backend = MockBackend::start().await;
    let auth = AuthClient::new(backend.client(SessionContext::in_memory()));

    assert_eq!(auth.restore().await.unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_persisted_token() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionContext::new(store.clone());
    let auth = AuthClient::new(backend.client(session.clone()));
    auth.login(EMAIL, PASSWORD).await.unwrap();

    auth.logout();

    assert!(!session.is_authenticated());
    assert_eq!(store.load().unwrap(), None);
}

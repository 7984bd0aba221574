//! Integration tests for the credential service against a real SQLite store.

use chrono::{Duration, TimeZone, Utc};
use credstore::config::Config;
use credstore::db::Store;
use credstore::models::Credential;
use credstore::services::CredentialError;
use credstore::state::SharedState;

async fn spawn_state() -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("credstore-cred-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    SharedState::new(config)
        .await
        .expect("Failed to create state")
}

fn sample() -> Credential {
    Credential::new("$argon2id$v=19$m=19456,t=2,p=1$abc$def")
        .with_salt("pepper")
        .with_last_changed(Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap())
}

#[tokio::test]
async fn test_in_memory_store_migrates() {
    let store = Store::new("sqlite::memory:").await.unwrap();
    store.ping().await.unwrap();
    assert!(store.list_credentials().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_then_get_returns_equal_record() {
    let state = spawn_state().await;
    let service = &state.credential_service;

    let saved = service.insert(sample()).await.unwrap();
    assert!(saved.id > 0);

    let loaded = service.get_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(
        loaded,
        Credential {
            id: saved.id,
            ..sample()
        }
    );
}

#[tokio::test]
async fn test_insert_rejects_invalid_fields() {
    let state = spawn_state().await;
    let service = &state.credential_service;

    let blank = Credential::new("   ");
    assert!(matches!(
        service.insert(blank).await,
        Err(CredentialError::Validation(_))
    ));

    let future = Credential::new("hash").with_last_changed(Utc::now() + Duration::hours(1));
    assert!(matches!(
        service.insert(future).await,
        Err(CredentialError::Validation(_))
    ));

    let long_salt = Credential::new("hash").with_salt("s".repeat(65));
    assert!(matches!(
        service.insert(long_salt).await,
        Err(CredentialError::Validation(_))
    ));

    assert!(service.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_requires_positive_id() {
    let state = spawn_state().await;

    let unsaved = sample();
    assert!(matches!(
        state.credential_service.update(&unsaved).await,
        Err(CredentialError::Constraint(_))
    ));

    let negative = Credential { id: -3, ..sample() };
    assert!(matches!(
        state.credential_service.update(&negative).await,
        Err(CredentialError::Constraint(_))
    ));
}

#[tokio::test]
async fn test_update_persists_changes() {
    let state = spawn_state().await;
    let service = &state.credential_service;

    let mut saved = service.insert(sample()).await.unwrap();
    saved.password_hash = "rotated".to_string();
    saved.salt = None;
    saved.must_reset = true;
    service.update(&saved).await.unwrap();

    let loaded = service.get_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(loaded.password_hash, "rotated");
    assert!(loaded.salt.is_none());
    assert!(loaded.must_reset);
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let state = spawn_state().await;

    let ghost = Credential { id: 999, ..sample() };
    assert!(matches!(
        state.credential_service.update(&ghost).await,
        Err(CredentialError::NotFound(999))
    ));
}

#[tokio::test]
async fn test_delete_hides_record_and_second_delete_fails() {
    let state = spawn_state().await;
    let service = &state.credential_service;

    let keep = service.insert(sample()).await.unwrap();
    let gone = service.insert(sample()).await.unwrap();

    service.delete(gone.id).await.unwrap();

    assert!(service.get_by_id(gone.id).await.unwrap().is_none());
    let all = service.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, keep.id);

    assert!(matches!(
        service.delete(gone.id).await,
        Err(CredentialError::NotFound(id)) if id == gone.id
    ));
    assert!(matches!(
        service.delete(12345).await,
        Err(CredentialError::NotFound(12345))
    ));

    // Updating a deleted record does not resurrect it.
    assert!(matches!(
        service.update(&gone).await,
        Err(CredentialError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_and_get_reject_non_positive_ids() {
    let state = spawn_state().await;

    assert!(matches!(
        state.credential_service.delete(0).await,
        Err(CredentialError::Constraint(_))
    ));
    assert!(matches!(
        state.credential_service.get_by_id(-1).await,
        Err(CredentialError::Constraint(_))
    ));
}

//! Integration tests for the account coordinator: uniqueness, soft delete and
//! the detach-then-delete flow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use credstore::config::Config;
use credstore::db::Store;
use credstore::models::{Account, Credential};
use credstore::services::{
    AccountError, AccountService, CredentialError, CredentialService, SeaOrmAccountService,
    SeaOrmCredentialService,
};
use credstore::state::SharedState;

fn temp_db_url() -> String {
    let db_path =
        std::env::temp_dir().join(format!("credstore-account-test-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", db_path.display())
}

async fn spawn_state() -> SharedState {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();

    SharedState::new(config)
        .await
        .expect("Failed to create state")
}

fn alice() -> Account {
    Account::new("alice", "alice@example.com", true)
        .with_registered_at(Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap())
}

fn hashed(hash: &str) -> Credential {
    Credential::new(hash).with_last_changed(Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap())
}

/// Delegates to a real service but refuses every delete.
struct FailingDelete {
    inner: Arc<dyn CredentialService>,
}

#[async_trait]
impl CredentialService for FailingDelete {
    fn validate(&self, credential: &Credential) -> Result<(), CredentialError> {
        self.inner.validate(credential)
    }

    async fn insert(&self, credential: Credential) -> Result<Credential, CredentialError> {
        self.inner.insert(credential).await
    }

    async fn update(&self, credential: &Credential) -> Result<(), CredentialError> {
        self.inner.update(credential).await
    }

    async fn delete(&self, _id: i32) -> Result<(), CredentialError> {
        Err(CredentialError::Database("disk I/O error".to_string()))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Credential>, CredentialError> {
        self.inner.get_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<Credential>, CredentialError> {
        self.inner.get_all().await
    }
}

#[tokio::test]
async fn test_insert_with_credential_persists_both() {
    let state = spawn_state().await;

    let saved = state
        .account_service
        .insert(alice().with_credential(hashed("h1")))
        .await
        .unwrap();

    assert!(saved.id > 0);
    let credential_id = saved.credential_id().expect("credential should be saved");

    let loaded = state
        .account_service
        .get_by_id(saved.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.credential.as_ref().unwrap().password_hash, "h1");

    assert!(
        state
            .credential_service
            .get_by_id(credential_id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_invalid_credential_blocks_account_insert() {
    let state = spawn_state().await;

    let result = state
        .account_service
        .insert(alice().with_credential(Credential::new("")))
        .await;

    assert!(matches!(result, Err(AccountError::Validation(_))));
    assert!(state.account_service.get_all().await.unwrap().is_empty());
    assert!(state.credential_service.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_email_format_is_checked() {
    let state = spawn_state().await;
    let service = &state.account_service;

    assert!(
        service
            .insert(Account::new("u1", "user@example.com", true))
            .await
            .is_ok()
    );

    for bad in ["user@@example", "user@"] {
        assert!(matches!(
            service.insert(Account::new("u2", bad, true)).await,
            Err(AccountError::Validation(_))
        ));
        assert!(matches!(
            service.find_by_email(bad).await,
            Err(AccountError::Validation(_))
        ));
    }
}

#[tokio::test]
async fn test_duplicate_username_conflicts_after_trimming() {
    let state = spawn_state().await;
    let service = &state.account_service;

    service.insert(alice()).await.unwrap();

    let result = service
        .insert(Account::new("  alice ", "other@example.com", true))
        .await;
    assert!(matches!(result, Err(AccountError::Conflict(_))));

    let result = service
        .insert(Account::new("bob", "alice@example.com", true))
        .await;
    assert!(matches!(result, Err(AccountError::Conflict(_))));

    assert_eq!(service.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_keeps_own_username() {
    let state = spawn_state().await;
    let service = &state.account_service;

    let mut saved = service.insert(alice()).await.unwrap();
    saved.active = false;
    let updated = service.update(saved.clone()).await.unwrap();
    assert!(!updated.active);

    let bob = service
        .insert(Account::new("bob", "bob@example.com", true))
        .await
        .unwrap();
    let stolen = Account {
        username: "alice".to_string(),
        ..bob
    };
    assert!(matches!(
        service.update(stolen).await,
        Err(AccountError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_update_after_delete_is_not_found() {
    let state = spawn_state().await;
    let service = &state.account_service;

    let saved = service.insert(alice()).await.unwrap();
    service.delete(saved.id).await.unwrap();

    let result = service
        .update(Account {
            active: false,
            ..saved.clone()
        })
        .await;
    assert!(matches!(result, Err(AccountError::NotFound(_))));

    let missing = Account { id: 4242, ..alice() };
    assert!(matches!(
        service.update(missing).await,
        Err(AccountError::NotFound(_))
    ));

    assert!(service.get_by_id(saved.id).await.unwrap().is_none());
    assert!(service.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let state = spawn_state().await;
    let service = &state.account_service;

    let first = service.insert(alice()).await.unwrap();
    let bob = service
        .insert(Account::new("bob", "bob@example.com", true))
        .await
        .unwrap();

    let result = service
        .update(Account {
            email: " alice@example.com ".to_string(),
            ..bob.clone()
        })
        .await;
    assert!(matches!(result, Err(AccountError::Conflict(_))));

    let alice_now = service.get_by_id(first.id).await.unwrap().unwrap();
    let bob_now = service.get_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(alice_now, first);
    assert_eq!(bob_now, bob);
}

#[tokio::test]
async fn test_second_detach_of_same_credential_conflicts() {
    let state = spawn_state().await;

    let saved = state
        .account_service
        .insert(alice().with_credential(hashed("h1")))
        .await
        .unwrap();
    let credential_id = saved.credential_id().unwrap();

    state
        .account_service
        .detach_and_delete_credential(saved.id, credential_id)
        .await
        .unwrap();

    let again = state
        .account_service
        .detach_and_delete_credential(saved.id, credential_id)
        .await;
    assert!(matches!(again, Err(AccountError::Conflict(_))));
}

#[tokio::test]
async fn test_state_uses_configured_skew_tolerance() {
    let mut config = Config::default();
    config.validation.clock_skew_tolerance_minutes = 0;

    let store = Store::new(&temp_db_url()).await.unwrap();
    let state = SharedState::from_store(config, store);
    assert_eq!(state.config.validation.clock_skew_tolerance_minutes, 0);

    let ahead = Credential::new("h1").with_last_changed(Utc::now() + chrono::Duration::minutes(2));
    assert!(matches!(
        state.credential_service.insert(ahead).await,
        Err(CredentialError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_requires_positive_id() {
    let state = spawn_state().await;

    assert!(matches!(
        state.account_service.update(alice()).await,
        Err(AccountError::Constraint(_))
    ));
}

#[tokio::test]
async fn test_find_by_username_and_email() {
    let state = spawn_state().await;
    let service = &state.account_service;

    let saved = service.insert(alice()).await.unwrap();

    let by_name = service.find_by_username(" alice ").await.unwrap().unwrap();
    assert_eq!(by_name.id, saved.id);

    let by_email = service
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, saved.id);

    assert!(service.find_by_username("Alice").await.unwrap().is_none());
    assert!(matches!(
        service.find_by_username("   ").await,
        Err(AccountError::Validation(_))
    ));
}

#[tokio::test]
async fn test_soft_deleted_username_can_be_reused() {
    let state = spawn_state().await;
    let service = &state.account_service;

    let first = service.insert(alice()).await.unwrap();
    service.delete(first.id).await.unwrap();

    assert!(service.get_by_id(first.id).await.unwrap().is_none());
    assert!(service.find_by_username("alice").await.unwrap().is_none());
    assert!(matches!(
        service.delete(first.id).await,
        Err(AccountError::NotFound(_))
    ));

    let second = service.insert(alice()).await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(service.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_account_delete_keeps_credential() {
    let state = spawn_state().await;

    let saved = state
        .account_service
        .insert(alice().with_credential(hashed("h1")))
        .await
        .unwrap();
    let credential_id = saved.credential_id().unwrap();

    state.account_service.delete(saved.id).await.unwrap();

    let credential = state
        .credential_service
        .get_by_id(credential_id)
        .await
        .unwrap();
    assert!(credential.is_some_and(|c| !c.deleted));
}

#[tokio::test]
async fn test_detach_rejects_foreign_credential() {
    let state = spawn_state().await;

    let saved = state
        .account_service
        .insert(alice().with_credential(hashed("mine")))
        .await
        .unwrap();
    let other = state.credential_service.insert(hashed("theirs")).await.unwrap();

    let result = state
        .account_service
        .detach_and_delete_credential(saved.id, other.id)
        .await;
    assert!(matches!(result, Err(AccountError::Conflict(_))));

    let loaded = state
        .account_service
        .get_by_id(saved.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.credential_id(), saved.credential_id());
    assert_eq!(state.credential_service.get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_detach_on_missing_account() {
    let state = spawn_state().await;

    assert!(matches!(
        state.account_service.detach_and_delete_credential(77, 1).await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        state.account_service.detach_and_delete_credential(0, 1).await,
        Err(AccountError::Constraint(_))
    ));
}

#[tokio::test]
async fn test_end_to_end_attach_then_detach() {
    let state = spawn_state().await;

    let account = state.account_service.insert(alice()).await.unwrap();
    assert!(account.credential.is_none());

    let credential = state.credential_service.insert(hashed("h1")).await.unwrap();

    let attached = state
        .account_service
        .update(account.with_credential(credential.clone()))
        .await
        .unwrap();
    assert_eq!(attached.credential_id(), Some(credential.id));

    state
        .account_service
        .detach_and_delete_credential(attached.id, credential.id)
        .await
        .unwrap();

    let loaded = state
        .account_service
        .get_by_id(attached.id)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.credential.is_none());
    assert!(state.credential_service.get_all().await.unwrap().is_empty());
    assert!(
        state
            .credential_service
            .get_by_id(credential.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_failed_credential_delete_leaves_account_detached() {
    let store = Store::new(&temp_db_url()).await.unwrap();
    let real: Arc<dyn CredentialService> = Arc::new(SeaOrmCredentialService::new(
        store.clone(),
        Config::default().validation.clock_skew_tolerance(),
    ));
    let failing: Arc<dyn CredentialService> = Arc::new(FailingDelete {
        inner: Arc::clone(&real),
    });
    let service = SeaOrmAccountService::new(store, failing);

    let saved = service
        .insert(alice().with_credential(hashed("h1")))
        .await
        .unwrap();
    let credential_id = saved.credential_id().unwrap();

    let result = service
        .detach_and_delete_credential(saved.id, credential_id)
        .await;
    assert!(matches!(result, Err(AccountError::Database(_))));

    let loaded = service.get_by_id(saved.id).await.unwrap().unwrap();
    assert!(loaded.credential.is_none());

    let orphan = real.get_by_id(credential_id).await.unwrap();
    assert!(orphan.is_some_and(|c| !c.deleted));
}

//! `SeaORM` implementation of the `AccountService` trait.
//!
//! Composite operations are sequences of independently committed storage
//! calls. A failure part-way returns the failing step's error without undoing
//! earlier steps; the step order guarantees the account never references a
//! soft-deleted credential.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::Store;
use crate::models::{Account, Credential};
use crate::services::account_service::{
    AccountError, AccountService, is_valid_email, normalize_account, require_positive_id,
    validate_account,
};
use crate::services::credential_service::CredentialService;

pub struct SeaOrmAccountService {
    store: Store,
    credentials: Arc<dyn CredentialService>,
}

/// A live row conflicts unless it is the account being updated.
fn is_conflict(existing: Option<&Account>, exclude_id: Option<i32>) -> bool {
    existing.is_some_and(|found| exclude_id.is_none_or(|id| found.id != id))
}

impl SeaOrmAccountService {
    #[must_use]
    pub fn new(store: Store, credentials: Arc<dyn CredentialService>) -> Self {
        Self { store, credentials }
    }

    /// Field checks for the account and any attached credential. Runs before
    /// any storage call.
    fn validate(&self, account: &Account) -> Result<(), AccountError> {
        validate_account(account)?;
        if let Some(credential) = &account.credential {
            self.credentials.validate(credential)?;
        }
        Ok(())
    }

    async fn ensure_unique(
        &self,
        account: &Account,
        exclude_id: Option<i32>,
    ) -> Result<(), AccountError> {
        let by_username = self
            .store
            .find_account_by_username(account.username.trim())
            .await?;
        if is_conflict(by_username.as_ref(), exclude_id) {
            return Err(AccountError::Conflict(format!(
                "An account with username '{}' already exists",
                account.username
            )));
        }

        let by_email = self.store.find_account_by_email(account.email.trim()).await?;
        if is_conflict(by_email.as_ref(), exclude_id) {
            return Err(AccountError::Conflict(format!(
                "An account with email '{}' already exists",
                account.email
            )));
        }

        Ok(())
    }

    /// Inserts an unsaved credential or updates a saved one, so the account
    /// can reference its ID.
    async fn persist_credential(&self, credential: Credential) -> Result<Credential, AccountError> {
        if credential.is_persisted() {
            self.credentials.update(&credential).await?;
            Ok(credential)
        } else {
            Ok(self.credentials.insert(credential).await?)
        }
    }

    async fn persist_attached_credential(&self, account: &mut Account) -> Result<(), AccountError> {
        if let Some(credential) = account.credential.take() {
            account.credential = Some(self.persist_credential(credential).await?);
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn insert(&self, account: Account) -> Result<Account, AccountError> {
        let mut account = normalize_account(account);
        self.validate(&account)?;
        self.ensure_unique(&account, None).await?;

        self.persist_attached_credential(&mut account).await?;

        account.id = self.store.insert_account(&account).await?;
        account.deleted = false;

        info!(
            account_id = account.id,
            credential_id = ?account.credential_id(),
            "Created account {}",
            account.username
        );
        Ok(account)
    }

    async fn update(&self, account: Account) -> Result<Account, AccountError> {
        require_positive_id(account.id, "Account")?;

        let mut account = normalize_account(account);
        self.validate(&account)?;
        self.ensure_unique(&account, Some(account.id)).await?;

        self.persist_attached_credential(&mut account).await?;

        if !self.store.update_account(&account).await? {
            return Err(AccountError::NotFound(format!("account {}", account.id)));
        }

        info!(
            account_id = account.id,
            credential_id = ?account.credential_id(),
            "Updated account {}",
            account.username
        );
        Ok(account)
    }

    async fn delete(&self, id: i32) -> Result<(), AccountError> {
        require_positive_id(id, "Account")?;

        if !self.store.soft_delete_account(id).await? {
            return Err(AccountError::NotFound(format!("account {id}")));
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Account>, AccountError> {
        require_positive_id(id, "Account")?;
        Ok(self.store.get_account(id).await?)
    }

    async fn get_all(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.list_accounts().await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }

        debug!("Searching account by username {}", username);
        Ok(self.store.find_account_by_username(username).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AccountError::Validation("Email cannot be empty".to_string()));
        }
        if !is_valid_email(email) {
            return Err(AccountError::Validation(format!(
                "Email format is invalid: {email}"
            )));
        }

        debug!("Searching account by email {}", email);
        Ok(self.store.find_account_by_email(email).await?)
    }

    async fn detach_and_delete_credential(
        &self,
        account_id: i32,
        credential_id: i32,
    ) -> Result<(), AccountError> {
        require_positive_id(account_id, "Account")?;
        require_positive_id(credential_id, "Credential")?;

        let mut account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(format!("account {account_id}")))?;

        if account.credential_id() != Some(credential_id) {
            warn!(
                account_id,
                credential_id, "Refused to delete a credential the account does not own"
            );
            return Err(AccountError::Conflict(
                "credential does not belong to this account".to_string(),
            ));
        }

        // Phase 1: the cleared reference must be committed before phase 2.
        account.credential = None;
        if !self.store.update_account(&account).await? {
            return Err(AccountError::NotFound(format!("account {account_id}")));
        }
        info!(account_id, credential_id, "Detached credential from account");

        // Phase 2
        if let Err(err) = self.credentials.delete(credential_id).await {
            warn!(
                account_id,
                credential_id,
                error = %err,
                "Credential detached but not deleted; it remains active and unreferenced"
            );
            return Err(err.into());
        }

        info!(account_id, credential_id, "Deleted detached credential");
        Ok(())
    }

    fn credential_service(&self) -> Arc<dyn CredentialService> {
        Arc::clone(&self.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(id: i32) -> Account {
        Account {
            id,
            ..Account::new("alice", "alice@example.com", true)
        }
    }

    #[test]
    fn no_existing_row_is_never_a_conflict() {
        assert!(!is_conflict(None, None));
        assert!(!is_conflict(None, Some(4)));
    }

    #[test]
    fn existing_row_conflicts_on_insert() {
        assert!(is_conflict(Some(&saved(4)), None));
    }

    #[test]
    fn own_row_is_excluded_on_update() {
        assert!(!is_conflict(Some(&saved(4)), Some(4)));
        assert!(is_conflict(Some(&saved(4)), Some(5)));
    }
}

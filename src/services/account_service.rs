//! Domain service for accounts and their credentials.
//!
//! This is where the cross-entity rules live: username and email uniqueness
//! among live accounts, persisting an attached credential before the account
//! that points at it, and clearing an account's reference before its
//! credential is soft-deleted.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::constants::limits::{EMAIL_MAX, USERNAME_MAX};
use crate::models::Account;
use crate::services::credential_service::{CredentialError, CredentialService};

/// Errors specific to account operations.
///
/// Credential failures raised inside a composite operation keep their
/// category when converted.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    Constraint(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<CredentialError> for AccountError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(msg) => Self::Validation(msg),
            CredentialError::Constraint(msg) => Self::Constraint(msg),
            CredentialError::NotFound(id) => Self::NotFound(format!("credential {id}")),
            CredentialError::Database(msg) => Self::Database(msg),
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid regex")
    })
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Trims the fields that take part in uniqueness lookups.
#[must_use]
pub fn normalize_account(mut account: Account) -> Account {
    account.username = account.username.trim().to_string();
    account.email = account.email.trim().to_string();
    account
}

pub fn validate_account(account: &Account) -> Result<(), AccountError> {
    let username = account.username.trim();
    if username.is_empty() {
        return Err(AccountError::Validation(
            "Username cannot be empty".to_string(),
        ));
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(AccountError::Validation(format!(
            "Username exceeds the maximum length ({USERNAME_MAX})"
        )));
    }

    let email = account.email.trim();
    if email.is_empty() {
        return Err(AccountError::Validation("Email cannot be empty".to_string()));
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(AccountError::Validation(format!(
            "Email exceeds the maximum length ({EMAIL_MAX})"
        )));
    }
    if !is_valid_email(email) {
        return Err(AccountError::Validation(format!(
            "Email format is invalid: {email}"
        )));
    }

    Ok(())
}

pub(crate) fn require_positive_id(id: i32, what: &str) -> Result<(), AccountError> {
    if id <= 0 {
        return Err(AccountError::Constraint(format!(
            "{what} ID must be greater than 0 (got {id})"
        )));
    }
    Ok(())
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an account, persisting an attached credential first.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for bad fields and
    /// [`AccountError::Conflict`] when the username or email is taken.
    async fn insert(&self, account: Account) -> Result<Account, AccountError>;

    /// Updates an account (never its `deleted` flag), persisting an attached
    /// credential first. Uniqueness checks ignore the account itself.
    async fn update(&self, account: Account) -> Result<Account, AccountError>;

    /// Soft-deletes the account only. Its credential stays active.
    async fn delete(&self, id: i32) -> Result<(), AccountError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Account>, AccountError>;

    async fn get_all(&self) -> Result<Vec<Account>, AccountError>;

    /// Exact match on a trimmed username.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for blank input.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError>;

    /// Exact match on a trimmed email.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for blank or malformed input.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Clears the account's credential reference, then soft-deletes the
    /// credential.
    ///
    /// The reference is always cleared before the delete. If the delete fails
    /// the account is left detached and the credential stays active and
    /// unreferenced; the delete's error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] when the account does not reference
    /// `credential_id`. Nothing is changed in that case.
    async fn detach_and_delete_credential(
        &self,
        account_id: i32,
        credential_id: i32,
    ) -> Result<(), AccountError>;

    /// The credential service used for the credential side of composite
    /// operations.
    fn credential_service(&self) -> Arc<dyn CredentialService>;
}

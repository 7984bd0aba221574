//! Domain service for credentials.
//!
//! Validates credential fields before anything reaches storage and turns
//! "no row matched" results into typed errors.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::constants::limits::{PASSWORD_HASH_MAX, SALT_MAX};
use crate::models::Credential;

/// Errors specific to credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    Constraint(String),

    #[error("Credential not found: {0}")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for CredentialError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CredentialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Checks the credential's fields.
///
/// `now` is passed in so the clock-skew rule is testable.
pub fn validate_credential(
    credential: &Credential,
    now: DateTime<Utc>,
    skew_tolerance: Duration,
) -> Result<(), CredentialError> {
    if credential.password_hash.trim().is_empty() {
        return Err(CredentialError::Validation(
            "Password hash cannot be empty".to_string(),
        ));
    }
    if credential.password_hash.chars().count() > PASSWORD_HASH_MAX {
        return Err(CredentialError::Validation(format!(
            "Password hash exceeds the maximum length ({PASSWORD_HASH_MAX})"
        )));
    }

    let salt_too_long = credential
        .salt
        .as_deref()
        .is_some_and(|salt| !salt.trim().is_empty() && salt.chars().count() > SALT_MAX);
    if salt_too_long {
        return Err(CredentialError::Validation(format!(
            "Salt exceeds the maximum length ({SALT_MAX})"
        )));
    }

    if credential
        .last_changed
        .is_some_and(|changed| changed > now + skew_tolerance)
    {
        return Err(CredentialError::Validation(
            "Last changed timestamp cannot be in the future".to_string(),
        ));
    }

    Ok(())
}

pub(crate) fn require_positive_id(id: i32) -> Result<(), CredentialError> {
    if id <= 0 {
        return Err(CredentialError::Constraint(format!(
            "Credential ID must be greater than 0 (got {id})"
        )));
    }
    Ok(())
}

/// Domain service trait for credentials.
#[async_trait::async_trait]
pub trait CredentialService: Send + Sync {
    /// Runs field validation without touching storage.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Validation`] describing the first bad field.
    fn validate(&self, credential: &Credential) -> Result<(), CredentialError>;

    /// Persists a new credential and returns it with its assigned ID.
    async fn insert(&self, credential: Credential) -> Result<Credential, CredentialError>;

    /// Overwrites every mutable field of a live credential.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Constraint`] for a non-positive ID and
    /// [`CredentialError::NotFound`] when no live row matched.
    async fn update(&self, credential: &Credential) -> Result<(), CredentialError>;

    /// Soft-deletes a credential.
    ///
    /// Deleting an already-deleted credential is a [`CredentialError::NotFound`].
    async fn delete(&self, id: i32) -> Result<(), CredentialError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Credential>, CredentialError>;

    async fn get_all(&self) -> Result<Vec<Credential>, CredentialError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolerance() -> Duration {
        Duration::minutes(5)
    }

    fn is_validation(result: Result<(), CredentialError>) -> bool {
        matches!(result, Err(CredentialError::Validation(_)))
    }

    #[test]
    fn accepts_minimal_credential() {
        let c = Credential::new("abc123");
        assert!(validate_credential(&c, Utc::now(), tolerance()).is_ok());
    }

    #[test]
    fn rejects_blank_hash() {
        let now = Utc::now();
        assert!(is_validation(validate_credential(&Credential::new(""), now, tolerance())));
        assert!(is_validation(validate_credential(&Credential::new("   "), now, tolerance())));
    }

    #[test]
    fn hash_length_limit() {
        let now = Utc::now();
        let at_limit = Credential::new("h".repeat(PASSWORD_HASH_MAX));
        assert!(validate_credential(&at_limit, now, tolerance()).is_ok());

        let over = Credential::new("h".repeat(PASSWORD_HASH_MAX + 1));
        assert!(is_validation(validate_credential(&over, now, tolerance())));
    }

    #[test]
    fn salt_length_limit() {
        let now = Utc::now();
        let ok = Credential::new("hash").with_salt("s".repeat(SALT_MAX));
        assert!(validate_credential(&ok, now, tolerance()).is_ok());

        let over = Credential::new("hash").with_salt("s".repeat(SALT_MAX + 1));
        assert!(is_validation(validate_credential(&over, now, tolerance())));

        let blank = Credential::new("hash").with_salt("   ");
        assert!(validate_credential(&blank, now, tolerance()).is_ok());
    }

    #[test]
    fn last_changed_within_skew_is_accepted() {
        let now = Utc::now();
        let c = Credential::new("hash").with_last_changed(now + Duration::minutes(4));
        assert!(validate_credential(&c, now, tolerance()).is_ok());

        let past = Credential::new("hash").with_last_changed(now - Duration::days(30));
        assert!(validate_credential(&past, now, tolerance()).is_ok());
    }

    #[test]
    fn last_changed_beyond_skew_is_rejected() {
        let now = Utc::now();
        let c = Credential::new("hash").with_last_changed(now + Duration::minutes(6));
        assert!(is_validation(validate_credential(&c, now, tolerance())));
    }

    #[test]
    fn non_positive_ids_are_constraint_errors() {
        assert!(require_positive_id(1).is_ok());
        assert!(matches!(
            require_positive_id(0),
            Err(CredentialError::Constraint(_))
        ));
        assert!(matches!(
            require_positive_id(-3),
            Err(CredentialError::Constraint(_))
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            CredentialError::NotFound(7).to_string(),
            "Credential not found: 7"
        );
        let db_err: CredentialError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(db_err, CredentialError::Database(_)));
    }
}

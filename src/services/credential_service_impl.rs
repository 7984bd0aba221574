//! `SeaORM` implementation of the `CredentialService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::db::Store;
use crate::models::Credential;
use crate::services::credential_service::{
    CredentialError, CredentialService, require_positive_id, validate_credential,
};

pub struct SeaOrmCredentialService {
    store: Store,
    skew_tolerance: Duration,
}

impl SeaOrmCredentialService {
    #[must_use]
    pub const fn new(store: Store, skew_tolerance: Duration) -> Self {
        Self {
            store,
            skew_tolerance,
        }
    }
}

#[async_trait]
impl CredentialService for SeaOrmCredentialService {
    fn validate(&self, credential: &Credential) -> Result<(), CredentialError> {
        validate_credential(credential, Utc::now(), self.skew_tolerance)
    }

    async fn insert(&self, mut credential: Credential) -> Result<Credential, CredentialError> {
        if let Err(err) = self.validate(&credential) {
            warn!("Rejected credential insert: {}", err);
            return Err(err);
        }

        credential.id = self.store.insert_credential(&credential).await?;
        credential.deleted = false;
        Ok(credential)
    }

    async fn update(&self, credential: &Credential) -> Result<(), CredentialError> {
        require_positive_id(credential.id)?;
        if let Err(err) = self.validate(credential) {
            warn!(credential_id = credential.id, "Rejected credential update: {}", err);
            return Err(err);
        }

        if !self.store.update_credential(credential).await? {
            return Err(CredentialError::NotFound(credential.id));
        }

        info!(credential_id = credential.id, "Updated credential");
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), CredentialError> {
        require_positive_id(id)?;

        if !self.store.soft_delete_credential(id).await? {
            return Err(CredentialError::NotFound(id));
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Credential>, CredentialError> {
        require_positive_id(id)?;
        Ok(self.store.get_credential(id).await?)
    }

    async fn get_all(&self) -> Result<Vec<Credential>, CredentialError> {
        Ok(self.store.list_credentials().await?)
    }
}

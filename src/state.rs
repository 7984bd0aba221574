use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, CredentialService, SeaOrmAccountService, SeaOrmCredentialService,
};

/// The wired-up services for one process.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub credential_service: Arc<dyn CredentialService>,

    pub account_service: Arc<dyn AccountService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::from_store(config, store))
    }

    #[must_use]
    pub fn from_store(config: Config, store: Store) -> Self {
        let credential_service: Arc<dyn CredentialService> = Arc::new(
            SeaOrmCredentialService::new(store.clone(), config.validation.clock_skew_tolerance()),
        );

        let account_service: Arc<dyn AccountService> = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            Arc::clone(&credential_service),
        ));

        Self {
            config: Arc::new(config),
            store,
            credential_service,
            account_service,
        }
    }
}

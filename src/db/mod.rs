use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::{Account, Credential};

pub mod migrator;
pub mod repositories;

pub use repositories::account::AccountRepository;
pub use repositories::credential::CredentialRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

fn is_memory_url(db_url: &str) -> bool {
    db_url.trim_start_matches("sqlite:") == ":memory:"
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = is_memory_url(db_url);

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Each in-memory connection is its own database, so the pool must
        // hold exactly one connection for its whole lifetime.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> AccountRepository {
        AccountRepository::new(self.conn.clone())
    }

    fn credential_repo(&self) -> CredentialRepository {
        CredentialRepository::new(self.conn.clone())
    }

    // ========== Credential Repository Methods ==========

    pub async fn insert_credential(&self, credential: &Credential) -> Result<i32> {
        self.credential_repo().insert(credential).await
    }

    pub async fn update_credential(&self, credential: &Credential) -> Result<bool> {
        self.credential_repo().update(credential).await
    }

    pub async fn soft_delete_credential(&self, id: i32) -> Result<bool> {
        self.credential_repo().soft_delete(id).await
    }

    pub async fn get_credential(&self, id: i32) -> Result<Option<Credential>> {
        self.credential_repo().get_by_id(id).await
    }

    pub async fn list_credentials(&self) -> Result<Vec<Credential>> {
        self.credential_repo().get_all().await
    }

    // ========== Account Repository Methods ==========

    pub async fn insert_account(&self, account: &Account) -> Result<i32> {
        self.account_repo().insert(account).await
    }

    pub async fn update_account(&self, account: &Account) -> Result<bool> {
        self.account_repo().update(account).await
    }

    pub async fn soft_delete_account(&self, id: i32) -> Result<bool> {
        self.account_repo().soft_delete(id).await
    }

    pub async fn get_account(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.account_repo().get_all().await
    }

    pub async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.account_repo().find_by_username(username).await
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.account_repo().find_by_email(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_memory_urls() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url(":memory:"));
        assert!(!is_memory_url("sqlite:data/credstore.db"));
    }
}

use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use tracing::{debug, info};

use super::credential::CredentialRepository;
use crate::entities::{accounts, credentials, prelude::*};
use crate::models::Account;

/// Repository for account rows.
///
/// Reads join the referenced credential in the same query. Soft-deleted
/// accounts are never returned, and a soft-deleted credential is treated
/// as absent.
pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: accounts::Model, credential: Option<credentials::Model>) -> Account {
        Account {
            id: model.id,
            username: model.username,
            email: model.email,
            active: model.active,
            registered_at: model.registered_at,
            deleted: model.deleted,
            credential: credential
                .filter(|c| !c.deleted)
                .map(CredentialRepository::map_model),
        }
    }

    pub async fn insert(&self, account: &Account) -> Result<i32> {
        let active_model = accounts::ActiveModel {
            username: Set(account.username.clone()),
            email: Set(account.email.clone()),
            active: Set(account.active),
            registered_at: Set(account.registered_at),
            credential_id: Set(account.credential_id()),
            deleted: Set(false),
            ..Default::default()
        };

        let res = Accounts::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert account")?;

        if res.last_insert_id <= 0 {
            anyhow::bail!("Account insert did not return a generated ID");
        }

        info!("Inserted account {} ({})", res.last_insert_id, account.username);
        Ok(res.last_insert_id)
    }

    /// Writes every column except `deleted`. Returns `false` when no live row
    /// has this id.
    pub async fn update(&self, account: &Account) -> Result<bool> {
        let result = Accounts::update_many()
            .col_expr(accounts::Column::Username, Expr::value(account.username.clone()))
            .col_expr(accounts::Column::Email, Expr::value(account.email.clone()))
            .col_expr(accounts::Column::Active, Expr::value(account.active))
            .col_expr(
                accounts::Column::RegisteredAt,
                Expr::value(account.registered_at),
            )
            .col_expr(
                accounts::Column::CredentialId,
                Expr::value(account.credential_id()),
            )
            .filter(accounts::Column::Id.eq(account.id))
            .filter(accounts::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update account {}", account.id))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let result = Accounts::update_many()
            .col_expr(accounts::Column::Deleted, Expr::value(true))
            .filter(accounts::Column::Id.eq(id))
            .filter(accounts::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to soft-delete account {id}"))?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Soft-deleted account {}", id);
        }
        Ok(removed)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Account>> {
        debug!("Looking up account {}", id);
        let row = Accounts::find_by_id(id)
            .filter(accounts::Column::Deleted.eq(false))
            .find_also_related(Credentials)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        Ok(row.map(|(account, credential)| Self::map_model(account, credential)))
    }

    pub async fn get_all(&self) -> Result<Vec<Account>> {
        let rows = Accounts::find()
            .filter(accounts::Column::Deleted.eq(false))
            .order_by_asc(accounts::Column::Id)
            .find_also_related(Credentials)
            .all(&self.conn)
            .await
            .context("Failed to list accounts")?;

        Ok(rows
            .into_iter()
            .map(|(account, credential)| Self::map_model(account, credential))
            .collect())
    }

    /// Exact, case-sensitive match on a live row.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = Accounts::find()
            .filter(accounts::Column::Deleted.eq(false))
            .filter(accounts::Column::Username.eq(username))
            .find_also_related(Credentials)
            .one(&self.conn)
            .await
            .context("Failed to query account by username")?;

        Ok(row.map(|(account, credential)| Self::map_model(account, credential)))
    }

    /// Exact, case-sensitive match on a live row.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = Accounts::find()
            .filter(accounts::Column::Deleted.eq(false))
            .filter(accounts::Column::Email.eq(email))
            .find_also_related(Credentials)
            .one(&self.conn)
            .await
            .context("Failed to query account by email")?;

        Ok(row.map(|(account, credential)| Self::map_model(account, credential)))
    }
}

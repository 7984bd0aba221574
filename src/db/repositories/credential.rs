use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use tracing::{debug, info};

use crate::entities::{credentials, prelude::*};
use crate::models::Credential;

/// Repository for credential rows. Every read skips soft-deleted rows.
pub struct CredentialRepository {
    conn: DatabaseConnection,
}

impl CredentialRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub(crate) fn map_model(model: credentials::Model) -> Credential {
        Credential {
            id: model.id,
            password_hash: model.password_hash,
            salt: model.salt,
            last_changed: model.last_changed,
            must_reset: model.must_reset,
            deleted: model.deleted,
        }
    }

    pub async fn insert(&self, credential: &Credential) -> Result<i32> {
        let active_model = credentials::ActiveModel {
            password_hash: Set(credential.password_hash.clone()),
            salt: Set(credential.salt.clone()),
            last_changed: Set(credential.last_changed),
            must_reset: Set(credential.must_reset),
            deleted: Set(false),
            ..Default::default()
        };

        let res = Credentials::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert credential")?;

        if res.last_insert_id <= 0 {
            anyhow::bail!("Credential insert did not return a generated ID");
        }

        info!("Inserted credential {}", res.last_insert_id);
        Ok(res.last_insert_id)
    }

    /// Returns `false` when no live row has this id.
    pub async fn update(&self, credential: &Credential) -> Result<bool> {
        let result = Credentials::update_many()
            .col_expr(
                credentials::Column::PasswordHash,
                Expr::value(credential.password_hash.clone()),
            )
            .col_expr(credentials::Column::Salt, Expr::value(credential.salt.clone()))
            .col_expr(
                credentials::Column::LastChanged,
                Expr::value(credential.last_changed),
            )
            .col_expr(
                credentials::Column::MustReset,
                Expr::value(credential.must_reset),
            )
            .filter(credentials::Column::Id.eq(credential.id))
            .filter(credentials::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update credential {}", credential.id))?;

        Ok(result.rows_affected > 0)
    }

    /// Returns `false` when no live row has this id, including a second delete.
    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let result = Credentials::update_many()
            .col_expr(credentials::Column::Deleted, Expr::value(true))
            .filter(credentials::Column::Id.eq(id))
            .filter(credentials::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to soft-delete credential {id}"))?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Soft-deleted credential {}", id);
        }
        Ok(removed)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Credential>> {
        debug!("Looking up credential {}", id);
        let row = Credentials::find_by_id(id)
            .filter(credentials::Column::Deleted.eq(false))
            .one(&self.conn)
            .await
            .context("Failed to query credential by ID")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn get_all(&self) -> Result<Vec<Credential>> {
        let rows = Credentials::find()
            .filter(credentials::Column::Deleted.eq(false))
            .order_by_asc(credentials::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list credentials")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }
}

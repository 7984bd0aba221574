use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Username).string_len(30).not_null())
                    .col(ColumnDef::new(Accounts::Email).string_len(120).not_null())
                    .col(ColumnDef::new(Accounts::Active).boolean().not_null())
                    .col(
                        ColumnDef::new(Accounts::RegisteredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Accounts::CredentialId).integer().null())
                    .col(
                        ColumnDef::new(Accounts::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // No cascade: a credential must outlive the account that referenced it.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_credential")
                            .from(Accounts::Table, Accounts::CredentialId)
                            .to(Credentials::Table, Credentials::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness only binds live rows, so a soft-deleted account frees its
        // username and email. sea-query has no partial index builder.
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_username_live \
             ON accounts (username) WHERE deleted = 0",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_email_live \
             ON accounts (email) WHERE deleted = 0",
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_credential_id")
                    .table(Accounts::Table)
                    .col(Accounts::CredentialId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Username,
    Email,
    Active,
    RegisteredAt,
    CredentialId,
    Deleted,
}

#[derive(DeriveIden)]
enum Credentials {
    Table,
    Id,
}

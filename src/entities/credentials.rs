use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credentials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Pre-computed password hash. Opaque to this crate.
    pub password_hash: String,

    pub salt: Option<String>,

    pub last_changed: Option<ChronoDateTimeUtc>,

    /// Forces a password reset on next login.
    pub must_reset: bool,

    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

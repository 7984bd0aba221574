use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique among rows with `deleted = false` (partial index).
    pub username: String,

    /// Unique among rows with `deleted = false` (partial index).
    pub email: String,

    pub active: bool,

    pub registered_at: Option<ChronoDateTimeUtc>,

    pub credential_id: Option<i32>,

    pub deleted: bool,
}

/// The credential side carries no back-reference, so only `belongs_to` is declared.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credentials::Entity",
        from = "Column::CredentialId",
        to = "super::credentials::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Credentials,
}

impl Related<super::credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credentials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Utc};

use super::credential::Credential;

/// A user account with an optional, eagerly loaded credential.
///
/// The association is one-way: the credential never points back here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub registered_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub credential: Option<Credential>,
}

impl Account {
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, active: bool) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            active,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_registered_at(mut self, at: DateTime<Utc>) -> Self {
        self.registered_at = Some(at);
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Id stored in the foreign key column. Unsaved credentials have none.
    #[must_use]
    pub fn credential_id(&self) -> Option<i32> {
        self.credential.as_ref().map(|c| c.id).filter(|id| *id > 0)
    }
}

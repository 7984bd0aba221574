use chrono::{DateTime, Utc};
use std::fmt;

/// Authentication material for one account.
///
/// The hash is computed by the caller; nothing here inspects its content.
/// `id == 0` means the credential has not been persisted yet.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential {
    pub id: i32,
    pub password_hash: String,
    pub salt: Option<String>,
    pub last_changed: Option<DateTime<Utc>>,
    pub must_reset: bool,
    pub deleted: bool,
}

impl Credential {
    #[must_use]
    pub fn new(password_hash: impl Into<String>) -> Self {
        Self {
            password_hash: password_hash.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    #[must_use]
    pub const fn with_last_changed(mut self, at: DateTime<Utc>) -> Self {
        self.last_changed = Some(at);
        self
    }

    #[must_use]
    pub const fn with_must_reset(mut self, must_reset: bool) -> Self {
        self.must_reset = must_reset;
        self
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// First 8 characters of the hash, for display.
    #[must_use]
    pub fn hash_preview(&self) -> String {
        let mut chars = self.password_hash.chars();
        let head: String = chars.by_ref().take(8).collect();
        if chars.next().is_some() {
            format!("{head}…")
        } else {
            head
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("password_hash", &self.hash_preview())
            .field("salt", &self.salt)
            .field("last_changed", &self.last_changed)
            .field("must_reset", &self.must_reset)
            .field("deleted", &self.deleted)
            .finish()
    }
}

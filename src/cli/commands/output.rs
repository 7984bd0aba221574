//! Printable views of accounts and credentials. Hashes and salts are never
//! printed, only their lengths.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Account, Credential};

#[derive(Debug, Clone, Serialize)]
pub struct CredentialSummary {
    pub id: i32,
    pub hash_length: usize,
    pub salt_length: usize,
    pub must_reset: bool,
    pub last_changed: Option<DateTime<Utc>>,
}

impl From<&Credential> for CredentialSummary {
    fn from(c: &Credential) -> Self {
        Self {
            id: c.id,
            hash_length: c.password_hash.chars().count(),
            salt_length: c.salt.as_deref().map_or(0, |s| s.chars().count()),
            must_reset: c.must_reset,
            last_changed: c.last_changed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub registered_at: Option<DateTime<Utc>>,
    pub credential_id: Option<i32>,
}

impl From<&Account> for AccountSummary {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            username: a.username.clone(),
            email: a.email.clone(),
            active: a.active,
            registered_at: a.registered_at,
            credential_id: a.credential_id(),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

pub(super) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) fn print_account(account: &Account) {
    let credential = account
        .credential_id()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    println!(
        "ID: {} | username: {} | email: {} | active: {} | registered: {} | credential: {}",
        account.id,
        account.username,
        account.email,
        yes_no(account.active),
        format_time(account.registered_at),
        credential
    );
}

pub(super) fn print_credential(credential: &Credential) {
    let summary = CredentialSummary::from(credential);
    println!(
        "ID: {} | hash(len): {} | salt(len): {} | must reset: {} | last changed: {}",
        summary.id,
        summary.hash_length,
        summary.salt_length,
        yes_no(summary.must_reset),
        format_time(summary.last_changed)
    );
}

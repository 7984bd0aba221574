mod account;
mod credential;
mod output;

pub use account::{
    cmd_account_create, cmd_account_delete, cmd_account_find, cmd_account_list,
    cmd_account_remove_credential, cmd_account_show, cmd_account_update,
};
pub use credential::{
    cmd_credential_create, cmd_credential_delete, cmd_credential_list, cmd_credential_show,
    cmd_credential_update,
};
pub use output::{AccountSummary, CredentialSummary};

use crate::cli::CredentialChangeArgs;
use crate::models::Credential;

/// Asks for a `y` on stdin unless `assume_yes` is set.
fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    println!("{prompt}");
    println!("Enter 'y' to confirm, anything else to cancel:");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Flags other than `--hash` only edit a credential that already exists.
fn needs_existing_credential(changes: &CredentialChangeArgs) -> bool {
    changes.salt.is_some() || changes.clear_salt || changes.must_reset.is_some()
}

/// Applies edit flags to a loaded credential. Returns whether anything changed;
/// any change stamps `last_changed`.
fn apply_credential_changes(credential: &mut Credential, changes: &CredentialChangeArgs) -> bool {
    let mut changed = false;

    if let Some(hash) = &changes.hash {
        credential.password_hash.clone_from(hash);
        changed = true;
    }
    if changes.clear_salt {
        credential.salt = None;
        changed = true;
    } else if let Some(salt) = &changes.salt {
        credential.salt = Some(salt.clone());
        changed = true;
    }
    if let Some(must_reset) = changes.must_reset {
        credential.must_reset = must_reset;
        changed = true;
    }

    if changed {
        credential.last_changed = Some(chrono::Utc::now());
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes() -> CredentialChangeArgs {
        CredentialChangeArgs {
            hash: None,
            salt: None,
            clear_salt: false,
            must_reset: None,
        }
    }

    #[test]
    fn no_flags_leave_credential_untouched() {
        let mut credential = Credential::new("hash").with_salt("salt");
        assert!(!apply_credential_changes(&mut credential, &changes()));
        assert_eq!(credential.salt.as_deref(), Some("salt"));
        assert!(credential.last_changed.is_none());
    }

    #[test]
    fn credential_only_flags_need_an_existing_credential() {
        assert!(!needs_existing_credential(&changes()));

        let hash_only = CredentialChangeArgs {
            hash: Some("h".to_string()),
            ..changes()
        };
        assert!(!needs_existing_credential(&hash_only));

        let clear = CredentialChangeArgs {
            clear_salt: true,
            ..changes()
        };
        assert!(needs_existing_credential(&clear));

        let salt = CredentialChangeArgs {
            salt: Some("s".to_string()),
            ..changes()
        };
        assert!(needs_existing_credential(&salt));

        let reset = CredentialChangeArgs {
            must_reset: Some(false),
            ..changes()
        };
        assert!(needs_existing_credential(&reset));
    }

    #[test]
    fn flags_overwrite_and_stamp() {
        let mut credential = Credential::new("old").with_salt("salt");
        let args = CredentialChangeArgs {
            hash: Some("new".to_string()),
            clear_salt: true,
            must_reset: Some(true),
            ..changes()
        };

        assert!(apply_credential_changes(&mut credential, &args));
        assert_eq!(credential.password_hash, "new");
        assert!(credential.salt.is_none());
        assert!(credential.must_reset);
        assert!(credential.last_changed.is_some());
    }
}

use chrono::Utc;

use super::output::{print_account, print_credential, print_json, AccountSummary};
use super::{apply_credential_changes, confirm, needs_existing_credential};
use crate::cli::{CredentialChangeArgs, NewCredentialArgs};
use crate::models::{Account, Credential};
use crate::state::SharedState;

fn new_credential(args: &NewCredentialArgs) -> Option<Credential> {
    let hash = args.hash.as_ref()?;
    let mut credential = Credential::new(hash.clone())
        .with_last_changed(Utc::now())
        .with_must_reset(args.must_reset);
    credential.salt.clone_from(&args.salt);
    Some(credential)
}

fn show(account: &Account, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&AccountSummary::from(account));
    }
    print_account(account);
    if let Some(credential) = &account.credential {
        print!("  credential -> ");
        print_credential(credential);
    }
    Ok(())
}

pub async fn cmd_account_create(
    state: &SharedState,
    username: &str,
    email: &str,
    inactive: bool,
    credential: &NewCredentialArgs,
    json: bool,
) -> anyhow::Result<()> {
    let mut account = Account::new(username, email, !inactive).with_registered_at(Utc::now());
    account.credential = new_credential(credential);

    let saved = state.account_service.insert(account).await?;
    if !json {
        println!("✓ Created account {}", saved.id);
    }
    show(&saved, json)
}

pub async fn cmd_account_list(state: &SharedState, json: bool) -> anyhow::Result<()> {
    let accounts = state.account_service.get_all().await?;

    if json {
        let summaries: Vec<AccountSummary> = accounts.iter().map(AccountSummary::from).collect();
        return print_json(&summaries);
    }

    if accounts.is_empty() {
        println!("No accounts yet. Use 'credstore account create' to add one.");
        return Ok(());
    }

    println!("{} account(s):", accounts.len());
    for account in &accounts {
        print_account(account);
    }
    Ok(())
}

pub async fn cmd_account_show(state: &SharedState, id: i32, json: bool) -> anyhow::Result<()> {
    match state.account_service.get_by_id(id).await? {
        Some(account) => show(&account, json),
        None => {
            println!("Account with ID {id} not found.");
            Ok(())
        }
    }
}

pub async fn cmd_account_find(
    state: &SharedState,
    username: Option<&str>,
    email: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let found = match (username, email) {
        (Some(username), _) => state.account_service.find_by_username(username).await?,
        (None, Some(email)) => state.account_service.find_by_email(email).await?,
        (None, None) => anyhow::bail!("Either --username or --email is required"),
    };

    match found {
        Some(account) => show(&account, json),
        None => {
            println!("No matching account.");
            Ok(())
        }
    }
}

pub async fn cmd_account_update(
    state: &SharedState,
    id: i32,
    username: Option<String>,
    email: Option<String>,
    active: Option<bool>,
    changes: &CredentialChangeArgs,
    json: bool,
) -> anyhow::Result<()> {
    let Some(mut account) = state.account_service.get_by_id(id).await? else {
        println!("Account with ID {id} not found.");
        return Ok(());
    };

    if let Some(username) = username {
        account.username = username;
    }
    if let Some(email) = email {
        account.email = email;
    }
    if let Some(active) = active {
        account.active = active;
    }

    match account.credential.as_mut() {
        Some(credential) => {
            apply_credential_changes(credential, changes);
        }
        None => {
            if let Some(hash) = &changes.hash {
                let mut credential = Credential::new(hash.clone())
                    .with_last_changed(Utc::now())
                    .with_must_reset(changes.must_reset.unwrap_or(false));
                if !changes.clear_salt {
                    credential.salt.clone_from(&changes.salt);
                }
                account.credential = Some(credential);
            } else if needs_existing_credential(changes) {
                anyhow::bail!("Account {id} has no credential; pass --hash to create one");
            }
        }
    }

    let saved = state.account_service.update(account).await?;
    if !json {
        println!("✓ Updated account {}", saved.id);
    }
    show(&saved, json)
}

pub async fn cmd_account_delete(state: &SharedState, id: i32, yes: bool) -> anyhow::Result<()> {
    let Some(account) = state.account_service.get_by_id(id).await? else {
        println!("Account with ID {id} not found.");
        return Ok(());
    };

    let prompt = format!("Delete account '{}' (ID: {})?", account.username, account.id);
    if !confirm(&prompt, yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    state.account_service.delete(id).await?;
    println!("✓ Deleted account: {}", account.username);
    if let Some(credential_id) = account.credential_id() {
        println!("  Credential {credential_id} was kept.");
    }
    Ok(())
}

pub async fn cmd_account_remove_credential(
    state: &SharedState,
    id: i32,
    yes: bool,
) -> anyhow::Result<()> {
    let Some(account) = state.account_service.get_by_id(id).await? else {
        println!("Account with ID {id} not found.");
        return Ok(());
    };

    let Some(credential_id) = account.credential_id() else {
        println!("Account '{}' has no credential.", account.username);
        return Ok(());
    };

    let prompt = format!(
        "Remove credential {credential_id} from '{}' and delete it?",
        account.username
    );
    if !confirm(&prompt, yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    state
        .account_service
        .detach_and_delete_credential(id, credential_id)
        .await?;
    println!("✓ Removed credential {credential_id} from '{}'", account.username);
    Ok(())
}

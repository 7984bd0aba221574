use chrono::Utc;

use super::output::{print_credential, print_json, CredentialSummary};
use super::{apply_credential_changes, confirm};
use crate::cli::CredentialChangeArgs;
use crate::models::Credential;
use crate::state::SharedState;

fn show(credential: &Credential, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&CredentialSummary::from(credential));
    }
    print_credential(credential);
    Ok(())
}

pub async fn cmd_credential_create(
    state: &SharedState,
    hash: &str,
    salt: Option<&str>,
    must_reset: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut credential = Credential::new(hash)
        .with_last_changed(Utc::now())
        .with_must_reset(must_reset);
    credential.salt = salt.map(str::to_string);

    let saved = state.credential_service.insert(credential).await?;
    if !json {
        println!("✓ Created credential {}", saved.id);
    }
    show(&saved, json)
}

pub async fn cmd_credential_list(state: &SharedState, json: bool) -> anyhow::Result<()> {
    let credentials = state.credential_service.get_all().await?;

    if json {
        let summaries: Vec<CredentialSummary> =
            credentials.iter().map(CredentialSummary::from).collect();
        return print_json(&summaries);
    }

    if credentials.is_empty() {
        println!("No credentials yet.");
        return Ok(());
    }

    println!("{} credential(s):", credentials.len());
    for credential in &credentials {
        print_credential(credential);
    }
    Ok(())
}

pub async fn cmd_credential_show(state: &SharedState, id: i32, json: bool) -> anyhow::Result<()> {
    match state.credential_service.get_by_id(id).await? {
        Some(credential) => show(&credential, json),
        None => {
            println!("Credential with ID {id} not found.");
            Ok(())
        }
    }
}

pub async fn cmd_credential_update(
    state: &SharedState,
    id: i32,
    changes: &CredentialChangeArgs,
    json: bool,
) -> anyhow::Result<()> {
    let Some(mut credential) = state.credential_service.get_by_id(id).await? else {
        println!("Credential with ID {id} not found.");
        return Ok(());
    };

    if !apply_credential_changes(&mut credential, changes) {
        println!("Nothing to change.");
        return Ok(());
    }

    state.credential_service.update(&credential).await?;
    if !json {
        println!("✓ Updated credential {id}");
    }
    show(&credential, json)
}

pub async fn cmd_credential_delete(state: &SharedState, id: i32, yes: bool) -> anyhow::Result<()> {
    if state.credential_service.get_by_id(id).await?.is_none() {
        println!("Credential with ID {id} not found.");
        return Ok(());
    }

    let owner = state
        .account_service
        .get_all()
        .await?
        .into_iter()
        .find(|a| a.credential_id() == Some(id));

    if let Some(owner) = &owner {
        println!(
            "Credential {id} is attached to account '{}'. \
             Use 'credstore account remove-credential {}' to detach it first.",
            owner.username, owner.id
        );
    }

    let prompt = format!("Delete credential {id}?");
    if !confirm(&prompt, yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    state.credential_service.delete(id).await?;
    println!("✓ Deleted credential {id}");
    Ok(())
}

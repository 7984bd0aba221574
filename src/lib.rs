pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{AccountCommands, Cli, Commands, CredentialCommands};
pub use config::Config;
use state::SharedState;

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists.");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let state = SharedState::new(config).await?;
    info!(
        database = %state.config.general.database_path,
        skew_minutes = state.config.validation.clock_skew_tolerance_minutes,
        "Starting credstore"
    );
    dispatch(&state, command, cli.json).await
}

async fn dispatch(state: &SharedState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Init => Ok(()),

        Commands::Account { command } => match command {
            AccountCommands::Create {
                username,
                email,
                inactive,
                credential,
            } => {
                cli::cmd_account_create(state, &username, &email, inactive, &credential, json)
                    .await
            }
            AccountCommands::List => cli::cmd_account_list(state, json).await,
            AccountCommands::Show { id } => cli::cmd_account_show(state, id, json).await,
            AccountCommands::Find { username, email } => {
                cli::cmd_account_find(state, username.as_deref(), email.as_deref(), json).await
            }
            AccountCommands::Update {
                id,
                username,
                email,
                active,
                credential,
            } => {
                cli::cmd_account_update(state, id, username, email, active, &credential, json)
                    .await
            }
            AccountCommands::Delete { id, yes } => cli::cmd_account_delete(state, id, yes).await,
            AccountCommands::RemoveCredential { id, yes } => {
                cli::cmd_account_remove_credential(state, id, yes).await
            }
        },

        Commands::Credential { command } => match command {
            CredentialCommands::Create {
                hash,
                salt,
                must_reset,
            } => {
                cli::cmd_credential_create(state, &hash, salt.as_deref(), must_reset, json).await
            }
            CredentialCommands::List => cli::cmd_credential_list(state, json).await,
            CredentialCommands::Show { id } => cli::cmd_credential_show(state, id, json).await,
            CredentialCommands::Update { id, changes } => {
                cli::cmd_credential_update(state, id, &changes, json).await
            }
            CredentialCommands::Delete { id, yes } => {
                cli::cmd_credential_delete(state, id, yes).await
            }
        },
    }
}

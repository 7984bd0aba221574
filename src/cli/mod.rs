//! CLI module - Command-line interface for credstore
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Args, Parser, Subcommand};

/// credstore - account and credential store
#[derive(Parser)]
#[command(name = "credstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    Init,

    /// Manage accounts
    #[command(alias = "a")]
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Manage credentials directly
    #[command(alias = "c")]
    Credential {
        #[command(subcommand)]
        command: CredentialCommands,
    },
}

/// Credential fields accepted when creating one inline.
#[derive(Args, Debug, Clone)]
pub struct NewCredentialArgs {
    /// Pre-computed password hash
    #[arg(long)]
    pub hash: Option<String>,

    /// Optional salt
    #[arg(long, requires = "hash")]
    pub salt: Option<String>,

    /// Require a password reset on next login
    #[arg(long, requires = "hash")]
    pub must_reset: bool,
}

/// Credential fields accepted when editing; unset flags keep current values.
#[derive(Args, Debug, Clone)]
pub struct CredentialChangeArgs {
    /// New password hash
    #[arg(long)]
    pub hash: Option<String>,

    /// New salt
    #[arg(long, conflicts_with = "clear_salt")]
    pub salt: Option<String>,

    /// Remove the salt
    #[arg(long)]
    pub clear_salt: bool,

    /// Set or clear the reset-on-next-login flag
    #[arg(long)]
    pub must_reset: Option<bool>,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create an account, optionally with a credential
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Create the account as inactive
        #[arg(long)]
        inactive: bool,
        #[command(flatten)]
        credential: NewCredentialArgs,
    },

    /// List all accounts
    #[command(alias = "ls")]
    List,

    /// Show one account
    Show {
        /// Account ID
        id: i32,
    },

    /// Find an account by exact username or email
    Find {
        #[arg(long, conflicts_with = "email", required_unless_present = "email")]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Update an account and its credential; unset flags keep current values
    Update {
        /// Account ID
        id: i32,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[command(flatten)]
        credential: CredentialChangeArgs,
    },

    /// Soft-delete an account (its credential is kept)
    #[command(alias = "rm")]
    Delete {
        /// Account ID
        id: i32,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Detach the account's credential, then delete it
    RemoveCredential {
        /// Account ID
        id: i32,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CredentialCommands {
    /// Create a credential not yet attached to any account
    Create {
        #[arg(long)]
        hash: String,
        #[arg(long)]
        salt: Option<String>,
        #[arg(long)]
        must_reset: bool,
    },

    /// List all credentials
    #[command(alias = "ls")]
    List,

    /// Show one credential
    Show {
        /// Credential ID
        id: i32,
    },

    /// Update a credential by ID
    Update {
        /// Credential ID
        id: i32,
        #[command(flatten)]
        changes: CredentialChangeArgs,
    },

    /// Soft-delete a credential by ID
    #[command(alias = "rm")]
    Delete {
        /// Credential ID
        id: i32,
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

pub use commands::*;

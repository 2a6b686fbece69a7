//! Chukka CLI - Command-line interface for Chukka
//!
//! Works against the profile's local database first; talking to the remote
//! API is explicit (auth, pull, push, delete --remote).

mod cli;
mod commands;
mod error;
mod profiles;
mod vault;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::CommandContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::commands::sync::{run_prune, run_pull, run_push};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chukka_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let ctx = CommandContext::load(cli.db_path, cli.profile.as_deref())?;

    match cli.command {
        Commands::Auth { command } => run_auth(command, &ctx).await?,
        Commands::Pull { kind, json } => run_pull(kind, json, &ctx).await?,
        Commands::Push {
            kind,
            local_id,
            json,
        } => run_push(kind, &local_id, json, &ctx).await?,
        Commands::Add { kind, data } => run_add(kind, &data, &ctx)?,
        Commands::List {
            kind,
            limit,
            all,
            json,
        } => run_list(kind, limit, all, json, &ctx)?,
        Commands::Show {
            kind,
            local_id,
            json,
        } => run_show(kind, &local_id, json, &ctx)?,
        Commands::Edit {
            kind,
            local_id,
            data,
        } => run_edit(kind, &local_id, &data, &ctx)?,
        Commands::Delete {
            kind,
            local_id,
            remote,
        } => run_delete(kind, &local_id, remote, &ctx).await?,
        Commands::Prune {
            kind,
            older_than_hours,
            json,
        } => run_prune(kind, older_than_hours, json, &ctx)?,
        Commands::Config { command } => run_config(command, cli.profile.as_deref())?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}

use chukka_core::api::NewAccount;
use chukka_core::models::UserDto;
use chukka_core::session::{Session, UserProfile};
use chukka_core::store::UserStore;
use chukka_core::util::unix_timestamp_ms;

use crate::cli::AuthCommands;
use crate::commands::common::CommandContext;
use crate::error::CliError;
use crate::vault::vault_for;

pub async fn run_auth(command: AuthCommands, ctx: &CommandContext) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            let api = ctx.open_api()?;
            let profile = api.login(&email, &password).await?;
            mirror_account(ctx, &profile)?;
            println!("Signed in profile '{}' as {}", ctx.profile_name, profile.email);
            Ok(())
        }
        AuthCommands::Register {
            email,
            password,
            name,
        } => {
            let api = ctx.open_api()?;
            let account = NewAccount {
                email,
                password,
                display_name: name,
            };
            let profile = api.register(&account).await?;
            mirror_account(ctx, &profile)?;
            println!(
                "Registered and signed in profile '{}' as {}",
                ctx.profile_name, profile.email
            );
            Ok(())
        }
        // Status and logout only touch the keyring, so they work without
        // an API URL configured.
        AuthCommands::Status => {
            let session = Session::hydrate(vault_for(&ctx.profile_name))?;
            if !session.is_authenticated() {
                println!("Profile '{}' is not signed in.", ctx.profile_name);
                return Ok(());
            }
            if let Some(profile) = session.profile() {
                println!(
                    "Profile '{}' is signed in as {}",
                    ctx.profile_name, profile.email
                );
            } else {
                println!("Profile '{}' is signed in.", ctx.profile_name);
            }
            Ok(())
        }
        AuthCommands::Refresh => {
            let api = ctx.open_api()?;
            api.refresh_session().await?;
            println!("Refreshed session for profile '{}'", ctx.profile_name);
            Ok(())
        }
        AuthCommands::Logout => {
            let session = Session::hydrate(vault_for(&ctx.profile_name))?;
            session.clear()?;
            println!("Signed out profile '{}'", ctx.profile_name);
            Ok(())
        }
    }
}

/// Mirror the signed-in account into the local `users` table so player
/// records can link to it.
fn mirror_account(ctx: &CommandContext, profile: &UserProfile) -> Result<(), CliError> {
    let db = ctx.open_database()?;
    UserStore::new(db.connection()).upsert_from_dto(
        &UserDto {
            id: profile.remote_id,
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
        },
        unix_timestamp_ms(),
    )?;
    Ok(())
}

use std::env;
use std::path::PathBuf;

use chukka_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::commands::common::{default_db_path, resolve_db_path};
use crate::error::CliError;
use crate::profiles::{CliProfile, CliProfilesConfig};

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_url,
            db_path,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            api_url,
            db_path,
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

fn run_config_init(
    profile_name: Option<&str>,
    api_url: Option<String>,
    db_path: Option<PathBuf>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let merged_api_url = normalize_text_option(api_url)
        .or_else(|| normalize_text_option(env::var("CHUKKA_API_URL").ok()));

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(value) = merged_api_url {
        profile.api_base_url = Some(value);
    }
    if let Some(value) = db_path {
        profile.db_path = Some(value.to_string_lossy().into_owned());
    }

    validate_profile_urls(profile)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profiles
        .get(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    if profile.api_base_url().is_none() {
        println!(
            "Profile '{profile_name}' has no API URL; remote commands need `--api-url` or CHUKKA_API_URL."
        );
    } else {
        println!(
            "Profile '{profile_name}' is ready. Run `chukka auth login --email <email> --password <password>`."
        );
    }

    Ok(())
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();

    println!("profile: {profile_name}");
    println!(
        "api_url: {}",
        profile.api_base_url().as_deref().unwrap_or("-")
    );
    println!(
        "db_path: {}",
        resolve_db_path(None, &profile).display()
    );
    println!("config_file: {}", crate::profiles::default_config_path().display());
    println!("default_db_path: {}", default_db_path().display());
    Ok(())
}

fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.api_base_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "api_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

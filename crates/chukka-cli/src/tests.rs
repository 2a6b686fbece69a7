use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chukka_core::models::{ClubFields, RemoteId, Tournament, TournamentFields};
use chukka_core::session::{ActiveSession, Session, UserProfile};
use chukka_core::store::{ClubStore, EntityStore, MatchStore, TeamStore, TournamentStore, UserStore};
use chukka_core::LocalId;
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{AuthCommands, CompletionShell, KindArg};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::{
    format_relative_time, format_timestamp, parse_fields, parse_local_id, record_line,
    resolve_db_path, CommandContext,
};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::sync::{run_prune, run_pull, run_push};
use crate::error::CliError;
use crate::profiles::CliProfile;
use crate::vault::vault_for;

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn format_timestamp_returns_utc_label() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn record_line_shows_sync_state_and_retirement() {
    let id = LocalId::new();
    let now = 10_000_000;

    let unsynced = record_line(id, None, "La Dolfina", false, now - 5_000, now);
    assert!(unsynced.starts_with(&id.to_string()));
    assert!(unsynced.contains("     -"));
    assert!(unsynced.contains("La Dolfina"));
    assert!(unsynced.contains("just now"));

    let retired = record_line(id, Some(RemoteId::new(7)), "La Dolfina", true, now - 5_000, now);
    assert!(retired.contains("     7"));
    assert!(retired.ends_with("(retired)"));
}

#[test]
fn parse_local_id_trims_and_rejects_garbage() {
    let id = LocalId::new();
    assert_eq!(parse_local_id(&format!("  {id}  ")).unwrap(), id);
    assert!(matches!(
        parse_local_id("not-a-uuid"),
        Err(CliError::InvalidLocalId(_))
    ));
}

#[test]
fn parse_fields_reports_bad_json() {
    let fields: ClubFields = parse_fields(r#"{"name": "Hurlingham"}"#).unwrap();
    assert_eq!(fields.name.as_deref(), Some("Hurlingham"));
    assert!(matches!(
        parse_fields::<ClubFields>("{not json"),
        Err(CliError::Data(_))
    ));
}

#[test]
fn resolve_db_path_prefers_flag_then_profile() {
    let profile = CliProfile {
        api_base_url: None,
        db_path: Some("/tmp/profile-chukka.db".to_string()),
    };

    assert_eq!(
        resolve_db_path(Some(PathBuf::from("/tmp/flag.db")), &profile),
        PathBuf::from("/tmp/flag.db")
    );
    assert_eq!(
        resolve_db_path(None, &profile),
        PathBuf::from("/tmp/profile-chukka.db")
    );
}

#[test]
fn run_add_and_edit_club_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-add-edit");

    run_add(
        KindArg::Club,
        r#"{"name": " La Dolfina ", "city": "Canuelas"}"#,
        &ctx,
    )
    .unwrap();

    let db = ctx.open_database().unwrap();
    let clubs = ClubStore::new(db.connection()).list(false).unwrap();
    assert_eq!(clubs.len(), 1);
    assert_eq!(clubs[0].name, "La Dolfina");
    let local_id = clubs[0].local_id;
    drop(db);

    run_edit(
        KindArg::Club,
        &local_id.to_string(),
        r#"{"city": "Pilar"}"#,
        &ctx,
    )
    .unwrap();

    let db = ctx.open_database().unwrap();
    let club = ClubStore::new(db.connection())
        .get(local_id)
        .unwrap()
        .unwrap();
    assert_eq!(club.name, "La Dolfina");
    assert_eq!(club.city.as_deref(), Some("Pilar"));
}

#[test]
fn run_add_rejects_blank_required_name() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-add-blank");

    let error = run_add(KindArg::Club, r#"{"name": "   "}"#, &ctx).unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(chukka_core::Error::InvalidInput(_))
    ));
}

#[test]
fn run_edit_of_unknown_record_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-edit-missing");

    let error = run_edit(
        KindArg::Club,
        &LocalId::new().to_string(),
        r#"{"city": "Pilar"}"#,
        &ctx,
    )
    .unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(chukka_core::Error::NotFound(_))
    ));
}

#[test]
fn run_add_match_resolves_tournament_by_remote_id() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-add-match");

    let db = ctx.open_database().unwrap();
    let mut tournament = Tournament::new_local(
        &TournamentFields {
            name: Some("Abierto de Palermo".to_string()),
            ..TournamentFields::default()
        },
        1_000,
    )
    .unwrap();
    tournament.remote_id = Some(RemoteId::new(5));
    TournamentStore::new(db.connection())
        .insert(&tournament)
        .unwrap();
    drop(db);

    run_add(KindArg::Match, r#"{"tournament_id": 5}"#, &ctx).unwrap();

    let db = ctx.open_database().unwrap();
    let matches = MatchStore::new(db.connection()).list().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].tournament_local_id, tournament.local_id);

    let error = run_add(KindArg::Match, r#"{"tournament_id": 77}"#, &ctx).unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(chukka_core::Error::InvalidInput(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_delete_applies_each_kinds_local_policy() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-delete");

    run_add(KindArg::Club, r#"{"name": "Ellerstina"}"#, &ctx).unwrap();
    run_add(KindArg::Team, r#"{"name": "Ellerstina I"}"#, &ctx).unwrap();

    let db = ctx.open_database().unwrap();
    let club_id = ClubStore::new(db.connection()).list(false).unwrap()[0].local_id;
    let team_id = TeamStore::new(db.connection()).list().unwrap()[0].local_id;
    drop(db);

    run_delete(KindArg::Club, &club_id.to_string(), false, &ctx)
        .await
        .unwrap();
    run_delete(KindArg::Team, &team_id.to_string(), false, &ctx)
        .await
        .unwrap();

    let db = ctx.open_database().unwrap();
    let clubs = ClubStore::new(db.connection());
    assert!(clubs.list(false).unwrap().is_empty());
    let retired = clubs.list(true).unwrap();
    assert_eq!(retired.len(), 1);
    assert!(!retired[0].is_active);
    assert!(TeamStore::new(db.connection()).list().unwrap().is_empty());
}

#[test]
fn run_prune_skips_fresh_records_and_rejects_hard_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-prune");

    run_add(KindArg::Club, r#"{"name": "La Aguada"}"#, &ctx).unwrap();
    run_prune(None, 24, false, &ctx).unwrap();

    let db = ctx.open_database().unwrap();
    assert_eq!(ClubStore::new(db.connection()).list(false).unwrap().len(), 1);
    drop(db);

    let error = run_prune(Some(KindArg::Team), 24, false, &ctx).unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(chukka_core::Error::InvalidInput(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_commands_require_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = remote_context(
        &dir.path().join("chukka.db"),
        "cli-unsigned",
        "http://127.0.0.1:9",
    );

    let error = run_pull(None, false, &ctx).await.unwrap_err();
    assert!(matches!(error, CliError::NotSignedIn));
}

#[tokio::test(flavor = "multi_thread")]
async fn auth_status_and_logout_work_without_api_url() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir.path().join("chukka.db"), "cli-no-url");

    run_auth(AuthCommands::Status, &ctx).await.unwrap();
    run_auth(AuthCommands::Logout, &ctx).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn run_auth_login_persists_session_in_keyring() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({"email": "patron@chukka.app", "password": "chukker7"}));
            then.status(200).json_body(json!({
                "token": "tok-login",
                "refresh_token": "refresh-1",
                "user": {"id": 3, "email": "patron@chukka.app", "display_name": "El Patron"}
            }));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ctx = remote_context(&dir.path().join("chukka.db"), "cli-login", &server.base_url());

    run_auth(
        AuthCommands::Login {
            email: "patron@chukka.app".to_string(),
            password: "chukker7".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap();

    login.assert_async().await;
    let session = Session::hydrate(vault_for("cli-login")).unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("tok-login"));
    assert_eq!(session.profile().unwrap().email, "patron@chukka.app");

    // Login also mirrors the account into the local users table.
    let db = ctx.open_database().unwrap();
    let user = UserStore::new(db.connection())
        .get_by_remote_id(RemoteId::new(3))
        .unwrap()
        .unwrap();
    assert_eq!(user.email, "patron@chukka.app");
    assert_eq!(user.display_name.as_deref(), Some("El Patron"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_pull_folds_remote_clubs_into_local_store() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/clubs")
                .header("authorization", "Bearer tok-pull");
            then.status(200).json_body(json!([
                {"id": 9, "name": "La Dolfina", "city": "Canuelas", "country": "Argentina"}
            ]));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ctx = remote_context(&dir.path().join("chukka.db"), "cli-pull", &server.base_url());
    sign_in_profile("cli-pull", "tok-pull");

    run_pull(Some(KindArg::Club), false, &ctx).await.unwrap();

    list.assert_async().await;
    let db = ctx.open_database().unwrap();
    let clubs = ClubStore::new(db.connection()).list(false).unwrap();
    assert_eq!(clubs.len(), 1);
    assert_eq!(clubs[0].remote_id, Some(RemoteId::new(9)));
    assert_eq!(clubs[0].name, "La Dolfina");
}

#[tokio::test(flavor = "multi_thread")]
async fn run_push_creates_remote_club_and_binds_id() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/clubs")
                .header("authorization", "Bearer tok-push")
                .json_body(json!({"name": "Ellerstina", "is_active": true}));
            then.status(201).json_body(json!({"id": 42}));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ctx = remote_context(&dir.path().join("chukka.db"), "cli-push", &server.base_url());
    sign_in_profile("cli-push", "tok-push");

    run_add(KindArg::Club, r#"{"name": "Ellerstina"}"#, &ctx).unwrap();
    let db = ctx.open_database().unwrap();
    let local_id = ClubStore::new(db.connection()).list(false).unwrap()[0].local_id;
    drop(db);

    run_push(KindArg::Club, &local_id.to_string(), false, &ctx)
        .await
        .unwrap();

    create.assert_async().await;
    let db = ctx.open_database().unwrap();
    let club = ClubStore::new(db.connection())
        .get(local_id)
        .unwrap()
        .unwrap();
    assert_eq!(club.remote_id, Some(RemoteId::new(42)));
}

#[test]
fn run_completions_writes_bash_script_file() {
    let output_path = std::env::temp_dir().join(format!(
        "chukka-completions-test-{}.bash",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos())
    ));

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_chukka()"));
    assert!(script.contains("complete -F _chukka"));

    let _ = std::fs::remove_file(output_path);
}

fn test_context(db_path: &Path, profile_name: &str) -> CommandContext {
    CommandContext {
        profile_name: profile_name.to_string(),
        profile: CliProfile::default(),
        db_path: db_path.to_path_buf(),
    }
}

fn remote_context(db_path: &Path, profile_name: &str, api_url: &str) -> CommandContext {
    CommandContext {
        profile_name: profile_name.to_string(),
        profile: CliProfile {
            api_base_url: Some(api_url.to_string()),
            db_path: None,
        },
        db_path: db_path.to_path_buf(),
    }
}

fn sign_in_profile(profile_name: &str, token: &str) {
    let session = Session::hydrate(vault_for(profile_name)).unwrap();
    session
        .activate(ActiveSession {
            token: token.to_string(),
            refresh_token: None,
            profile: UserProfile {
                remote_id: RemoteId::new(1),
                email: "patron@chukka.app".to_string(),
                display_name: None,
            },
        })
        .unwrap();
}

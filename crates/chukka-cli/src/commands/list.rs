use chukka_core::models::Match;
use chukka_core::store::{
    AwardStore, BreederStore, ClubStore, FieldStore, HorseStore, MatchStore, PlayerStore,
    TeamStore, TournamentStore,
};
use chukka_core::util::unix_timestamp_ms;

use crate::cli::KindArg;
use crate::commands::common::{print_json, record_line, CommandContext};
use crate::error::CliError;

/// List local records of one kind in store order (by name for most kinds,
/// by schedule for matches, recent-first for tournaments). `--all` folds
/// locally retired records back in; it is a no-op for the hard-deleted
/// kinds, which keep no retired rows.
pub fn run_list(
    kind: KindArg,
    limit: usize,
    include_retired: bool,
    as_json: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let db = ctx.open_database()?;
    let conn = db.connection();
    let now_ms = unix_timestamp_ms();

    match kind {
        KindArg::Tournament => {
            let records = trimmed(TournamentStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                let label = format!("{} ({})", record.name, record.start_date);
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &label,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Club => {
            let records = trimmed(ClubStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &record.name,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Team => {
            let records = trimmed(TeamStore::new(conn).list()?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &record.name,
                        false,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Player => {
            let records = trimmed(PlayerStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                let label = format!("{} {}", record.first_name, record.last_name);
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &label,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Horse => {
            let records = trimmed(HorseStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &record.name,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Breeder => {
            let records = trimmed(BreederStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &record.name,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Field => {
            let records = trimmed(FieldStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &record.name,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Match => {
            let records = trimmed(MatchStore::new(conn).list()?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &match_label(record),
                        false,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
        KindArg::Award => {
            let records = trimmed(AwardStore::new(conn).list(include_retired)?, limit);
            if as_json {
                return print_json(&records);
            }
            for record in &records {
                println!(
                    "{}",
                    record_line(
                        record.local_id,
                        record.remote_id,
                        &record.name,
                        !record.is_active,
                        record.updated_at,
                        now_ms
                    )
                );
            }
        }
    }

    Ok(())
}

fn trimmed<T>(mut records: Vec<T>, limit: usize) -> Vec<T> {
    records.truncate(limit);
    records
}

fn match_label(record: &Match) -> String {
    let when = record.starts_at.map_or_else(
        || "unscheduled".to_string(),
        |at| at.format("%Y-%m-%d %H:%M").to_string(),
    );
    format!(
        "{when}  {}-{} {}",
        record.home_score, record.away_score, record.status
    )
}

use chukka_core::store::{
    AwardStore, BreederStore, ClubStore, EntityStore, FieldStore, HorseStore, MatchStore,
    PlayerStore, TeamStore, TournamentStore,
};
use serde::Serialize;

use crate::cli::KindArg;
use crate::commands::common::{
    not_found, parse_local_id, print_json, print_record_text, CommandContext,
};
use crate::error::CliError;

pub fn run_show(
    kind: KindArg,
    local_id: &str,
    as_json: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let db = ctx.open_database()?;
    let conn = db.connection();
    let id = parse_local_id(local_id)?;

    match kind {
        KindArg::Tournament => {
            let record = TournamentStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Club => {
            let record = ClubStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Team => {
            let record = TeamStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Player => {
            let record = PlayerStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Horse => {
            let record = HorseStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Breeder => {
            let record = BreederStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Field => {
            let record = FieldStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Match => {
            let record = MatchStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
        KindArg::Award => {
            let record = AwardStore::new(conn)
                .get(id)?
                .ok_or_else(|| not_found(kind, id))?;
            print_record(&record, as_json)
        }
    }
}

fn print_record<T: Serialize>(record: &T, as_json: bool) -> Result<(), CliError> {
    if as_json {
        print_json(record)
    } else {
        print_record_text(record)
    }
}

use chukka_core::models::{
    AwardFields, BreederFields, ClubFields, FieldFields, HorseFields, MatchFields, PlayerFields,
    TeamFields, TournamentFields,
};
use chukka_core::store::{
    AwardStore, BreederStore, ClubStore, EntityStore, FieldStore, HorseStore, MatchStore,
    PlayerStore, TeamStore, TournamentStore,
};
use chukka_core::sync::Relations;
use chukka_core::util::unix_timestamp_ms;

use crate::cli::KindArg;
use crate::commands::common::{not_found, parse_fields, parse_local_id, CommandContext};
use crate::error::CliError;

/// Patch one local record with JSON fields. Absent fields keep their
/// current values, so `--data '{"handicap": 6}'` touches nothing else.
pub fn run_edit(
    kind: KindArg,
    local_id: &str,
    data: &str,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let db = ctx.open_database()?;
    let conn = db.connection();
    let relations = Relations::new(conn);
    let id = parse_local_id(local_id)?;
    let now_ms = unix_timestamp_ms();

    match kind {
        KindArg::Tournament => {
            let fields: TournamentFields = parse_fields(data)?;
            let store = TournamentStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms);
            store.update(&record)?;
        }
        KindArg::Club => {
            let fields: ClubFields = parse_fields(data)?;
            let store = ClubStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms);
            store.update(&record)?;
        }
        KindArg::Team => {
            let fields: TeamFields = parse_fields(data)?;
            let store = TeamStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms, &relations)?;
            store.update(&record)?;
        }
        KindArg::Player => {
            let fields: PlayerFields = parse_fields(data)?;
            let store = PlayerStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms, &relations)?;
            store.update(&record)?;
        }
        KindArg::Horse => {
            let fields: HorseFields = parse_fields(data)?;
            let store = HorseStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms, &relations)?;
            store.update(&record)?;
        }
        KindArg::Breeder => {
            let fields: BreederFields = parse_fields(data)?;
            let store = BreederStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms);
            store.update(&record)?;
        }
        KindArg::Field => {
            let fields: FieldFields = parse_fields(data)?;
            let store = FieldStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms);
            store.update(&record)?;
        }
        KindArg::Match => {
            let fields: MatchFields = parse_fields(data)?;
            let store = MatchStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms, &relations)?;
            store.update(&record)?;
        }
        KindArg::Award => {
            let fields: AwardFields = parse_fields(data)?;
            let store = AwardStore::new(conn);
            let mut record = store.get(id)?.ok_or_else(|| not_found(kind, id))?;
            record.apply_edit(&fields, now_ms, &relations)?;
            store.update(&record)?;
        }
    }

    println!("{id}");
    Ok(())
}

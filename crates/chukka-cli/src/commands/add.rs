use chukka_core::models::{
    Award, AwardFields, Breeder, BreederFields, Club, ClubFields, Field, FieldFields, Horse,
    HorseFields, Match, MatchFields, Player, PlayerFields, Team, TeamFields, Tournament,
    TournamentFields,
};
use chukka_core::store::{
    AwardStore, BreederStore, ClubStore, EntityStore, FieldStore, HorseStore, MatchStore,
    PlayerStore, TeamStore, TournamentStore,
};
use chukka_core::sync::Relations;
use chukka_core::util::unix_timestamp_ms;

use crate::cli::KindArg;
use crate::commands::common::{parse_fields, CommandContext};
use crate::error::CliError;

/// Create one local record from JSON fields and print its new local id.
/// Relation fields take remote ids and must resolve against records already
/// pulled into this database.
pub fn run_add(kind: KindArg, data: &str, ctx: &CommandContext) -> Result<(), CliError> {
    let db = ctx.open_database()?;
    let conn = db.connection();
    let relations = Relations::new(conn);
    let now_ms = unix_timestamp_ms();

    let local_id = match kind {
        KindArg::Tournament => {
            let fields: TournamentFields = parse_fields(data)?;
            let record = Tournament::new_local(&fields, now_ms)?;
            TournamentStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Club => {
            let fields: ClubFields = parse_fields(data)?;
            let record = Club::new_local(&fields, now_ms)?;
            ClubStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Team => {
            let fields: TeamFields = parse_fields(data)?;
            let record = Team::new_local(&fields, now_ms, &relations)?;
            TeamStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Player => {
            let fields: PlayerFields = parse_fields(data)?;
            let record = Player::new_local(&fields, now_ms, &relations)?;
            PlayerStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Horse => {
            let fields: HorseFields = parse_fields(data)?;
            let record = Horse::new_local(&fields, now_ms, &relations)?;
            HorseStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Breeder => {
            let fields: BreederFields = parse_fields(data)?;
            let record = Breeder::new_local(&fields, now_ms)?;
            BreederStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Field => {
            let fields: FieldFields = parse_fields(data)?;
            let record = Field::new_local(&fields, now_ms)?;
            FieldStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Match => {
            let fields: MatchFields = parse_fields(data)?;
            let record = Match::new_local(&fields, now_ms, &relations)?;
            MatchStore::new(conn).insert(&record)?;
            record.local_id
        }
        KindArg::Award => {
            let fields: AwardFields = parse_fields(data)?;
            let record = Award::new_local(&fields, now_ms, &relations)?;
            AwardStore::new(conn).insert(&record)?;
            record.local_id
        }
    };

    println!("{local_id}");
    Ok(())
}

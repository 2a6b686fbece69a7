use chukka_core::models::DeletePolicy;
use chukka_core::store::{
    AwardStore, BreederStore, ClubStore, FieldStore, HorseStore, MatchStore, PlayerStore,
    TeamStore, TournamentStore,
};

use crate::cli::KindArg;
use crate::commands::common::{parse_local_id, CommandContext};
use crate::error::CliError;

/// Delete one record. Without `--remote` only the local row is touched:
/// soft-deletable kinds are retired in place, hard-deleted kinds lose the
/// row (and matches their duties and participations with it). With
/// `--remote` the server copy goes first, then the same local rule runs.
pub async fn run_delete(
    kind: KindArg,
    local_id: &str,
    remote: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let id = parse_local_id(local_id)?;

    if remote {
        let service = ctx.open_service()?;
        let outcome = service.delete(kind.entity(), id).await?;
        if outcome.remote_deleted {
            println!("Deleted {id} remotely");
        } else {
            println!("{id} was never pushed; nothing to delete remotely");
        }
    } else {
        let db = ctx.open_database()?;
        let conn = db.connection();
        match kind {
            KindArg::Tournament => TournamentStore::new(conn).delete(id)?,
            KindArg::Club => ClubStore::new(conn).delete(id)?,
            KindArg::Team => TeamStore::new(conn).delete(id)?,
            KindArg::Player => PlayerStore::new(conn).delete(id)?,
            KindArg::Horse => HorseStore::new(conn).delete(id)?,
            KindArg::Breeder => BreederStore::new(conn).delete(id)?,
            KindArg::Field => FieldStore::new(conn).delete(id)?,
            KindArg::Match => MatchStore::new(conn).delete(id)?,
            KindArg::Award => AwardStore::new(conn).delete(id)?,
        }
    }

    match kind.entity().delete_policy() {
        DeletePolicy::Soft => println!("Retired {id} locally"),
        DeletePolicy::Hard => println!("Deleted {id} locally"),
    }
    Ok(())
}

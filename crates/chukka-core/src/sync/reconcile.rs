//! Pull-side reconciliation of remote lists into the local store

use serde::Serialize;

use crate::error::Result;
use crate::store::EntityStore;
use crate::sync::{MapOutcome, Relations, SyncEntity};

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Remote records seen for the first time
    pub inserted: usize,
    /// Remote records merged into an existing local record
    pub updated: usize,
    /// Records skipped because a reference could not be resolved yet
    pub skipped: usize,
}

impl ReconcileOutcome {
    /// Fold another pass into this one (used when a kind is pulled in
    /// several requests, like matches per tournament).
    pub fn absorb(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
    }
}

/// Merge a remote list into the local store.
///
/// Each DTO either updates the record already bound to its remote id or
/// inserts a fresh one; records absent from the list are never touched.
/// Safe to re-run with the same input: the second pass updates instead of
/// inserting.
///
/// A DTO whose references cannot be resolved locally yet is skipped whole,
/// never inserted with placeholder relations; it is picked up once the
/// referenced kind has been pulled.
pub fn reconcile<E, S>(
    store: &S,
    relations: &Relations<'_>,
    dtos: &[E::Dto],
    now_ms: i64,
) -> Result<ReconcileOutcome>
where
    E: SyncEntity,
    S: EntityStore<E>,
{
    let mut outcome = ReconcileOutcome::default();

    for dto in dtos {
        let remote_id = E::remote_id_of(dto);
        match store.get_by_remote_id(remote_id)? {
            Some(mut record) => match record.merge_remote(dto, now_ms, relations)? {
                MapOutcome::Applied(()) => {
                    store.update(&record)?;
                    outcome.updated += 1;
                }
                MapOutcome::Unresolved(reason) => {
                    tracing::warn!(kind = %E::KIND, %remote_id, "skipping update: {reason}");
                    outcome.skipped += 1;
                }
            },
            None => match E::from_remote(dto, now_ms, relations)? {
                MapOutcome::Applied(record) => {
                    store.insert(&record)?;
                    outcome.inserted += 1;
                }
                MapOutcome::Unresolved(reason) => {
                    tracing::warn!(kind = %E::KIND, %remote_id, "skipping insert: {reason}");
                    outcome.skipped += 1;
                }
            },
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        MatchDto, MatchFields, RemoteId, TeamDto, TeamFields, TournamentDto, TournamentFields,
    };
    use crate::store::{Database, MatchStore, TeamStore, TournamentStore};
    use pretty_assertions::assert_eq;

    fn tournament_dto(id: i64, name: &str) -> TournamentDto {
        TournamentDto {
            id: RemoteId::new(id),
            fields: TournamentFields {
                name: Some(name.to_string()),
                location: Some("Sydney".to_string()),
                start_date: "2025-03-01".parse().ok(),
                end_date: "2025-03-08".parse().ok(),
                ..TournamentFields::default()
            },
        }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let store = TournamentStore::new(db.connection());
        let relations = Relations::new(db.connection());

        let dtos = [tournament_dto(7, "Spring Cup"), tournament_dto(8, "Autumn Open")];

        let first = reconcile(&store, &relations, &dtos, 1_000).unwrap();
        assert_eq!(
            first,
            ReconcileOutcome {
                inserted: 2,
                updated: 0,
                skipped: 0
            }
        );

        let second = reconcile(&store, &relations, &dtos, 2_000).unwrap();
        assert_eq!(
            second,
            ReconcileOutcome {
                inserted: 0,
                updated: 2,
                skipped: 0
            }
        );

        let all = store.list(true).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Spring Cup");
        assert_eq!(all[0].remote_id, Some(RemoteId::new(7)));
    }

    #[test]
    fn test_merge_is_partial_not_full_replace() {
        let db = Database::open_in_memory().unwrap();
        let store = TournamentStore::new(db.connection());
        let relations = Relations::new(db.connection());

        reconcile(&store, &relations, &[tournament_dto(7, "Spring Cup")], 1_000).unwrap();

        // A sparser snapshot of the same record must not blank out fields
        let sparse = TournamentDto {
            id: RemoteId::new(7),
            fields: TournamentFields {
                name: Some("Spring Cup 2025".to_string()),
                ..TournamentFields::default()
            },
        };
        reconcile(&store, &relations, &[sparse], 2_000).unwrap();

        let tournament = store.get_by_remote_id(RemoteId::new(7)).unwrap().unwrap();
        assert_eq!(tournament.name, "Spring Cup 2025");
        assert_eq!(tournament.location, "Sydney");
    }

    #[test]
    fn test_match_scores_survive_scoreless_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let tournaments = TournamentStore::new(db.connection());
        let matches = MatchStore::new(db.connection());
        let relations = Relations::new(db.connection());

        reconcile(
            &tournaments,
            &relations,
            &[tournament_dto(7, "Spring Cup")],
            1_000,
        )
        .unwrap();

        let with_scores = MatchDto {
            id: RemoteId::new(5),
            fields: MatchFields {
                tournament_id: Some(RemoteId::new(7)),
                home_score: Some(8),
                away_score: Some(6),
                ..MatchFields::default()
            },
        };
        reconcile(&matches, &relations, &[with_scores], 1_000).unwrap();

        let scoreless = MatchDto {
            id: RemoteId::new(5),
            fields: MatchFields {
                tournament_id: Some(RemoteId::new(7)),
                ..MatchFields::default()
            },
        };
        reconcile(&matches, &relations, &[scoreless], 2_000).unwrap();

        let game = matches.get_by_remote_id(RemoteId::new(5)).unwrap().unwrap();
        assert_eq!((game.home_score, game.away_score), (8, 6));
    }

    #[test]
    fn test_unresolved_reference_defers_the_record() {
        let db = Database::open_in_memory().unwrap();
        let tournaments = TournamentStore::new(db.connection());
        let teams = TeamStore::new(db.connection());
        let matches = MatchStore::new(db.connection());
        let relations = Relations::new(db.connection());

        reconcile(
            &tournaments,
            &relations,
            &[tournament_dto(7, "Spring Cup")],
            1_000,
        )
        .unwrap();

        let game = MatchDto {
            id: RemoteId::new(5),
            fields: MatchFields {
                tournament_id: Some(RemoteId::new(7)),
                home_team_id: Some(RemoteId::new(11)),
                ..MatchFields::default()
            },
        };

        // Team 11 is unknown: the whole DTO defers
        let outcome = reconcile(&matches, &relations, &[game.clone()], 1_000).unwrap();
        assert_eq!(outcome.skipped, 1);
        assert!(matches.get_by_remote_id(RemoteId::new(5)).unwrap().is_none());

        let team = TeamDto {
            id: RemoteId::new(11),
            fields: TeamFields {
                name: Some("La Dolfina".to_string()),
                ..TeamFields::default()
            },
        };
        reconcile(&teams, &relations, &[team], 1_500).unwrap();

        // Next pass resolves
        let outcome = reconcile(&matches, &relations, &[game], 2_000).unwrap();
        assert_eq!(outcome.inserted, 1);
        let stored = matches.get_by_remote_id(RemoteId::new(5)).unwrap().unwrap();
        assert!(stored.home_team_local_id.is_some());
    }

    #[test]
    fn test_duplicate_ids_in_one_payload_insert_once() {
        let db = Database::open_in_memory().unwrap();
        let store = TournamentStore::new(db.connection());
        let relations = Relations::new(db.connection());

        let dtos = [tournament_dto(7, "Spring Cup"), tournament_dto(7, "Spring Cup")];
        let outcome = reconcile(&store, &relations, &dtos, 1_000).unwrap();

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.updated, 1);
        assert_eq!(store.list(true).unwrap().len(), 1);
    }
}

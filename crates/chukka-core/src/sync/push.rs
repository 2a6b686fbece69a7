//! Push-side upload of local records to the remote API

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{DeletePolicy, RemoteId};
use crate::store;
use crate::sync::{Relations, SyncEntity};
use crate::util::unix_timestamp_ms;

/// Result of pushing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PushOutcome {
    pub remote_id: RemoteId,
    /// True when this push created the remote record
    pub created: bool,
}

/// Result of deleting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    /// True when a remote DELETE was issued; false means the record had
    /// never been pushed and only local state changed
    pub remote_deleted: bool,
}

/// Create response; only the assigned id matters, the rest of the echoed
/// record comes back through the next pull.
#[derive(Debug, Deserialize)]
struct CreatedDto {
    id: RemoteId,
}

/// Upload one local record.
///
/// A record without a remote id is created (POST) and the server-assigned id
/// is bound to it; a record with one is updated in place (PUT). The payload
/// is built before any request goes out, so a record whose required
/// relations are not pushed yet fails without touching the server. Any
/// failure leaves the record local-only, to be retried by a later push.
pub async fn push_record<E: SyncEntity>(
    api: &ApiClient,
    conn: &Connection,
    record: &E,
) -> Result<PushOutcome> {
    let payload = record.push_payload(&Relations::new(conn))?;
    let local_id = record.local_id();

    let outcome = match record.remote_id() {
        None => {
            let created: CreatedDto = api
                .post(&format!("/api/{}", E::COLLECTION), &payload)
                .await?;
            store::set_remote_id(conn, E::TABLE, local_id, created.id)?;
            tracing::info!(kind = %E::KIND, %local_id, remote_id = %created.id, "created remote record");
            PushOutcome {
                remote_id: created.id,
                created: true,
            }
        }
        Some(remote_id) => {
            api.put(&format!("/api/{}/{remote_id}", E::COLLECTION), &payload)
                .await?;
            tracing::info!(kind = %E::KIND, %local_id, %remote_id, "updated remote record");
            PushOutcome {
                remote_id,
                created: false,
            }
        }
    };

    store::mark_seen(conn, E::TABLE, local_id, unix_timestamp_ms())?;
    Ok(outcome)
}

/// Delete one record, remotely when possible.
///
/// The remote call is always a hard DELETE; what happens to the local row
/// follows the kind's delete policy. A record that was never pushed is
/// deleted locally only. A failed remote call leaves the local row alone.
pub async fn delete_record<E: SyncEntity>(
    api: &ApiClient,
    conn: &Connection,
    record: &E,
) -> Result<DeleteOutcome> {
    let local_id = record.local_id();
    let remote_deleted = match record.remote_id() {
        Some(remote_id) => {
            api.delete(&format!("/api/{}/{remote_id}", E::COLLECTION))
                .await?;
            true
        }
        None => {
            tracing::warn!(kind = %E::KIND, %local_id, "record was never pushed, deleting locally only");
            false
        }
    };

    match E::DELETE_POLICY {
        DeletePolicy::Soft => store::soft_delete(conn, E::TABLE, local_id)?,
        DeletePolicy::Hard => store::hard_delete(conn, E::TABLE, local_id)?,
    }
    tracing::info!(kind = %E::KIND, %local_id, %remote_deleted, "deleted record");
    Ok(DeleteOutcome { remote_deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{
        Club, ClubFields, LocalId, Match, MatchStatus, Team, TeamFields, Tournament,
        TournamentFields,
    };
    use crate::session::{MemoryVault, Session};
    use crate::store::{ClubStore, Database, EntityStore, MatchStore, TeamStore, TournamentStore};
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn client_for(server: &MockServer) -> ApiClient {
        let session = Session::new(Arc::new(MemoryVault::new()));
        ApiClient::new(server.base_url(), session).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_push_creates_then_later_pushes_update() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/clubs")
                    .json_body_partial(r#"{"name": "La Aguada"}"#);
                then.status(201).json_body(json!({"id": 31, "name": "La Aguada"}));
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/clubs/31");
                then.status(200).json_body(json!({"id": 31, "name": "La Aguada"}));
            })
            .await;

        let db = Database::open_in_memory().unwrap();
        let store = ClubStore::new(db.connection());
        let club = Club::new_local(
            &ClubFields {
                name: Some("La Aguada".to_string()),
                ..ClubFields::default()
            },
            1_000,
        )
        .unwrap();
        store.insert(&club).unwrap();

        let client = client_for(&server);
        let outcome = push_record(&client, db.connection(), &club).await.unwrap();
        assert_eq!(outcome.remote_id, RemoteId::new(31));
        assert!(outcome.created);

        let club = store.get(club.local_id).unwrap().unwrap();
        assert_eq!(club.remote_id, Some(RemoteId::new(31)));
        assert!(club.last_seen_at.is_some());

        // The record now carries its remote id, so the next push updates
        let outcome = push_record(&client, db.connection(), &club).await.unwrap();
        assert!(!outcome.created);

        create.assert_hits_async(1).await;
        update.assert_hits_async(1).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_create_leaves_the_record_local_only() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/clubs");
                then.status(500).json_body(json!({"message": "boom"}));
            })
            .await;

        let db = Database::open_in_memory().unwrap();
        let store = ClubStore::new(db.connection());
        let club = Club::new_local(
            &ClubFields {
                name: Some("Ellerstina".to_string()),
                ..ClubFields::default()
            },
            1_000,
        )
        .unwrap();
        store.insert(&club).unwrap();

        let client = client_for(&server);
        let err = push_record(&client, db.connection(), &club)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));

        let club = store.get(club.local_id).unwrap().unwrap();
        assert_eq!(club.remote_id, None);
        assert_eq!(club.last_seen_at, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unsynced_required_relation_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/matches");
                then.status(201).json_body(json!({"id": 1}));
            })
            .await;

        let db = Database::open_in_memory().unwrap();
        let tournaments = TournamentStore::new(db.connection());
        let teams = TeamStore::new(db.connection());
        let match_store = MatchStore::new(db.connection());
        let relations = Relations::new(db.connection());

        let tournament = Tournament::new_local(
            &TournamentFields {
                name: Some("Spring Cup".to_string()),
                ..TournamentFields::default()
            },
            1_000,
        )
        .unwrap();
        tournaments.insert(&tournament).unwrap();
        store::set_remote_id(
            db.connection(),
            Tournament::TABLE,
            tournament.local_id,
            RemoteId::new(7),
        )
        .unwrap();

        // Teams exist locally but were never pushed
        let team = Team::new_local(
            &TeamFields {
                name: Some("La Dolfina".to_string()),
                club_id: None,
            },
            1_000,
            &relations,
        )
        .unwrap();
        teams.insert(&team).unwrap();

        let game = Match {
            local_id: LocalId::new(),
            remote_id: None,
            tournament_local_id: tournament.local_id,
            home_team_local_id: Some(team.local_id),
            away_team_local_id: Some(team.local_id),
            field_local_id: None,
            starts_at: None,
            home_score: 0,
            away_score: 0,
            status: MatchStatus::default(),
            created_at: 1_000,
            updated_at: 1_000,
            last_seen_at: None,
        };
        match_store.insert(&game).unwrap();

        let client = client_for(&server);
        let err = push_record(&client, db.connection(), &game)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsyncedRelation(_)));
        create.assert_hits_async(0).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_of_unpushed_record_is_local_only() {
        let server = MockServer::start_async().await;

        let db = Database::open_in_memory().unwrap();
        let store = ClubStore::new(db.connection());
        let club = Club::new_local(
            &ClubFields {
                name: Some("Palermo".to_string()),
                ..ClubFields::default()
            },
            1_000,
        )
        .unwrap();
        store.insert(&club).unwrap();

        let client = client_for(&server);
        let outcome = delete_record(&client, db.connection(), &club)
            .await
            .unwrap();
        assert!(!outcome.remote_deleted);

        // Soft policy keeps the row
        let club = store.get(club.local_id).unwrap().unwrap();
        assert!(!club.is_active);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_of_pushed_record_hits_the_server() {
        let server = MockServer::start_async().await;
        let remote_delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/teams/4");
                then.status(204);
            })
            .await;

        let db = Database::open_in_memory().unwrap();
        let store = TeamStore::new(db.connection());
        let relations = Relations::new(db.connection());
        let team = Team::new_local(
            &TeamFields {
                name: Some("La Natividad".to_string()),
                club_id: None,
            },
            1_000,
            &relations,
        )
        .unwrap();
        store.insert(&team).unwrap();
        store::set_remote_id(db.connection(), Team::TABLE, team.local_id, RemoteId::new(4))
            .unwrap();
        let team = store.get(team.local_id).unwrap().unwrap();

        let client = client_for(&server);
        let outcome = delete_record(&client, db.connection(), &team)
            .await
            .unwrap();
        assert!(outcome.remote_deleted);
        remote_delete.assert_async().await;

        // Hard policy removes the row
        assert_eq!(store.get(team.local_id).unwrap(), None);
    }
}

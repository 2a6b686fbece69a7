//! Sync facade dispatching per-kind over the generic pull/push machinery

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{
    Award, Breeder, Club, DeletePolicy, EntityKind, Field, Horse, LocalId, Match, MatchDto,
    Player, RemoteId, Team, Tournament,
};
use crate::store::{
    self, AwardStore, BreederStore, ClubStore, Database, EntityStore, FieldStore, HorseStore,
    MatchStore, PlayerStore, TeamStore, TournamentStore,
};
use crate::sync::{
    delete_record, push_record, reconcile, DeleteOutcome, PushOutcome, ReconcileOutcome,
    Relations, SyncEntity,
};
use crate::util::unix_timestamp_ms;

/// Outcome of pulling one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindReport {
    pub kind: EntityKind,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Per-tournament match requests that failed and were skipped over
    pub failed_requests: usize,
    /// Set when the kind's pull failed outright
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KindReport {
    fn pulled(kind: EntityKind, outcome: ReconcileOutcome) -> Self {
        Self {
            kind,
            inserted: outcome.inserted,
            updated: outcome.updated,
            skipped: outcome.skipped,
            failed_requests: 0,
            error: None,
        }
    }

    fn failed(kind: EntityKind, error: String) -> Self {
        Self {
            kind,
            inserted: 0,
            updated: 0,
            skipped: 0,
            failed_requests: 0,
            error: Some(error),
        }
    }
}

/// Outcome of a full pull across every kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub kinds: Vec<KindReport>,
}

impl SyncReport {
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.kinds.iter().map(|kind| kind.inserted).sum()
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.kinds.iter().map(|kind| kind.updated).sum()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.kinds.iter().map(|kind| kind.skipped).sum()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.kinds.iter().any(|kind| kind.error.is_some())
    }
}

/// Outcome of retiring records that pulls stopped returning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Rows deactivated per kind; kinds with nothing retired are omitted
    pub retired: BTreeMap<EntityKind, usize>,
}

impl PruneReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.retired.values().sum()
    }
}

/// Facade tying the API client and the local store together.
///
/// Pulls run kind by kind in dependency order so remote references resolve
/// within a single pass.
pub struct SyncService {
    api: ApiClient,
    db: Database,
}

impl SyncService {
    #[must_use]
    pub fn new(api: ApiClient, db: Database) -> Self {
        Self { api, db }
    }

    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Pull every kind in dependency order.
    ///
    /// A kind that fails to pull is recorded in the report and does not stop
    /// the kinds after it; the next pull picks up whatever was missed.
    pub async fn pull_all(&self) -> SyncReport {
        let mut report = SyncReport::default();
        for kind in EntityKind::ALL {
            match self.pull_kind(kind).await {
                Ok(kind_report) => report.kinds.push(kind_report),
                Err(error) => {
                    tracing::error!(%kind, %error, "pull failed");
                    report.kinds.push(KindReport::failed(kind, error.to_string()));
                }
            }
        }
        report
    }

    /// Pull one kind from its collection endpoint.
    pub async fn pull_kind(&self, kind: EntityKind) -> Result<KindReport> {
        match kind {
            EntityKind::Tournament => {
                let dtos = self.fetch_list::<Tournament>().await?;
                self.apply_pull::<Tournament, _>(&TournamentStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Club => {
                let dtos = self.fetch_list::<Club>().await?;
                self.apply_pull::<Club, _>(&ClubStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Team => {
                let dtos = self.fetch_list::<Team>().await?;
                self.apply_pull::<Team, _>(&TeamStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Player => {
                let dtos = self.fetch_list::<Player>().await?;
                self.apply_pull::<Player, _>(&PlayerStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Horse => {
                let dtos = self.fetch_list::<Horse>().await?;
                self.apply_pull::<Horse, _>(&HorseStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Breeder => {
                let dtos = self.fetch_list::<Breeder>().await?;
                self.apply_pull::<Breeder, _>(&BreederStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Field => {
                let dtos = self.fetch_list::<Field>().await?;
                self.apply_pull::<Field, _>(&FieldStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Award => {
                let dtos = self.fetch_list::<Award>().await?;
                self.apply_pull::<Award, _>(&AwardStore::new(self.db.connection()), &dtos)
            }
            EntityKind::Match => self.pull_matches().await,
        }
    }

    /// Push one record by kind and local id.
    pub async fn push(&self, kind: EntityKind, local_id: LocalId) -> Result<PushOutcome> {
        match kind {
            EntityKind::Tournament => {
                self.push_one::<Tournament, _>(&TournamentStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Club => {
                self.push_one::<Club, _>(&ClubStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Team => {
                self.push_one::<Team, _>(&TeamStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Player => {
                self.push_one::<Player, _>(&PlayerStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Horse => {
                self.push_one::<Horse, _>(&HorseStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Breeder => {
                self.push_one::<Breeder, _>(&BreederStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Field => {
                self.push_one::<Field, _>(&FieldStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Award => {
                self.push_one::<Award, _>(&AwardStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Match => {
                self.push_one::<Match, _>(&MatchStore::new(self.db.connection()), local_id)
                    .await
            }
        }
    }

    /// Delete one record by kind and local id, remotely when it has been
    /// pushed.
    pub async fn delete(&self, kind: EntityKind, local_id: LocalId) -> Result<DeleteOutcome> {
        match kind {
            EntityKind::Tournament => {
                self.delete_one::<Tournament, _>(
                    &TournamentStore::new(self.db.connection()),
                    local_id,
                )
                .await
            }
            EntityKind::Club => {
                self.delete_one::<Club, _>(&ClubStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Team => {
                self.delete_one::<Team, _>(&TeamStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Player => {
                self.delete_one::<Player, _>(&PlayerStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Horse => {
                self.delete_one::<Horse, _>(&HorseStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Breeder => {
                self.delete_one::<Breeder, _>(&BreederStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Field => {
                self.delete_one::<Field, _>(&FieldStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Award => {
                self.delete_one::<Award, _>(&AwardStore::new(self.db.connection()), local_id)
                    .await
            }
            EntityKind::Match => {
                self.delete_one::<Match, _>(&MatchStore::new(self.db.connection()), local_id)
                    .await
            }
        }
    }

    async fn fetch_list<E: SyncEntity>(&self) -> Result<Vec<E::Dto>> {
        self.api
            .get_list(&format!("/api/{}", E::COLLECTION), E::LIST_SHAPE)
            .await
    }

    fn apply_pull<E, S>(&self, store: &S, dtos: &[E::Dto]) -> Result<KindReport>
    where
        E: SyncEntity,
        S: EntityStore<E>,
    {
        let relations = Relations::new(self.db.connection());
        let outcome = reconcile(store, &relations, dtos, unix_timestamp_ms())?;
        Ok(KindReport::pulled(E::KIND, outcome))
    }

    /// Matches have no flat collection endpoint; they are pulled per known
    /// tournament, and one failing tournament does not abort the rest.
    async fn pull_matches(&self) -> Result<KindReport> {
        let tournament_ids: Vec<RemoteId> = {
            let tournaments = TournamentStore::new(self.db.connection());
            tournaments
                .list(true)?
                .into_iter()
                .filter_map(|tournament| tournament.remote_id)
                .collect()
        };

        let mut outcome = ReconcileOutcome::default();
        let mut failed_requests = 0;
        for tournament_id in tournament_ids {
            let path = format!("/api/matches/tournament/{tournament_id}");
            let dtos: Vec<MatchDto> = match self.api.get_list(&path, Match::LIST_SHAPE).await {
                Ok(dtos) => dtos,
                Err(error) => {
                    tracing::warn!(%tournament_id, %error, "skipping matches of one tournament");
                    failed_requests += 1;
                    continue;
                }
            };
            let store = MatchStore::new(self.db.connection());
            let relations = Relations::new(self.db.connection());
            outcome.absorb(reconcile(&store, &relations, &dtos, unix_timestamp_ms())?);
        }

        let mut report = KindReport::pulled(EntityKind::Match, outcome);
        report.failed_requests = failed_requests;
        Ok(report)
    }

    async fn push_one<E, S>(&self, store: &S, local_id: LocalId) -> Result<PushOutcome>
    where
        E: SyncEntity,
        S: EntityStore<E>,
    {
        let record = store
            .get(local_id)?
            .ok_or_else(|| Error::NotFound(format!("{} record {local_id}", E::TABLE)))?;
        push_record(&self.api, self.db.connection(), &record).await
    }

    async fn delete_one<E, S>(&self, store: &S, local_id: LocalId) -> Result<DeleteOutcome>
    where
        E: SyncEntity,
        S: EntityStore<E>,
    {
        let record = store
            .get(local_id)?
            .ok_or_else(|| Error::NotFound(format!("{} record {local_id}", E::TABLE)))?;
        delete_record(&self.api, self.db.connection(), &record).await
    }
}

/// Retire soft-deletable records that no pull has returned since
/// `cutoff_ms`.
///
/// Never runs implicitly; the caller decides when absence from pulls has
/// lasted long enough to mean remote deletion. Hard-deleted kinds are left
/// alone: absence from one pull is not reliable enough to destroy rows over.
pub fn retire_unseen(db: &Database, cutoff_ms: i64) -> Result<PruneReport> {
    let mut report = PruneReport::default();
    for kind in EntityKind::ALL {
        if matches!(kind.delete_policy(), DeletePolicy::Hard) {
            tracing::debug!(%kind, "kind is hard-deleted, not pruned");
            continue;
        }
        retire_into(db, kind, cutoff_ms, &mut report)?;
    }
    Ok(report)
}

/// Single-kind variant of [`retire_unseen`]. Hard-deleted kinds are
/// rejected rather than skipped.
pub fn retire_unseen_kind(
    db: &Database,
    kind: EntityKind,
    cutoff_ms: i64,
) -> Result<PruneReport> {
    if matches!(kind.delete_policy(), DeletePolicy::Hard) {
        return Err(Error::InvalidInput(format!(
            "{kind} records are hard-deleted and cannot be retired"
        )));
    }
    let mut report = PruneReport::default();
    retire_into(db, kind, cutoff_ms, &mut report)?;
    Ok(report)
}

fn retire_into(
    db: &Database,
    kind: EntityKind,
    cutoff_ms: i64,
    report: &mut PruneReport,
) -> Result<()> {
    let retired = store::retire_unseen(
        db.connection(),
        table_of(kind),
        cutoff_ms,
        unix_timestamp_ms(),
    )?;
    if retired > 0 {
        tracing::info!(%kind, retired, "retired records unseen since cutoff");
        report.retired.insert(kind, retired);
    }
    Ok(())
}

const fn table_of(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Tournament => Tournament::TABLE,
        EntityKind::Club => Club::TABLE,
        EntityKind::Team => Team::TABLE,
        EntityKind::Player => Player::TABLE,
        EntityKind::Horse => Horse::TABLE,
        EntityKind::Breeder => Breeder::TABLE,
        EntityKind::Field => Field::TABLE,
        EntityKind::Match => Match::TABLE,
        EntityKind::Award => Award::TABLE,
    }
}

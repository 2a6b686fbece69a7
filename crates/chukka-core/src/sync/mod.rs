//! Entity synchronization between the local store and the remote API.
//!
//! The protocol is uniform across kinds: pull a remote list, match DTOs to
//! local records by remote id, insert the unseen ones and partially overwrite
//! the known ones; push local edits upstream as a create (no remote id yet)
//! or an update (remote id known). Reconciliation never deletes.
//!
//! Each kind binds itself to the protocol by implementing [`SyncEntity`];
//! the generic machinery lives in [`reconcile`], [`push`] and the
//! [`SyncService`] facade.

mod push;
mod reconcile;
mod service;

pub use push::{delete_record, push_record, DeleteOutcome, PushOutcome};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use service::{
    retire_unseen, retire_unseen_kind, KindReport, PruneReport, SyncReport, SyncService,
};

use rusqlite::Connection;

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{DeletePolicy, EntityKind, LocalId, RemoteId};
use crate::store;

/// Result of mapping one remote DTO onto local state.
///
/// `Unresolved` means a reference in the DTO names a remote record that has
/// no local counterpart yet; the whole DTO is skipped for this pass and
/// picked up by a later pull, never inserted with placeholder relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome<T> {
    Applied(T),
    Unresolved(String),
}

/// Binding between one entity kind and the sync protocol.
///
/// Implementations live next to their model structs; everything the generic
/// reconcile/push machinery needs to know about a kind is declared here.
pub trait SyncEntity: Sized {
    /// Wire shape of one record in a list response
    type Dto: serde::de::DeserializeOwned + Send;

    const KIND: EntityKind;
    /// REST collection segment under the API base path
    const COLLECTION: &'static str;
    /// Local table name
    const TABLE: &'static str;
    /// List response envelope used by this kind's endpoint
    const LIST_SHAPE: ListShape;
    /// What local deletion means for this kind
    const DELETE_POLICY: DeletePolicy;

    fn local_id(&self) -> LocalId;
    fn remote_id(&self) -> Option<RemoteId>;
    fn remote_id_of(dto: &Self::Dto) -> RemoteId;

    /// Materialize a local record from a remote DTO first seen in a pull.
    ///
    /// Local-only fields the DTO does not carry get fixed defaults.
    fn from_remote(dto: &Self::Dto, now_ms: i64, relations: &Relations<'_>)
        -> Result<MapOutcome<Self>>;

    /// Partially overwrite this record from a remote DTO.
    ///
    /// Fields absent from (or null in) the DTO are left untouched.
    fn merge_remote(
        &mut self,
        dto: &Self::Dto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<()>>;

    /// Wire-shape body for create/update calls.
    fn push_payload(&self, relations: &Relations<'_>) -> Result<serde_json::Value>;
}

/// Resolver between remote references and local records.
///
/// Pull direction: a DTO's `*_id` remote reference becomes a local id, or
/// the DTO is skipped. Push direction: a record's local reference becomes
/// the related record's remote id for the payload.
pub struct Relations<'a> {
    conn: &'a Connection,
}

impl<'a> Relations<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Resolve an optional remote reference to a local id.
    ///
    /// Absent reference resolves to `Applied(None)` (leave the local field
    /// untouched); a present reference either resolves or marks the DTO
    /// unresolved.
    pub fn resolve_ref(
        &self,
        table: &str,
        label: &str,
        remote: Option<RemoteId>,
    ) -> Result<MapOutcome<Option<LocalId>>> {
        let Some(remote) = remote else {
            return Ok(MapOutcome::Applied(None));
        };
        match store::local_id_by_remote(self.conn, table, remote)? {
            Some(local) => Ok(MapOutcome::Applied(Some(local))),
            None => Ok(MapOutcome::Unresolved(format!(
                "{label} {remote} is not in the local store yet"
            ))),
        }
    }

    /// Like [`Self::resolve_ref`], but for user-supplied input where an
    /// unresolvable reference is an input error rather than a skip.
    pub fn resolve_input_ref(
        &self,
        table: &str,
        label: &str,
        remote: Option<RemoteId>,
    ) -> Result<Option<LocalId>> {
        match self.resolve_ref(table, label, remote)? {
            MapOutcome::Applied(value) => Ok(value),
            MapOutcome::Unresolved(reason) => {
                Err(Error::InvalidInput(format!("{reason}; pull it first")))
            }
        }
    }

    /// Remote id of a related record, for push payloads of optional
    /// associations. An unsynced related record is omitted with a warning
    /// rather than failing the push.
    pub fn payload_ref(
        &self,
        table: &str,
        label: &str,
        local: Option<LocalId>,
    ) -> Result<Option<RemoteId>> {
        let Some(local) = local else {
            return Ok(None);
        };
        let remote = store::remote_id_of(self.conn, table, local)?;
        if remote.is_none() {
            tracing::warn!(%local, "omitting {label} from payload: not pushed yet");
        }
        Ok(remote)
    }

    /// Remote id of a related record that the wire schema requires.
    pub fn required_payload_ref(
        &self,
        table: &str,
        label: &str,
        local: Option<LocalId>,
    ) -> Result<RemoteId> {
        let Some(local) = local else {
            return Err(Error::InvalidInput(format!("record has no {label} set")));
        };
        store::remote_id_of(self.conn, table, local)?.ok_or_else(|| {
            Error::UnsyncedRelation(format!("{label} {local} has no remote id; push it first"))
        })
    }
}

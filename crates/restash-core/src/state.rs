// ── Substate and reducer ──
//
// The reducer is the sole mutator of the substate. Every transition
// returns a fresh value so the surrounding store's change detection
// works by comparison. Entity merges dedup by id: any existing entry
// whose id appears in the incoming set is removed before the incoming
// entities are appended.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionTypes, OperationKind, Payload};
use crate::model::{Entity, EntityId};

// ── Substate ─────────────────────────────────────────────────────────

/// The state slice owned by one resource's reducer.
///
/// Mounted by the surrounding store under a key the collaborators agree
/// on; the query helpers expect this exact slice, not the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Substate {
    /// Archive key → result ids, in fetch order. Order is not guaranteed
    /// stable across refetches.
    pub archives: IndexMap<String, Vec<EntityId>>,
    /// The entity cache. At most one entry per id.
    pub entities: Vec<Entity>,
    /// Key of the archive currently being fetched. A second fetch before
    /// the first settles overwrites this, and the stale completion may
    /// clear it while the newer fetch is still outstanding.
    pub loading_archive: Option<String>,
    /// Id of the entity currently being fetched.
    pub loading_entity: Option<EntityId>,
    /// Id (real or temporary) currently being created or updated.
    pub saving: Option<EntityId>,
}

impl Substate {
    // ── Query helpers ────────────────────────────────────────────────

    /// True iff the archive `key` is currently being fetched.
    pub fn is_archive_loading(&self, key: &str) -> bool {
        self.loading_archive.as_deref() == Some(key)
    }

    /// The cached entities for archive `key`, or `None` if the key was
    /// never successfully fetched.
    ///
    /// Filters the entity cache by the stored id set; iteration order
    /// follows the cache, so callers must treat the result as unordered.
    pub fn get_archive(&self, key: &str) -> Option<Vec<&Entity>> {
        let ids: HashSet<&EntityId> = self.archives.get(key)?.iter().collect();
        Some(
            self.entities
                .iter()
                .filter(|e| e.id().is_some_and(|id| ids.contains(&id)))
                .collect(),
        )
    }

    /// True iff the entity `id` is currently being fetched.
    pub fn is_entity_loading(&self, id: &EntityId) -> bool {
        self.loading_entity.as_ref() == Some(id)
    }

    /// The cached entity with the given id, if any.
    pub fn get_single(&self, id: &EntityId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.id().as_ref() == Some(id))
    }

    /// True iff the entity `id` is currently being created or updated.
    pub fn is_saving(&self, id: &EntityId) -> bool {
        self.saving.as_ref() == Some(id)
    }

    /// True iff a create is in flight (`saving` holds a temporary id).
    pub fn is_creating(&self) -> bool {
        self.saving.as_ref().is_some_and(EntityId::is_temp)
    }
}

// ── Reducer ──────────────────────────────────────────────────────────

/// Pure reducer for one resource's substate.
///
/// Produced by `ResourceHandler::reducer()` and mounted by the
/// surrounding store; the handler never self-registers.
#[derive(Debug, Clone)]
pub struct Reducer {
    types: ActionTypes,
}

impl Reducer {
    pub(crate) fn new(types: ActionTypes) -> Self {
        Self { types }
    }

    /// Fold one action into the substate, returning a new value.
    ///
    /// Actions whose tag does not resolve to one of this resource's 12
    /// operations — including other resources' actions flowing through
    /// the same store — leave the state unchanged.
    pub fn reduce(&self, state: Option<&Substate>, action: &Action) -> Substate {
        let mut next = state.cloned().unwrap_or_default();
        let Some(kind) = self.types.kind_of(&action.tag) else {
            return next;
        };

        match (kind, &action.payload) {
            (OperationKind::ArchiveStart, Payload::ArchiveStart { key }) => {
                next.loading_archive = Some(key.clone());
            }
            (OperationKind::ArchiveSuccess, Payload::ArchiveSuccess { key, results }) => {
                next.loading_archive = None;
                // The id list and the entity merge land in the same
                // transition, so the archive never references an entity
                // missing from the cache.
                let ids: Vec<EntityId> = results.iter().filter_map(Entity::id).collect();
                next.archives.insert(key.clone(), ids);
                merge_entities(&mut next.entities, results);
            }
            (OperationKind::ArchiveError, Payload::ArchiveError { .. }) => {
                next.loading_archive = None;
            }
            (OperationKind::GetStart, Payload::GetStart { id }) => {
                next.loading_entity = Some(id.clone());
            }
            (OperationKind::GetSuccess, Payload::GetSuccess { data, .. }) => {
                next.loading_entity = None;
                merge_entities(&mut next.entities, std::slice::from_ref(data));
            }
            (OperationKind::GetError, Payload::GetError { .. }) => {
                next.loading_entity = None;
            }
            (
                OperationKind::UpdateStart | OperationKind::CreateStart,
                Payload::UpdateStart { id, .. } | Payload::CreateStart { id, .. },
            ) => {
                next.saving = Some(id.clone());
            }
            (
                OperationKind::UpdateSuccess | OperationKind::CreateSuccess,
                Payload::UpdateSuccess { data, .. } | Payload::CreateSuccess { data, .. },
            ) => {
                next.saving = None;
                merge_entities(&mut next.entities, std::slice::from_ref(data));
            }
            (
                OperationKind::UpdateError | OperationKind::CreateError,
                Payload::UpdateError { .. } | Payload::CreateError { .. },
            ) => {
                next.saving = None;
            }
            // Tag resolved to one of ours but the payload disagrees:
            // treat like an unknown action.
            _ => {}
        }

        next
    }
}

/// Remove existing entries whose id appears in `incoming`, then append
/// `incoming`. Entries without an id are left alone.
fn merge_entities(existing: &mut Vec<Entity>, incoming: &[Entity]) {
    let incoming_ids: HashSet<EntityId> = incoming.iter().filter_map(Entity::id).collect();
    existing.retain(|e| e.id().is_none_or(|id| !incoming_ids.contains(&id)));
    existing.extend_from_slice(incoming);
}

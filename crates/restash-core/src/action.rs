// ── Action types and dispatched actions ──
//
// Every resource operation dispatches through a closed set of 12 logical
// operations (four verbs x three phases). Tag strings are resolved once
// at construction time: an override table is checked first, then the
// `<VERB>_<TYPE>[_REQUEST|_ERROR]` derivation applies. The reducer uses
// the reverse lookup to ignore actions belonging to other resources
// mounted in the same store.

use std::collections::HashMap;

use indexmap::IndexMap;
use strum::AsRefStr;

use crate::error::HandlerError;
use crate::model::{Entity, EntityId};

// ── Operation kinds ──────────────────────────────────────────────────

/// The four verbs, as they appear in derived action-type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    /// Archive (collection) query.
    Query,
    /// Single-entity fetch.
    Load,
    Update,
    Create,
}

/// The three phases every operation moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Success,
    Error,
}

/// The closed set of logical operations a resource handler dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ArchiveStart,
    ArchiveSuccess,
    ArchiveError,
    GetStart,
    GetSuccess,
    GetError,
    UpdateStart,
    UpdateSuccess,
    UpdateError,
    CreateStart,
    CreateSuccess,
    CreateError,
}

impl OperationKind {
    pub const ALL: [Self; 12] = [
        Self::ArchiveStart,
        Self::ArchiveSuccess,
        Self::ArchiveError,
        Self::GetStart,
        Self::GetSuccess,
        Self::GetError,
        Self::UpdateStart,
        Self::UpdateSuccess,
        Self::UpdateError,
        Self::CreateStart,
        Self::CreateSuccess,
        Self::CreateError,
    ];

    pub fn verb(self) -> Verb {
        match self {
            Self::ArchiveStart | Self::ArchiveSuccess | Self::ArchiveError => Verb::Query,
            Self::GetStart | Self::GetSuccess | Self::GetError => Verb::Load,
            Self::UpdateStart | Self::UpdateSuccess | Self::UpdateError => Verb::Update,
            Self::CreateStart | Self::CreateSuccess | Self::CreateError => Verb::Create,
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            Self::ArchiveStart | Self::GetStart | Self::UpdateStart | Self::CreateStart => {
                Phase::Start
            }
            Self::ArchiveSuccess
            | Self::GetSuccess
            | Self::UpdateSuccess
            | Self::CreateSuccess => Phase::Success,
            Self::ArchiveError | Self::GetError | Self::UpdateError | Self::CreateError => {
                Phase::Error
            }
        }
    }

    /// Derive the default tag for this operation on `resource_type`:
    /// `<VERB>_<TYPE>` with a `_REQUEST` suffix for start phases and an
    /// `_ERROR` suffix for error phases.
    fn derive_tag(self, resource_type: &str) -> String {
        let ty = resource_type.to_uppercase();
        let verb = self.verb();
        match self.phase() {
            Phase::Start => format!("{}_{ty}_REQUEST", verb.as_ref()),
            Phase::Success => format!("{}_{ty}", verb.as_ref()),
            Phase::Error => format!("{}_{ty}_ERROR", verb.as_ref()),
        }
    }
}

// ── Tag table ────────────────────────────────────────────────────────

/// Resolved action-type tags for one resource.
///
/// Derivation is deterministic, so two handlers for distinct resource
/// types mounted in the same store can never collide unless an override
/// makes them.
#[derive(Debug, Clone)]
pub struct ActionTypes {
    tags: IndexMap<OperationKind, String>,
}

impl ActionTypes {
    /// Resolve all 12 tags for `resource_type`, consulting `overrides`
    /// first.
    pub fn derive(resource_type: &str, overrides: &HashMap<OperationKind, String>) -> Self {
        let tags = OperationKind::ALL
            .iter()
            .map(|kind| {
                let tag = overrides
                    .get(kind)
                    .cloned()
                    .unwrap_or_else(|| kind.derive_tag(resource_type));
                (*kind, tag)
            })
            .collect();
        Self { tags }
    }

    /// The tag string for one operation.
    pub fn tag(&self, kind: OperationKind) -> &str {
        self.tags
            .get(&kind)
            .expect("tag table covers every operation kind")
    }

    /// Reverse lookup: which of this resource's operations (if any) does
    /// `tag` name?
    pub fn kind_of(&self, tag: &str) -> Option<OperationKind> {
        self.tags
            .iter()
            .find_map(|(kind, t)| (t == tag).then_some(*kind))
    }
}

// ── Dispatched actions ───────────────────────────────────────────────

/// Cloneable error payload carried by `*Error` actions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ActionError {
    pub message: String,
    pub code: String,
    pub status: Option<u16>,
}

impl From<&HandlerError> for ActionError {
    fn from(err: &HandlerError) -> Self {
        match err {
            HandlerError::Api {
                message,
                code,
                status,
            } => Self {
                message: message.clone(),
                code: code.clone(),
                status: *status,
            },
            other => Self {
                message: other.to_string(),
                code: restash_api::UNKNOWN_CODE.to_owned(),
                status: None,
            },
        }
    }
}

/// A dispatched action: the resolved tag plus a typed payload.
///
/// Collaborators reading the store see the contract shape — `tag` plus
/// the payload's `id`/`data`/`results`/`error` fields.
#[derive(Debug, Clone)]
pub struct Action {
    pub tag: String,
    pub payload: Payload,
}

impl Action {
    pub(crate) fn new(types: &ActionTypes, payload: Payload) -> Self {
        Self {
            tag: types.tag(payload.kind()).to_owned(),
            payload,
        }
    }
}

/// One variant per operation x phase.
#[derive(Debug, Clone)]
pub enum Payload {
    ArchiveStart { key: String },
    ArchiveSuccess { key: String, results: Vec<Entity> },
    ArchiveError { key: String, error: ActionError },
    GetStart { id: EntityId },
    GetSuccess { id: EntityId, data: Entity },
    GetError { id: EntityId, error: ActionError },
    UpdateStart { id: EntityId, data: Entity },
    UpdateSuccess { id: EntityId, data: Entity },
    UpdateError { id: EntityId, error: ActionError },
    CreateStart { id: EntityId, data: Entity },
    CreateSuccess { id: EntityId, data: Entity },
    CreateError { id: EntityId, error: ActionError },
}

impl Payload {
    /// The operation this payload belongs to.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::ArchiveStart { .. } => OperationKind::ArchiveStart,
            Self::ArchiveSuccess { .. } => OperationKind::ArchiveSuccess,
            Self::ArchiveError { .. } => OperationKind::ArchiveError,
            Self::GetStart { .. } => OperationKind::GetStart,
            Self::GetSuccess { .. } => OperationKind::GetSuccess,
            Self::GetError { .. } => OperationKind::GetError,
            Self::UpdateStart { .. } => OperationKind::UpdateStart,
            Self::UpdateSuccess { .. } => OperationKind::UpdateSuccess,
            Self::UpdateError { .. } => OperationKind::UpdateError,
            Self::CreateStart { .. } => OperationKind::CreateStart,
            Self::CreateSuccess { .. } => OperationKind::CreateSuccess,
            Self::CreateError { .. } => OperationKind::CreateError,
        }
    }
}

// restash-core: Resource handler, actions, and reducer binding REST
// collections to a state container.

pub mod action;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Action, ActionError, ActionTypes, OperationKind, Payload, Phase, Verb};
pub use config::ResourceConfig;
pub use error::HandlerError;
pub use handler::{ArchiveQuery, ResourceHandler};
pub use model::{Entity, EntityId, TEMP_ID_PREFIX};
pub use state::{Reducer, Substate};

// Transport-layer types consumers need for configuration.
pub use restash_api::{RequestContext, TlsMode, TransportConfig};

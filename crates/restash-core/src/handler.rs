// ── Resource handler ──
//
// The long-lived orchestration object for one collection resource:
// owns the HTTP client, the resolved action-type table, the archive
// registry, and the temp-id counter. The four action creators each
// issue exactly one request and dispatch start/success/error actions
// through the caller-supplied sink as they progress.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::error;

use restash_api::{CollectionClient, RequestContext};

use crate::action::{Action, ActionError, ActionTypes, Payload};
use crate::config::ResourceConfig;
use crate::error::HandlerError;
use crate::model::{Entity, EntityId};
use crate::state::Reducer;

// ── Archive queries ──────────────────────────────────────────────────

/// Parameters for one registered archive.
pub enum ArchiveQuery<S> {
    /// A fixed parameter set.
    Static(IndexMap<String, String>),
    /// Evaluated against the consumer's global state at dispatch time.
    Dynamic(Arc<dyn Fn(&S) -> IndexMap<String, String> + Send + Sync>),
}

impl<S> ArchiveQuery<S> {
    /// A dynamic query computed from global state when the fetch runs.
    pub fn dynamic(f: impl Fn(&S) -> IndexMap<String, String> + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    fn resolve(&self, read_state: impl Fn() -> S) -> IndexMap<String, String> {
        match self {
            Self::Static(params) => params.clone(),
            Self::Dynamic(f) => f(&read_state()),
        }
    }
}

impl<S> From<IndexMap<String, String>> for ArchiveQuery<S> {
    fn from(params: IndexMap<String, String>) -> Self {
        Self::Static(params)
    }
}

impl<S> Clone for ArchiveQuery<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(params) => Self::Static(params.clone()),
            Self::Dynamic(f) => Self::Dynamic(Arc::clone(f)),
        }
    }
}

impl<S> fmt::Debug for ArchiveQuery<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(params) => f.debug_tuple("Static").field(params).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

// ── Handler ──────────────────────────────────────────────────────────

/// Binds one REST collection resource to a predictable state container.
///
/// Generic over `S`, the consumer's global state type, which dynamic
/// archive queries are evaluated against. Handlers for resources whose
/// archives are all static can use the default `S = ()`.
///
/// Action creators take a dispatch sink (`FnMut(Action)`); the actions
/// they emit are folded into a [`Substate`](crate::Substate) by the
/// [`Reducer`] this handler produces.
pub struct ResourceHandler<S = ()> {
    client: CollectionClient,
    action_types: ActionTypes,
    archives: DashMap<String, ArchiveQuery<S>>,
    rethrow_on_error: bool,
    /// Monotonic, never decremented. Temp ids are never reused.
    temp_id_counter: AtomicU64,
}

impl<S> ResourceHandler<S> {
    /// Build a handler from configuration.
    pub fn new(config: ResourceConfig) -> Result<Self, HandlerError> {
        let mut client = CollectionClient::new(
            config.base_url.as_str(),
            config.query_defaults,
            &config.transport,
        )?;
        if let Some(token) = &config.auth_token {
            client = client.with_auth_param(&config.auth_param, token);
        }

        Ok(Self {
            client,
            action_types: ActionTypes::derive(&config.resource_type, &config.overrides),
            archives: DashMap::new(),
            rethrow_on_error: config.rethrow_on_error,
            temp_id_counter: AtomicU64::new(0),
        })
    }

    /// The resolved action-type table for this resource.
    pub fn action_types(&self) -> &ActionTypes {
        &self.action_types
    }

    /// Produce the reducer for this resource's substate. The caller
    /// mounts it in the surrounding store; the handler never
    /// self-registers.
    pub fn reducer(&self) -> Reducer {
        Reducer::new(self.action_types.clone())
    }

    /// Register or replace the query spec for an archive key.
    ///
    /// No network effect. Re-registering changes what a subsequent fetch
    /// retrieves; already-cached results are not invalidated.
    pub fn register_archive(&self, key: impl Into<String>, query: impl Into<ArchiveQuery<S>>) {
        self.archives.insert(key.into(), query.into());
    }

    fn action(&self, payload: Payload) -> Action {
        Action::new(&self.action_types, payload)
    }

    fn next_temp_id(&self) -> EntityId {
        EntityId::temp(self.temp_id_counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Shared failure tail: log, dispatch the `*Error` action, then
    /// either return the error or swallow it per the rethrow policy.
    fn fail<D: FnMut(Action)>(
        &self,
        err: restash_api::Error,
        to_payload: impl FnOnce(ActionError) -> Payload,
        dispatch: &mut D,
    ) -> Result<Option<EntityId>, HandlerError> {
        let err = HandlerError::from(err);
        dispatch(self.action(to_payload(ActionError::from(&err))));
        if self.rethrow_on_error {
            Err(err)
        } else {
            Ok(None)
        }
    }

    // ── Action creators ──────────────────────────────────────────────

    /// Fetch a registered archive.
    ///
    /// Fails with [`HandlerError::UnknownArchive`] before any action is
    /// dispatched if `key` was never registered. Resolves with the key
    /// on success, `Ok(None)` on a swallowed failure.
    pub async fn fetch_archive<D, G>(
        &self,
        key: &str,
        mut dispatch: D,
        read_state: G,
    ) -> Result<Option<String>, HandlerError>
    where
        D: FnMut(Action),
        G: Fn() -> S,
    {
        if !self.archives.contains_key(key) {
            return Err(HandlerError::UnknownArchive {
                key: key.to_owned(),
            });
        }

        dispatch(self.action(Payload::ArchiveStart {
            key: key.to_owned(),
        }));

        // Resolved after the start dispatch so dynamic queries see the
        // state the start transition produced.
        let params: Vec<(String, String)> = {
            let query = self
                .archives
                .get(key)
                .ok_or_else(|| HandlerError::UnknownArchive {
                    key: key.to_owned(),
                })?;
            query.resolve(read_state).into_iter().collect()
        };

        match self.client.query(&params).await {
            Ok(results) => {
                let results: Vec<Entity> = results.into_iter().map(Entity::from).collect();
                dispatch(self.action(Payload::ArchiveSuccess {
                    key: key.to_owned(),
                    results,
                }));
                Ok(Some(key.to_owned()))
            }
            Err(err) => {
                error!(archive = key, "archive query failed: {err}");
                let res = self.fail(
                    err,
                    |error| Payload::ArchiveError {
                        key: key.to_owned(),
                        error,
                    },
                    &mut dispatch,
                )?;
                Ok(res.map(|_| key.to_owned()))
            }
        }
    }

    /// Fetch a single entity by id.
    ///
    /// Resolves with the id on success, `Ok(None)` on a swallowed
    /// failure.
    pub async fn fetch_single<D>(
        &self,
        id: &EntityId,
        mut dispatch: D,
    ) -> Result<Option<EntityId>, HandlerError>
    where
        D: FnMut(Action),
    {
        dispatch(self.action(Payload::GetStart { id: id.clone() }));

        match self
            .client
            .fetch(&id.to_string(), RequestContext::View)
            .await
        {
            Ok(data) => {
                dispatch(self.action(Payload::GetSuccess {
                    id: id.clone(),
                    data: Entity::from(data),
                }));
                Ok(Some(id.clone()))
            }
            Err(err) => {
                error!(%id, "entity fetch failed: {err}");
                self.fail(
                    err,
                    |error| Payload::GetError {
                        id: id.clone(),
                        error,
                    },
                    &mut dispatch,
                )
            }
        }
    }

    /// Update an existing entity. The payload MUST carry an `id` field;
    /// fails with [`HandlerError::MissingId`] before any dispatch
    /// otherwise. Resolves with the id on success.
    pub async fn update<D>(
        &self,
        entity: Entity,
        mut dispatch: D,
    ) -> Result<Option<EntityId>, HandlerError>
    where
        D: FnMut(Action),
    {
        let Some(id) = entity.id() else {
            return Err(HandlerError::MissingId);
        };

        dispatch(self.action(Payload::UpdateStart {
            id: id.clone(),
            data: entity.clone(),
        }));

        match self
            .client
            .update(&id.to_string(), entity.as_value(), RequestContext::Edit)
            .await
        {
            Ok(data) => {
                dispatch(self.action(Payload::UpdateSuccess {
                    id: id.clone(),
                    data: Entity::from(data),
                }));
                Ok(Some(id))
            }
            Err(err) => {
                error!(%id, "entity update failed: {err}");
                self.fail(
                    err,
                    |error| Payload::UpdateError {
                        id: id.clone(),
                        error,
                    },
                    &mut dispatch,
                )
            }
        }
    }

    /// Create a new entity.
    ///
    /// Allocates a fresh temporary id to track the in-flight create; the
    /// temp id rides on `CreateStart` and `CreateSuccess` so callers
    /// tracking it elsewhere can reconcile. Resolves with the
    /// server-assigned id (or `Ok(None)` if the response carried none,
    /// or the failure was swallowed).
    pub async fn create<D>(
        &self,
        payload: Entity,
        mut dispatch: D,
    ) -> Result<Option<EntityId>, HandlerError>
    where
        D: FnMut(Action),
    {
        let temp_id = self.next_temp_id();

        dispatch(self.action(Payload::CreateStart {
            id: temp_id.clone(),
            data: payload.clone(),
        }));

        match self
            .client
            .create(payload.as_value(), RequestContext::Edit)
            .await
        {
            Ok(data) => {
                let data = Entity::from(data);
                let server_id = data.id();
                dispatch(self.action(Payload::CreateSuccess { id: temp_id, data }));
                Ok(server_id)
            }
            Err(err) => {
                error!(%temp_id, "entity create failed: {err}");
                self.fail(
                    err,
                    |error| Payload::CreateError {
                        id: temp_id.clone(),
                        error,
                    },
                    &mut dispatch,
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn temp_ids_are_strictly_increasing() {
        let config = ResourceConfig::new(
            "https://example.com/wp/v2/posts".parse().unwrap(),
            "posts",
        );
        let handler: ResourceHandler = ResourceHandler::new(config).unwrap();

        let a = handler.next_temp_id();
        let b = handler.next_temp_id();
        let c = handler.next_temp_id();

        assert_eq!(a.to_string(), "_tmp_0");
        assert_eq!(b.to_string(), "_tmp_1");
        assert_eq!(c.to_string(), "_tmp_2");
        assert!(a.is_temp() && b.is_temp() && c.is_temp());
    }

    #[test]
    fn register_archive_replaces_the_query() {
        let config = ResourceConfig::new(
            "https://example.com/wp/v2/posts".parse().unwrap(),
            "posts",
        );
        let handler: ResourceHandler = ResourceHandler::new(config).unwrap();

        let mut params = IndexMap::new();
        params.insert("orderby".to_owned(), "date".to_owned());
        handler.register_archive("featured", ArchiveQuery::Static(params));

        let mut replaced = IndexMap::new();
        replaced.insert("orderby".to_owned(), "title".to_owned());
        handler.register_archive("featured", ArchiveQuery::Static(replaced));

        match handler.archives.get("featured").unwrap().value() {
            ArchiveQuery::Static(p) => {
                assert_eq!(p.get("orderby").map(String::as_str), Some("title"));
            }
            ArchiveQuery::Dynamic(_) => panic!("expected static query"),
        }
    }
}

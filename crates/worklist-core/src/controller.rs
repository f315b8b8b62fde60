//! Optimistic mutation manager.
//!
//! [`EntityController`] owns the [`EntityStore`] for one screen and is the
//! only writer to it. Updates and deletes are applied locally before the
//! remote call and rolled back from a snapshot if the call fails. Creates
//! and edits wait for the server. Every outcome becomes a [`Notice`].
//!
//! The store lives behind a mutex that is released before every remote
//! call, so any number of mutations may be in flight at once.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::error::{ErrorCode, RemoteError};
use crate::filter::FilterSpec;
use crate::model::entity::{EntityId, EntityPatch, ListEntity};
use crate::notify::{Notice, Notifier, Operation};
use crate::remote::Remote;
use crate::sort::{RankTables, SortKeys, sort_entities};
use crate::store::{EntityStore, StoreSnapshot};

/// Page budget for the initial collection fetch.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// What a failed update or delete restores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackScope {
    /// The whole store, from the snapshot taken before the optimistic apply.
    #[default]
    Store,
    /// Only the failed entity, and only if nothing wrote to it since the
    /// optimistic apply.
    Entity,
}

/// Per-screen controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub ranks: RankTables,
    pub rollback: RollbackScope,
    pub max_pages: u32,
}

impl ControllerSettings {
    #[must_use]
    pub fn defaults_for<E: ListEntity>() -> Self {
        Self {
            ranks: E::default_ranks(),
            rollback: RollbackScope::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The remote accepted the change and its response was merged.
    Committed,
    /// The remote failed after an optimistic apply; local state was restored.
    RolledBack,
    /// The remote failed before anything was applied locally.
    Failed,
    /// Rejected locally (unknown id or empty patch); the remote was not called.
    Skipped,
}

impl MutationOutcome {
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Most recent failure, cleared by the next success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastError {
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug)]
struct ControllerState<E> {
    store: EntityStore<E>,
    pending_delete: Option<EntityId>,
    last_error: Option<LastError>,
    container: Option<EntityId>,
}

/// Everything needed to undo one optimistic write.
struct Rollback<E> {
    snapshot: StoreSnapshot<E>,
    id: EntityId,
    original: E,
    position: usize,
    /// Revision the entity held right after the optimistic write, `None`
    /// when the write removed it.
    revision: Option<u64>,
}

pub struct EntityController<E: ListEntity, R, N> {
    remote: R,
    notifier: N,
    settings: ControllerSettings,
    state: Mutex<ControllerState<E>>,
}

impl<E, R, N> EntityController<E, R, N>
where
    E: ListEntity,
    R: Remote<E>,
    N: Notifier,
{
    pub fn new(remote: R, notifier: N) -> Self {
        Self::with_settings(remote, notifier, ControllerSettings::defaults_for::<E>())
    }

    pub fn with_settings(remote: R, notifier: N, settings: ControllerSettings) -> Self {
        Self {
            remote,
            notifier,
            settings,
            state: Mutex::new(ControllerState {
                store: EntityStore::new(),
                pending_delete: None,
                last_error: None,
                container: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub const fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Entities matching `filter`, stably sorted by `keys`.
    pub fn view(&self, filter: &FilterSpec, keys: &SortKeys) -> Vec<E> {
        let mut visible: Vec<E> = {
            let state = self.lock();
            state
                .store
                .iter()
                .filter(|entity| filter.matches(*entity))
                .cloned()
                .collect()
        };
        sort_entities(&mut visible, keys, &self.settings.ranks);
        debug!(kind = %E::KIND, count = visible.len(), sort = %keys, "view recomputed");
        visible
    }

    /// Deep copy of the whole store, in store order.
    pub fn snapshot_all(&self) -> Vec<E> {
        self.lock().store.all()
    }

    pub fn get(&self, id: EntityId) -> Option<E> {
        self.lock().store.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().store.is_empty()
    }

    pub fn is_updating(&self, id: EntityId) -> bool {
        self.lock().store.is_updating(id)
    }

    pub fn updating_ids(&self) -> Vec<EntityId> {
        self.lock().store.updating_ids()
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.lock().last_error.clone()
    }

    /// Container the store was last loaded for.
    pub fn container(&self) -> Option<EntityId> {
        self.lock().container
    }

    // -----------------------------------------------------------------------
    // Delete confirmation
    // -----------------------------------------------------------------------

    /// Open the delete confirmation for `id`. Returns `false` for an id the
    /// store does not hold.
    pub fn request_delete(&self, id: EntityId) -> bool {
        let mut state = self.lock();
        if state.store.get(id).is_none() {
            return false;
        }
        state.pending_delete = Some(id);
        true
    }

    pub fn cancel_delete(&self) {
        self.lock().pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<EntityId> {
        self.lock().pending_delete
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Fetch the full collection and replace the store with it. Returns the
    /// loaded count, or `None` if the fetch failed and the store was left
    /// untouched.
    pub async fn load(&self, container: Option<EntityId>) -> Option<usize> {
        let result = self
            .remote
            .fetch_entities(container, self.settings.max_pages)
            .await;

        let mut state = self.lock();
        match result {
            Ok(entities) => {
                state.store.replace(entities);
                state.container = container;
                state.last_error = None;
                let count = state.store.len();
                drop(state);
                info!(kind = %E::KIND, count, container, "collection loaded");
                self.notifier.notify(Notice::Loaded {
                    kind: E::KIND,
                    count,
                });
                Some(count)
            }
            Err(err) => {
                let notice = Self::record_failure(
                    &mut state,
                    Operation::Load,
                    None,
                    None,
                    err.code(),
                    err.to_string(),
                );
                drop(state);
                self.notifier.notify(notice);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Optimistic mutations
    // -----------------------------------------------------------------------

    /// Apply `patch` locally, send it, then merge the response or roll back.
    pub async fn update_field(&self, id: EntityId, patch: E::Patch) -> MutationOutcome {
        if patch.is_empty() {
            self.reject(Operation::Update, id, ErrorCode::EmptyPatch);
            return MutationOutcome::Skipped;
        }

        let rollback = {
            let mut state = self.lock();
            let (Some(position), Some(original)) =
                (state.store.position(id), state.store.get(id).cloned())
            else {
                drop(state);
                self.reject(Operation::Update, id, ErrorCode::EntityNotFound);
                return MutationOutcome::Skipped;
            };
            let snapshot = state.store.snapshot();
            state.store.mark_updating(id);
            state.store.merge(id, &patch);
            Rollback {
                snapshot,
                id,
                original,
                position,
                revision: state.store.revision(id),
            }
        };
        debug!(kind = %E::KIND, id, fields = ?patch.fields(), "optimistic update applied");

        let result = self.remote.update(id, &patch).await;

        let mut state = self.lock();
        state.store.clear_updating(id);
        match result {
            Ok(response) => {
                state.store.merge(id, &response);
                state.last_error = None;
                drop(state);

                let before = rollback.original;
                let mut after = before.clone();
                after.apply(&patch);
                after.apply(&response);
                info!(kind = %E::KIND, id, "update committed");
                self.notifier.notify(Notice::Updated {
                    kind: E::KIND,
                    id,
                    name: after.display_name().to_string(),
                    changes: before.describe_changes(&after, &patch),
                });
                MutationOutcome::Committed
            }
            Err(err) => {
                let name = rollback.original.display_name().to_string();
                self.roll_back(&mut state.store, rollback);
                let notice = Self::record_failure(
                    &mut state,
                    Operation::Update,
                    Some(id),
                    Some(name),
                    err.code(),
                    err.to_string(),
                );
                drop(state);
                self.notifier.notify(notice);
                MutationOutcome::RolledBack
            }
        }
    }

    /// Remove `id` locally, closing the confirmation, then delete it remotely.
    /// On failure the entity comes back and the confirmation reopens.
    pub async fn delete(&self, id: EntityId) -> MutationOutcome {
        let rollback = {
            let mut state = self.lock();
            if state.store.get(id).is_none() {
                drop(state);
                self.reject(Operation::Delete, id, ErrorCode::EntityNotFound);
                return MutationOutcome::Skipped;
            }
            let snapshot = state.store.snapshot();
            let Some((position, original)) = state.store.remove(id) else {
                return MutationOutcome::Skipped;
            };
            state.pending_delete = None;
            state.store.mark_updating(id);
            Rollback {
                snapshot,
                id,
                original,
                position,
                revision: None,
            }
        };
        debug!(kind = %E::KIND, id, "optimistic delete applied");

        let result = self.remote.delete(id).await;

        let mut state = self.lock();
        state.store.clear_updating(id);
        let name = rollback.original.display_name().to_string();
        match result {
            Ok(()) => {
                state.last_error = None;
                drop(state);
                info!(kind = %E::KIND, id, "delete committed");
                self.notifier.notify(Notice::Deleted {
                    kind: E::KIND,
                    id,
                    name,
                });
                MutationOutcome::Committed
            }
            Err(err) => {
                self.roll_back(&mut state.store, rollback);
                state.pending_delete = Some(id);
                let notice = Self::record_failure(
                    &mut state,
                    Operation::Delete,
                    Some(id),
                    Some(name),
                    err.code(),
                    err.to_string(),
                );
                drop(state);
                self.notifier.notify(notice);
                MutationOutcome::RolledBack
            }
        }
    }

    // -----------------------------------------------------------------------
    // Form submits
    // -----------------------------------------------------------------------

    /// Create through the remote and prepend the returned entity.
    pub async fn create(&self, draft: E::Draft) -> Option<E> {
        match self.remote.create(&draft).await {
            Ok(entity) => {
                let (id, name) = (entity.id(), entity.display_name().to_string());
                {
                    let mut state = self.lock();
                    state.store.prepend(entity.clone());
                    state.last_error = None;
                }
                info!(kind = %E::KIND, id, "entity created");
                self.notifier.notify(Notice::Created {
                    kind: E::KIND,
                    id,
                    name,
                });
                Some(entity)
            }
            Err(err) => {
                let notice = {
                    let mut state = self.lock();
                    Self::record_failure(
                        &mut state,
                        Operation::Create,
                        None,
                        None,
                        err.code(),
                        err.to_string(),
                    )
                };
                self.notifier.notify(notice);
                None
            }
        }
    }

    /// Send `patch` and merge whatever fields the server returns. Nothing is
    /// applied locally before the response.
    pub async fn edit(&self, id: EntityId, patch: E::Patch) -> MutationOutcome {
        if patch.is_empty() {
            self.reject(Operation::Edit, id, ErrorCode::EmptyPatch);
            return MutationOutcome::Skipped;
        }
        let Some(before) = self.get(id) else {
            self.reject(Operation::Edit, id, ErrorCode::EntityNotFound);
            return MutationOutcome::Skipped;
        };

        let result = self.remote.update(id, &patch).await;

        let mut state = self.lock();
        match result {
            Ok(response) => {
                state.store.merge(id, &response);
                state.last_error = None;
                let after = state.store.get(id).cloned().unwrap_or_else(|| {
                    let mut merged = before.clone();
                    merged.apply(&response);
                    merged
                });
                drop(state);
                info!(kind = %E::KIND, id, "edit committed");
                self.notifier.notify(Notice::Edited {
                    kind: E::KIND,
                    id,
                    name: after.display_name().to_string(),
                    changes: before.describe_changes(&after, &response),
                });
                MutationOutcome::Committed
            }
            Err(err) => {
                let notice = Self::record_failure(
                    &mut state,
                    Operation::Edit,
                    Some(id),
                    Some(before.display_name().to_string()),
                    err.code(),
                    err.to_string(),
                );
                drop(state);
                self.notifier.notify(notice);
                MutationOutcome::Failed
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn roll_back(&self, store: &mut EntityStore<E>, rollback: Rollback<E>) {
        match self.settings.rollback {
            RollbackScope::Store => {
                store.restore(rollback.snapshot);
                warn!(kind = %E::KIND, id = rollback.id, "store rolled back");
            }
            RollbackScope::Entity => {
                if store.revision(rollback.id) == rollback.revision {
                    store.insert_at(rollback.position, rollback.original);
                    warn!(kind = %E::KIND, id = rollback.id, "entity rolled back");
                } else {
                    warn!(
                        kind = %E::KIND,
                        id = rollback.id,
                        "entity changed since the optimistic write, rollback skipped"
                    );
                }
            }
        }
    }

    /// Local precondition failure: no remote call, no state change beyond
    /// the error record.
    fn reject(&self, operation: Operation, id: EntityId, code: ErrorCode) {
        let message = match code {
            ErrorCode::EntityNotFound => RemoteError::NotFound(id).to_string(),
            other => other.message().to_string(),
        };
        let notice = {
            let mut state = self.lock();
            let name = state
                .store
                .get(id)
                .map(|entity| entity.display_name().to_string());
            Self::record_failure(&mut state, operation, Some(id), name, code, message)
        };
        self.notifier.notify(notice);
    }

    fn record_failure(
        state: &mut ControllerState<E>,
        operation: Operation,
        id: Option<EntityId>,
        name: Option<String>,
        code: ErrorCode,
        message: String,
    ) -> Notice {
        warn!(kind = %E::KIND, %operation, id, %code, "{message}");
        state.last_error = Some(LastError {
            operation,
            id,
            code,
            message: message.clone(),
        });
        Notice::Failed {
            kind: E::KIND,
            operation,
            id,
            name,
            code,
            message,
        }
    }
}

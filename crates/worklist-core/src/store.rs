//! Authoritative in-memory entity collection.
//!
//! Ids are unique at all times. Partial writes go through
//! [`EntityStore::merge`], a shallow patch that never clears fields the patch
//! omits. Every write bumps a per-entity revision so a rollback can tell
//! whether anything touched the entity after its optimistic apply.

use std::collections::HashMap;

use crate::model::entity::{EntityId, ListEntity};

#[derive(Debug, Clone, PartialEq)]
struct Slot<E> {
    entity: E,
    revision: u64,
}

/// Point-in-time deep copy of a store, used to roll back a failed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<E> {
    slots: Vec<Slot<E>>,
}

impl<E: ListEntity> StoreSnapshot<E> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &E> {
        self.slots.iter().map(|s| &s.entity)
    }
}

#[derive(Debug, Clone)]
pub struct EntityStore<E> {
    slots: Vec<Slot<E>>,
    /// In-flight mutation count per id.
    updating: HashMap<EntityId, usize>,
    next_revision: u64,
}

impl<E> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            updating: HashMap::new(),
            next_revision: 1,
        }
    }
}

impl<E: ListEntity> EntityStore<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: Vec<E>) -> Self {
        let mut store = Self::new();
        store.replace(entities);
        store
    }

    fn bump(&mut self) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        revision
    }

    fn slot(&mut self, entity: E) -> Slot<E> {
        Slot {
            entity,
            revision: self.bump(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every entity, in store order.
    #[must_use]
    pub fn all(&self) -> Vec<E> {
        self.slots.iter().map(|s| s.entity.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.slots.iter().map(|s| &s.entity)
    }

    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.slots.iter().position(|s| s.entity.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.slots
            .iter()
            .find(|s| s.entity.id() == id)
            .map(|s| &s.entity)
    }

    /// Revision of the entity's last write, `None` when absent.
    #[must_use]
    pub fn revision(&self, id: EntityId) -> Option<u64> {
        self.slots
            .iter()
            .find(|s| s.entity.id() == id)
            .map(|s| s.revision)
    }

    /// Insert a new entity at the end, or overwrite an existing one in place.
    ///
    /// A full entity has no omitted fields, so overwriting is the merge.
    /// Partial server payloads go through [`EntityStore::merge`] instead.
    pub fn upsert(&mut self, entity: E) {
        let id = entity.id();
        let slot = self.slot(entity);
        match self.position(id) {
            Some(pos) => self.slots[pos] = slot,
            None => self.slots.push(slot),
        }
    }

    /// Insert a new entity at the front, or overwrite an existing one in place.
    pub fn prepend(&mut self, entity: E) {
        self.insert_at(0, entity);
    }

    /// Insert at `index` (clamped), or overwrite in place if the id exists.
    pub fn insert_at(&mut self, index: usize, entity: E) {
        let id = entity.id();
        let slot = self.slot(entity);
        match self.position(id) {
            Some(pos) => self.slots[pos] = slot,
            None => {
                let index = index.min(self.slots.len());
                self.slots.insert(index, slot);
            }
        }
    }

    /// Shallow-merge `patch` into the entity. Returns `false` if absent.
    pub fn merge(&mut self, id: EntityId, patch: &E::Patch) -> bool {
        let revision = self.bump();
        match self.slots.iter_mut().find(|s| s.entity.id() == id) {
            Some(slot) => {
                slot.entity.apply(patch);
                slot.revision = revision;
                true
            }
            None => false,
        }
    }

    /// Remove the entity, returning its former position and value.
    pub fn remove(&mut self, id: EntityId) -> Option<(usize, E)> {
        let pos = self.position(id)?;
        let slot = self.slots.remove(pos);
        Some((pos, slot.entity))
    }

    /// Replace the whole collection. A repeated id keeps the position of its
    /// first occurrence and the value of its last.
    pub fn replace(&mut self, entities: Vec<E>) {
        let mut slots: Vec<Slot<E>> = Vec::with_capacity(entities.len());
        let mut index: HashMap<EntityId, usize> = HashMap::with_capacity(entities.len());
        for entity in entities {
            let id = entity.id();
            let slot = self.slot(entity);
            match index.get(&id) {
                Some(&pos) => {
                    tracing::warn!(id, "duplicate id in collection, keeping last value");
                    slots[pos] = slot;
                }
                None => {
                    index.insert(id, slots.len());
                    slots.push(slot);
                }
            }
        }
        self.slots = slots;
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot<E> {
        StoreSnapshot {
            slots: self.slots.clone(),
        }
    }

    /// Restore every entity from `snapshot`. Restored entities get fresh
    /// revisions; the updating set is left alone.
    pub fn restore(&mut self, snapshot: StoreSnapshot<E>) {
        let restored: Vec<Slot<E>> = snapshot
            .slots
            .into_iter()
            .map(|s| self.slot(s.entity))
            .collect();
        self.slots = restored;
    }

    pub fn mark_updating(&mut self, id: EntityId) {
        *self.updating.entry(id).or_insert(0) += 1;
    }

    /// Release one in-flight marker for `id`.
    pub fn clear_updating(&mut self, id: EntityId) {
        if let Some(count) = self.updating.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.updating.remove(&id);
            }
        }
    }

    #[must_use]
    pub fn is_updating(&self, id: EntityId) -> bool {
        self.updating.contains_key(&id)
    }

    /// Ids with at least one in-flight mutation, ascending.
    #[must_use]
    pub fn updating_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.updating.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

// ── Generic ordered entity collection ──
//
// Insertion-ordered storage with O(1) id lookups and push-based change
// notification via `watch` channels.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// An ordered, reactive collection for a single entity type.
///
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive. Iteration order is insertion order; replacing an
/// entity keeps its position.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    entries: RwLock<IndexMap<EntityId, Arc<T>>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for cheap reads and subscriptions.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entries: RwLock::new(IndexMap::new()),
            version,
            snapshot,
        }
    }

    /// Append an entity. Returns `false` (and changes nothing) if the id exists.
    pub(crate) fn insert(&self, id: EntityId, entity: T) -> bool {
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if entries.contains_key(&id) {
                return false;
            }
            entries.insert(id, Arc::new(entity));
        }
        self.publish();
        true
    }

    /// Replace an existing entity in place. Returns the previous value.
    pub(crate) fn replace(&self, id: &EntityId, entity: T) -> Option<Arc<T>> {
        let previous = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let slot = entries.get_mut(id)?;
            std::mem::replace(slot, Arc::new(entity))
        };
        self.publish();
        Some(previous)
    }

    /// Edit an entity under the write lock. `edit` works on a copy of the
    /// current value and returns whether it changed anything; only then is
    /// the copy stored and published. Returns the value now in the slot.
    pub(crate) fn modify(
        &self,
        id: &EntityId,
        edit: &mut dyn FnMut(&mut T) -> bool,
    ) -> Option<Arc<T>> {
        let (current, changed) = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let slot = entries.get_mut(id)?;
            let mut next = T::clone(slot.as_ref());
            if edit(&mut next) {
                *slot = Arc::new(next);
                (Arc::clone(slot), true)
            } else {
                (Arc::clone(slot), false)
            }
        };
        if changed {
            self.publish();
        }
        Some(current)
    }

    /// Remove an entity, preserving the order of the rest.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(id);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Rebuild the snapshot, broadcast it, and bump the version.
    fn publish(&self) {
        let values: Vec<Arc<T>> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Arc::clone)
            .collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_existing_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.insert(EntityId::from("1"), "hello".into()));
        assert!(!col.insert(EntityId::from("1"), "world".into()));
        assert_eq!(*col.get(&EntityId::from("1")).unwrap(), "hello");
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        for name in ["c", "a", "b"] {
            col.insert(EntityId::from(name), name.to_owned());
        }
        let snap = col.snapshot();
        let order: Vec<&str> = snap.iter().map(|s| s.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn replace_keeps_position() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert(EntityId::from("a"), "a".into());
        col.insert(EntityId::from("b"), "b".into());
        col.insert(EntityId::from("c"), "c".into());

        let old = col.replace(&EntityId::from("b"), "B".into()).unwrap();
        assert_eq!(*old, "b");
        let snap = col.snapshot();
        assert_eq!(*snap[1], "B");
        assert!(col.replace(&EntityId::from("zzz"), "x".into()).is_none());
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        for name in ["a", "b", "c"] {
            col.insert(EntityId::from(name), name.to_owned());
        }
        assert_eq!(*col.remove(&EntityId::from("a")).unwrap(), "a");
        let snap = col.snapshot();
        assert_eq!(*snap[0], "b");
        assert_eq!(*snap[1], "c");
        assert!(col.remove(&EntityId::from("a")).is_none());
    }

    #[test]
    fn modify_edits_the_current_value() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert(EntityId::from("a"), "a".into());
        col.replace(&EntityId::from("a"), "b".into());

        let seen = col
            .modify(&EntityId::from("a"), &mut |v| {
                v.push('!');
                true
            })
            .unwrap();
        assert_eq!(*seen, "b!");
        assert_eq!(col.version(), 3);

        // Declined edits leave the value and version alone.
        col.modify(&EntityId::from("a"), &mut |v| {
            v.clear();
            false
        });
        assert_eq!(*col.get(&EntityId::from("a")).unwrap(), "b!");
        assert_eq!(col.version(), 3);
        assert!(col.modify(&EntityId::from("zzz"), &mut |_| true).is_none());
    }

    #[test]
    fn every_mutation_bumps_version() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert_eq!(col.version(), 0);
        col.insert(EntityId::from("a"), "a".into());
        col.replace(&EntityId::from("a"), "b".into());
        col.remove(&EntityId::from("a"));
        assert_eq!(col.version(), 3);
        // No-op removal publishes nothing.
        col.remove(&EntityId::from("a"));
        assert_eq!(col.version(), 3);
    }
}

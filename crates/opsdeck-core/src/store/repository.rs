// ── Repository contract ──
//
// Create/read/update/delete over one entity type. Editors only talk to
// this trait; the in-memory implementation backs tests and the CLI, and a
// database-backed one can slot in without touching them.

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::{
    ActiveCall, Alert, Backup, CallFlowMenu, Device, EntityId, InterfaceStats, User, Vlan,
    VpnConnection, VpnServer,
};
use crate::stream::EntityStream;

use super::collection::EntityCollection;

/// A storable record with a stable identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable type name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &EntityId;
}

macro_rules! impl_entity {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: &'static str = $kind;

                fn id(&self) -> &EntityId {
                    &self.id
                }
            }
        )*
    };
}

impl_entity! {
    CallFlowMenu => "menu",
    ActiveCall => "call",
    Device => "device",
    InterfaceStats => "interface",
    Vlan => "vlan",
    VpnServer => "vpn server",
    VpnConnection => "vpn session",
    Alert => "alert",
    Backup => "backup",
    User => "user",
}

/// CRUD contract with id-uniqueness enforcement.
///
/// `list()` returns records in insertion order. Updates replace the whole
/// record; there is no partial patching.
pub trait Repository<T: Entity>: Send + Sync {
    fn list(&self) -> Arc<Vec<Arc<T>>>;

    fn get(&self, id: &EntityId) -> Option<Arc<T>>;

    /// Store a new record. Fails with [`CoreError::DuplicateId`] if the id exists.
    fn create(&self, entity: T) -> Result<Arc<T>, CoreError>;

    /// Replace an existing record. Fails with [`CoreError::NotFound`] otherwise.
    fn update(&self, entity: T) -> Result<Arc<T>, CoreError>;

    /// Remove a record, returning it.
    fn delete(&self, id: &EntityId) -> Result<Arc<T>, CoreError>;

    /// Read-modify-write of one record. `edit` sees the record as it is at
    /// write time and returns whether it changed it; unchanged records are
    /// not written back.
    fn modify(
        &self,
        id: &EntityId,
        edit: &mut dyn FnMut(&mut T) -> bool,
    ) -> Result<Arc<T>, CoreError> {
        let found = self.require(id)?;
        let mut next = T::clone(found.as_ref());
        if edit(&mut next) {
            self.update(next)
        } else {
            Ok(found)
        }
    }

    fn require(&self, id: &EntityId) -> Result<Arc<T>, CoreError> {
        self.get(id)
            .ok_or_else(|| CoreError::not_found(T::KIND, id))
    }

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Entity, R: Repository<T> + ?Sized> Repository<T> for &R {
    fn list(&self) -> Arc<Vec<Arc<T>>> {
        (**self).list()
    }

    fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        (**self).get(id)
    }

    fn create(&self, entity: T) -> Result<Arc<T>, CoreError> {
        (**self).create(entity)
    }

    fn update(&self, entity: T) -> Result<Arc<T>, CoreError> {
        (**self).update(entity)
    }

    fn delete(&self, id: &EntityId) -> Result<Arc<T>, CoreError> {
        (**self).delete(id)
    }

    fn modify(
        &self,
        id: &EntityId,
        edit: &mut dyn FnMut(&mut T) -> bool,
    ) -> Result<Arc<T>, CoreError> {
        (**self).modify(id, edit)
    }
}

impl<T: Entity, R: Repository<T> + ?Sized> Repository<T> for Arc<R> {
    fn list(&self) -> Arc<Vec<Arc<T>>> {
        (**self).list()
    }

    fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        (**self).get(id)
    }

    fn create(&self, entity: T) -> Result<Arc<T>, CoreError> {
        (**self).create(entity)
    }

    fn update(&self, entity: T) -> Result<Arc<T>, CoreError> {
        (**self).update(entity)
    }

    fn delete(&self, id: &EntityId) -> Result<Arc<T>, CoreError> {
        (**self).delete(id)
    }

    fn modify(
        &self,
        id: &EntityId,
        edit: &mut dyn FnMut(&mut T) -> bool,
    ) -> Result<Arc<T>, CoreError> {
        (**self).modify(id, edit)
    }
}

/// In-process repository backed by an ordered [`EntityCollection`].
pub struct InMemoryRepository<T: Entity> {
    collection: EntityCollection<T>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            collection: EntityCollection::new(),
        }
    }

    /// Build a repository from records, keeping the first of any duplicate ids.
    pub fn with_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let repo = Self::new();
        for entity in entities {
            let id = entity.id().clone();
            if !repo.collection.insert(id.clone(), entity) {
                tracing::warn!(kind = T::KIND, %id, "dropping record with duplicate id");
            }
        }
        repo
    }

    pub fn subscribe(&self) -> EntityStream<T> {
        EntityStream::new(self.collection.subscribe())
    }

    /// Mutation counter; bumps on every successful write.
    pub fn version(&self) -> u64 {
        self.collection.version()
    }

    /// Owned copies of every record, in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.collection
            .snapshot()
            .iter()
            .map(|e| T::clone(e))
            .collect()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn list(&self) -> Arc<Vec<Arc<T>>> {
        self.collection.snapshot()
    }

    fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.collection.get(id)
    }

    fn create(&self, entity: T) -> Result<Arc<T>, CoreError> {
        let id = entity.id().clone();
        if !self.collection.insert(id.clone(), entity) {
            return Err(CoreError::DuplicateId {
                entity_type: T::KIND.into(),
                identifier: id.to_string(),
            });
        }
        tracing::debug!(kind = T::KIND, %id, "created");
        self.require(&id)
    }

    fn update(&self, entity: T) -> Result<Arc<T>, CoreError> {
        let id = entity.id().clone();
        self.collection
            .replace(&id, entity)
            .ok_or_else(|| CoreError::not_found(T::KIND, &id))?;
        tracing::debug!(kind = T::KIND, %id, "updated");
        self.require(&id)
    }

    fn delete(&self, id: &EntityId) -> Result<Arc<T>, CoreError> {
        let removed = self
            .collection
            .remove(id)
            .ok_or_else(|| CoreError::not_found(T::KIND, id))?;
        tracing::debug!(kind = T::KIND, %id, "deleted");
        Ok(removed)
    }

    fn modify(
        &self,
        id: &EntityId,
        edit: &mut dyn FnMut(&mut T) -> bool,
    ) -> Result<Arc<T>, CoreError> {
        self.collection
            .modify(id, edit)
            .ok_or_else(|| CoreError::not_found(T::KIND, id))
    }

    fn len(&self) -> usize {
        self.collection.len()
    }

    fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CallFlowMenu;

    fn menu(id: &str, name: &str) -> CallFlowMenu {
        CallFlowMenu {
            id: EntityId::from(id),
            name: name.into(),
            ..CallFlowMenu::placeholder()
        }
    }

    #[test]
    fn create_enforces_unique_ids() {
        let repo = InMemoryRepository::new();
        repo.create(menu("1", "Main")).unwrap();
        let err = repo.create(menu("1", "Other")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { .. }));
        assert_eq!(repo.get(&EntityId::from("1")).unwrap().name, "Main");
    }

    #[test]
    fn update_requires_existing_record() {
        let repo = InMemoryRepository::new();
        let err = repo.update(menu("9", "Ghost")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        repo.create(menu("9", "Real")).unwrap();
        let updated = repo.update(menu("9", "Renamed")).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn delete_returns_removed_record() {
        let repo = InMemoryRepository::with_entities([menu("1", "A"), menu("2", "B")]);
        let removed = repo.delete(&EntityId::from("1")).unwrap();
        assert_eq!(removed.name, "A");
        assert!(repo.delete(&EntityId::from("1")).is_err());
        assert_eq!(repo.to_vec(), vec![menu("2", "B")]);
    }

    #[test]
    fn with_entities_drops_duplicate_ids() {
        let repo = InMemoryRepository::with_entities([menu("1", "A"), menu("1", "B")]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.list()[0].name, "A");
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let repo = InMemoryRepository::new();
        let mut stream = repo.subscribe();
        assert!(stream.current().is_empty());

        repo.create(menu("1", "Main")).unwrap();
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.latest().len(), 1);
    }
}

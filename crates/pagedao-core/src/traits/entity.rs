//! Entity descriptors and the unit of work that stores them.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::parameter::ParamValue;

/// Static description of a persistent entity type.
///
/// Implemented once per entity; replaces runtime discovery of identifier
/// accessors and lifecycle hooks.
pub trait Entity: Send + Sync {
    /// Identifier type.
    type Id: Clone + Send + Sync + Into<ParamValue>;

    /// Entity name as used in query-language statements.
    fn entity_name() -> &'static str;

    /// Identifier, absent until the entity has been inserted.
    fn id(&self) -> Option<&Self::Id>;

    /// Whether saving this entity inserts rather than updates.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Hook run before a new entity is saved.
    fn before_insert(&mut self) {}

    /// Hook run before an existing entity is saved.
    fn before_update(&mut self) {}
}

/// The unit of work tracking entities of type `E`.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Load an entity by identifier.
    async fn get(&self, id: &E::Id) -> AppResult<Option<E>>;

    /// Load every entity of this type.
    async fn find_all(&self) -> AppResult<Vec<E>>;

    /// Insert or update depending on whether the entity is new.
    async fn save_or_update(&self, entity: &E) -> AppResult<()>;

    /// Update an existing entity.
    async fn update(&self, entity: &E) -> AppResult<()>;

    /// Delete an entity.
    async fn delete(&self, entity: &E) -> AppResult<()>;

    /// Push pending changes to the database.
    async fn flush(&self) -> AppResult<()>;

    /// Forget every tracked entity without flushing.
    fn clear(&self);
}

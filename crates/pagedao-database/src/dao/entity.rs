//! Entity lifecycle operations.

use tracing::debug;

use pagedao_core::result::AppResult;
use pagedao_core::traits::{Entity, EntityStore, QueryExecutor};
use pagedao_core::types::parameter::{ParamValue, Parameter};

use super::BaseDao;

impl<T: Entity> BaseDao<T> {
    /// Load an entity by identifier.
    pub async fn get<S>(&self, store: &S, id: &T::Id) -> AppResult<Option<T>>
    where
        S: EntityStore<T>,
    {
        store.get(id).await
    }

    /// Load every entity.
    pub async fn find_all<S>(&self, store: &S) -> AppResult<Vec<T>>
    where
        S: EntityStore<T>,
    {
        store.find_all().await
    }

    /// Save an entity, running its insert or update hook first.
    pub async fn save<S>(&self, store: &S, entity: &mut T) -> AppResult<()>
    where
        S: EntityStore<T>,
    {
        if entity.is_new() {
            entity.before_insert();
        } else {
            entity.before_update();
        }
        store.save_or_update(entity).await
    }

    /// Save several entities in order, stopping at the first failure.
    pub async fn save_all<S>(&self, store: &S, entities: &mut [T]) -> AppResult<()>
    where
        S: EntityStore<T>,
    {
        for entity in entities.iter_mut() {
            self.save(store, entity).await?;
        }
        Ok(())
    }

    /// Update an existing entity without running hooks.
    pub async fn update<S>(&self, store: &S, entity: &T) -> AppResult<()>
    where
        S: EntityStore<T>,
    {
        store.update(entity).await
    }

    /// Delete an entity through the unit of work.
    pub async fn delete_entity<S>(&self, store: &S, entity: &T) -> AppResult<()>
    where
        S: EntityStore<T>,
    {
        store.delete(entity).await
    }

    /// Flush pending changes.
    pub async fn flush<S>(&self, store: &S) -> AppResult<()>
    where
        S: EntityStore<T>,
    {
        store.flush().await
    }

    /// Drop every tracked entity without flushing.
    pub fn clear<S>(&self, store: &S)
    where
        S: EntityStore<T>,
    {
        store.clear();
    }

    /// Physically delete by identifier, returning affected rows.
    pub async fn delete_by_id<X>(&self, session: &X, id: T::Id) -> AppResult<u64>
    where
        X: QueryExecutor,
    {
        let ql = format!("delete from {} where id = :p1", T::entity_name());
        let deleted = self
            .execute_update(session, &ql, Some(&Parameter::positional([id])))
            .await?;
        debug!(entity = T::entity_name(), deleted, "Deleted by id");
        Ok(deleted)
    }

    /// Set the soft-delete flag, returning affected rows.
    pub async fn update_del_flag<X>(
        &self,
        session: &X,
        id: T::Id,
        del_flag: impl Into<ParamValue>,
    ) -> AppResult<u64>
    where
        X: QueryExecutor,
    {
        let ql = format!(
            "update {} set del_flag = :p2 where id = :p1",
            T::entity_name()
        );
        let params = Parameter::new().with("p1", id).with("p2", del_flag);
        self.execute_update(session, &ql, Some(&params)).await
    }
}

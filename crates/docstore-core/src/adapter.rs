// The adapter contract — a uniform CRUD/query facade over a document store.
//
// Backends delegate every operation to their driver and surface its errors
// unchanged; there is no adapter-side retry, caching, or ordering beyond
// what the driver provides. Lifecycle methods take &mut self so the handle
// cannot be replaced while data calls are in flight.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::binding::ModelBinding;
use crate::context::ServiceContext;
use crate::error::StoreResult;
use crate::filters::QueryFilters;

/// The core database adapter trait.
///
/// Every backend (MongoDB, memory) implements this trait. Entities are
/// `serde_json::Value` objects so the contract stays schema-agnostic; the
/// bound schema only informs what the backend enforces on its own store.
///
/// Calling any data operation before `connect` resolves fails with
/// `StoreError::Connection`. Single-entity lookups report absence as
/// `Ok(None)`.
#[async_trait]
pub trait DbAdapter: Send + Sync + fmt::Debug {
    /// Bind the service context and model. No store side effect; binding
    /// problems are reported synchronously.
    fn init(&mut self, ctx: ServiceContext, binding: ModelBinding) -> StoreResult<()>;

    /// Establish the store connection from the configured URI/options.
    async fn connect(&mut self) -> StoreResult<()>;

    /// Release the connection. Safe to call once after connect; a no-op
    /// when never connected.
    async fn disconnect(&mut self) -> StoreResult<()>;

    /// Find all entities matching the filters. Empty filters return all
    /// entities, bounded only by store defaults.
    async fn find(&self, filters: &QueryFilters) -> StoreResult<Vec<Value>>;

    /// Find a single entity by raw query.
    async fn find_one(&self, query: &Value) -> StoreResult<Option<Value>>;

    /// Find an entity by its native id.
    async fn find_by_id(&self, id: &Value) -> StoreResult<Option<Value>>;

    /// Find entities by a list of native ids.
    async fn find_by_ids(&self, ids: &[Value]) -> StoreResult<Vec<Value>>;

    /// Count entities matching the filters' query/search; sort, offset and
    /// limit are ignored.
    async fn count(&self, filters: &QueryFilters) -> StoreResult<u64>;

    /// Persist a new entity; returns the persisted form including the
    /// generated identifier.
    async fn insert(&self, entity: Value) -> StoreResult<Value>;

    /// Persist many new entities; returns the persisted forms in input
    /// order.
    async fn insert_many(&self, entities: Vec<Value>) -> StoreResult<Vec<Value>>;

    /// Apply a partial update to all entities matching the query; returns
    /// the number of affected entities.
    async fn update_many(&self, query: &Value, update: &Value) -> StoreResult<u64>;

    /// Apply a partial update to one entity by id; returns the updated
    /// entity.
    async fn update_by_id(&self, id: &Value, update: &Value) -> StoreResult<Option<Value>>;

    /// Delete all entities matching the query; returns the number deleted.
    async fn remove_many(&self, query: &Value) -> StoreResult<u64>;

    /// Delete one entity by id; returns the removed entity.
    async fn remove_by_id(&self, id: &Value) -> StoreResult<Option<Value>>;

    /// Delete every entity in the bound collection.
    async fn clear(&self) -> StoreResult<()>;

    /// Rename the user-facing id field to the store's native id field.
    /// Pure and synchronous; inverse of `after_retrieve_transform_id`.
    fn before_save_transform_id(&self, entity: Value, id_field: &str) -> Value;

    /// Rename the store's native id field back to the user-facing one.
    /// Pure and synchronous; inverse of `before_save_transform_id`.
    fn after_retrieve_transform_id(&self, entity: Value, id_field: &str) -> Value;
}

/// Move a field of a JSON object to a new name, dropping nothing else.
///
/// The shared implementation behind the id transforms: both backends store
/// their native id under `_id`, so the transform is a pure rename in the
/// JSON domain. Non-object values pass through untouched.
pub fn rename_id_field(mut entity: Value, from: &str, to: &str) -> Value {
    if from == to {
        return entity;
    }
    if let Some(obj) = entity.as_object_mut() {
        if let Some(value) = obj.remove(from) {
            obj.insert(to.to_string(), value);
        }
    }
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rename_id_field() {
        let entity = json!({ "code": "u1", "name": "Alice" });
        let renamed = rename_id_field(entity, "code", "_id");
        assert_eq!(renamed, json!({ "_id": "u1", "name": "Alice" }));
    }

    #[test]
    fn test_rename_round_trip() {
        let entity = json!({ "code": "u1", "name": "Alice" });
        let there = rename_id_field(entity.clone(), "code", "_id");
        let back = rename_id_field(there, "_id", "code");
        assert_eq!(back, entity);
    }

    #[test]
    fn test_rename_missing_field_is_noop() {
        let entity = json!({ "name": "Alice" });
        assert_eq!(
            rename_id_field(entity.clone(), "code", "_id"),
            entity
        );
    }

    #[test]
    fn test_rename_same_name_is_noop() {
        let entity = json!({ "_id": "u1" });
        assert_eq!(rename_id_field(entity.clone(), "_id", "_id"), entity);
    }

    #[test]
    fn test_rename_non_object_passes_through() {
        let entity = json!("scalar");
        assert_eq!(rename_id_field(entity.clone(), "a", "b"), entity);
    }
}

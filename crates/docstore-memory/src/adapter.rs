// MemoryAdapter — Vec-backed implementation of the docstore contract.
//
// Semantics track the MongoDB backend: the same lifecycle guards, the same
// `_id` native identifier, a subset of the query operators, and identical
// search/sort/offset/limit behavior. Data is dropped on disconnect.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use docstore_core::adapter::{rename_id_field, DbAdapter};
use docstore_core::binding::{Model, ModelBinding};
use docstore_core::context::ServiceContext;
use docstore_core::error::{StoreError, StoreResult};
use docstore_core::filters::{QueryFilters, SortDirection, SortSpec};
use docstore_core::ids::generate_id;

/// The store's native identifier field, kept in line with the MongoDB
/// backend so the id transforms behave identically.
pub const NATIVE_ID_FIELD: &str = "_id";

type Store = Arc<RwLock<Vec<Value>>>;

/// In-memory adapter implementing the docstore contract.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    ctx: Option<ServiceContext>,
    model: Option<Model>,
    store: Option<Store>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound model, once init has run.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Snapshot of all stored entities, for inspection in tests.
    pub async fn snapshot(&self) -> StoreResult<Vec<Value>> {
        Ok(self.store()?.read().await.clone())
    }

    /// Number of stored entities.
    pub async fn len(&self) -> StoreResult<usize> {
        Ok(self.store()?.read().await.len())
    }

    pub async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Convert a store-native entity into a plain data object. Memory
    /// entities already are plain objects, so this is a copy.
    pub fn entity_to_object(&self, entity: &Value) -> Value {
        entity.clone()
    }

    fn store(&self) -> StoreResult<&Store> {
        self.store.as_ref().ok_or_else(|| {
            StoreError::Connection("adapter is not connected; call connect() first".into())
        })
    }
}

/// Check a raw query value for shapes the matcher cannot serve.
fn check_query(query: &Value) -> StoreResult<()> {
    if !query.is_object() && !query.is_null() {
        return Err(StoreError::Query(
            "filter query must be a JSON object".into(),
        ));
    }
    Ok(())
}

/// Whether a record satisfies a raw query object. Conditions are AND-ed;
/// a condition value that is all operator keys is an operator match,
/// anything else is deep equality.
fn matches_query(record: &Value, query: &Value) -> bool {
    let Some(conditions) = query.as_object() else {
        return true;
    };
    conditions.iter().all(|(field, expected)| {
        let actual = record.get(field).cloned().unwrap_or(Value::Null);
        match expected.as_object() {
            Some(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => ops
                .iter()
                .all(|(op, operand)| match_operator(&actual, op, operand)),
            _ => actual == *expected,
        }
    })
}

/// Match one operator condition. Unknown operators match nothing.
fn match_operator(actual: &Value, op: &str, operand: &Value) -> bool {
    match op {
        "$eq" => actual == operand,
        "$ne" => actual != operand,
        "$in" => operand.as_array().is_some_and(|arr| arr.contains(actual)),
        "$nin" => operand.as_array().is_some_and(|arr| !arr.contains(actual)),
        "$lt" => compare_json(actual, operand).is_some_and(|c| c < 0),
        "$lte" => compare_json(actual, operand).is_some_and(|c| c <= 0),
        "$gt" => compare_json(actual, operand).is_some_and(|c| c > 0),
        "$gte" => compare_json(actual, operand).is_some_and(|c| c >= 0),
        // A missing field reads as Null here, so null-valued fields count
        // as absent.
        "$exists" => operand
            .as_bool()
            .is_some_and(|want| want == !actual.is_null()),
        _ => false,
    }
}

/// Compare two JSON scalars numerically or lexicographically.
fn compare_json(a: &Value, b: &Value) -> Option<i8> {
    match (a, b) {
        (Value::Number(an), Value::Number(bn)) => {
            let af = an.as_f64()?;
            let bf = bn.as_f64()?;
            af.partial_cmp(&bf).map(|o| match o {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            })
        }
        (Value::String(a_s), Value::String(b_s)) => Some(match a_s.cmp(b_s) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }),
        _ => None,
    }
}

/// Case-insensitive substring match across the search fields.
fn matches_search(record: &Value, term: &str, fields: &[String]) -> bool {
    let needle = term.to_lowercase();
    fields.iter().any(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&needle))
    })
}

fn matches_filters(record: &Value, filters: &QueryFilters) -> bool {
    if let Some(query) = &filters.query {
        if !matches_query(record, query) {
            return false;
        }
    }
    if filters.has_search() {
        let term = filters.search.as_deref().unwrap_or_default();
        if !matches_search(record, term, &filters.search_fields) {
            return false;
        }
    }
    true
}

/// Apply a sort spec in field order.
fn sort_entities(entities: &mut [Value], spec: &SortSpec) {
    entities.sort_by(|a, b| {
        for field in &spec.fields {
            let cmp = match (a.get(&field.field), b.get(&field.field)) {
                (Some(av), Some(bv)) => compare_json(av, bv).unwrap_or(0),
                (Some(_), None) => 1,
                (None, Some(_)) => -1,
                (None, None) => 0,
            };
            let ord = match field.direction {
                SortDirection::Asc => cmp.cmp(&0),
                SortDirection::Desc => cmp.cmp(&0).reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Merge plain fields into a record.
fn merge_fields(record: &mut Value, data: &Value) {
    if let (Some(rec), Some(fields)) = (record.as_object_mut(), data.as_object()) {
        for (key, value) in fields {
            rec.insert(key.clone(), value.clone());
        }
    }
}

/// Apply an update value to a record, with the same shape rules as the
/// MongoDB backend: plain field maps merge, all-operator maps apply
/// `$set`/`$unset`/`$inc`, mixed maps are rejected.
fn apply_update(record: &mut Value, update: &Value) -> StoreResult<()> {
    let map = update
        .as_object()
        .ok_or_else(|| StoreError::Query("update must be a JSON object".into()))?;
    if map.is_empty() {
        return Err(StoreError::Query("update must not be empty".into()));
    }
    let operator_keys = map.keys().filter(|k| k.starts_with('$')).count();
    if operator_keys == 0 {
        merge_fields(record, update);
        return Ok(());
    }
    if operator_keys != map.len() {
        return Err(StoreError::Query(
            "update must use either operator keys or plain field assignments, not both".into(),
        ));
    }
    for (op, args) in map {
        match op.as_str() {
            "$set" => merge_fields(record, args),
            "$unset" => {
                if let (Some(rec), Some(keys)) = (record.as_object_mut(), args.as_object()) {
                    for key in keys.keys() {
                        rec.remove(key);
                    }
                }
            }
            "$inc" => {
                if let (Some(rec), Some(increments)) = (record.as_object_mut(), args.as_object()) {
                    for (key, delta) in increments {
                        let current = rec.get(key).and_then(Value::as_f64).unwrap_or(0.0);
                        let sum = current + delta.as_f64().unwrap_or(0.0);
                        let value = if sum.fract() == 0.0 && sum.abs() < i64::MAX as f64 {
                            Value::from(sum as i64)
                        } else {
                            Value::from(sum)
                        };
                        rec.insert(key.clone(), value);
                    }
                }
            }
            other => {
                return Err(StoreError::Query(format!(
                    "unsupported update operator '{other}'"
                )))
            }
        }
    }
    Ok(())
}

/// Insert one entity into the locked store, minting an id when absent.
fn insert_locked(entities: &mut Vec<Value>, mut entity: Value) -> StoreResult<Value> {
    let obj = entity
        .as_object_mut()
        .ok_or_else(|| StoreError::Query("entity must be a JSON object".into()))?;
    match obj.get(NATIVE_ID_FIELD) {
        None | Some(Value::Null) => {
            obj.insert(NATIVE_ID_FIELD.to_string(), Value::String(generate_id()));
        }
        Some(_) => {}
    }
    let id = entity[NATIVE_ID_FIELD].clone();
    if entities.iter().any(|e| e.get(NATIVE_ID_FIELD) == Some(&id)) {
        return Err(StoreError::Store(format!("duplicate id: {id}")));
    }
    entities.push(entity.clone());
    Ok(entity)
}

#[async_trait]
impl DbAdapter for MemoryAdapter {
    fn init(&mut self, ctx: ServiceContext, binding: ModelBinding) -> StoreResult<()> {
        let model = binding.resolve()?;
        ctx.logger.debug(&format!(
            "bound model '{}' for service '{}'",
            model.name, ctx.service_name
        ));
        self.model = Some(model);
        self.ctx = Some(ctx);
        Ok(())
    }

    async fn connect(&mut self) -> StoreResult<()> {
        let ctx = self.ctx.as_ref().ok_or_else(|| {
            StoreError::Config("adapter is not initialized; call init() before connect()".into())
        })?;
        self.store = Some(Arc::new(RwLock::new(Vec::new())));
        ctx.logger.info("memory store ready");
        Ok(())
    }

    async fn disconnect(&mut self) -> StoreResult<()> {
        if self.store.take().is_some() {
            if let Some(ctx) = &self.ctx {
                ctx.logger.info("memory store dropped");
            }
        }
        Ok(())
    }

    async fn find(&self, filters: &QueryFilters) -> StoreResult<Vec<Value>> {
        filters.validate()?;
        let store = self.store()?.read().await;
        let mut result: Vec<Value> = store
            .iter()
            .filter(|record| matches_filters(record, filters))
            .cloned()
            .collect();
        drop(store);

        if let Some(sort) = &filters.sort {
            sort_entities(&mut result, sort);
        }
        if let Some(offset) = filters.offset {
            if (offset as usize) < result.len() {
                result = result.split_off(offset as usize);
            } else {
                result.clear();
            }
        }
        if let Some(limit) = filters.limit {
            result.truncate(limit.max(0) as usize);
        }
        Ok(result)
    }

    async fn find_one(&self, query: &Value) -> StoreResult<Option<Value>> {
        check_query(query)?;
        let store = self.store()?.read().await;
        Ok(store
            .iter()
            .find(|record| matches_query(record, query))
            .cloned())
    }

    async fn find_by_id(&self, id: &Value) -> StoreResult<Option<Value>> {
        let store = self.store()?.read().await;
        Ok(store
            .iter()
            .find(|record| record.get(NATIVE_ID_FIELD) == Some(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Value]) -> StoreResult<Vec<Value>> {
        let store = self.store()?.read().await;
        Ok(store
            .iter()
            .filter(|record| {
                record
                    .get(NATIVE_ID_FIELD)
                    .is_some_and(|id| ids.contains(id))
            })
            .cloned()
            .collect())
    }

    async fn count(&self, filters: &QueryFilters) -> StoreResult<u64> {
        filters.validate()?;
        let store = self.store()?.read().await;
        Ok(store
            .iter()
            .filter(|record| matches_filters(record, filters))
            .count() as u64)
    }

    async fn insert(&self, entity: Value) -> StoreResult<Value> {
        let mut store = self.store()?.write().await;
        insert_locked(&mut store, entity)
    }

    async fn insert_many(&self, entities: Vec<Value>) -> StoreResult<Vec<Value>> {
        let mut store = self.store()?.write().await;
        entities
            .into_iter()
            .map(|entity| insert_locked(&mut store, entity))
            .collect()
    }

    async fn update_many(&self, query: &Value, update: &Value) -> StoreResult<u64> {
        check_query(query)?;
        let mut store = self.store()?.write().await;
        let mut count = 0u64;
        for record in store.iter_mut() {
            if matches_query(record, query) {
                apply_update(record, update)?;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn update_by_id(&self, id: &Value, update: &Value) -> StoreResult<Option<Value>> {
        let mut store = self.store()?.write().await;
        match store
            .iter_mut()
            .find(|record| record.get(NATIVE_ID_FIELD) == Some(id))
        {
            Some(record) => {
                apply_update(record, update)?;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove_many(&self, query: &Value) -> StoreResult<u64> {
        check_query(query)?;
        let mut store = self.store()?.write().await;
        let before = store.len();
        store.retain(|record| !matches_query(record, query));
        Ok((before - store.len()) as u64)
    }

    async fn remove_by_id(&self, id: &Value) -> StoreResult<Option<Value>> {
        let mut store = self.store()?.write().await;
        match store
            .iter()
            .position(|record| record.get(NATIVE_ID_FIELD) == Some(id))
        {
            Some(pos) => Ok(Some(store.remove(pos))),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> StoreResult<()> {
        self.store()?.write().await.clear();
        Ok(())
    }

    fn before_save_transform_id(&self, entity: Value, id_field: &str) -> Value {
        rename_id_field(entity, id_field, NATIVE_ID_FIELD)
    }

    fn after_retrieve_transform_id(&self, entity: Value, id_field: &str) -> Value {
        rename_id_field(entity, NATIVE_ID_FIELD, id_field)
    }
}

// Query translation — converts contract-level filters and entities into
// MongoDB BSON documents, and documents back into plain JSON objects.
//
// Identifier handling: string ids that parse as ObjectId hex are coerced to
// ObjectId on the way in, and ObjectId values come back as their hex string,
// so caller-supplied ids round-trip unchanged.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use serde_json::Value;

use docstore_core::error::{StoreError, StoreResult};
use docstore_core::filters::{QueryFilters, SortDirection, SortSpec};

use crate::adapter::NATIVE_ID_FIELD;

/// Convert a JSON value to BSON.
pub fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::String(n.to_string())
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            let mut out = Document::new();
            for (key, item) in map {
                out.insert(key.clone(), json_to_bson(item));
            }
            Bson::Document(out)
        }
    }
}

/// Convert a BSON value to JSON. ObjectId becomes its hex string and
/// DateTime its epoch millis; types with no JSON counterpart become null.
pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => serde_json::json!(*f),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::from(dt.timestamp_millis()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => doc_to_json(d),
        _ => Value::Null,
    }
}

/// Convert a store document into a plain JSON object. Keys are kept as-is;
/// renaming the native id field is the caller-driven id transform, not a
/// conversion concern.
pub fn doc_to_json(document: &Document) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in document {
        map.insert(key.clone(), bson_to_json(value));
    }
    Value::Object(map)
}

/// Convert an id value to BSON, coercing ObjectId-shaped strings.
pub fn id_to_bson(id: &Value) -> Bson {
    match id {
        Value::String(s) => match ObjectId::parse_str(s) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(s.clone()),
        },
        other => json_to_bson(other),
    }
}

/// Id values inside a filter: plain ids, id lists, and operator objects
/// (`{"$in": [...]}`) all get ObjectId coercion on their leaves.
fn id_filter_to_bson(value: &Value) -> Bson {
    match value {
        Value::String(_) => id_to_bson(value),
        Value::Array(items) => Bson::Array(items.iter().map(id_to_bson).collect()),
        Value::Object(map) => {
            let mut out = Document::new();
            for (key, item) in map {
                out.insert(key.clone(), id_filter_to_bson(item));
            }
            Bson::Document(out)
        }
        other => json_to_bson(other),
    }
}

/// Convert a raw query object into a filter document.
pub fn json_to_filter_doc(query: &Value) -> StoreResult<Document> {
    match query {
        Value::Null => Ok(Document::new()),
        Value::Object(map) => {
            let mut out = Document::new();
            for (key, value) in map {
                let bson = if key == NATIVE_ID_FIELD {
                    id_filter_to_bson(value)
                } else {
                    json_to_bson(value)
                };
                out.insert(key.clone(), bson);
            }
            Ok(out)
        }
        _ => Err(StoreError::Query(
            "filter query must be a JSON object".into(),
        )),
    }
}

/// Build the complete filter for a read: the raw query merged with the
/// free-text search condition.
pub fn build_filter(filters: &QueryFilters) -> StoreResult<Document> {
    filters.validate()?;
    let base = match &filters.query {
        Some(query) => json_to_filter_doc(query)?,
        None => Document::new(),
    };
    if !filters.has_search() {
        return Ok(base);
    }
    let term = filters.search.as_deref().unwrap_or_default();
    let search = search_condition(term, &filters.search_fields);
    if base.is_empty() {
        Ok(search)
    } else {
        Ok(doc! { "$and": [base, search] })
    }
}

/// Case-insensitive escaped substring match, OR-ed across the search fields.
pub fn search_condition(term: &str, fields: &[String]) -> Document {
    let pattern = regex_escape(term);
    let conditions: Vec<Document> = fields
        .iter()
        .map(|field| {
            let mut condition = Document::new();
            condition.insert(
                field.clone(),
                doc! { "$regex": pattern.clone(), "$options": "i" },
            );
            condition
        })
        .collect();
    doc! { "$or": conditions }
}

/// Build a sort document from a parsed sort spec.
pub fn build_sort(spec: &SortSpec) -> Document {
    let mut out = Document::new();
    for field in &spec.fields {
        let direction = match field.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        out.insert(field.field.clone(), direction);
    }
    out
}

/// Convert an entity into an insert document, coercing a supplied id.
pub fn build_insert_doc(entity: &Value) -> StoreResult<Document> {
    let map = entity
        .as_object()
        .ok_or_else(|| StoreError::Query("entity must be a JSON object".into()))?;
    let mut out = Document::new();
    for (key, value) in map {
        let bson = if key == NATIVE_ID_FIELD {
            id_to_bson(value)
        } else {
            json_to_bson(value)
        };
        out.insert(key.clone(), bson);
    }
    Ok(out)
}

/// Convert an update value into an update document. Plain field maps are
/// wrapped in `$set`; maps whose keys are all operators pass through;
/// mixing the two is rejected.
pub fn build_update_doc(update: &Value) -> StoreResult<Document> {
    let map = update
        .as_object()
        .ok_or_else(|| StoreError::Query("update must be a JSON object".into()))?;
    if map.is_empty() {
        return Err(StoreError::Query("update must not be empty".into()));
    }
    let operator_keys = map.keys().filter(|k| k.starts_with('$')).count();
    if operator_keys == map.len() {
        let mut out = Document::new();
        for (key, value) in map {
            out.insert(key.clone(), json_to_bson(value));
        }
        Ok(out)
    } else if operator_keys == 0 {
        let mut set = Document::new();
        for (key, value) in map {
            set.insert(key.clone(), json_to_bson(value));
        }
        Ok(doc! { "$set": set })
    } else {
        Err(StoreError::Query(
            "update must use either operator keys or plain field assignments, not both".into(),
        ))
    }
}

/// Merge the driver-reported inserted id into the entity.
pub fn with_inserted_id(mut entity: Value, id: &Bson) -> Value {
    if let Some(obj) = entity.as_object_mut() {
        obj.insert(NATIVE_ID_FIELD.to_string(), bson_to_json(id));
    }
    entity
}

/// Escape regex special characters so search terms match literally.
fn regex_escape(s: &str) -> String {
    let special = [
        '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\',
    ];
    let mut escaped = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OID: &str = "507f1f77bcf86cd799439011";

    #[test]
    fn test_json_to_bson_scalars() {
        assert_eq!(json_to_bson(&json!("hello")), Bson::String("hello".into()));
        assert_eq!(json_to_bson(&json!(42)), Bson::Int64(42));
        assert_eq!(json_to_bson(&json!(1.5)), Bson::Double(1.5));
        assert_eq!(json_to_bson(&Value::Null), Bson::Null);
    }

    #[test]
    fn test_bson_to_json_object_id() {
        let oid = ObjectId::parse_str(OID).unwrap();
        assert_eq!(bson_to_json(&Bson::ObjectId(oid)), json!(OID));
    }

    #[test]
    fn test_doc_to_json_keeps_native_id() {
        let document = doc! { "_id": "u1", "name": "Alice" };
        let entity = doc_to_json(&document);
        assert_eq!(entity["_id"], "u1");
        assert_eq!(entity["name"], "Alice");
    }

    #[test]
    fn test_id_to_bson_coerces_object_id_hex() {
        assert_eq!(
            id_to_bson(&json!(OID)),
            Bson::ObjectId(ObjectId::parse_str(OID).unwrap())
        );
        assert_eq!(id_to_bson(&json!("plain-id")), Bson::String("plain-id".into()));
        assert_eq!(id_to_bson(&json!(7)), Bson::Int64(7));
    }

    #[test]
    fn test_filter_doc_coerces_id_operators() {
        let filter = json_to_filter_doc(&json!({ "_id": { "$in": [OID, "k2"] } })).unwrap();
        let list = filter
            .get_document("_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(list[0], Bson::ObjectId(ObjectId::parse_str(OID).unwrap()));
        assert_eq!(list[1], Bson::String("k2".into()));
    }

    #[test]
    fn test_filter_doc_rejects_non_object() {
        assert!(json_to_filter_doc(&json!([1, 2])).unwrap_err().is_query());
    }

    #[test]
    fn test_build_filter_query_only() {
        let filters = QueryFilters::new().with_query(json!({ "status": "active" }));
        let filter = build_filter(&filters).unwrap();
        assert_eq!(filter, doc! { "status": "active" });
    }

    #[test]
    fn test_build_filter_search_only() {
        let filters = QueryFilters::new().with_search("ali", ["name", "email"]);
        let filter = build_filter(&filters).unwrap();
        let or = filter.get_array("$or").unwrap();
        assert_eq!(or.len(), 2);
    }

    #[test]
    fn test_build_filter_merges_query_and_search() {
        let filters = QueryFilters::new()
            .with_query(json!({ "status": "active" }))
            .with_search("ali", ["name"]);
        let filter = build_filter(&filters).unwrap();
        assert!(filter.contains_key("$and"));
    }

    #[test]
    fn test_build_filter_search_without_fields_errors() {
        let filters = QueryFilters {
            search: Some("ali".into()),
            ..Default::default()
        };
        assert!(build_filter(&filters).unwrap_err().is_query());
    }

    #[test]
    fn test_search_condition_escapes_regex() {
        let condition = search_condition("a.b", &["name".to_string()]);
        let or = condition.get_array("$or").unwrap();
        let Bson::Document(first) = &or[0] else {
            panic!("expected a document");
        };
        assert_eq!(
            first.get_document("name").unwrap().get_str("$regex").unwrap(),
            "a\\.b"
        );
    }

    #[test]
    fn test_build_sort() {
        let sort = build_sort(&SortSpec::parse("age -name"));
        assert_eq!(sort, doc! { "age": 1, "name": -1 });
    }

    #[test]
    fn test_build_insert_doc_coerces_id() {
        let document = build_insert_doc(&json!({ "_id": OID, "name": "Alice" })).unwrap();
        assert_eq!(
            document.get("_id"),
            Some(&Bson::ObjectId(ObjectId::parse_str(OID).unwrap()))
        );
    }

    #[test]
    fn test_build_insert_doc_rejects_non_object() {
        assert!(build_insert_doc(&json!("nope")).unwrap_err().is_query());
    }

    #[test]
    fn test_build_update_doc_wraps_plain_fields() {
        let update = build_update_doc(&json!({ "name": "Bob" })).unwrap();
        assert_eq!(update, doc! { "$set": { "name": "Bob" } });
    }

    #[test]
    fn test_build_update_doc_passes_operators_through() {
        let update = build_update_doc(&json!({ "$inc": { "age": 1 } })).unwrap();
        assert!(update.contains_key("$inc"));
        assert!(!update.contains_key("$set"));
    }

    #[test]
    fn test_build_update_doc_rejects_mixed_keys() {
        let err = build_update_doc(&json!({ "$inc": { "age": 1 }, "name": "Bob" })).unwrap_err();
        assert!(err.is_query());
    }

    #[test]
    fn test_with_inserted_id() {
        let oid = ObjectId::parse_str(OID).unwrap();
        let entity = with_inserted_id(json!({ "name": "Alice" }), &Bson::ObjectId(oid));
        assert_eq!(entity["_id"], json!(OID));
    }
}

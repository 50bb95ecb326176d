// Adapter compliance checks — exercise the shared DbAdapter contract
// against any backend.
//
// run_all expects an initialized, connected adapter bound to a collection
// the suite may freely wipe; check_lifecycle_guard expects an adapter that
// has NOT been connected. Failures carry enough context to name the
// offending check.

use anyhow::{ensure, Context, Result};
use serde_json::json;

use docstore_core::adapter::DbAdapter;
use docstore_core::filters::QueryFilters;

/// Run every contract check against a connected adapter. The bound
/// collection is cleared between checks.
pub async fn run_all(adapter: &dyn DbAdapter) -> Result<()> {
    check_transform_round_trip(adapter)?;
    check_insert_then_find_by_id(adapter).await?;
    check_count_matches_find(adapter).await?;
    check_update(adapter).await?;
    check_remove(adapter).await?;
    check_clear(adapter).await?;
    Ok(())
}

/// Data operations on a never-connected adapter must fail with a
/// connection error, not silently no-op.
pub async fn check_lifecycle_guard(adapter: &dyn DbAdapter) -> Result<()> {
    let err = adapter
        .find(&QueryFilters::new())
        .await
        .err()
        .context("find before connect must fail")?;
    ensure!(err.is_connection(), "find before connect: got {err}");

    let err = adapter
        .insert(json!({ "name": "x" }))
        .await
        .err()
        .context("insert before connect must fail")?;
    ensure!(err.is_connection(), "insert before connect: got {err}");

    let err = adapter
        .count(&QueryFilters::new())
        .await
        .err()
        .context("count before connect must fail")?;
    ensure!(err.is_connection(), "count before connect: got {err}");
    Ok(())
}

/// The id transforms must be inverse renames over the same field.
pub fn check_transform_round_trip(adapter: &dyn DbAdapter) -> Result<()> {
    let entity = json!({ "userId": "u-42", "name": "Alice", "age": 30 });
    let saved = adapter.before_save_transform_id(entity.clone(), "userId");
    ensure!(
        saved.get("userId").is_none(),
        "before_save must remove the user-facing id field"
    );
    let restored = adapter.after_retrieve_transform_id(saved, "userId");
    ensure!(
        restored == entity,
        "transform round trip must reconstruct the entity: {restored}"
    );
    Ok(())
}

async fn check_insert_then_find_by_id(adapter: &dyn DbAdapter) -> Result<()> {
    adapter.clear().await?;

    let saved = adapter.insert(json!({ "name": "Alice" })).await?;
    let id = saved.get("_id").context("insert must report an id")?.clone();
    ensure!(!id.is_null(), "generated id must not be null");

    let found = adapter
        .find_by_id(&id)
        .await?
        .context("inserted entity must be findable by id")?;
    ensure!(found["name"] == "Alice", "found entity mismatch: {found}");

    // Explicitly supplied ids survive the save/retrieve cycle.
    let saved = adapter
        .insert(json!({ "_id": "pinned-1", "name": "Bob" }))
        .await?;
    ensure!(saved["_id"] == "pinned-1", "supplied id must be kept");
    let found = adapter.find_by_id(&json!("pinned-1")).await?;
    ensure!(found.is_some(), "supplied id must be findable");
    Ok(())
}

async fn check_count_matches_find(adapter: &dyn DbAdapter) -> Result<()> {
    adapter.clear().await?;
    adapter
        .insert_many(crate::json::sample_entities(6))
        .await?;

    let filters = QueryFilters::new().with_query(json!({ "active": true }));
    let found = adapter.find(&filters).await?;
    let counted = adapter.count(&filters).await?;
    ensure!(
        found.len() as u64 == counted,
        "count ({counted}) must equal find length ({}) without paging",
        found.len()
    );

    let all = adapter.count(&QueryFilters::new()).await?;
    ensure!(all == 6, "unfiltered count must see all entities, got {all}");
    Ok(())
}

async fn check_update(adapter: &dyn DbAdapter) -> Result<()> {
    adapter.clear().await?;
    let saved = adapter
        .insert(json!({ "name": "Carol", "age": 30 }))
        .await?;
    let id = saved["_id"].clone();

    let updated = adapter
        .update_by_id(&id, &json!({ "age": 31 }))
        .await?
        .context("update_by_id must return the updated entity")?;
    ensure!(updated["age"] == 31, "update must apply: {updated}");
    ensure!(updated["name"] == "Carol", "update must not drop fields");

    let missing = adapter
        .update_by_id(&json!("no-such-id"), &json!({ "age": 1 }))
        .await?;
    ensure!(missing.is_none(), "updating a missing id must return None");

    let affected = adapter
        .update_many(&json!({ "name": "Carol" }), &json!({ "tier": "gold" }))
        .await?;
    ensure!(affected == 1, "update_many must report affected count");
    Ok(())
}

async fn check_remove(adapter: &dyn DbAdapter) -> Result<()> {
    adapter.clear().await?;
    let saved = adapter.insert(json!({ "name": "Dave" })).await?;
    let id = saved["_id"].clone();

    let removed = adapter
        .remove_by_id(&id)
        .await?
        .context("remove_by_id must return the removed entity")?;
    ensure!(removed["name"] == "Dave", "removed entity mismatch");

    let gone = adapter.find_by_id(&id).await?;
    ensure!(gone.is_none(), "removed entity must not be findable");

    adapter
        .insert_many(crate::json::sample_entities(4))
        .await?;
    let deleted = adapter.remove_many(&json!({ "active": true })).await?;
    ensure!(deleted == 2, "remove_many must report deleted count, got {deleted}");
    Ok(())
}

async fn check_clear(adapter: &dyn DbAdapter) -> Result<()> {
    adapter
        .insert_many(crate::json::sample_entities(3))
        .await?;
    adapter.clear().await?;
    let count = adapter.count(&QueryFilters::new()).await?;
    ensure!(count == 0, "count after clear must be 0, got {count}");
    Ok(())
}

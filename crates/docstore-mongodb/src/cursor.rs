// Lazy find query — a composable, not-yet-executed representation of one
// collection read. Nothing touches the store until all() or first() runs it.

use futures_util::TryStreamExt;
use mongodb::bson::Document;
use mongodb::options::FindOptions;
use mongodb::Collection;
use serde_json::Value;

use docstore_core::error::{StoreError, StoreResult};
use docstore_core::filters::SortSpec;

use crate::query;

/// A find operation under construction. Created by
/// [`MongoAdapter::create_cursor`](crate::MongoAdapter::create_cursor) with
/// the filter semantics of `find`, then refined before execution.
pub struct FindQuery {
    collection: Collection<Document>,
    filter: Document,
    options: FindOptions,
}

impl FindQuery {
    pub(crate) fn new(collection: Collection<Document>, filter: Document) -> Self {
        Self {
            collection,
            filter,
            options: FindOptions::default(),
        }
    }

    /// Refine the filter with additional top-level conditions.
    pub fn and_filter(mut self, extra: Document) -> Self {
        for (key, value) in extra {
            self.filter.insert(key, value);
        }
        self
    }

    /// Set the sort order from a parsed sort spec.
    pub fn sort_spec(mut self, spec: &SortSpec) -> Self {
        if !spec.is_empty() {
            self.options.sort = Some(query::build_sort(spec));
        }
        self
    }

    /// Set a raw sort document.
    pub fn sort(mut self, sort: Document) -> Self {
        self.options.sort = Some(sort);
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.options.skip = Some(n);
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.options.limit = Some(n);
        self
    }

    /// The filter this query will run with.
    pub fn filter_doc(&self) -> &Document {
        &self.filter
    }

    /// Execute and collect every matching entity.
    pub async fn all(self) -> StoreResult<Vec<Value>> {
        let cursor = self
            .collection
            .find(self.filter)
            .with_options(self.options)
            .await
            .map_err(|e| StoreError::Store(format!("find failed: {e}")))?;
        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Store(format!("cursor drain failed: {e}")))?;
        Ok(documents.iter().map(query::doc_to_json).collect())
    }

    /// Execute and return the first matching entity.
    pub async fn first(self) -> StoreResult<Option<Value>> {
        let mut results = self.limit(1).all().await?;
        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results.remove(0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use mongodb::Client;

    // Client construction is lazy; no server contact happens here.
    async fn test_collection() -> Collection<Document> {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        client.database("docstore_test").collection("things")
    }

    #[tokio::test]
    async fn test_query_composition_stays_lazy() {
        let q = FindQuery::new(test_collection().await, doc! { "status": "active" })
            .sort_spec(&SortSpec::parse("-age"))
            .skip(10)
            .limit(5);

        assert_eq!(q.filter_doc(), &doc! { "status": "active" });
        assert_eq!(q.options.sort, Some(doc! { "age": -1 }));
        assert_eq!(q.options.skip, Some(10));
        assert_eq!(q.options.limit, Some(5));
    }

    #[tokio::test]
    async fn test_and_filter_merges_conditions() {
        let q = FindQuery::new(test_collection().await, doc! { "status": "active" })
            .and_filter(doc! { "age": { "$gte": 21 } });

        assert!(q.filter_doc().contains_key("status"));
        assert!(q.filter_doc().contains_key("age"));
    }

    #[tokio::test]
    async fn test_empty_sort_spec_leaves_sort_unset() {
        let q = FindQuery::new(test_collection().await, doc! {})
            .sort_spec(&SortSpec::default());
        assert!(q.options.sort.is_none());
    }
}

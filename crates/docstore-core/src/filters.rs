// Request-scoped filter types shared by every adapter backend.
//
// A QueryFilters value describes one read operation and is fully owned by
// the caller for the duration of that call; it is never persisted.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Sort direction for a single sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One field of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered sort specification.
///
/// Parsed from the conventional string form where a leading `-` marks a
/// descending field: `"-createdAt"`, `"age -name"`, or a list of such
/// tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub fields: Vec<SortField>,
}

impl SortSpec {
    /// Parse a single sort string; tokens are whitespace-separated.
    pub fn parse(spec: &str) -> Self {
        let mut out = Self::default();
        for token in spec.split_whitespace() {
            out.push_token(token);
        }
        out
    }

    /// Build a spec from a list of sort tokens.
    pub fn from_list<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::default();
        for token in tokens {
            for part in token.as_ref().split_whitespace() {
                out.push_token(part);
            }
        }
        out
    }

    fn push_token(&mut self, token: &str) {
        let (field, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (token, SortDirection::Asc),
        };
        if field.is_empty() {
            return;
        }
        self.fields.push(SortField {
            field: field.to_string(),
            direction,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The recognized query-shaping fields for a read operation.
///
/// `query` is a raw store query object passed through to the backend;
/// `search`/`search_fields` describe a free-text match; `sort`, `offset`
/// and `limit` shape the result sequence. `count` honors only
/// `query`/`search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw query object.
    pub fn with_query(mut self, query: serde_json::Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Set a free-text search term over the given fields.
    pub fn with_search<I, S>(mut self, term: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some(term.into());
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sort order from a sort string (`"age -name"`).
    pub fn with_sort(mut self, spec: &str) -> Self {
        self.sort = Some(SortSpec::parse(spec));
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check the filter for shapes no backend can serve.
    ///
    /// A search term with no search fields is rejected rather than guessing
    /// which fields to scan.
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(query) = &self.query {
            if !query.is_object() && !query.is_null() {
                return Err(StoreError::Query(
                    "filter query must be a JSON object".into(),
                ));
            }
        }
        if self.search.as_deref().is_some_and(|s| !s.is_empty()) && self.search_fields.is_empty() {
            return Err(StoreError::Query(
                "search requires at least one search field".into(),
            ));
        }
        Ok(())
    }

    /// Whether an effective search term is present.
    pub fn has_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse_single_asc() {
        let spec = SortSpec::parse("name");
        assert_eq!(spec.fields.len(), 1);
        assert_eq!(spec.fields[0].field, "name");
        assert_eq!(spec.fields[0].direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_parse_desc_prefix() {
        let spec = SortSpec::parse("-createdAt");
        assert_eq!(spec.fields[0].field, "createdAt");
        assert_eq!(spec.fields[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_parse_space_separated() {
        let spec = SortSpec::parse("age -name");
        assert_eq!(spec.fields.len(), 2);
        assert_eq!(spec.fields[0].field, "age");
        assert_eq!(spec.fields[0].direction, SortDirection::Asc);
        assert_eq!(spec.fields[1].field, "name");
        assert_eq!(spec.fields[1].direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_from_list() {
        let spec = SortSpec::from_list(["age", "-name"]);
        assert_eq!(spec.fields.len(), 2);
        assert_eq!(spec.fields[1].direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_skips_bare_dash() {
        let spec = SortSpec::parse("- name");
        assert_eq!(spec.fields.len(), 1);
        assert_eq!(spec.fields[0].field, "name");
    }

    #[test]
    fn test_filters_builder() {
        let filters = QueryFilters::new()
            .with_query(serde_json::json!({ "status": "active" }))
            .with_sort("-age")
            .with_offset(10)
            .with_limit(5);
        assert!(filters.query.is_some());
        assert_eq!(filters.offset, Some(10));
        assert_eq!(filters.limit, Some(5));
        assert!(!filters.sort.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_validate_search_without_fields() {
        let filters = QueryFilters {
            search: Some("alice".into()),
            ..Default::default()
        };
        let err = filters.validate().unwrap_err();
        assert!(err.is_query());
    }

    #[test]
    fn test_validate_search_with_fields() {
        let filters = QueryFilters::new().with_search("alice", ["name", "email"]);
        assert!(filters.validate().is_ok());
        assert!(filters.has_search());
    }

    #[test]
    fn test_validate_empty_search_term() {
        let filters = QueryFilters {
            search: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.validate().is_ok());
        assert!(!filters.has_search());
    }

    #[test]
    fn test_validate_non_object_query() {
        let filters = QueryFilters::new().with_query(serde_json::json!([1, 2]));
        assert!(filters.validate().unwrap_err().is_query());
    }

    #[test]
    fn test_filters_serde_camel_case() {
        let filters = QueryFilters::new().with_search("bob", ["name"]);
        let json = serde_json::to_value(&filters).unwrap();
        assert!(json.get("searchFields").is_some());
        assert!(json.get("search_fields").is_none());
    }
}

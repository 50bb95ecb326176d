#![doc = include_str!("../README.md")]

pub mod adapter;
pub mod binding;
pub mod context;
pub mod error;
pub mod filters;
pub mod ids;
pub mod logger;
pub mod schema;

// Re-exports for convenience
pub use adapter::{rename_id_field, DbAdapter};
pub use binding::{Model, ModelBinding};
pub use context::ServiceContext;
pub use error::{StoreError, StoreResult};
pub use filters::{QueryFilters, SortDirection, SortField, SortSpec};
pub use logger::{LogHandler, LogLevel, LoggerConfig, StoreLogger};
pub use schema::{FieldType, Schema, SchemaField};

// docstore-memory — in-memory adapter for the docstore contract.
//
// A Vec-based store for the bound collection, thread-safe via
// tokio::sync::RwLock. Ephemeral by design: data lives only as long as the
// connection. Ideal for testing, prototyping, and development.

pub mod adapter;

pub use adapter::MemoryAdapter;

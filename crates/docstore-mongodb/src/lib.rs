// docstore-mongodb — MongoDB adapter for the docstore contract.
//
// A pass-through facade over the official MongoDB Rust driver: every
// operation delegates to the driver's collection API and surfaces its
// errors unchanged. The adapter owns nothing but the single connection
// handle established by connect().

pub mod adapter;
pub mod cursor;
pub mod query;

pub use adapter::{MongoAdapter, MongoOptions};
pub use cursor::FindQuery;

// docstore-test-utils — shared test tooling for adapter backends.
//
// The compliance module exercises the full DbAdapter contract against any
// backend; the json module carries the small helpers those checks (and
// backend test suites) keep reaching for.

pub mod compliance;
pub mod json;

pub use json::{deep_merge, sample_entities, sort_entities};

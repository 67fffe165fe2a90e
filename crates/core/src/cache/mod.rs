//! Cache contracts shared by every backend.

mod keys;
mod outcome;
mod serialization;
mod traits;

pub use keys::{namespaced_key, validate_key};
pub use outcome::{Lookup, WriteOutcome};
pub use serialization::{deserialize_value, serialize_value};
pub use traits::Cache;

//! Cache Module
//!
//! Provides the bucketed hash table, cache entries, the expiration sampler
//! and the cache facade that ties them together.

mod entry;
mod sampler;
mod store;
mod table;


// Re-export public types
pub use entry::{Entry, Ttl};
pub use sampler::{sample_expired, SweepReport, EXPIRED_TOLERANCE_PERCENT};
pub use store::Cache;
pub use table::{HashTable, Record, BUCKET_COUNT};

pub(crate) use store::SharedTable;

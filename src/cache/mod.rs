//! Cache Module
//!
//! Record model, expiration policy, key patterns and the value codec shared by
//! the store.

mod codec;
mod expiry;
mod pattern;
mod record;


// Re-export public types
pub use codec::ValueCodec;
pub use expiry::{Clock, ExpirationPolicy, SystemClock};
pub use pattern::{KeyPattern, MATCH_ALL};
pub use record::{format_timestamp, CacheRecord, CacheValue};

// == Public Constants ==
/// Remote table holding the records
pub const TABLE: &str = "cache";

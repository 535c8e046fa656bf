//! Tag-indexed read cache.
//!
//! This crate provides:
//! - `TagCache` - Keyed results with single-flight loading
//! - `Tag` - Dependency labels that reads provide and writes invalidate
//! - `CacheKey` - Operation name plus canonical arguments
//! - `Subscription` - Live interest that keeps an entry fresh
//!
//! # Example
//!
//! ```ignore
//! use campus_cache::{loader, CacheConfig, CacheKey, ReadOptions, Tag, TagCache};
//!
//! let cache: TagCache<Vec<Event>, ClientError> = TagCache::new(CacheConfig::default());
//! let events = cache
//!     .read(
//!         CacheKey::for_operation("getAllEvents", &Value::Null),
//!         vec![Tag::collection("Events")],
//!         loader(move || fetch_events(client.clone())),
//!         ReadOptions::default(),
//!     )
//!     .await?;
//!
//! // After a write, everything tagged `Events` is stale.
//! cache.invalidate(&[Tag::collection("Events")]);
//! ```

mod config;
mod entry;
mod error;
mod key;
mod store;
mod tag;

pub use config::*;
pub use entry::{EntrySnapshot, EntryStatus};
pub use error::*;
pub use key::*;
pub use store::*;
pub use tag::*;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        loader, CacheConfig, CacheKey, EntryStatus, ReadOptions, Subscription, Tag, TagCache,
    };
}

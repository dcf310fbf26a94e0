//! Cache module for time-limited values
//!
//! This module provides a cache that stamps every value with its write time and
//! treats entries older than 24 hours as absent. Catalog listings and detail
//! records are cached through it.

mod manager;

pub use manager::{now_millis, CacheEntry, TimestampedCache, VALIDITY_WINDOW_MILLIS};

//! holocron library
//!
//! Exposes the storage, cache, data, and application layers so the binary and the
//! integration tests share one implementation.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod storage;
pub mod ui;

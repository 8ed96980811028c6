//! Storage module for the activity log
//!
//! Provides the `LogStore` abstraction and its JSON file implementation.

mod log_store;

pub use log_store::{JsonFileLogStore, LogStore, DEFAULT_LOG_CAPACITY};

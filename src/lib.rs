//! Notes Cache - in-process object cache for a notes backend
//!
//! Provides a size-bounded, type-checked object cache and the note, tag and
//! user services that read through it and invalidate it on every write.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod tasks;

pub use app::AppState;
pub use cache::ObjectCache;
pub use config::Config;
pub use error::{CacheError, ServiceError, StoreError};
pub use tasks::spawn_stats_reporter;

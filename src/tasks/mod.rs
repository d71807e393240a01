//! Background Tasks Module
//!
//! Contains background tasks that run periodically during process lifetime.
//!
//! # Tasks
//! - Stats reporter: logs a cache statistics snapshot at a fixed interval

mod stats_reporter;

pub use stats_reporter::spawn_stats_reporter;

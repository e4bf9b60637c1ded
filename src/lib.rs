#![doc(test(attr(deny(warnings))))]

//! Habit Core is the data engine behind a habit and event tracker: categories,
//! weekly schedules, a per-day completion ledger, composable list filters, and
//! streak statistics, persisted through a pluggable storage backend.

pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

pub use crate::config::{Config, ConfigManager};
pub use crate::core::services::{
    FilterMode, FilterSet, Section, Statistics, ToggleOutcome, TrackerDraft, TrackerFilter,
};
pub use crate::core::{
    Clock, CompletionState, EngineEvent, ErrorKind, FixedClock, Result, SubscriptionId,
    SystemClock, TrackerEngine, TrackerError,
};
pub use crate::domain::{
    Category, Color, CompletionRecord, Schedule, Tracker, TrackerBook, Weekday,
};
pub use crate::storage::{JsonStorage, MemoryStorage, StorageBackend};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Habit Core tracing initialized.");
    });
}

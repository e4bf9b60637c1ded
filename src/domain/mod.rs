//! Pure domain models: weekdays, schedules, categories, trackers, and records.
//! No I/O and no storage, only data types and their invariants.

pub mod book;
pub mod category;
pub mod color;
pub mod common;
pub mod schedule;
pub mod tracker;

pub use book::{TrackerBook, CURRENT_SCHEMA_VERSION};
pub use category::{Category, PINNED_CATEGORY_NAME};
pub use color::Color;
pub use common::{Displayable, Identifiable, NamedEntity, ToLocalDay};
pub use schedule::{Schedule, Weekday, SCHEDULE_DELIMITER};
pub use tracker::{CompletionRecord, Tracker};

//! The per-day completion ledger.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::core::errors::{Result, TrackerError};
use crate::domain::{CompletionRecord, TrackerBook};

/// What a toggle did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Completed,
    Cleared,
    /// The day lies after today and had no record; nothing changed.
    IgnoredFuture,
}

impl ToggleOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, ToggleOutcome::IgnoredFuture)
    }
}

pub struct CompletionService;

impl CompletionService {
    /// Flips the completion of `tracker_id` on `day`.
    ///
    /// Existing records are always removable. New records are only created for
    /// days up to and including `today`; later days are silently ignored.
    pub fn toggle(
        book: &mut TrackerBook,
        tracker_id: Uuid,
        day: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleOutcome> {
        if book.tracker(tracker_id).is_none() {
            return Err(TrackerError::TrackerNotFound(tracker_id));
        }
        let record = CompletionRecord::new(tracker_id, day);
        let outcome = if book.completion_records.remove(&record) {
            ToggleOutcome::Cleared
        } else if day > today {
            ToggleOutcome::IgnoredFuture
        } else {
            book.completion_records.insert(record);
            ToggleOutcome::Completed
        };
        if outcome.changed() {
            book.touch();
        }
        debug!(tracker_id = %tracker_id, %day, ?outcome, "completion toggled");
        Ok(outcome)
    }

    pub fn is_completed(book: &TrackerBook, tracker_id: Uuid, day: NaiveDate) -> bool {
        book.completion_records
            .contains(&CompletionRecord::new(tracker_id, day))
    }

    pub fn count(book: &TrackerBook, tracker_id: Uuid) -> usize {
        book.completion_records
            .iter()
            .filter(|record| record.tracker_id == tracker_id)
            .count()
    }

    /// Full ledger scan ordered by day, then tracker id.
    pub fn all_records(book: &TrackerBook, ascending: bool) -> Vec<CompletionRecord> {
        let mut records: Vec<CompletionRecord> =
            book.completion_records.iter().copied().collect();
        records.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.tracker_id.cmp(&b.tracker_id)));
        if !ascending {
            records.reverse();
        }
        records
    }
}

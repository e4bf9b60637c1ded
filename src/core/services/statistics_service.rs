//! Streaks and totals derived from the completion history.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{TrackerBook, Weekday};

/// Snapshot shown on the statistics screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub best_streak: usize,
    pub ideal_days: usize,
    pub total_completions: usize,
    pub daily_average: usize,
}

pub struct StatisticsService;

impl StatisticsService {
    /// Computes the statistics snapshot. Never fails: records pointing at
    /// trackers that no longer exist are skipped.
    ///
    /// A day is ideal when at least one tracker is scheduled on its weekday
    /// and every scheduled tracker was completed that day. Due sets come from
    /// the current catalog.
    pub fn compute(book: &TrackerBook, today: NaiveDate) -> Statistics {
        let known: HashSet<Uuid> = book.trackers.iter().map(|tracker| tracker.id).collect();
        let mut by_day: BTreeMap<NaiveDate, HashSet<Uuid>> = BTreeMap::new();
        let mut skipped = 0usize;
        let mut total_completions = 0usize;
        for record in &book.completion_records {
            if !known.contains(&record.tracker_id) {
                skipped += 1;
                continue;
            }
            total_completions += 1;
            by_day.entry(record.day).or_default().insert(record.tracker_id);
        }
        if skipped > 0 {
            warn!(skipped, "completion records for unknown trackers were skipped");
        }

        let Some(first_day) = by_day.keys().next().copied() else {
            return Statistics::default();
        };

        // Most recent first.
        let classified: Vec<(NaiveDate, Option<bool>)> = by_day
            .iter()
            .rev()
            .map(|(day, completed)| (*day, Self::is_ideal(book, *day, completed)))
            .collect();

        let ideal_days = classified
            .iter()
            .filter(|(_, ideal)| *ideal == Some(true))
            .count();

        let mut best_streak = 0usize;
        let mut previous: Option<NaiveDate> = None;
        for (day, ideal) in &classified {
            if let Some(later) = previous {
                if later.pred_opt() != Some(*day) {
                    break;
                }
            }
            match ideal {
                Some(true) => best_streak += 1,
                Some(false) => break,
                // Nothing due: keeps the run contiguous without extending it.
                None => {}
            }
            previous = Some(*day);
        }

        let span = (today - first_day).num_days().max(0) as usize + 1;
        Statistics {
            best_streak,
            ideal_days,
            total_completions,
            daily_average: total_completions / span,
        }
    }

    /// `None` when nothing was due on the day, so it counts neither way.
    fn is_ideal(book: &TrackerBook, day: NaiveDate, completed: &HashSet<Uuid>) -> Option<bool> {
        let weekday = Weekday::of(day);
        let mut due = book
            .trackers
            .iter()
            .filter(|tracker| tracker.schedule.contains(weekday))
            .peekable();
        due.peek()?;
        Some(due.all(|tracker| completed.contains(&tracker.id)))
    }
}

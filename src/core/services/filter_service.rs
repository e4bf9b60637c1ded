//! Composable tracker filters used to drive list views.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::CompletionService;
use crate::domain::{Tracker, TrackerBook, Weekday};

/// A single, independently toggled filter criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerFilter {
    /// Case-insensitive substring match on the tracker name.
    NameContains(String),
    /// One-off trackers always pass; scheduled ones must include the day.
    DueOnWeekday(Weekday),
    CompletedOn(NaiveDate),
    NotCompletedOn(NaiveDate),
}

impl TrackerFilter {
    pub fn matches(&self, book: &TrackerBook, tracker: &Tracker) -> bool {
        match self {
            TrackerFilter::NameContains(text) => {
                text.is_empty() || tracker.name.to_lowercase().contains(&text.to_lowercase())
            }
            TrackerFilter::DueOnWeekday(day) => {
                tracker.is_one_off() || tracker.schedule.contains(*day)
            }
            TrackerFilter::CompletedOn(date) => {
                CompletionService::is_completed(book, tracker.id, *date)
            }
            TrackerFilter::NotCompletedOn(date) => {
                !CompletionService::is_completed(book, tracker.id, *date)
            }
        }
    }
}

/// Preset filter modes offered by the list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Today,
    Completed,
    Uncompleted,
}

/// Conjunction of zero or more criteria. The empty set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    criteria: Vec<TrackerFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion. An empty `NameContains` is dropped rather than stored.
    pub fn with(mut self, criterion: TrackerFilter) -> Self {
        self.push(criterion);
        self
    }

    pub fn push(&mut self, criterion: TrackerFilter) {
        if matches!(&criterion, TrackerFilter::NameContains(text) if text.is_empty()) {
            return;
        }
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[TrackerFilter] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, book: &TrackerBook, tracker: &Tracker) -> bool {
        self.criteria
            .iter()
            .all(|criterion| criterion.matches(book, tracker))
    }

    /// Builds the criteria for a list-screen mode.
    ///
    /// `Today` only applies the weekday rule when `reference` really is
    /// `today`; for any other reference date it degrades to a name search.
    pub fn for_mode(
        mode: FilterMode,
        search_text: &str,
        reference: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let due = TrackerFilter::DueOnWeekday(Weekday::of(reference));
        let filters = FilterSet::new().with(TrackerFilter::NameContains(search_text.to_string()));
        match mode {
            FilterMode::All => filters.with(due),
            FilterMode::Today if reference == today => filters.with(due),
            FilterMode::Today => filters,
            FilterMode::Completed => filters
                .with(TrackerFilter::CompletedOn(reference))
                .with(due),
            FilterMode::Uncompleted => filters
                .with(TrackerFilter::NotCompletedOn(reference))
                .with(due),
        }
    }
}

impl FromIterator<TrackerFilter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = TrackerFilter>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for criterion in iter {
            set.push(criterion);
        }
        set
    }
}

pub struct FilterService;

impl FilterService {
    /// Ids of all trackers accepted by `filters`, in catalog order.
    pub fn visible(book: &TrackerBook, filters: &FilterSet) -> Vec<Uuid> {
        book.trackers
            .iter()
            .filter(|tracker| filters.matches(book, tracker))
            .map(|tracker| tracker.id)
            .collect()
    }
}

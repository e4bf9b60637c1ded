use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    category::{Category, PINNED_CATEGORY_NAME},
    tracker::{CompletionRecord, Tracker},
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The complete persisted catalog: categories, trackers, and the completion ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerBook {
    #[serde(default = "TrackerBook::schema_version_default")]
    pub schema_version: u8,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub trackers: Vec<Tracker>,
    /// Keyed by `(tracker_id, day)`, so a pair can only be recorded once.
    #[serde(default)]
    pub completion_records: BTreeSet<CompletionRecord>,
}

impl Default for TrackerBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerBook {
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            updated_at: Utc::now(),
            categories: Vec::new(),
            trackers: Vec::new(),
            completion_records: BTreeSet::new(),
        }
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_tracker(&mut self, tracker: Tracker) -> Uuid {
        let id = tracker.id;
        self.trackers.push(tracker);
        self.touch();
        id
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| category.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn tracker(&self, id: Uuid) -> Option<&Tracker> {
        self.trackers.iter().find(|tracker| tracker.id == id)
    }

    pub fn tracker_mut(&mut self, id: Uuid) -> Option<&mut Tracker> {
        self.trackers.iter_mut().find(|tracker| tracker.id == id)
    }

    /// Name of the tracker's current category, or `None` for a dangling reference.
    pub fn category_name_of(&self, tracker: &Tracker) -> Option<&str> {
        self.category(tracker.category_id)
            .map(|category| category.name.as_str())
    }

    /// A tracker is pinned while it sits in the sentinel category.
    pub fn is_pinned(&self, tracker: &Tracker) -> bool {
        self.category_name_of(tracker) == Some(PINNED_CATEGORY_NAME)
    }

    pub fn trackers_in(&self, category_id: Uuid) -> impl Iterator<Item = &Tracker> {
        self.trackers
            .iter()
            .filter(move |tracker| tracker.category_id == category_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

//! Tracker definitions and their completion records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{color::Color, common::*, schedule::Schedule};

/// A recurring habit or a one-off event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tracker {
    pub id: Uuid,
    pub name: String,
    pub color: Color,
    pub emoji: String,
    #[serde(default)]
    pub schedule: Schedule,
    pub category_id: Uuid,
    /// Name of the category to restore on unpin. Only set while pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_original_category_name: Option<String>,
}

impl Tracker {
    pub fn new(
        name: impl Into<String>,
        color: Color,
        emoji: impl Into<String>,
        schedule: Schedule,
        category_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color,
            emoji: emoji.into(),
            schedule,
            category_id,
            pinned_original_category_name: None,
        }
    }

    pub fn is_one_off(&self) -> bool {
        self.schedule.is_empty()
    }
}

impl Identifiable for Tracker {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Tracker {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Tracker {
    fn display_label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

/// Evidence that a tracker was completed on a given local calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionRecord {
    pub tracker_id: Uuid,
    pub day: NaiveDate,
}

impl CompletionRecord {
    pub fn new(tracker_id: Uuid, day: impl ToLocalDay) -> Self {
        Self {
            tracker_id,
            day: day.to_local_day(),
        }
    }
}

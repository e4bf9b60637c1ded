//! Tracker CRUD, pin state transitions, and sectioned views.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::errors::{Result, TrackerError};
use crate::core::services::CategoryService;
use crate::domain::{Color, Schedule, Tracker, TrackerBook, PINNED_CATEGORY_NAME};

/// Editable fields of a tracker, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerDraft {
    pub name: String,
    pub color: Color,
    pub emoji: String,
    pub schedule: Schedule,
    pub category_id: Uuid,
}

impl TrackerDraft {
    pub fn new(
        name: impl Into<String>,
        color: Color,
        emoji: impl Into<String>,
        schedule: Schedule,
        category_id: Uuid,
    ) -> Self {
        Self {
            name: name.into(),
            color,
            emoji: emoji.into(),
            schedule,
            category_id,
        }
    }
}

/// A titled group of trackers as presented by list views.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub category_id: Uuid,
    pub pinned: bool,
    pub trackers: Vec<Tracker>,
}

pub struct TrackerService;

impl TrackerService {
    pub fn create(book: &mut TrackerBook, draft: TrackerDraft) -> Result<Tracker> {
        let name = Self::validate(book, &draft)?;
        let tracker = Tracker::new(
            name,
            draft.color,
            draft.emoji,
            draft.schedule,
            draft.category_id,
        );
        info!(tracker_id = %tracker.id, name = %tracker.name, "tracker created");
        book.add_tracker(tracker.clone());
        Ok(tracker)
    }

    /// Replaces the editable fields of a tracker.
    ///
    /// A pinned tracker moved to a regular category stays pinned; the new
    /// category becomes the one restored on unpin.
    pub fn update(book: &mut TrackerBook, id: Uuid, draft: TrackerDraft) -> Result<Tracker> {
        let currently_pinned = book
            .tracker(id)
            .map(|tracker| book.is_pinned(tracker))
            .ok_or(TrackerError::TrackerNotFound(id))?;
        let name = Self::validate(book, &draft)?;
        let target_name = book
            .category(draft.category_id)
            .map(|category| category.name.clone())
            .ok_or_else(|| TrackerError::CategoryNotFound(draft.category_id.to_string()))?;

        let tracker = book
            .tracker_mut(id)
            .ok_or(TrackerError::TrackerNotFound(id))?;
        tracker.name = name;
        tracker.color = draft.color;
        tracker.emoji = draft.emoji;
        tracker.schedule = draft.schedule;
        if currently_pinned && target_name != PINNED_CATEGORY_NAME {
            tracker.pinned_original_category_name = Some(target_name);
        } else {
            tracker.category_id = draft.category_id;
        }
        let updated = tracker.clone();
        book.touch();
        debug!(tracker_id = %id, "tracker updated");
        Ok(updated)
    }

    /// Removes a tracker together with all of its completion records.
    /// Returns the number of records removed.
    pub fn delete(book: &mut TrackerBook, id: Uuid) -> Result<usize> {
        if book.tracker(id).is_none() {
            return Err(TrackerError::TrackerNotFound(id));
        }
        book.trackers.retain(|tracker| tracker.id != id);
        let before = book.completion_records.len();
        book.completion_records
            .retain(|record| record.tracker_id != id);
        let removed = before - book.completion_records.len();
        book.touch();
        info!(tracker_id = %id, records = removed, "tracker deleted");
        Ok(removed)
    }

    /// Moves a tracker into the pinned sentinel, remembering the current
    /// category by name. Returns `false` when it was already pinned.
    pub fn pin(book: &mut TrackerBook, id: Uuid) -> Result<bool> {
        let tracker = book.tracker(id).ok_or(TrackerError::TrackerNotFound(id))?;
        if book.is_pinned(tracker) {
            return Ok(false);
        }
        let original = book
            .category_name_of(tracker)
            .map(str::to_string)
            .ok_or_else(|| TrackerError::CategoryNotFound(tracker.category_id.to_string()))?;
        let sentinel = CategoryService::find_or_create(book, PINNED_CATEGORY_NAME);
        let tracker = book
            .tracker_mut(id)
            .ok_or(TrackerError::TrackerNotFound(id))?;
        tracker.pinned_original_category_name = Some(original);
        tracker.category_id = sentinel.id;
        book.touch();
        debug!(tracker_id = %id, "tracker pinned");
        Ok(true)
    }

    /// Restores a pinned tracker to the category it was pinned from, looked up
    /// (or recreated) by name. Returns `false` when it was not pinned.
    pub fn unpin(book: &mut TrackerBook, id: Uuid) -> Result<bool> {
        let tracker = book.tracker(id).ok_or(TrackerError::TrackerNotFound(id))?;
        if !book.is_pinned(tracker) {
            return Ok(false);
        }
        let original = tracker
            .pinned_original_category_name
            .clone()
            .unwrap_or_else(|| PINNED_CATEGORY_NAME.to_string());
        let restored = CategoryService::find_or_create(book, &original);
        let tracker = book
            .tracker_mut(id)
            .ok_or(TrackerError::TrackerNotFound(id))?;
        // Without a remembered name the tracker lands back in the sentinel.
        let changed =
            tracker.category_id != restored.id || tracker.pinned_original_category_name.is_some();
        tracker.category_id = restored.id;
        tracker.pinned_original_category_name = None;
        if changed {
            book.touch();
            debug!(tracker_id = %id, category = %original, "tracker unpinned");
        }
        Ok(changed)
    }

    /// Groups the trackers accepted by `visible` into sections ordered by
    /// category name, with trackers ordered by name inside each section.
    /// Empty sections are omitted.
    pub fn sections<F>(book: &TrackerBook, pinned_title: &str, mut visible: F) -> Vec<Section>
    where
        F: FnMut(&Tracker) -> bool,
    {
        let mut sections = Vec::new();
        for category in CategoryService::list(book) {
            let mut trackers: Vec<Tracker> = book
                .trackers_in(category.id)
                .filter(|tracker| visible(*tracker))
                .cloned()
                .collect();
            if trackers.is_empty() {
                continue;
            }
            trackers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            let pinned = category.is_pinned_sentinel();
            sections.push(Section {
                title: if pinned {
                    pinned_title.to_string()
                } else {
                    category.name.clone()
                },
                category_id: category.id,
                pinned,
                trackers,
            });
        }
        let orphans = book
            .trackers
            .iter()
            .filter(|tracker| book.category(tracker.category_id).is_none())
            .count();
        if orphans > 0 {
            warn!(orphans, "trackers without a category were left out of sections");
        }
        sections
    }

    fn validate(book: &TrackerBook, draft: &TrackerDraft) -> Result<String> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(TrackerError::Validation(
                "tracker name must not be empty".into(),
            ));
        }
        if book.category(draft.category_id).is_none() {
            return Err(TrackerError::CategoryNotFound(draft.category_id.to_string()));
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::domain::{CompletionRecord, Weekday};
    use chrono::NaiveDate;

    fn draft(name: &str, category_id: Uuid) -> TrackerDraft {
        TrackerDraft::new(
            name,
            Color::rgb(0x33, 0x66, 0xFF),
            "⭐",
            Schedule::from([Weekday::Monday]),
            category_id,
        )
    }

    #[test]
    fn create_requires_existing_category_and_name() {
        let mut book = TrackerBook::new();
        let err = TrackerService::create(&mut book, draft("Run", Uuid::new_v4())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let health = CategoryService::find_or_create(&mut book, "Health");
        let err = TrackerService::create(&mut book, draft("   ", health.id)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let tracker = TrackerService::create(&mut book, draft("  Run ", health.id)).unwrap();
        assert_eq!(tracker.name, "Run");
        assert_eq!(book.trackers.len(), 1);
    }

    #[test]
    fn update_rejects_unknown_ids() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        let run = TrackerService::create(&mut book, draft("Run", health.id)).unwrap();

        let err = TrackerService::update(&mut book, Uuid::new_v4(), draft("X", health.id))
            .unwrap_err();
        assert!(matches!(err, TrackerError::TrackerNotFound(_)));
        // A missing tracker wins over an invalid draft.
        let err = TrackerService::update(&mut book, Uuid::new_v4(), draft("  ", Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err =
            TrackerService::update(&mut book, run.id, draft("X", Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, TrackerError::CategoryNotFound(_)));

        let work = CategoryService::find_or_create(&mut book, "Work");
        let updated = TrackerService::update(&mut book, run.id, draft("Jog", work.id)).unwrap();
        assert_eq!(updated.name, "Jog");
        assert_eq!(updated.category_id, work.id);
    }

    #[test]
    fn delete_cascades_to_records() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        let run = TrackerService::create(&mut book, draft("Run", health.id)).unwrap();
        let read = TrackerService::create(&mut book, draft("Read", health.id)).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        book.completion_records.insert(CompletionRecord::new(run.id, day));
        book.completion_records.insert(CompletionRecord::new(read.id, day));

        assert_eq!(TrackerService::delete(&mut book, run.id).unwrap(), 1);
        assert!(book.tracker(run.id).is_none());
        assert_eq!(book.completion_records.len(), 1);
        assert!(matches!(
            TrackerService::delete(&mut book, run.id),
            Err(TrackerError::TrackerNotFound(_))
        ));
    }

    #[test]
    fn pin_and_unpin_are_idempotent_and_restore_by_name() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        let run = TrackerService::create(&mut book, draft("Run", health.id)).unwrap();

        assert!(!TrackerService::unpin(&mut book, run.id).unwrap());
        assert!(TrackerService::pin(&mut book, run.id).unwrap());
        assert!(!TrackerService::pin(&mut book, run.id).unwrap());
        let pinned = book.tracker(run.id).unwrap();
        assert!(book.is_pinned(pinned));
        assert_eq!(
            pinned.pinned_original_category_name.as_deref(),
            Some("Health")
        );

        CategoryService::rename(&mut book, health.id, "Fitness").unwrap();
        assert!(TrackerService::unpin(&mut book, run.id).unwrap());
        let restored = book.tracker(run.id).unwrap();
        assert_eq!(book.category_name_of(restored), Some("Health"));
        assert_ne!(restored.category_id, health.id);
        assert!(restored.pinned_original_category_name.is_none());
    }

    #[test]
    fn updating_a_pinned_tracker_retargets_the_restore_category() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        let work = CategoryService::find_or_create(&mut book, "Work");
        let run = TrackerService::create(&mut book, draft("Run", health.id)).unwrap();
        TrackerService::pin(&mut book, run.id).unwrap();

        TrackerService::update(&mut book, run.id, draft("Run", work.id)).unwrap();
        let tracker = book.tracker(run.id).unwrap();
        assert!(book.is_pinned(tracker));
        assert_eq!(tracker.pinned_original_category_name.as_deref(), Some("Work"));

        TrackerService::unpin(&mut book, run.id).unwrap();
        assert_eq!(book.tracker(run.id).unwrap().category_id, work.id);
    }

    #[test]
    fn sections_group_and_order_by_name() {
        let mut book = TrackerBook::new();
        let work = CategoryService::find_or_create(&mut book, "Work");
        let health = CategoryService::find_or_create(&mut book, "Health");
        CategoryService::find_or_create(&mut book, "Empty");
        TrackerService::create(&mut book, draft("Stretch", health.id)).unwrap();
        TrackerService::create(&mut book, draft("Run", health.id)).unwrap();
        let mail = TrackerService::create(&mut book, draft("Mail", work.id)).unwrap();
        TrackerService::pin(&mut book, mail.id).unwrap();

        let sections = TrackerService::sections(&book, "Pinned", |_| true);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Pinned", "Health"]);
        assert!(sections[0].pinned);
        let names: Vec<&str> = sections[1]
            .trackers
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Run", "Stretch"]);
    }
}

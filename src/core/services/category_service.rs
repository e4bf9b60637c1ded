//! Business logic helpers for category management.

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::errors::{Result, TrackerError};
use crate::domain::{Category, TrackerBook, PINNED_CATEGORY_NAME};

/// Provides validated operations for [`Category`] entities.
///
/// Category names are compared exactly and case-sensitively. The empty name is
/// reserved for the pinned sentinel.
pub struct CategoryService;

impl CategoryService {
    /// Returns every category ordered by name; the pinned sentinel sorts first.
    pub fn list(book: &TrackerBook) -> Vec<&Category> {
        let mut categories: Vec<&Category> = book.categories.iter().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        categories
    }

    pub fn find<'a>(book: &'a TrackerBook, name: &str) -> Option<&'a Category> {
        book.category_by_name(name)
    }

    /// Returns the category called `name`, creating it when absent.
    pub fn find_or_create(book: &mut TrackerBook, name: &str) -> Category {
        if let Some(existing) = book.category_by_name(name) {
            return existing.clone();
        }
        let category = Category::new(name);
        info!(category_id = %category.id, name, "category created");
        book.add_category(category.clone());
        category
    }

    /// Renames a category, keeping names unique and the empty name reserved.
    pub fn rename(book: &mut TrackerBook, id: Uuid, new_name: &str) -> Result<()> {
        let current = book
            .category(id)
            .ok_or_else(|| TrackerError::CategoryNotFound(id.to_string()))?;
        if current.name == new_name {
            return Ok(());
        }
        if current.is_pinned_sentinel() {
            return Err(TrackerError::Validation(
                "the pinned category cannot be renamed".into(),
            ));
        }
        if new_name == PINNED_CATEGORY_NAME {
            return Err(TrackerError::Validation(
                "category name must not be empty".into(),
            ));
        }
        if book.category_by_name(new_name).is_some() {
            return Err(TrackerError::Validation(format!(
                "category `{}` already exists",
                new_name
            )));
        }
        let category = book
            .category_mut(id)
            .ok_or_else(|| TrackerError::CategoryNotFound(id.to_string()))?;
        debug!(category_id = %id, from = %category.name, to = new_name, "category renamed");
        category.name = new_name.to_string();
        book.touch();
        Ok(())
    }

    /// Removes a category. Categories that still hold trackers are rejected
    /// rather than cascading.
    pub fn delete(book: &mut TrackerBook, id: Uuid) -> Result<Category> {
        let category = book
            .category(id)
            .cloned()
            .ok_or_else(|| TrackerError::CategoryNotFound(id.to_string()))?;
        let trackers = book.trackers_in(id).count();
        if trackers > 0 {
            return Err(TrackerError::CategoryInUse {
                name: category.name,
                trackers,
            });
        }
        book.categories.retain(|existing| existing.id != id);
        book.touch();
        info!(category_id = %id, "category deleted");
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::domain::{Color, Schedule, Tracker};

    #[test]
    fn find_or_create_is_idempotent() {
        let mut book = TrackerBook::new();
        let first = CategoryService::find_or_create(&mut book, "Health");
        let second = CategoryService::find_or_create(&mut book, "Health");
        assert_eq!(first.id, second.id);
        assert_eq!(book.categories.len(), 1);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut book = TrackerBook::new();
        let upper = CategoryService::find_or_create(&mut book, "Health");
        let lower = CategoryService::find_or_create(&mut book, "health");
        assert_ne!(upper.id, lower.id);
        assert!(CategoryService::find(&book, "HEALTH").is_none());
    }

    #[test]
    fn list_sorts_sentinel_first() {
        let mut book = TrackerBook::new();
        CategoryService::find_or_create(&mut book, "Work");
        CategoryService::find_or_create(&mut book, "");
        CategoryService::find_or_create(&mut book, "Health");
        let names: Vec<&str> = CategoryService::list(&book)
            .into_iter()
            .map(|category| category.name.as_str())
            .collect();
        assert_eq!(names, vec!["", "Health", "Work"]);
    }

    #[test]
    fn rename_rejects_empty_name() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        let err = CategoryService::rename(&mut book, health.id, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(book.category(health.id).unwrap().name, "Health");
    }

    #[test]
    fn rename_rejects_duplicates_and_accepts_new_names() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        CategoryService::find_or_create(&mut book, "Work");
        let err = CategoryService::rename(&mut book, health.id, "Work").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        CategoryService::rename(&mut book, health.id, "Wellness").unwrap();
        assert_eq!(book.category(health.id).unwrap().name, "Wellness");
    }

    #[test]
    fn sentinel_keeps_its_empty_name() {
        let mut book = TrackerBook::new();
        let pinned = CategoryService::find_or_create(&mut book, "");
        CategoryService::rename(&mut book, pinned.id, "").unwrap();
        let err = CategoryService::rename(&mut book, pinned.id, "Pinned").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn delete_rejects_categories_in_use() {
        let mut book = TrackerBook::new();
        let health = CategoryService::find_or_create(&mut book, "Health");
        book.add_tracker(Tracker::new(
            "Run",
            Color::rgb(0, 0, 0),
            "🏃",
            Schedule::new(),
            health.id,
        ));
        let err = CategoryService::delete(&mut book, health.id).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::CategoryInUse { trackers: 1, .. }
        ));

        let empty = CategoryService::find_or_create(&mut book, "Empty");
        CategoryService::delete(&mut book, empty.id).unwrap();
        assert!(CategoryService::find(&book, "Empty").is_none());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut book = TrackerBook::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            CategoryService::rename(&mut book, missing, "X")
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CategoryService::delete(&mut book, missing).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}

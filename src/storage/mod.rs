pub mod json_backend;
pub mod memory;

use std::collections::{HashMap, HashSet};

use crate::{core::errors::Result, domain::TrackerBook};

/// Abstraction over persistence backends capable of storing the tracker book.
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<TrackerBook>>;
    fn save(&self, book: &TrackerBook) -> Result<()>;
}

/// Detects dangling references and other anomalies within a book snapshot.
pub fn book_warnings(book: &TrackerBook) -> Vec<String> {
    let tracker_ids: HashSet<_> = book.trackers.iter().map(|t| t.id).collect();
    let category_ids: HashSet<_> = book.categories.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();

    let mut names: HashMap<&str, usize> = HashMap::new();
    for category in &book.categories {
        *names.entry(category.name.as_str()).or_default() += 1;
    }
    let mut duplicates: Vec<_> = names.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    for (name, count) in duplicates {
        warnings.push(format!("category name `{}` is used {} times", name, count));
    }

    for tracker in &book.trackers {
        if !category_ids.contains(&tracker.category_id) {
            warnings.push(format!(
                "tracker {} references missing category {}",
                tracker.id, tracker.category_id
            ));
        }
    }
    for record in &book.completion_records {
        if !tracker_ids.contains(&record.tracker_id) {
            warnings.push(format!(
                "completion record on {} references unknown tracker {}",
                record.day, record.tracker_id
            ));
        }
    }
    warnings
}

pub use json_backend::{load_book_from_path, save_book_to_path, JsonStorage};
pub use memory::MemoryStorage;

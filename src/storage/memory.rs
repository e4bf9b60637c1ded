use std::sync::{Arc, Mutex};

use crate::{
    core::errors::{Result, TrackerError},
    domain::TrackerBook,
};

use super::StorageBackend;

/// Volatile backend holding the last saved snapshot. Clones share the snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    snapshot: Arc<Mutex<Option<TrackerBook>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(book: TrackerBook) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Some(book))),
        }
    }

    /// The most recently saved book, if any.
    pub fn snapshot(&self) -> Option<TrackerBook> {
        self.snapshot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<TrackerBook>> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| TrackerError::Storage("memory storage lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, book: &TrackerBook) -> Result<()> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| TrackerError::Storage("memory storage lock poisoned".into()))?;
        *guard = Some(book.clone());
        Ok(())
    }
}

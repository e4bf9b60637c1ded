//! The tracker engine: one instance owns the book, its storage, and the
//! current filter, and is the only writer of that state.

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::core::errors::Result;
use crate::core::services::{
    CategoryService, CompletionService, FilterMode, FilterService, FilterSet, Section,
    Statistics, StatisticsService, ToggleOutcome, TrackerDraft, TrackerService,
};
use crate::core::time::{Clock, SystemClock};
use crate::domain::{Category, CompletionRecord, ToLocalDay, Tracker, TrackerBook};
use crate::storage::{book_warnings, JsonStorage, StorageBackend};

/// Change notifications delivered to subscribers after a committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CategoriesChanged,
    TrackersChanged,
    CompletionChanged {
        tracker_id: Uuid,
        day: NaiveDate,
        completed: bool,
    },
    FilterChanged,
}

/// Completion state of a tracker right after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionState {
    pub completed: bool,
    pub count: usize,
    pub outcome: ToggleOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&EngineEvent) + Send + Sync>;

/// Facade over the catalog services.
///
/// Every mutation takes `&mut self`, so there is exactly one writer at a time
/// and each write is visible to the next read. Mutations run against a working
/// copy of the book which only replaces the live book once storage accepted it.
pub struct TrackerEngine {
    book: TrackerBook,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    filter: FilterSet,
    pinned_title: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl TrackerEngine {
    pub fn new(storage: Box<dyn StorageBackend>, clock: Box<dyn Clock>) -> Result<Self> {
        Self::open(storage, clock, &Config::default())
    }

    /// Loads the book from `storage`, starting empty when nothing was saved yet.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        clock: Box<dyn Clock>,
        config: &Config,
    ) -> Result<Self> {
        let book = match storage.load()? {
            Some(book) => book,
            None => {
                info!("no stored trackers, starting with an empty book");
                TrackerBook::new()
            }
        };
        for warning in book_warnings(&book) {
            warn!("{}", warning);
        }
        info!(
            categories = book.categories.len(),
            trackers = book.trackers.len(),
            records = book.completion_records.len(),
            "tracker book opened"
        );
        Ok(Self {
            book,
            storage,
            clock,
            filter: FilterSet::new(),
            pinned_title: config.pinned_section_title.clone(),
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Opens the JSON store described by `config` with the system clock.
    pub fn with_json_storage(config: &Config) -> Result<Self> {
        let storage = JsonStorage::from_config(config)?;
        Self::open(Box::new(storage), Box::new(SystemClock), config)
    }

    pub fn book(&self) -> &TrackerBook {
        &self.book
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Replaces the in-memory book with whatever storage currently holds.
    pub fn reload(&mut self) -> Result<()> {
        self.book = self.storage.load()?.unwrap_or_default();
        for warning in book_warnings(&self.book) {
            warn!("{}", warning);
        }
        self.notify(&EngineEvent::CategoriesChanged);
        self.notify(&EngineEvent::TrackersChanged);
        Ok(())
    }

    // Categories

    pub fn categories(&self) -> Vec<&Category> {
        CategoryService::list(&self.book)
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        CategoryService::find(&self.book, name)
    }

    pub fn find_or_create_category(&mut self, name: &str) -> Result<Category> {
        self.mutate(EngineEvent::CategoriesChanged, |book| {
            Ok(CategoryService::find_or_create(book, name))
        })
    }

    pub fn rename_category(&mut self, id: Uuid, new_name: &str) -> Result<()> {
        self.mutate(EngineEvent::CategoriesChanged, |book| {
            CategoryService::rename(book, id, new_name)
        })
    }

    pub fn delete_category(&mut self, id: Uuid) -> Result<Category> {
        self.mutate(EngineEvent::CategoriesChanged, |book| {
            CategoryService::delete(book, id)
        })
    }

    // Trackers

    pub fn tracker(&self, id: Uuid) -> Option<&Tracker> {
        self.book.tracker(id)
    }

    pub fn is_pinned(&self, id: Uuid) -> bool {
        self.book
            .tracker(id)
            .map(|tracker| self.book.is_pinned(tracker))
            .unwrap_or(false)
    }

    pub fn create_tracker(&mut self, draft: TrackerDraft) -> Result<Tracker> {
        self.mutate(EngineEvent::TrackersChanged, |book| {
            TrackerService::create(book, draft)
        })
    }

    pub fn update_tracker(&mut self, id: Uuid, draft: TrackerDraft) -> Result<Tracker> {
        self.mutate(EngineEvent::TrackersChanged, |book| {
            TrackerService::update(book, id, draft)
        })
    }

    /// Deletes the tracker and its completion history.
    pub fn delete_tracker(&mut self, id: Uuid) -> Result<usize> {
        self.mutate(EngineEvent::TrackersChanged, |book| {
            TrackerService::delete(book, id)
        })
    }

    pub fn pin(&mut self, id: Uuid) -> Result<bool> {
        self.mutate(EngineEvent::TrackersChanged, |book| {
            TrackerService::pin(book, id)
        })
    }

    pub fn unpin(&mut self, id: Uuid) -> Result<bool> {
        self.mutate(EngineEvent::TrackersChanged, |book| {
            TrackerService::unpin(book, id)
        })
    }

    // Completions

    /// Toggles completion of a tracker on the local day of `date`.
    pub fn toggle(&mut self, tracker_id: Uuid, date: impl ToLocalDay) -> Result<CompletionState> {
        let day = date.to_local_day();
        let today = self.clock.today();
        let event = EngineEvent::CompletionChanged {
            tracker_id,
            day,
            completed: !CompletionService::is_completed(&self.book, tracker_id, day),
        };
        let outcome = self.mutate(event, |book| {
            CompletionService::toggle(book, tracker_id, day, today)
        })?;
        Ok(CompletionState {
            completed: CompletionService::is_completed(&self.book, tracker_id, day),
            count: CompletionService::count(&self.book, tracker_id),
            outcome,
        })
    }

    pub fn is_completed(&self, tracker_id: Uuid, date: impl ToLocalDay) -> bool {
        CompletionService::is_completed(&self.book, tracker_id, date.to_local_day())
    }

    pub fn completion_count(&self, tracker_id: Uuid) -> usize {
        CompletionService::count(&self.book, tracker_id)
    }

    pub fn all_records(&self, ascending: bool) -> Vec<CompletionRecord> {
        CompletionService::all_records(&self.book, ascending)
    }

    // Filtering

    pub fn current_filter(&self) -> &FilterSet {
        &self.filter
    }

    /// Replaces the active filter and notifies subscribers.
    pub fn apply_filters(&mut self, filters: FilterSet) {
        debug!(criteria = filters.criteria().len(), "filters applied");
        self.filter = filters;
        self.notify(&EngineEvent::FilterChanged);
    }

    pub fn apply_mode(&mut self, mode: FilterMode, search_text: &str, reference: impl ToLocalDay) {
        let filters = FilterSet::for_mode(
            mode,
            search_text,
            reference.to_local_day(),
            self.clock.today(),
        );
        self.apply_filters(filters);
    }

    /// Trackers passing the active filter, in catalog order.
    pub fn visible_trackers(&self) -> Vec<&Tracker> {
        FilterService::visible(&self.book, &self.filter)
            .into_iter()
            .filter_map(|id| self.book.tracker(id))
            .collect()
    }

    /// Sectioned snapshot of the trackers passing the active filter.
    pub fn sections(&self) -> Vec<Section> {
        TrackerService::sections(&self.book, &self.pinned_title, |tracker| {
            self.filter.matches(&self.book, tracker)
        })
    }

    pub fn statistics(&self) -> Statistics {
        StatisticsService::compute(&self.book, self.clock.today())
    }

    // Notifications

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&self, event: &EngineEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    /// Runs `apply` on a working copy. Changed books are persisted before they
    /// replace the live one; subscribers are told only about committed changes.
    fn mutate<T, F>(&mut self, event: EngineEvent, apply: F) -> Result<T>
    where
        F: FnOnce(&mut TrackerBook) -> Result<T>,
    {
        let mut working = self.book.clone();
        let value = apply(&mut working)?;
        if working == self.book {
            return Ok(value);
        }
        working.updated_at = self.clock.now();
        if let Err(err) = self.storage.save(&working) {
            warn!(error = %err, "persisting tracker book failed, change discarded");
            return Err(err);
        }
        self.book = working;
        self.notify(&event);
        Ok(value)
    }
}

impl fmt::Debug for TrackerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerEngine")
            .field("categories", &self.book.categories.len())
            .field("trackers", &self.book.trackers.len())
            .field("records", &self.book.completion_records.len())
            .field("filter", &self.filter)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorKind, TrackerError};
    use crate::core::services::TrackerFilter;
    use crate::core::time::FixedClock;
    use crate::domain::{Color, Schedule, Weekday};
    use crate::storage::MemoryStorage;
    use std::sync::{Arc, Mutex};

    // 2024-03-06 is a Wednesday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
    }

    fn engine_with(storage: MemoryStorage) -> TrackerEngine {
        TrackerEngine::new(Box::new(storage), Box::new(FixedClock::new(wednesday())))
            .expect("engine")
    }

    fn draft(name: &str, schedule: Schedule, category_id: Uuid) -> TrackerDraft {
        TrackerDraft::new(name, Color::rgb(0x33, 0x66, 0x99), "⭐", schedule, category_id)
    }

    struct FailingStorage;

    impl StorageBackend for FailingStorage {
        fn load(&self) -> Result<Option<TrackerBook>> {
            Ok(None)
        }

        fn save(&self, _book: &TrackerBook) -> Result<()> {
            Err(TrackerError::Storage("disk full".into()))
        }
    }

    #[test]
    fn mutations_are_persisted_immediately() {
        let storage = MemoryStorage::new();
        let mut engine = engine_with(storage.clone());
        let health = engine.find_or_create_category("Health").expect("category");
        engine
            .create_tracker(draft("Run", Schedule::every_day(), health.id))
            .expect("tracker");

        let saved = storage.snapshot().expect("saved book");
        assert_eq!(saved.trackers.len(), 1);
        assert_eq!(saved.categories.len(), 1);
        assert_eq!(&saved, engine.book());
    }

    #[test]
    fn find_or_create_returns_the_same_category() {
        let mut engine = engine_with(MemoryStorage::new());
        let first = engine.find_or_create_category("Health").expect("first");
        let second = engine.find_or_create_category("Health").expect("second");
        assert_eq!(first.id, second.id);
        assert_eq!(engine.categories().len(), 1);
    }

    #[test]
    fn failed_saves_leave_state_untouched() {
        let mut engine =
            TrackerEngine::new(Box::new(FailingStorage), Box::new(FixedClock::new(wednesday())))
                .expect("engine");
        let events = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&events);
        engine.subscribe(move |_| *counter.lock().unwrap() += 1);

        let err = engine.find_or_create_category("Health").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(engine.categories().is_empty());
        assert_eq!(*events.lock().unwrap(), 0);
    }

    #[test]
    fn toggle_reports_state_and_count() {
        let mut engine = engine_with(MemoryStorage::new());
        let health = engine.find_or_create_category("Health").unwrap();
        let run = engine
            .create_tracker(draft("Run", Schedule::every_day(), health.id))
            .unwrap();

        let state = engine.toggle(run.id, wednesday()).expect("toggle on");
        assert!(state.completed);
        assert_eq!(state.count, 1);
        assert_eq!(state.outcome, ToggleOutcome::Completed);

        let state = engine.toggle(run.id, wednesday()).expect("toggle off");
        assert!(!state.completed);
        assert_eq!(state.count, 0);
        assert!(!engine.is_completed(run.id, wednesday()));
    }

    #[test]
    fn future_toggles_are_silent() {
        let storage = MemoryStorage::new();
        let mut engine = engine_with(storage.clone());
        let health = engine.find_or_create_category("Health").unwrap();
        let run = engine
            .create_tracker(draft("Run", Schedule::every_day(), health.id))
            .unwrap();
        let before = storage.snapshot();

        let tomorrow = wednesday().succ_opt().unwrap();
        let state = engine.toggle(run.id, tomorrow).expect("no error");
        assert_eq!(state.outcome, ToggleOutcome::IgnoredFuture);
        assert!(!engine.is_completed(run.id, tomorrow));
        assert_eq!(storage.snapshot(), before);
    }

    #[test]
    fn toggle_unknown_tracker_is_not_found() {
        let mut engine = engine_with(MemoryStorage::new());
        let err = engine.toggle(Uuid::new_v4(), wednesday()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn weekday_filter_keeps_one_offs_in_the_pinned_section() {
        let mut engine = engine_with(MemoryStorage::new());
        let health = engine.find_or_create_category("Health").unwrap();
        engine
            .create_tracker(draft(
                "Run",
                Schedule::from([Weekday::Monday, Weekday::Wednesday]),
                health.id,
            ))
            .unwrap();
        let read = engine
            .create_tracker(draft("Read", Schedule::new(), health.id))
            .unwrap();
        engine.pin(read.id).unwrap();

        engine.apply_filters(
            FilterSet::new().with(TrackerFilter::DueOnWeekday(Weekday::Wednesday)),
        );
        let sections = engine.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Pinned");
        assert!(sections[0].pinned);
        assert_eq!(sections[0].trackers[0].name, "Read");
        assert_eq!(sections[1].title, "Health");
        assert_eq!(sections[1].trackers[0].name, "Run");
    }

    #[test]
    fn listeners_receive_committed_events_until_unsubscribed() {
        let mut engine = engine_with(MemoryStorage::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = engine.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let health = engine.find_or_create_category("Health").unwrap();
        // Already present: nothing committed, nothing announced.
        engine.find_or_create_category("Health").unwrap();
        engine.apply_mode(FilterMode::All, "", wednesday());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EngineEvent::CategoriesChanged, EngineEvent::FilterChanged]
        );

        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.rename_category(health.id, "Fitness").unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn apply_mode_today_degrades_on_other_days() {
        let mut engine = engine_with(MemoryStorage::new());
        let health = engine.find_or_create_category("Health").unwrap();
        engine
            .create_tracker(draft("Plan", Schedule::from([Weekday::Monday]), health.id))
            .unwrap();

        engine.apply_mode(FilterMode::Today, "", wednesday());
        assert!(engine.visible_trackers().is_empty());

        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        engine.apply_mode(FilterMode::Today, "", monday);
        assert_eq!(engine.visible_trackers().len(), 1);
    }

    #[test]
    fn statistics_use_the_engine_clock() {
        let mut engine = engine_with(MemoryStorage::new());
        let health = engine.find_or_create_category("Health").unwrap();
        let run = engine
            .create_tracker(draft("Run", Schedule::every_day(), health.id))
            .unwrap();
        for days_back in 0..3 {
            let day = wednesday() - chrono::Duration::days(days_back);
            engine.toggle(run.id, day).unwrap();
        }
        let stats = engine.statistics();
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.ideal_days, 3);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn opening_a_seeded_store_exposes_its_trackers() {
        let mut book = TrackerBook::new();
        let health = book.add_category(Category::new("Health"));
        let run = book.add_tracker(Tracker::new(
            "Run",
            Color::rgb(0, 0, 0),
            "🏃",
            Schedule::new(),
            health,
        ));
        let engine = engine_with(MemoryStorage::with_book(book));
        assert!(engine.tracker(run).is_some_and(Tracker::is_one_off));
        assert_eq!(engine.visible_trackers().len(), 1);
        assert_eq!(engine.sections()[0].title, "Health");
    }

    #[test]
    fn reopening_restores_the_saved_book() {
        let storage = MemoryStorage::new();
        let mut engine = engine_with(storage.clone());
        let health = engine.find_or_create_category("Health").unwrap();
        engine
            .create_tracker(draft("Run", Schedule::every_day(), health.id))
            .unwrap();
        drop(engine);

        let reopened = engine_with(storage);
        assert_eq!(reopened.book().trackers.len(), 1);
        assert_eq!(reopened.find_category("Health").map(|c| c.id), Some(health.id));
    }
}

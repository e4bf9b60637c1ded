pub mod category_service;
pub mod completion_service;
pub mod filter_service;
pub mod statistics_service;
pub mod tracker_service;

pub use category_service::CategoryService;
pub use completion_service::{CompletionService, ToggleOutcome};
pub use filter_service::{FilterMode, FilterService, FilterSet, TrackerFilter};
pub use statistics_service::{Statistics, StatisticsService};
pub use tracker_service::{Section, TrackerDraft, TrackerService};

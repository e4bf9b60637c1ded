pub mod engine;
pub mod errors;
pub mod services;
pub mod time;
pub mod utils;

pub use engine::{CompletionState, EngineEvent, SubscriptionId, TrackerEngine};
pub use errors::{ErrorKind, Result, TrackerError};
pub use time::{Clock, FixedClock, SystemClock};

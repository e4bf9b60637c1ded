//! Shared traits and calendar-day helpers for tracker primitives.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Truncates a point in time to its calendar day in the local calendar.
///
/// Naive values are assumed to already be local wall-clock values; zoned
/// values are converted into the host time zone before the time of day is
/// discarded.
pub trait ToLocalDay {
    fn to_local_day(&self) -> NaiveDate;
}

impl ToLocalDay for NaiveDate {
    fn to_local_day(&self) -> NaiveDate {
        *self
    }
}

impl ToLocalDay for NaiveDateTime {
    fn to_local_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> ToLocalDay for DateTime<Tz> {
    fn to_local_day(&self) -> NaiveDate {
        self.with_timezone(&Local).date_naive()
    }
}

impl<T: ToLocalDay + ?Sized> ToLocalDay for &T {
    fn to_local_day(&self) -> NaiveDate {
        (**self).to_local_day()
    }
}

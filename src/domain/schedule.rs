//! Days of the week and the weekly schedules built from them.

use std::{collections::BTreeSet, fmt};

use chrono::{Datelike, NaiveDate};
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

use crate::domain::common::ToLocalDay;

/// Separator used by the persisted schedule encoding.
pub const SCHEDULE_DELIMITER: char = ',';

/// A day of the week, ordered from Monday (index 0) to Sunday (index 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Fixed position of the day, Monday = 0.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Short display code, also used by the persisted encoding.
    pub fn short_code(self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Exact, case-sensitive lookup by short code.
    pub fn from_short_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.short_code() == code)
    }

    /// Weekday of a calendar day, independent of any locale's first day of week.
    pub fn of(date: impl ToLocalDay) -> Self {
        Self::from(date.to_local_day().weekday())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        Self::ALL[value.num_days_from_monday() as usize]
    }
}

/// `{}` prints the short code, `{:#}` the full name.
impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(self.long_name())
        } else {
            f.write_str(self.short_code())
        }
    }
}

/// Set of weekdays on which a tracker is due. Empty means a one-off event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Schedule(BTreeSet<Weekday>);

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn every_day() -> Self {
        Weekday::ALL.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    /// Members in canonical Monday-first order.
    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0.iter().copied()
    }

    /// Whether the schedule matches `date` by weekday. One-off events never do.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.contains(Weekday::of(date))
    }

    pub fn encode(&self) -> String {
        let codes: Vec<&str> = self.days().map(Weekday::short_code).collect();
        codes.join(&SCHEDULE_DELIMITER.to_string())
    }

    /// Lenient decoding: unknown tokens are dropped and `None` or an empty
    /// string yield the empty schedule. Never fails.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::new();
        };
        raw.split(SCHEDULE_DELIMITER)
            .filter_map(|token| Weekday::from_short_code(token.trim()))
            .collect()
    }
}

impl FromIterator<Weekday> for Schedule {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Weekday; N]> for Schedule {
    fn from(days: [Weekday; N]) -> Self {
        days.into_iter().collect()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("one-off");
        }
        f.write_str(&self.encode())
    }
}

impl Serialize for Schedule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Schedule::decode(value.as_deref()))
    }
}

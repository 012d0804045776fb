//! Weekly teaching grid.
//!
//! Sessions are placed on a fixed grid: a list of teaching days crossed
//! with a list of daily time bands. Grid slots are numbered day-major,
//! so slot `i` falls on `days[i / bands.len()]` in band `i % bands.len()`.
//!
//! # Time Model
//! Bands are half-open intervals `[start, end)` of wall-clock time.
//! Two bands overlap iff each starts before the other ends.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A daily teaching band `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBand {
    /// Band start (inclusive).
    pub start: NaiveTime,
    /// Band end (exclusive).
    pub end: NaiveTime,
}

impl TimeBand {
    /// Creates a band.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Creates a band from `(hour, minute)` pairs.
    ///
    /// Returns `None` for out-of-range clock values.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        Some(Self {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0)?,
            end: NaiveTime::from_hms_opt(end.0, end.1, 0)?,
        })
    }

    /// Band length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether two bands overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        intervals_overlap(self.start, self.end, other.start, other.end)
    }
}

/// Half-open interval overlap test on wall-clock times.
#[inline]
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// One cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Grid index (day-major).
    pub index: usize,
    /// Teaching day.
    pub day: Weekday,
    /// Time band on that day.
    pub band: TimeBand,
}

/// Fixed weekly grid of teaching days and time bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGrid {
    /// Teaching days in week order.
    pub days: Vec<Weekday>,
    /// Daily bands in chronological order.
    pub bands: Vec<TimeBand>,
}

impl WeeklyGrid {
    /// Creates a grid.
    pub fn new(days: Vec<Weekday>, bands: Vec<TimeBand>) -> Self {
        Self { days, bands }
    }

    /// Number of slots in the grid.
    pub fn len(&self) -> usize {
        self.days.len() * self.bands.len()
    }

    /// Whether the grid has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slot at `index`, wrapping around the week.
    ///
    /// Returns `None` only for an empty grid.
    pub fn slot(&self, index: usize) -> Option<Slot> {
        if self.is_empty() {
            return None;
        }
        let index = index % self.len();
        let per_day = self.bands.len();
        Some(Slot {
            index,
            day: self.days[index / per_day],
            band: self.bands[index % per_day],
        })
    }

    /// Iterates over every slot in grid order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.len()).filter_map(move |i| self.slot(i))
    }

    /// Finds the grid index of a `(day, start)` position, if it is on the grid.
    pub fn index_of(&self, day: Weekday, start: NaiveTime) -> Option<usize> {
        let d = self.days.iter().position(|&x| x == day)?;
        let b = self.bands.iter().position(|band| band.start == start)?;
        Some(d * self.bands.len() + b)
    }
}

impl Default for WeeklyGrid {
    /// Monday to Friday, five 90-minute bands.
    fn default() -> Self {
        let band = |sh, sm, eh, em| TimeBand {
            start: NaiveTime::from_hms_opt(sh, sm, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(eh, em, 0).unwrap_or_default(),
        };
        Self {
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            bands: vec![
                band(8, 0, 9, 30),
                band(9, 45, 11, 15),
                band(11, 30, 13, 0),
                band(14, 0, 15, 30),
                band(15, 45, 17, 15),
            ],
        }
    }
}

//! Shift definition model.
//!
//! A shift is a daily time window with headcount bounds. Shifts are
//! supplied by the external shift catalog and are read-only here.
//!
//! # Time Model
//! Start and end are wall-clock times of day. A shift whose end is at or
//! before its start runs past midnight into the next calendar day. Breaks
//! are unpaid and excluded from worked hours but not from the span used
//! for overlap and rest checks.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A shift definition from the shift catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Human-readable name (e.g. "Early", "Night").
    pub name: String,
    /// Start time of day.
    pub start: NaiveTime,
    /// End time of day.
    pub end: NaiveTime,
    /// Whether the shift ends on the calendar day after it starts.
    pub crosses_midnight: bool,
    /// Minimum number of employees required per day.
    pub min_headcount: u32,
    /// Maximum number of employees allowed per day.
    pub max_headcount: u32,
    /// Unpaid break inside the shift.
    pub break_window: Option<BreakWindow>,
}

/// An unpaid break within a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakWindow {
    /// Break start time of day.
    pub start: NaiveTime,
    /// Break end time of day.
    pub end: NaiveTime,
}

impl BreakWindow {
    /// Creates a break window.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Break length in minutes (wraps past midnight).
    pub fn duration_minutes(&self) -> i64 {
        let diff = minute_of_day(self.end) - minute_of_day(self.start);
        if diff < 0 {
            diff + MINUTES_PER_DAY
        } else {
            diff
        }
    }
}

impl Shift {
    /// Creates a shift with no headcount requirement.
    ///
    /// `crosses_midnight` is derived from the times (`end <= start`).
    pub fn new(id: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            start,
            end,
            crosses_midnight: end <= start,
            min_headcount: 0,
            max_headcount: u32::MAX,
            break_window: None,
        }
    }

    /// Creates a shift from `(hour, minute)` pairs.
    ///
    /// Returns `None` if either time is out of range.
    pub fn from_hm(id: impl Into<String>, start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        let start = NaiveTime::from_hms_opt(start.0, start.1, 0)?;
        let end = NaiveTime::from_hms_opt(end.0, end.1, 0)?;
        Some(Self::new(id, start, end))
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the per-day headcount bounds.
    pub fn with_headcount(mut self, min: u32, max: u32) -> Self {
        self.min_headcount = min;
        self.max_headcount = max;
        self
    }

    /// Requires exactly `count` employees per day.
    pub fn with_exact_headcount(self, count: u32) -> Self {
        self.with_headcount(count, count)
    }

    /// Sets the unpaid break.
    pub fn with_break(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.break_window = Some(BreakWindow::new(start, end));
        self
    }

    /// Start offset within its day (minutes after midnight).
    #[inline]
    pub fn start_minute(&self) -> i64 {
        minute_of_day(self.start)
    }

    /// Total span from start to end in minutes, breaks included.
    pub fn span_minutes(&self) -> i64 {
        let diff = minute_of_day(self.end) - self.start_minute();
        if self.crosses_midnight {
            diff + MINUTES_PER_DAY
        } else {
            diff
        }
    }

    /// Break length in minutes (0 without a break).
    pub fn break_minutes(&self) -> i64 {
        self.break_window
            .as_ref()
            .map(BreakWindow::duration_minutes)
            .unwrap_or(0)
    }

    /// Paid working hours (span minus break).
    pub fn work_hours(&self) -> f64 {
        (self.span_minutes() - self.break_minutes()).max(0) as f64 / 60.0
    }

    /// Whether the headcount bounds admit `count` employees.
    #[inline]
    pub fn headcount_ok(&self, count: u32) -> bool {
        count >= self.min_headcount && count <= self.max_headcount
    }
}

#[inline]
fn minute_of_day(time: NaiveTime) -> i64 {
    (time.num_seconds_from_midnight() / 60) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_day_shift_span() {
        let shift = Shift::new("D", t(8, 0), t(16, 0));
        assert!(!shift.crosses_midnight);
        assert_eq!(shift.start_minute(), 480);
        assert_eq!(shift.span_minutes(), 480);
        assert!((shift.work_hours() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_night_shift_crosses_midnight() {
        let shift = Shift::new("N", t(22, 0), t(6, 0));
        assert!(shift.crosses_midnight);
        assert_eq!(shift.span_minutes(), 480);
    }

    #[test]
    fn test_break_reduces_work_hours() {
        let shift = Shift::new("D", t(9, 0), t(18, 0)).with_break(t(12, 0), t(13, 0));
        assert_eq!(shift.span_minutes(), 540);
        assert_eq!(shift.break_minutes(), 60);
        assert!((shift.work_hours() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_headcount_bounds() {
        let shift = Shift::new("D", t(8, 0), t(16, 0)).with_headcount(1, 2);
        assert!(!shift.headcount_ok(0));
        assert!(shift.headcount_ok(1));
        assert!(shift.headcount_ok(2));
        assert!(!shift.headcount_ok(3));
    }

    #[test]
    fn test_from_hm_rejects_bad_time() {
        assert!(Shift::from_hm("X", (25, 0), (8, 0)).is_none());
        assert!(Shift::from_hm("X", (6, 0), (14, 0)).is_some());
    }
}

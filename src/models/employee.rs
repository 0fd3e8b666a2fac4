//! Employee reference model.
//!
//! Employees come from the external directory. The engine only reads
//! the fields that matter for rostering: which shifts a person may work,
//! their per-day preferences, and their weekly hour cap.
//!
//! Per-day availability is expressed as a weighted rest preference
//! ([`ShiftPreference::rest`]). There is no hard unavailability rule: a
//! large weight makes working that day cost more than any soft trade-off,
//! while headcount and the other hard rules still take precedence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An employee as seen by the scheduling engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Shift IDs this employee may be assigned to.
    pub eligible_shifts: Vec<String>,
    /// Weighted per-day preferences.
    pub preferences: Vec<ShiftPreference>,
    /// Personal weekly hour cap. Falls back to the plan-wide threshold.
    pub max_weekly_hours: Option<f64>,
}

/// A wish for a specific day: a given shift, or a day off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftPreference {
    /// The calendar day the preference applies to.
    pub date: NaiveDate,
    /// Preferred shift; `None` means the employee prefers to rest.
    pub shift_id: Option<String>,
    /// Penalty weight when the preference is not met (≥ 0).
    pub weight: f64,
}

impl ShiftPreference {
    /// Preference for working a particular shift on `date`.
    pub fn shift(date: NaiveDate, shift_id: impl Into<String>, weight: f64) -> Self {
        Self {
            date,
            shift_id: Some(shift_id.into()),
            weight,
        }
    }

    /// Preference for a day off on `date`. Also the way to mark a day as
    /// unavailable, with a weight large enough to dominate soft penalties.
    pub fn rest(date: NaiveDate, weight: f64) -> Self {
        Self {
            date,
            shift_id: None,
            weight,
        }
    }
}

impl Employee {
    /// Creates an employee with no eligible shifts.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            eligible_shifts: Vec::new(),
            preferences: Vec::new(),
            max_weekly_hours: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the eligible shift IDs.
    pub fn with_eligible_shifts<I, S>(mut self, shift_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_shifts = shift_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a preference.
    pub fn with_preference(mut self, preference: ShiftPreference) -> Self {
        self.preferences.push(preference);
        self
    }

    /// Sets a personal weekly hour cap.
    pub fn with_max_weekly_hours(mut self, hours: f64) -> Self {
        self.max_weekly_hours = Some(hours);
        self
    }

    /// Whether the employee may work `shift_id`.
    pub fn is_eligible_for(&self, shift_id: &str) -> bool {
        self.eligible_shifts.iter().any(|s| s == shift_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_builder() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let emp = Employee::new("E1")
            .with_name("Kim")
            .with_eligible_shifts(["D", "N"])
            .with_preference(ShiftPreference::rest(day, 5.0))
            .with_max_weekly_hours(40.0);

        assert_eq!(emp.name, "Kim");
        assert!(emp.is_eligible_for("D"));
        assert!(!emp.is_eligible_for("E"));
        assert_eq!(emp.preferences.len(), 1);
        assert!(emp.preferences[0].shift_id.is_none());
        assert_eq!(emp.max_weekly_hours, Some(40.0));
    }
}

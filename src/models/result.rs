//! Schedule result rows.
//!
//! The persisted, queryable form of a plan's best schedule: one row per
//! (employee, day). Rows are replaced wholesale on every successful run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (employee, day) assignment of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Owning plan.
    pub plan_id: String,
    /// Assigned employee.
    pub employee_id: String,
    /// Calendar day.
    pub date: NaiveDate,
    /// Assigned shift; `None` = rest day.
    pub shift_id: Option<String>,
    /// Shift display name (denormalized for reports).
    pub shift_name: Option<String>,
    /// Paid hours for the day (0 on rest days).
    pub work_hours: f64,
}

impl ScheduleResult {
    /// Creates a rest-day row.
    pub fn rest(plan_id: impl Into<String>, employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            plan_id: plan_id.into(),
            employee_id: employee_id.into(),
            date,
            shift_id: None,
            shift_name: None,
            work_hours: 0.0,
        }
    }

    /// Creates a working-day row.
    pub fn shift(
        plan_id: impl Into<String>,
        employee_id: impl Into<String>,
        date: NaiveDate,
        shift_id: impl Into<String>,
        shift_name: impl Into<String>,
        work_hours: f64,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            employee_id: employee_id.into(),
            date,
            shift_id: Some(shift_id.into()),
            shift_name: Some(shift_name.into()),
            work_hours,
        }
    }

    /// Whether this row is a rest day.
    #[inline]
    pub fn is_rest(&self) -> bool {
        self.shift_id.is_none()
    }
}

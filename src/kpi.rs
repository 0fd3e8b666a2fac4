//! Roster statistics (KPIs).
//!
//! Computes workload indicators from the result rows of a plan.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total hours | Sum of paid hours over all rows |
//! | Avg hours | Total hours / employees |
//! | Workload std dev | Population std dev of per-employee hours |
//! | Rest days | Rows without a shift |
//! | Weekend shifts | Shifts worked on Saturday or Sunday |
//! | Shift mix | Assignments per shift ID |
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering", §4 (Evaluation)

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::constraints::variance;
use crate::models::ScheduleResult;

/// Workload of one employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeWorkload {
    /// Paid hours.
    pub hours: f64,
    /// Days with a shift.
    pub working_days: usize,
    /// Days without a shift.
    pub rest_days: usize,
    /// Shifts on Saturday or Sunday.
    pub weekend_shifts: usize,
}

/// Roster performance indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Number of shift assignments.
    pub total_assignments: usize,
    /// Number of rest rows.
    pub rest_days: usize,
    /// Paid hours over all employees.
    pub total_hours: f64,
    /// Mean paid hours per employee.
    pub avg_hours_per_employee: f64,
    /// Population std dev of paid hours per employee.
    pub workload_std_dev: f64,
    /// Per-employee workload, keyed by employee ID.
    pub by_employee: BTreeMap<String, EmployeeWorkload>,
    /// Assignment count per shift ID.
    pub assignments_by_shift: BTreeMap<String, usize>,
}

impl ScheduleKpi {
    /// Computes KPIs from result rows.
    pub fn calculate(rows: &[ScheduleResult]) -> Self {
        let mut kpi = Self::default();

        for row in rows {
            let load = kpi.by_employee.entry(row.employee_id.clone()).or_default();
            match &row.shift_id {
                Some(shift_id) => {
                    load.hours += row.work_hours;
                    load.working_days += 1;
                    if matches!(row.date.weekday(), Weekday::Sat | Weekday::Sun) {
                        load.weekend_shifts += 1;
                    }
                    *kpi.assignments_by_shift.entry(shift_id.clone()).or_default() += 1;
                    kpi.total_assignments += 1;
                    kpi.total_hours += row.work_hours;
                }
                None => {
                    load.rest_days += 1;
                    kpi.rest_days += 1;
                }
            }
        }

        let hours: Vec<f64> = kpi.by_employee.values().map(|w| w.hours).collect();
        if !hours.is_empty() {
            kpi.avg_hours_per_employee = kpi.total_hours / hours.len() as f64;
            kpi.workload_std_dev = variance(&hours).sqrt();
        }
        kpi
    }

    /// Whether workload spread is within `max_std_dev` hours.
    pub fn is_balanced(&self, max_std_dev: f64) -> bool {
        self.workload_std_dev <= max_std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_calculate() {
        // 2026-03-07 is a Saturday
        let rows = vec![
            ScheduleResult::shift("P", "E1", day(6), "EARLY", "Early", 8.0),
            ScheduleResult::shift("P", "E1", day(7), "LATE", "Late", 7.5),
            ScheduleResult::rest("P", "E2", day(6)),
            ScheduleResult::shift("P", "E2", day(7), "EARLY", "Early", 8.0),
        ];
        let kpi = ScheduleKpi::calculate(&rows);

        assert_eq!(kpi.total_assignments, 3);
        assert_eq!(kpi.rest_days, 1);
        assert!((kpi.total_hours - 23.5).abs() < 1e-10);
        assert!((kpi.avg_hours_per_employee - 11.75).abs() < 1e-10);
        // 15.5 and 8.0 → std dev 3.75
        assert!((kpi.workload_std_dev - 3.75).abs() < 1e-10);
        assert_eq!(kpi.assignments_by_shift["EARLY"], 2);
        assert_eq!(kpi.by_employee["E1"].weekend_shifts, 1);
        assert_eq!(kpi.by_employee["E2"].rest_days, 1);
        assert!(kpi.is_balanced(4.0));
        assert!(!kpi.is_balanced(3.0));
    }

    #[test]
    fn test_empty_rows() {
        let kpi = ScheduleKpi::calculate(&[]);
        assert_eq!(kpi, ScheduleKpi::default());
    }
}

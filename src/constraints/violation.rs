//! Constraint violations.
//!
//! Violations are recorded with problem indices so evaluation stays
//! allocation-light; [`ViolationSet::reports`] resolves them to IDs and
//! messages for diagnostics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ga::ScheduleProblem;

/// Whether a violation makes a schedule infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Infeasible: must be zero in an acceptable roster.
    Hard,
    /// Degrades quality only.
    Soft,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// An employee's shifts overlap in time (e.g. night shift into an early shift).
    Overlap,
    /// Headcount of a shift on a day is outside [min, max].
    Headcount,
    /// Less than the minimum rest between two consecutive shifts.
    MinRest,
    /// More consecutive working days than allowed.
    ConsecutiveDays,
    /// Assigned to a shift outside the eligible set.
    IneligibleShift,
    /// The employee has no eligible shift at all.
    NoEligibleShift,
    /// A weighted preference was not honoured.
    Preference,
    /// A shift type is unevenly spread across eligible employees.
    Fairness,
    /// Weekly hours above the threshold.
    Overtime,
    /// Weekend duty unevenly spread across employees.
    WeekendBalance,
    /// Total hours unevenly spread across employees.
    WorkloadBalance,
}

impl ViolationKind {
    /// Severity class of this kind.
    pub fn severity(self) -> Severity {
        match self {
            Self::Overlap
            | Self::Headcount
            | Self::MinRest
            | Self::ConsecutiveDays
            | Self::IneligibleShift
            | Self::NoEligibleShift => Severity::Hard,
            Self::Preference
            | Self::Fairness
            | Self::Overtime
            | Self::WeekendBalance
            | Self::WorkloadBalance => Severity::Soft,
        }
    }
}

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// What was violated.
    pub kind: ViolationKind,
    /// Employee index, when the violation concerns one employee.
    pub employee: Option<usize>,
    /// Day index, when the violation concerns one day.
    pub day: Option<usize>,
    /// Shift index, when the violation concerns one shift.
    pub shift: Option<usize>,
    /// Size of the violation (count, hours, variance, or preference weight).
    pub magnitude: f64,
    /// Penalty per unit of magnitude.
    pub weight: f64,
}

impl Violation {
    /// Creates a violation with no subject indices.
    pub fn new(kind: ViolationKind, magnitude: f64, weight: f64) -> Self {
        Self {
            kind,
            employee: None,
            day: None,
            shift: None,
            magnitude,
            weight,
        }
    }

    /// Sets the employee index.
    pub fn for_employee(mut self, employee: usize) -> Self {
        self.employee = Some(employee);
        self
    }

    /// Sets the day index.
    pub fn on_day(mut self, day: usize) -> Self {
        self.day = Some(day);
        self
    }

    /// Sets the shift index.
    pub fn for_shift(mut self, shift: usize) -> Self {
        self.shift = Some(shift);
        self
    }

    /// Penalty contribution: weight × magnitude.
    #[inline]
    pub fn penalty(&self) -> f64 {
        self.weight * self.magnitude
    }

    /// Whether this is a hard violation.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.kind.severity() == Severity::Hard
    }
}

/// All violations found in one chromosome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViolationSet {
    violations: Vec<Violation>,
}

impl ViolationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    #[inline]
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Empties the set, keeping its allocation.
    pub fn clear(&mut self) {
        self.violations.clear();
    }

    /// All violations.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Hard violations only.
    pub fn hard(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_hard())
    }

    /// Soft violations only.
    pub fn soft(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.is_hard())
    }

    /// Number of hard violations.
    pub fn hard_count(&self) -> usize {
        self.hard().count()
    }

    /// Number of violations of one kind.
    pub fn count_of(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    /// Sum of hard penalties.
    pub fn hard_penalty(&self) -> f64 {
        self.hard().map(Violation::penalty).sum()
    }

    /// Sum of soft penalties.
    pub fn soft_penalty(&self) -> f64 {
        self.soft().map(Violation::penalty).sum()
    }

    /// Whether there are no hard violations.
    pub fn is_feasible(&self) -> bool {
        self.hard_count() == 0
    }

    /// Total number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether there are no violations at all.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Resolves violations into ID-based reports.
    pub fn reports<'a>(
        &'a self,
        problem: &'a ScheduleProblem,
    ) -> impl Iterator<Item = ViolationReport> + 'a {
        self.violations.iter().map(move |v| ViolationReport::resolve(v, problem))
    }
}

/// A violation resolved to domain IDs, for diagnostics and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationReport {
    /// What was violated.
    pub kind: ViolationKind,
    /// Hard or soft.
    pub severity: Severity,
    /// Employee concerned.
    pub employee_id: Option<String>,
    /// Day concerned.
    pub date: Option<NaiveDate>,
    /// Shift concerned.
    pub shift_id: Option<String>,
    /// Size of the violation.
    pub magnitude: f64,
    /// Penalty contribution.
    pub penalty: f64,
    /// Human-readable description.
    pub message: String,
}

impl ViolationReport {
    fn resolve(v: &Violation, problem: &ScheduleProblem) -> Self {
        let employee_id = v.employee.map(|e| problem.employees[e].id.clone());
        let date = v.day.map(|d| problem.date(d));
        let shift_id = v.shift.map(|s| problem.shifts[s].id.clone());

        let who = employee_id.as_deref().unwrap_or("?");
        let what = shift_id.as_deref().unwrap_or("?");
        let when = date.map(|d| d.to_string()).unwrap_or_else(|| "?".into());

        let message = match v.kind {
            ViolationKind::Overlap => format!("{who}: shift on {when} overlaps the previous shift"),
            ViolationKind::Headcount => {
                format!("shift {what} on {when}: headcount off by {}", v.magnitude)
            }
            ViolationKind::MinRest => format!("{who}: insufficient rest before shift on {when}"),
            ViolationKind::ConsecutiveDays => {
                format!("{who}: too many consecutive working days at {when}")
            }
            ViolationKind::IneligibleShift => {
                format!("{who}: not eligible for shift {what} on {when}")
            }
            ViolationKind::NoEligibleShift => format!("{who}: has no eligible shifts"),
            ViolationKind::Preference => format!("{who}: preference on {when} not met"),
            ViolationKind::Fairness => {
                format!("shift {what}: uneven distribution (variance {:.2})", v.magnitude)
            }
            ViolationKind::Overtime => {
                format!("{who}: {:.1}h over weekly limit in week of {when}", v.magnitude)
            }
            ViolationKind::WeekendBalance => {
                format!("weekend duty uneven (variance {:.2})", v.magnitude)
            }
            ViolationKind::WorkloadBalance => {
                format!("workload uneven (std dev {:.1}h)", v.magnitude)
            }
        };

        Self {
            kind: v.kind,
            severity: v.kind.severity(),
            employee_id,
            date,
            shift_id,
            magnitude: v.magnitude,
            penalty: v.penalty(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_partitions_by_severity() {
        let mut set = ViolationSet::new();
        set.push(Violation::new(ViolationKind::Headcount, 2.0, 500.0).on_day(0).for_shift(1));
        set.push(Violation::new(ViolationKind::Preference, 3.0, 10.0).for_employee(0));

        assert_eq!(set.len(), 2);
        assert_eq!(set.hard_count(), 1);
        assert!(!set.is_feasible());
        assert!((set.hard_penalty() - 1000.0).abs() < 1e-10);
        assert!((set.soft_penalty() - 30.0).abs() < 1e-10);
        assert_eq!(set.count_of(ViolationKind::Preference), 1);
    }

    #[test]
    fn test_report_resolves_ids() {
        let problem = crate::ga::problem::fixtures::weekly_problem();
        let mut set = ViolationSet::new();
        set.push(
            Violation::new(ViolationKind::IneligibleShift, 1.0, 1000.0)
                .for_employee(2)
                .on_day(1)
                .for_shift(0),
        );

        let reports: Vec<_> = set.reports(&problem).collect();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].employee_id.as_deref(), Some("E3"));
        assert_eq!(reports[0].shift_id.as_deref(), Some("EARLY"));
        assert_eq!(reports[0].severity, Severity::Hard);
        assert_eq!(reports[0].message, "E3: not eligible for shift EARLY on 2026-03-03");
    }
}

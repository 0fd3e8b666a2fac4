//! Rostering problem definition.
//!
//! Bridges domain models (`Employee`, `Shift`) to the index-based
//! representation the GA works on. Built once per run from a snapshot of
//! the collaborator data and shared read-only by every evaluation.
//!
//! # Encoding
//! Employees and shifts are addressed by position. A gene holds either
//! `Gene::Rest` or `Gene::Shift(i)` where `i` indexes [`ScheduleProblem::shifts`].

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{horizon_days, Employee, ScheduleResult, Shift};

use super::ShiftChromosome;

/// One (employee, day) assignment: a shift or a rest day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gene {
    /// Day off.
    Rest,
    /// Works the shift at this index of the problem's shift list.
    Shift(usize),
}

impl Gene {
    /// Whether this is a rest day.
    #[inline]
    pub fn is_rest(self) -> bool {
        matches!(self, Gene::Rest)
    }

    /// The shift index, if working.
    #[inline]
    pub fn shift_index(self) -> Option<usize> {
        match self {
            Gene::Rest => None,
            Gene::Shift(i) => Some(i),
        }
    }
}

/// A preference resolved to problem indices.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPreference {
    /// Day index within the horizon.
    pub day: usize,
    /// Preferred assignment.
    pub preferred: Gene,
    /// Penalty weight when unmet.
    pub weight: f64,
}

/// Compact employee descriptor for GA encoding.
///
/// Extracted from `Employee` to avoid string lookups in the hot loop.
#[derive(Debug, Clone)]
pub struct EmployeeSlot {
    /// Employee ID.
    pub id: String,
    /// Indices of eligible shifts (unknown shift IDs are dropped).
    pub eligible: Vec<usize>,
    /// Personal weekly hour cap.
    pub max_weekly_hours: Option<f64>,
    /// Preferences that fall inside the horizon.
    pub preferences: Vec<DayPreference>,
}

impl EmployeeSlot {
    /// Whether shift `shift` is in the eligible set.
    #[inline]
    pub fn is_eligible(&self, shift: usize) -> bool {
        self.eligible.contains(&shift)
    }
}

/// Immutable snapshot of one rostering problem.
#[derive(Debug, Clone)]
pub struct ScheduleProblem {
    /// Employees, in plan order.
    pub employees: Vec<EmployeeSlot>,
    /// Shifts, in catalog order.
    pub shifts: Vec<Shift>,
    /// First day of the horizon.
    pub start_date: NaiveDate,
    /// Number of days in the horizon.
    pub days: usize,
    weekend: Vec<bool>,
    week_of_day: Vec<usize>,
    week_count: usize,
}

impl ScheduleProblem {
    /// Creates a problem from domain models and an inclusive horizon.
    ///
    /// An `end` before `start` yields an empty horizon; callers validate
    /// plans before building problems.
    pub fn new(employees: &[Employee], shifts: &[Shift], start: NaiveDate, end: NaiveDate) -> Self {
        let days = horizon_days(start, end);
        let shift_index: HashMap<&str, usize> = shifts
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();

        let slots = employees
            .iter()
            .map(|emp| {
                let mut eligible: Vec<usize> = emp
                    .eligible_shifts
                    .iter()
                    .filter_map(|id| shift_index.get(id.as_str()).copied())
                    .collect();
                eligible.sort_unstable();
                eligible.dedup();

                let preferences = emp
                    .preferences
                    .iter()
                    .filter_map(|pref| {
                        let offset = (pref.date - start).num_days();
                        if offset < 0 || offset as usize >= days {
                            return None;
                        }
                        let preferred = match &pref.shift_id {
                            None => Gene::Rest,
                            Some(id) => Gene::Shift(*shift_index.get(id.as_str())?),
                        };
                        Some(DayPreference {
                            day: offset as usize,
                            preferred,
                            weight: pref.weight.max(0.0),
                        })
                    })
                    .collect();

                EmployeeSlot {
                    id: emp.id.clone(),
                    eligible,
                    max_weekly_hours: emp.max_weekly_hours,
                    preferences,
                }
            })
            .collect();

        // Bucket days by ISO week, numbered in order of first appearance
        let mut week_ids: HashMap<(i32, u32), usize> = HashMap::new();
        let mut week_of_day = Vec::with_capacity(days);
        let mut weekend = Vec::with_capacity(days);
        for date in start.iter_days().take(days) {
            let iso = date.iso_week();
            let next = week_ids.len();
            week_of_day.push(*week_ids.entry((iso.year(), iso.week())).or_insert(next));
            weekend.push(matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
        }

        Self {
            employees: slots,
            shifts: shifts.to_vec(),
            start_date: start,
            days,
            weekend,
            week_of_day,
            week_count: week_ids.len(),
        }
    }

    /// Number of employees.
    #[inline]
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    /// Number of genes in a complete chromosome.
    #[inline]
    pub fn gene_count(&self) -> usize {
        self.days * self.employees.len()
    }

    /// Calendar date of a day index.
    pub fn date(&self, day: usize) -> NaiveDate {
        self.start_date + chrono::Days::new(day as u64)
    }

    /// Whether a day index falls on Saturday or Sunday.
    #[inline]
    pub fn is_weekend(&self, day: usize) -> bool {
        self.weekend[day]
    }

    /// ISO-week bucket of a day index.
    #[inline]
    pub fn week_of(&self, day: usize) -> usize {
        self.week_of_day[day]
    }

    /// Number of distinct ISO weeks touched by the horizon.
    #[inline]
    pub fn week_count(&self) -> usize {
        self.week_count
    }

    /// Employees without a single eligible shift.
    pub fn infeasible_employees(&self) -> Vec<usize> {
        self.employees
            .iter()
            .enumerate()
            .filter(|(_, e)| e.eligible.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Paid hours of a gene.
    #[inline]
    pub fn work_hours(&self, gene: Gene) -> f64 {
        gene.shift_index()
            .map(|s| self.shifts[s].work_hours())
            .unwrap_or(0.0)
    }

    /// Decodes a chromosome into result rows, ordered by (day, employee).
    pub fn decode(&self, plan_id: &str, chromosome: &ShiftChromosome) -> Vec<ScheduleResult> {
        let mut rows = Vec::with_capacity(self.gene_count());
        for day in 0..self.days {
            let date = self.date(day);
            for (emp_idx, emp) in self.employees.iter().enumerate() {
                let row = match chromosome.gene(emp_idx, day) {
                    Gene::Rest => ScheduleResult::rest(plan_id, &emp.id, date),
                    Gene::Shift(s) => {
                        let shift = &self.shifts[s];
                        ScheduleResult::shift(
                            plan_id,
                            &emp.id,
                            date,
                            &shift.id,
                            &shift.name,
                            shift.work_hours(),
                        )
                    }
                };
                rows.push(row);
            }
        }
        rows
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::ShiftPreference;

    /// Monday 2026-03-02.
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    /// Three non-overlapping day shifts, one person each.
    pub fn day_shifts() -> Vec<Shift> {
        vec![
            Shift::from_hm("EARLY", (7, 0), (15, 0)).unwrap().with_exact_headcount(1),
            Shift::from_hm("MID", (9, 0), (17, 0)).unwrap().with_exact_headcount(1),
            Shift::from_hm("LATE", (11, 0), (19, 0)).unwrap().with_exact_headcount(1),
        ]
    }

    /// `count` employees eligible for every shift in `shifts`.
    pub fn staff(count: usize, shifts: &[Shift]) -> Vec<Employee> {
        (1..=count)
            .map(|i| {
                Employee::new(format!("E{i}"))
                    .with_eligible_shifts(shifts.iter().map(|s| s.id.clone()))
            })
            .collect()
    }

    /// 5 employees × 7 days × 3 single-headcount shifts.
    pub fn weekly_problem() -> ScheduleProblem {
        let shifts = day_shifts();
        let employees = staff(5, &shifts);
        let start = monday();
        ScheduleProblem::new(&employees, &shifts, start, start + chrono::Days::new(6))
    }

    /// Same as [`weekly_problem`] with a rest preference for E1 on Monday.
    pub fn weekly_problem_with_preference() -> ScheduleProblem {
        let shifts = day_shifts();
        let mut employees = staff(5, &shifts);
        employees[0] = employees[0]
            .clone()
            .with_preference(ShiftPreference::rest(monday(), 4.0));
        let start = monday();
        ScheduleProblem::new(&employees, &shifts, start, start + chrono::Days::new(6))
    }
}

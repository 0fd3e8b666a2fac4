//! Hard constraint checks.
//!
//! Each check walks the chromosome once and appends to the violation set.
//! Times are absolute minutes from the start of the horizon, so shifts
//! that cross midnight are compared against the next day correctly.

use super::{ConstraintSettings, Violation, ViolationKind, ViolationSet};
use crate::ga::{Gene, ScheduleProblem, ShiftChromosome};
use crate::models::MINUTES_PER_DAY;

/// Employees with no eligible shift, and genes outside the eligible set.
pub(super) fn check_eligibility(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    let w = &settings.weights;
    for (e, emp) in problem.employees.iter().enumerate() {
        if emp.eligible.is_empty() {
            out.push(Violation::new(ViolationKind::NoEligibleShift, 1.0, w.no_eligible_shift).for_employee(e));
        }
        for day in 0..problem.days {
            if let Gene::Shift(s) = ch.gene(e, day) {
                if !emp.is_eligible(s) {
                    out.push(
                        Violation::new(ViolationKind::IneligibleShift, 1.0, w.ineligible_shift)
                            .for_employee(e)
                            .on_day(day)
                            .for_shift(s),
                    );
                }
            }
        }
    }
}

/// Per-shift per-day headcount within [min, max].
///
/// Magnitude is the number of people missing or in excess.
pub(super) fn check_headcount(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    let mut counts = vec![0u32; problem.shifts.len()];
    for day in 0..problem.days {
        counts.fill(0);
        for gene in ch.day_column(day) {
            if let Gene::Shift(s) = gene {
                counts[*s] += 1;
            }
        }
        for (s, shift) in problem.shifts.iter().enumerate() {
            let count = counts[s];
            let off = if count < shift.min_headcount {
                shift.min_headcount - count
            } else if count > shift.max_headcount {
                count - shift.max_headcount
            } else {
                continue;
            };
            out.push(
                Violation::new(ViolationKind::Headcount, off as f64, settings.weights.headcount)
                    .on_day(day)
                    .for_shift(s),
            );
        }
    }
}

/// Overlap, minimum rest, and consecutive working days per employee.
pub(super) fn check_sequences(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    let w = &settings.weights;
    let min_rest = (settings.min_rest_hours * 60.0).round() as i64;
    let max_streak = settings.max_consecutive_days as usize;

    for e in 0..problem.employee_count() {
        let mut prev_end: Option<i64> = None;
        let mut streak = 0usize;

        for day in 0..problem.days {
            let s = match ch.gene(e, day) {
                Gene::Rest => {
                    streak = 0;
                    continue;
                }
                Gene::Shift(s) => s,
            };
            let shift = &problem.shifts[s];
            let start = day as i64 * MINUTES_PER_DAY + shift.start_minute();

            if let Some(end) = prev_end {
                if start < end {
                    out.push(
                        Violation::new(ViolationKind::Overlap, 1.0, w.overlap)
                            .for_employee(e)
                            .on_day(day)
                            .for_shift(s),
                    );
                } else if start - end < min_rest {
                    out.push(
                        Violation::new(ViolationKind::MinRest, 1.0, w.min_rest)
                            .for_employee(e)
                            .on_day(day)
                            .for_shift(s),
                    );
                }
            }
            prev_end = Some(start + shift.span_minutes());

            streak += 1;
            if streak > max_streak {
                out.push(
                    Violation::new(ViolationKind::ConsecutiveDays, 1.0, w.consecutive_days)
                        .for_employee(e)
                        .on_day(day),
                );
            }
        }
    }
}

//! Soft constraint checks.
//!
//! Balance terms use population variance (or its square root for hours)
//! over the employees concerned; a perfectly even spread scores zero.

use super::{ConstraintSettings, Violation, ViolationKind, ViolationSet};
use crate::ga::{Gene, ScheduleProblem, ShiftChromosome};

const EPSILON: f64 = 1e-9;

/// Population variance; zero for fewer than two values.
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Unmet preferences. Magnitude is the preference weight.
pub(super) fn check_preferences(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    for (e, emp) in problem.employees.iter().enumerate() {
        for pref in &emp.preferences {
            if pref.weight <= 0.0 || ch.gene(e, pref.day) == pref.preferred {
                continue;
            }
            let mut v = Violation::new(ViolationKind::Preference, pref.weight, settings.weights.preference)
                .for_employee(e)
                .on_day(pref.day);
            if let Gene::Shift(s) = pref.preferred {
                v = v.for_shift(s);
            }
            out.push(v);
        }
    }
}

/// Variance of per-shift assignment counts across eligible employees.
pub(super) fn check_fairness(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    let n = problem.employee_count();
    let mut counts = vec![0.0f64; n];
    let mut eligible_counts = Vec::with_capacity(n);

    for s in 0..problem.shifts.len() {
        counts.fill(0.0);
        for day in 0..problem.days {
            for (e, gene) in ch.day_column(day).iter().enumerate() {
                if *gene == Gene::Shift(s) {
                    counts[e] += 1.0;
                }
            }
        }
        eligible_counts.clear();
        eligible_counts.extend(
            problem
                .employees
                .iter()
                .enumerate()
                .filter(|(_, emp)| emp.is_eligible(s))
                .map(|(e, _)| counts[e]),
        );
        let var = variance(&eligible_counts);
        if var > EPSILON {
            out.push(Violation::new(ViolationKind::Fairness, var, settings.weights.fairness).for_shift(s));
        }
    }
}

/// Hours above the weekly cap, per employee per ISO week.
///
/// The cap is the employee's own limit when set, otherwise the plan-wide
/// threshold. The violation is anchored on the first day of the week
/// inside the horizon.
pub(super) fn check_overtime(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    let weeks = problem.week_count();
    let mut hours = vec![0.0f64; weeks];
    let mut first_day = vec![usize::MAX; weeks];
    for day in 0..problem.days {
        let w = problem.week_of(day);
        first_day[w] = first_day[w].min(day);
    }

    for (e, emp) in problem.employees.iter().enumerate() {
        let cap = emp.max_weekly_hours.unwrap_or(settings.max_weekly_hours);
        hours.fill(0.0);
        for day in 0..problem.days {
            hours[problem.week_of(day)] += problem.work_hours(ch.gene(e, day));
        }
        for (w, &total) in hours.iter().enumerate() {
            let excess = total - cap;
            if excess > EPSILON {
                out.push(
                    Violation::new(ViolationKind::Overtime, excess, settings.weights.overtime)
                        .for_employee(e)
                        .on_day(first_day[w]),
                );
            }
        }
    }
}

/// Variance of weekend days worked across employees.
pub(super) fn check_weekend_balance(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    if !settings.weekend_balance || !(0..problem.days).any(|d| problem.is_weekend(d)) {
        return;
    }
    let mut worked = vec![0.0f64; problem.employee_count()];
    for day in (0..problem.days).filter(|&d| problem.is_weekend(d)) {
        for (e, gene) in ch.day_column(day).iter().enumerate() {
            if !gene.is_rest() {
                worked[e] += 1.0;
            }
        }
    }
    let var = variance(&worked);
    if var > EPSILON {
        out.push(Violation::new(ViolationKind::WeekendBalance, var, settings.weights.weekend_balance));
    }
}

/// Standard deviation of total hours across employees.
pub(super) fn check_workload_balance(
    problem: &ScheduleProblem,
    settings: &ConstraintSettings,
    ch: &ShiftChromosome,
    out: &mut ViolationSet,
) {
    let totals: Vec<f64> = (0..problem.employee_count())
        .map(|e| ch.employee_row(e).map(|g| problem.work_hours(g)).sum())
        .collect();
    let std_dev = variance(&totals).sqrt();
    if std_dev > EPSILON {
        out.push(Violation::new(
            ViolationKind::WorkloadBalance,
            std_dev,
            settings.weights.workload_balance,
        ));
    }
}

//! Rostering constraint model.
//!
//! Evaluates a complete chromosome against the hard and soft rules of a
//! plan and returns every violation with its weighted penalty.
//!
//! # Hard constraints (must be zero in an acceptable roster)
//! - No overlapping shifts for one employee
//! - Per-shift per-day headcount within [min, max]
//! - Minimum rest between consecutive shifts
//! - Maximum consecutive working days
//! - Only eligible shifts; every employee has at least one
//!
//! # Soft constraints
//! - Weighted employee preferences
//! - Fair spread of each shift type among eligible employees
//! - Weekly overtime above the cap
//! - Weekend duty balance
//! - Total workload balance
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models"

mod hard;
mod soft;
mod violation;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ga::{ScheduleProblem, ShiftChromosome};

pub(crate) use soft::variance;
pub use violation::{Severity, Violation, ViolationKind, ViolationReport, ViolationSet};

/// Penalty per unit of violation magnitude, per rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintWeights {
    pub overlap: f64,
    pub headcount: f64,
    pub min_rest: f64,
    pub consecutive_days: f64,
    pub ineligible_shift: f64,
    pub no_eligible_shift: f64,
    pub preference: f64,
    pub fairness: f64,
    pub overtime: f64,
    pub weekend_balance: f64,
    pub workload_balance: f64,
}

impl Default for ConstraintWeights {
    fn default() -> Self {
        Self {
            overlap: 1000.0,
            headcount: 500.0,
            min_rest: 300.0,
            consecutive_days: 300.0,
            ineligible_shift: 1000.0,
            no_eligible_shift: 1000.0,
            preference: 10.0,
            fairness: 5.0,
            overtime: 20.0,
            weekend_balance: 5.0,
            workload_balance: 2.0,
        }
    }
}

impl ConstraintWeights {
    /// Weight of one rule.
    pub fn of(&self, kind: ViolationKind) -> f64 {
        match kind {
            ViolationKind::Overlap => self.overlap,
            ViolationKind::Headcount => self.headcount,
            ViolationKind::MinRest => self.min_rest,
            ViolationKind::ConsecutiveDays => self.consecutive_days,
            ViolationKind::IneligibleShift => self.ineligible_shift,
            ViolationKind::NoEligibleShift => self.no_eligible_shift,
            ViolationKind::Preference => self.preference,
            ViolationKind::Fairness => self.fairness,
            ViolationKind::Overtime => self.overtime,
            ViolationKind::WeekendBalance => self.weekend_balance,
            ViolationKind::WorkloadBalance => self.workload_balance,
        }
    }

    /// All weights, in declaration order, with their names.
    pub(crate) fn named(&self) -> [(&'static str, f64); 11] {
        [
            ("overlap", self.overlap),
            ("headcount", self.headcount),
            ("min_rest", self.min_rest),
            ("consecutive_days", self.consecutive_days),
            ("ineligible_shift", self.ineligible_shift),
            ("no_eligible_shift", self.no_eligible_shift),
            ("preference", self.preference),
            ("fairness", self.fairness),
            ("overtime", self.overtime),
            ("weekend_balance", self.weekend_balance),
            ("workload_balance", self.workload_balance),
        ]
    }
}

/// Labor rules of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSettings {
    /// Minimum hours between the end of one shift and the start of the next.
    pub min_rest_hours: f64,
    /// Maximum run of working days.
    pub max_consecutive_days: u32,
    /// Weekly hour threshold for employees without a personal cap.
    pub max_weekly_hours: f64,
    /// Whether to balance weekend duty.
    pub weekend_balance: bool,
    /// Penalty weights.
    pub weights: ConstraintWeights,
}

impl Default for ConstraintSettings {
    fn default() -> Self {
        Self {
            min_rest_hours: 12.0,
            max_consecutive_days: 6,
            max_weekly_hours: 48.0,
            weekend_balance: true,
            weights: ConstraintWeights::default(),
        }
    }
}

impl ConstraintSettings {
    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.min_rest_hours = hours;
        self
    }

    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    pub fn with_max_weekly_hours(mut self, hours: f64) -> Self {
        self.max_weekly_hours = hours;
        self
    }

    pub fn with_weekend_balance(mut self, enabled: bool) -> Self {
        self.weekend_balance = enabled;
        self
    }

    pub fn with_weights(mut self, weights: ConstraintWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// Constraint evaluator bound to one problem.
///
/// Cheap to clone; the problem is shared.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    problem: Arc<ScheduleProblem>,
    settings: ConstraintSettings,
}

impl ConstraintModel {
    /// Creates a model for `problem` under `settings`.
    pub fn new(problem: impl Into<Arc<ScheduleProblem>>, settings: ConstraintSettings) -> Self {
        Self {
            problem: problem.into(),
            settings,
        }
    }

    /// The problem being evaluated.
    pub fn problem(&self) -> &ScheduleProblem {
        &self.problem
    }

    /// The labor rules in force.
    pub fn settings(&self) -> &ConstraintSettings {
        &self.settings
    }

    /// Evaluates every rule against a chromosome.
    pub fn evaluate(&self, chromosome: &ShiftChromosome) -> ViolationSet {
        let mut out = ViolationSet::new();
        self.evaluate_into(chromosome, &mut out);
        out
    }

    /// Evaluates into an existing set, clearing it first.
    pub fn evaluate_into(&self, chromosome: &ShiftChromosome, out: &mut ViolationSet) {
        out.clear();
        let (p, s) = (self.problem.as_ref(), &self.settings);

        hard::check_eligibility(p, s, chromosome, out);
        hard::check_headcount(p, s, chromosome, out);
        hard::check_sequences(p, s, chromosome, out);

        soft::check_preferences(p, s, chromosome, out);
        soft::check_fairness(p, s, chromosome, out);
        soft::check_overtime(p, s, chromosome, out);
        soft::check_weekend_balance(p, s, chromosome, out);
        soft::check_workload_balance(p, s, chromosome, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::problem::fixtures::*;
    use crate::ga::Gene;
    use crate::models::{Employee, Shift};
    use chrono::Days;

    fn model(problem: ScheduleProblem) -> ConstraintModel {
        ConstraintModel::new(problem, ConstraintSettings::default())
    }

    /// E1..E3 on EARLY/MID/LATE every day, E4/E5 rest: satisfies headcount.
    fn rotation(problem: &ScheduleProblem) -> ShiftChromosome {
        let mut ch = ShiftChromosome::all_rest(problem);
        for day in 0..problem.days {
            for s in 0..3 {
                ch.set_gene((day + s) % 5, day, Gene::Shift(s));
            }
        }
        ch
    }

    #[test]
    fn test_all_rest_misses_headcount() {
        let m = model(weekly_problem());
        let ch = ShiftChromosome::all_rest(m.problem());
        let v = m.evaluate(&ch);

        // 3 shifts × 7 days, each short by one
        assert_eq!(v.count_of(ViolationKind::Headcount), 21);
        assert!((v.hard_penalty() - 21.0 * 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_is_feasible() {
        let m = model(weekly_problem());
        let v = m.evaluate(&rotation(m.problem()));
        assert!(v.is_feasible(), "{:?}", v.hard().collect::<Vec<_>>());
    }

    #[test]
    fn test_overstaffing_counts_excess() {
        let m = model(weekly_problem());
        let mut ch = rotation(m.problem());
        // Two extra people on EARLY on day 0
        let idle: Vec<usize> = (0..5).filter(|&e| ch.gene(e, 0).is_rest()).collect();
        for &e in &idle {
            ch.set_gene(e, 0, Gene::Shift(0));
        }
        let v = m.evaluate(&ch);
        let hc: Vec<_> = v.iter().filter(|x| x.kind == ViolationKind::Headcount).collect();
        assert_eq!(hc.len(), 1);
        assert_eq!(hc[0].magnitude, 2.0);
    }

    #[test]
    fn test_night_into_early_overlaps() {
        let shifts = vec![
            Shift::from_hm("NIGHT", (22, 0), (8, 0)).unwrap(),
            Shift::from_hm("EARLY", (6, 0), (14, 0)).unwrap(),
        ];
        let emp = Employee::new("E1").with_eligible_shifts(["NIGHT", "EARLY"]);
        let problem = ScheduleProblem::new(&[emp], &shifts, monday(), monday() + Days::new(1));
        let m = model(problem);

        let mut ch = ShiftChromosome::all_rest(m.problem());
        ch.set_gene(0, 0, Gene::Shift(0));
        ch.set_gene(0, 1, Gene::Shift(1));
        let v = m.evaluate(&ch);
        assert_eq!(v.count_of(ViolationKind::Overlap), 1);
        assert_eq!(v.count_of(ViolationKind::MinRest), 0);
    }

    #[test]
    fn test_short_turnaround_breaks_min_rest() {
        let shifts = vec![
            Shift::from_hm("LATE", (14, 0), (22, 0)).unwrap(),
            Shift::from_hm("EARLY", (6, 0), (14, 0)).unwrap(),
        ];
        let emp = Employee::new("E1").with_eligible_shifts(["LATE", "EARLY"]);
        let problem = ScheduleProblem::new(&[emp], &shifts, monday(), monday() + Days::new(1));
        let m = model(problem);

        let mut ch = ShiftChromosome::all_rest(m.problem());
        ch.set_gene(0, 0, Gene::Shift(0));
        ch.set_gene(0, 1, Gene::Shift(1));
        let v = m.evaluate(&ch);
        // 22:00 to 06:00 is 8h < 12h
        assert_eq!(v.count_of(ViolationKind::MinRest), 1);
        assert_eq!(v.count_of(ViolationKind::Overlap), 0);
    }

    #[test]
    fn test_consecutive_days_counted_per_excess_day() {
        let shifts = vec![Shift::from_hm("DAY", (8, 0), (16, 0)).unwrap()];
        let emp = Employee::new("E1").with_eligible_shifts(["DAY"]);
        let problem = ScheduleProblem::new(&[emp], &shifts, monday(), monday() + Days::new(7));
        let m = model(problem);

        let mut ch = ShiftChromosome::all_rest(m.problem());
        for day in 0..8 {
            ch.set_gene(0, day, Gene::Shift(0));
        }
        let v = m.evaluate(&ch);
        // Days 7 and 8 of the streak exceed the limit of 6
        assert_eq!(v.count_of(ViolationKind::ConsecutiveDays), 2);
    }

    #[test]
    fn test_ineligible_and_no_eligible() {
        let shifts = day_shifts();
        let employees = vec![
            Employee::new("E1").with_eligible_shifts(["EARLY"]),
            Employee::new("E2"),
        ];
        let problem = ScheduleProblem::new(&employees, &shifts, monday(), monday());
        let m = model(problem);

        let mut ch = ShiftChromosome::all_rest(m.problem());
        ch.set_gene(0, 0, Gene::Shift(2));
        let v = m.evaluate(&ch);
        assert_eq!(v.count_of(ViolationKind::IneligibleShift), 1);
        assert_eq!(v.count_of(ViolationKind::NoEligibleShift), 1);
    }

    #[test]
    fn test_unmet_preference_penalized_by_weight() {
        let m = model(weekly_problem_with_preference());
        let mut ch = rotation(m.problem());
        assert_eq!(ch.gene(0, 0), Gene::Shift(0));
        let v = m.evaluate(&ch);
        let pref: Vec<_> = v.iter().filter(|x| x.kind == ViolationKind::Preference).collect();
        assert_eq!(pref.len(), 1);
        assert!((pref[0].penalty() - 40.0).abs() < 1e-9);

        ch.set_gene(0, 0, Gene::Rest);
        assert_eq!(m.evaluate(&ch).count_of(ViolationKind::Preference), 0);
    }

    #[test]
    fn test_overtime_uses_personal_cap() {
        let shifts = vec![Shift::from_hm("DAY", (8, 0), (16, 0)).unwrap()];
        let employees = vec![
            Employee::new("E1").with_eligible_shifts(["DAY"]).with_max_weekly_hours(20.0),
            Employee::new("E2").with_eligible_shifts(["DAY"]),
        ];
        let problem = ScheduleProblem::new(&employees, &shifts, monday(), monday() + Days::new(4));
        let m = model(problem);

        let mut ch = ShiftChromosome::all_rest(m.problem());
        for day in 0..5 {
            ch.set_gene(0, day, Gene::Shift(0));
            ch.set_gene(1, day, Gene::Shift(0));
        }
        let v = m.evaluate(&ch);
        let ot: Vec<_> = v.iter().filter(|x| x.kind == ViolationKind::Overtime).collect();
        // E1: 40h against 20h cap; E2: 40h under the 48h default
        assert_eq!(ot.len(), 1);
        assert_eq!(ot[0].employee, Some(0));
        assert!((ot[0].magnitude - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekend_balance_toggle() {
        let problem = weekly_problem();
        let mut ch = ShiftChromosome::all_rest(&problem);
        ch.set_gene(0, 5, Gene::Shift(0));
        ch.set_gene(0, 6, Gene::Shift(0));

        let on = ConstraintModel::new(problem.clone(), ConstraintSettings::default());
        let off = ConstraintModel::new(problem, ConstraintSettings::default().with_weekend_balance(false));
        assert_eq!(on.evaluate(&ch).count_of(ViolationKind::WeekendBalance), 1);
        assert_eq!(off.evaluate(&ch).count_of(ViolationKind::WeekendBalance), 0);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let m = model(weekly_problem_with_preference());
        let ch = rotation(m.problem());
        assert_eq!(m.evaluate(&ch), m.evaluate(&ch));
    }

    #[test]
    fn test_settings_serde_defaults() {
        let s: ConstraintSettings = serde_json::from_str(r#"{"min_rest_hours": 10}"#).unwrap();
        assert_eq!(s.min_rest_hours, 10.0);
        assert_eq!(s.max_consecutive_days, 6);
        assert_eq!(s.weights, ConstraintWeights::default());
        assert_eq!(s.weights.of(ViolationKind::Headcount), 500.0);
    }
}

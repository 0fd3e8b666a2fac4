//! Day-major roster chromosome.
//!
//! # Encoding
//!
//! One gene per (employee, day), stored day-major: the genes of day `d`
//! occupy `d * E .. (d + 1) * E` where `E` is the employee count. Every
//! operator preserves the length, so a chromosome always covers each
//! (employee, day) pair exactly once.
//!
//! Day-major storage makes a day's full assignment column a contiguous
//! slice, which is what day-wise crossover copies.
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering"

use rand::prelude::IndexedRandom;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Gene, ScheduleProblem};
use crate::constraints::ConstraintSettings;
use crate::models::MINUTES_PER_DAY;

/// A complete candidate roster.
///
/// Higher fitness = better schedule (maximization convention). The cached
/// fitness is cleared by every gene write.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftChromosome {
    genes: Vec<Gene>,
    employees: usize,
    days: usize,
    fitness: Option<f64>,
}

impl ShiftChromosome {
    /// A roster where everybody rests every day.
    pub fn all_rest(problem: &ScheduleProblem) -> Self {
        Self {
            genes: vec![Gene::Rest; problem.gene_count()],
            employees: problem.employee_count(),
            days: problem.days,
            fitness: None,
        }
    }

    /// Builds a chromosome from raw day-major genes.
    ///
    /// Returns `None` when the gene count does not match the problem.
    pub fn from_genes(problem: &ScheduleProblem, genes: Vec<Gene>) -> Option<Self> {
        if genes.len() != problem.gene_count() {
            return None;
        }
        Some(Self {
            genes,
            employees: problem.employee_count(),
            days: problem.days,
            fitness: None,
        })
    }

    /// Creates a random chromosome.
    ///
    /// Each gene is drawn uniformly from the employee's eligible shifts
    /// plus rest. Employees with no eligible shift always rest.
    pub fn random<R: Rng>(problem: &ScheduleProblem, rng: &mut R) -> Self {
        let mut ch = Self::all_rest(problem);
        for day in 0..problem.days {
            for (emp_idx, emp) in problem.employees.iter().enumerate() {
                let pick = rng.random_range(0..=emp.eligible.len());
                if pick < emp.eligible.len() {
                    ch.genes[day * ch.employees + emp_idx] = Gene::Shift(emp.eligible[pick]);
                }
            }
        }
        ch
    }

    /// Creates a greedily seeded chromosome.
    ///
    /// Walks the horizon day by day and fills each shift up to its minimum
    /// headcount. Candidates are tried in random order; employees who would
    /// break the rest or consecutive-day limits, or who asked for the day
    /// off, are only used when nobody else is eligible. Everyone left over
    /// rests.
    pub fn greedy<R: Rng>(
        problem: &ScheduleProblem,
        settings: &ConstraintSettings,
        rng: &mut R,
    ) -> Self {
        let mut ch = Self::all_rest(problem);
        let n = problem.employee_count();
        let min_rest = (settings.min_rest_hours * 60.0).round() as i64;
        let max_streak = settings.max_consecutive_days as usize;

        let mut streak = vec![0usize; n];
        let mut last_end: Vec<Option<i64>> = vec![None; n];
        let mut order: Vec<usize> = (0..n).collect();
        let mut shift_order: Vec<usize> = (0..problem.shifts.len()).collect();

        for day in 0..problem.days {
            order.shuffle(rng);
            shift_order.shuffle(rng);
            let mut taken = vec![false; n];
            let day_offset = day as i64 * MINUTES_PER_DAY;

            for &s in &shift_order {
                let shift = &problem.shifts[s];
                let start = day_offset + shift.start_minute();
                let mut needed = shift.min_headcount as usize;

                let comfortable = |e: usize| {
                    streak[e] < max_streak
                        && last_end[e].map_or(true, |end| start - end >= min_rest)
                        && !problem.employees[e]
                            .preferences
                            .iter()
                            .any(|p| p.day == day && p.preferred.is_rest())
                };

                for relaxed in [false, true] {
                    for &e in &order {
                        if needed == 0 {
                            break;
                        }
                        if taken[e] || !problem.employees[e].is_eligible(s) {
                            continue;
                        }
                        if !relaxed && !comfortable(e) {
                            continue;
                        }
                        taken[e] = true;
                        ch.genes[day * n + e] = Gene::Shift(s);
                        needed -= 1;
                    }
                }
            }

            for e in 0..n {
                match ch.genes[day * n + e] {
                    Gene::Shift(s) => {
                        let shift = &problem.shifts[s];
                        streak[e] += 1;
                        last_end[e] = Some(day_offset + shift.start_minute() + shift.span_minutes());
                    }
                    Gene::Rest => streak[e] = 0,
                }
            }
        }
        ch
    }

    /// Gene of `employee` on `day`.
    #[inline]
    pub fn gene(&self, employee: usize, day: usize) -> Gene {
        self.genes[day * self.employees + employee]
    }

    /// Overwrites one gene and clears the cached fitness.
    pub fn set_gene(&mut self, employee: usize, day: usize, gene: Gene) {
        self.genes[day * self.employees + employee] = gene;
        self.fitness = None;
    }

    /// All genes, day-major.
    #[inline]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// The full assignment column of one day.
    #[inline]
    pub fn day_column(&self, day: usize) -> &[Gene] {
        &self.genes[day * self.employees..(day + 1) * self.employees]
    }

    /// One employee's genes across the horizon.
    pub fn employee_row(&self, employee: usize) -> impl Iterator<Item = Gene> + '_ {
        (0..self.days).map(move |day| self.gene(employee, day))
    }

    /// Number of employees encoded.
    #[inline]
    pub fn employee_count(&self) -> usize {
        self.employees
    }

    /// Number of days encoded.
    #[inline]
    pub fn day_count(&self) -> usize {
        self.days
    }

    /// Cached fitness, if evaluated since the last change.
    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Cached fitness, or negative infinity when unevaluated.
    #[inline]
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Stores an evaluated fitness.
    #[inline]
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Whether the chromosome has exactly one gene per (employee, day).
    pub fn is_complete(&self, problem: &ScheduleProblem) -> bool {
        self.employees == problem.employee_count()
            && self.days == problem.days
            && self.genes.len() == problem.gene_count()
    }

    /// Whether the chromosome is complete and only uses eligible shifts.
    pub fn is_valid(&self, problem: &ScheduleProblem) -> bool {
        if !self.is_complete(problem) {
            return false;
        }
        (0..self.days).all(|day| {
            (0..self.employees).all(|e| match self.gene(e, day) {
                Gene::Rest => true,
                Gene::Shift(s) => problem.employees[e].is_eligible(s),
            })
        })
    }
}

// ======================== Crossover operators ========================

/// Day-wise uniform crossover.
///
/// For each day the child inherits that day's whole assignment column
/// from `p1` or `p2` with equal probability. Keeps per-day headcount
/// patterns intact, which gene-wise crossover would scatter.
pub fn day_crossover<R: Rng>(
    p1: &ShiftChromosome,
    p2: &ShiftChromosome,
    rng: &mut R,
) -> ShiftChromosome {
    let mut child = p1.clone();
    child.fitness = None;
    let n = child.employees;
    for day in 0..child.days {
        if rng.random_bool(0.5) {
            child.genes[day * n..(day + 1) * n].copy_from_slice(p2.day_column(day));
        }
    }
    child
}

/// Employee-wise uniform crossover.
///
/// For each employee the child inherits that person's full row from
/// `p1` or `p2`. Keeps individual work patterns (rest spacing, streaks)
/// intact at the cost of per-day headcount.
pub fn employee_crossover<R: Rng>(
    p1: &ShiftChromosome,
    p2: &ShiftChromosome,
    rng: &mut R,
) -> ShiftChromosome {
    let mut child = p1.clone();
    child.fitness = None;
    let n = child.employees;
    for e in 0..n {
        if rng.random_bool(0.5) {
            for day in 0..child.days {
                child.genes[day * n + e] = p2.genes[day * n + e];
            }
        }
    }
    child
}

// ======================== Mutation operators ========================

/// Reassign mutation: with probability `rate` per gene, moves the gene to
/// a different eligible shift or to rest.
pub fn reassign_mutation<R: Rng>(
    chromosome: &mut ShiftChromosome,
    problem: &ScheduleProblem,
    rate: f64,
    rng: &mut R,
) {
    let n = chromosome.employees;
    let mut options: Vec<Gene> = Vec::new();
    let mut changed = false;

    for idx in 0..chromosome.genes.len() {
        if !rng.random_bool(rate) {
            continue;
        }
        let emp = &problem.employees[idx % n];
        if emp.eligible.is_empty() {
            continue;
        }
        let current = chromosome.genes[idx];
        options.clear();
        options.extend(
            std::iter::once(Gene::Rest)
                .chain(emp.eligible.iter().map(|&s| Gene::Shift(s)))
                .filter(|&g| g != current),
        );
        if let Some(&gene) = options.choose(rng) {
            chromosome.genes[idx] = gene;
            changed = true;
        }
    }

    if changed {
        chromosome.fitness = None;
    }
}

/// Swap mutation: with probability `rate` per gene, swaps the assignment
/// with another employee on the same day when both stay eligible.
/// Leaves per-day headcount unchanged.
pub fn swap_mutation<R: Rng>(
    chromosome: &mut ShiftChromosome,
    problem: &ScheduleProblem,
    rate: f64,
    rng: &mut R,
) {
    let n = chromosome.employees;
    if n < 2 {
        return;
    }
    let fits = |e: usize, g: Gene| g.shift_index().map_or(true, |s| problem.employees[e].is_eligible(s));
    let mut changed = false;

    for idx in 0..chromosome.genes.len() {
        if !rng.random_bool(rate) {
            continue;
        }
        let (day, a) = (idx / n, idx % n);
        let b = rng.random_range(0..n);
        let (ia, ib) = (day * n + a, day * n + b);
        let (ga, gb) = (chromosome.genes[ia], chromosome.genes[ib]);
        if a == b || ga == gb || !fits(a, gb) || !fits(b, ga) {
            continue;
        }
        chromosome.genes.swap(ia, ib);
        changed = true;
    }

    if changed {
        chromosome.fitness = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::problem::fixtures::*;
    use crate::models::Employee;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_chromosome() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = ShiftChromosome::random(&problem, &mut rng);

        assert_eq!(ch.genes().len(), 35);
        assert!(ch.is_valid(&problem));
        assert_eq!(ch.fitness(), None);
    }

    #[test]
    fn test_greedy_meets_headcount() {
        let problem = weekly_problem();
        let settings = ConstraintSettings::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = ShiftChromosome::greedy(&problem, &settings, &mut rng);

        assert!(ch.is_valid(&problem));
        for day in 0..problem.days {
            for s in 0..problem.shifts.len() {
                let count = ch.day_column(day).iter().filter(|&&g| g == Gene::Shift(s)).count();
                assert_eq!(count, 1, "day {day} shift {s}");
            }
        }
    }

    #[test]
    fn test_greedy_respects_rest_preference_when_possible() {
        let problem = weekly_problem_with_preference();
        let settings = ConstraintSettings::default();
        for seed in 0..10 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let ch = ShiftChromosome::greedy(&problem, &settings, &mut rng);
            assert_eq!(ch.gene(0, 0), Gene::Rest);
        }
    }

    #[test]
    fn test_infeasible_employee_always_rests() {
        let shifts = day_shifts();
        let employees = vec![
            Employee::new("E1").with_eligible_shifts(["EARLY"]),
            Employee::new("E2"),
        ];
        let problem = ScheduleProblem::new(&employees, &shifts, monday(), monday() + chrono::Days::new(3));
        let mut rng = SmallRng::seed_from_u64(42);

        let mut ch = ShiftChromosome::random(&problem, &mut rng);
        reassign_mutation(&mut ch, &problem, 1.0, &mut rng);
        assert!(ch.employee_row(1).all(Gene::is_rest));
    }

    #[test]
    fn test_day_crossover_copies_whole_columns() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = ShiftChromosome::all_rest(&problem);
        let mut p2 = ShiftChromosome::all_rest(&problem);
        for day in 0..problem.days {
            for e in 0..problem.employee_count() {
                p2.set_gene(e, day, Gene::Shift(0));
            }
        }

        let child = day_crossover(&p1, &p2, &mut rng);
        assert!(child.is_complete(&problem));
        assert_eq!(child.fitness(), None);
        for day in 0..problem.days {
            let col = child.day_column(day);
            assert!(col == p1.day_column(day) || col == p2.day_column(day));
        }
    }

    #[test]
    fn test_employee_crossover_copies_whole_rows() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(7);
        let p1 = ShiftChromosome::all_rest(&problem);
        let mut p2 = ShiftChromosome::all_rest(&problem);
        for day in 0..problem.days {
            for e in 0..problem.employee_count() {
                p2.set_gene(e, day, Gene::Shift(1));
            }
        }

        let child = employee_crossover(&p1, &p2, &mut rng);
        for e in 0..problem.employee_count() {
            let row: Vec<Gene> = child.employee_row(e).collect();
            assert!(row.iter().all(|g| *g == row[0]));
        }
    }

    #[test]
    fn test_reassign_mutation_changes_every_gene_at_full_rate() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let original = ShiftChromosome::random(&problem, &mut rng);
        let mut ch = original.clone();
        ch.set_fitness(1.0);

        reassign_mutation(&mut ch, &problem, 1.0, &mut rng);
        assert!(ch.is_valid(&problem));
        assert_eq!(ch.fitness(), None);
        assert!(ch.genes().iter().zip(original.genes()).all(|(a, b)| a != b));
    }

    #[test]
    fn test_zero_rate_mutation_keeps_fitness() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ch = ShiftChromosome::random(&problem, &mut rng);
        ch.set_fitness(5.0);
        let before = ch.clone();

        reassign_mutation(&mut ch, &problem, 0.0, &mut rng);
        swap_mutation(&mut ch, &problem, 0.0, &mut rng);
        assert_eq!(ch, before);
    }

    #[test]
    fn test_swap_mutation_preserves_daily_headcount() {
        let problem = weekly_problem();
        let settings = ConstraintSettings::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let original = ShiftChromosome::greedy(&problem, &settings, &mut rng);
        let mut ch = original.clone();

        swap_mutation(&mut ch, &problem, 0.5, &mut rng);
        assert!(ch.is_valid(&problem));
        for day in 0..problem.days {
            let mut a: Vec<Gene> = original.day_column(day).to_vec();
            let mut b: Vec<Gene> = ch.day_column(day).to_vec();
            a.sort_by_key(|g| g.shift_index());
            b.sort_by_key(|g| g.shift_index());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_from_genes_checks_length() {
        let problem = weekly_problem();
        assert!(ShiftChromosome::from_genes(&problem, vec![Gene::Rest; 34]).is_none());
        assert!(ShiftChromosome::from_genes(&problem, vec![Gene::Rest; 35]).is_some());
    }
}

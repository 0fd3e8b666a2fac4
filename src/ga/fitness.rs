//! Fitness evaluation.
//!
//! `fitness = BASE_SCORE − Σ hard penalties − Σ soft penalties`, where each
//! penalty is `weight × magnitude`. Higher is better; negative values are
//! allowed and simply rank worse. Evaluation is pure: the same chromosome
//! under the same weights always scores the same.

use rayon::prelude::*;
use rayon::ThreadPool;

use super::ShiftChromosome;
use crate::constraints::{ConstraintModel, ViolationSet};

/// Score of a chromosome with no violations at all.
pub const BASE_SCORE: f64 = 10_000.0;

/// Where a generation's evaluations run.
#[derive(Debug, Default)]
pub enum EvalPool {
    /// On the calling thread.
    Sequential,
    /// On rayon's global pool (one worker per core).
    #[default]
    Global,
    /// On a dedicated, bounded pool.
    Dedicated(ThreadPool),
}

/// Fitness broken down by severity.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessBreakdown {
    /// Scalar fitness.
    pub fitness: f64,
    /// Sum of hard penalties.
    pub hard_penalty: f64,
    /// Sum of soft penalties.
    pub soft_penalty: f64,
    /// Every violation found.
    pub violations: ViolationSet,
}

/// Scores chromosomes against a read-only constraint model.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    model: ConstraintModel,
}

impl FitnessEvaluator {
    /// Creates an evaluator over `model`.
    pub fn new(model: ConstraintModel) -> Self {
        Self { model }
    }

    /// The underlying constraint model.
    pub fn model(&self) -> &ConstraintModel {
        &self.model
    }

    /// Scalar fitness of one chromosome.
    pub fn evaluate(&self, chromosome: &ShiftChromosome) -> f64 {
        self.breakdown(chromosome).fitness
    }

    /// Fitness with its violation detail.
    pub fn breakdown(&self, chromosome: &ShiftChromosome) -> FitnessBreakdown {
        let violations = self.model.evaluate(chromosome);
        let hard_penalty = violations.hard_penalty();
        let soft_penalty = violations.soft_penalty();
        FitnessBreakdown {
            fitness: BASE_SCORE - hard_penalty - soft_penalty,
            hard_penalty,
            soft_penalty,
            violations,
        }
    }

    /// Whether a fitness value means "no penalties at all".
    #[inline]
    pub fn is_perfect(fitness: f64) -> bool {
        fitness >= BASE_SCORE
    }

    /// Evaluates every chromosome whose fitness is not cached.
    ///
    /// Returns once all scores are in; callers rely on this as the
    /// generation boundary.
    pub fn evaluate_all(&self, chromosomes: &mut [ShiftChromosome], pool: &EvalPool) {
        let score = |ch: &mut ShiftChromosome| {
            if ch.fitness().is_none() {
                let f = self.evaluate(ch);
                ch.set_fitness(f);
            }
        };
        match pool {
            EvalPool::Sequential => chromosomes.iter_mut().for_each(score),
            EvalPool::Global => chromosomes.par_iter_mut().for_each(score),
            EvalPool::Dedicated(pool) => pool.install(|| chromosomes.par_iter_mut().for_each(score)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSettings;
    use crate::ga::problem::fixtures::*;
    use crate::ga::{Gene, ScheduleProblem};
    use crate::models::Shift;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn evaluator(problem: ScheduleProblem) -> FitnessEvaluator {
        FitnessEvaluator::new(ConstraintModel::new(problem, ConstraintSettings::default()))
    }

    #[test]
    fn test_perfect_single_assignment() {
        let shifts = vec![Shift::from_hm("DAY", (8, 0), (16, 0)).unwrap().with_exact_headcount(1)];
        let employees = staff(1, &shifts);
        let eval = evaluator(ScheduleProblem::new(&employees, &shifts, monday(), monday()));

        let mut ch = ShiftChromosome::all_rest(eval.model().problem());
        assert!((eval.evaluate(&ch) - (BASE_SCORE - 500.0)).abs() < 1e-9);

        ch.set_gene(0, 0, Gene::Shift(0));
        let f = eval.evaluate(&ch);
        assert_eq!(f, BASE_SCORE);
        assert!(FitnessEvaluator::is_perfect(f));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let eval = evaluator(weekly_problem_with_preference());
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = ShiftChromosome::random(eval.model().problem(), &mut rng);
        assert_eq!(eval.evaluate(&ch), eval.evaluate(&ch));
    }

    #[test]
    fn test_breakdown_sums_to_fitness() {
        let eval = evaluator(weekly_problem());
        let mut rng = SmallRng::seed_from_u64(3);
        let ch = ShiftChromosome::random(eval.model().problem(), &mut rng);
        let b = eval.breakdown(&ch);
        assert!((b.fitness - (BASE_SCORE - b.hard_penalty - b.soft_penalty)).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_all_matches_sequential() {
        let eval = evaluator(weekly_problem());
        let mut rng = SmallRng::seed_from_u64(42);
        let problem = eval.model().problem();
        let seq: Vec<ShiftChromosome> = (0..16).map(|_| ShiftChromosome::random(problem, &mut rng)).collect();
        let mut a = seq.clone();
        let mut b = seq;

        eval.evaluate_all(&mut a, &EvalPool::Sequential);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        eval.evaluate_all(&mut b, &EvalPool::Dedicated(pool));

        for (x, y) in a.iter().zip(&b) {
            assert!(x.fitness().is_some());
            assert_eq!(x.fitness(), y.fitness());
        }
    }

    #[test]
    fn test_evaluate_all_keeps_cached_scores() {
        let eval = evaluator(weekly_problem());
        let mut chs = vec![ShiftChromosome::all_rest(eval.model().problem())];
        chs[0].set_fitness(1.5);
        eval.evaluate_all(&mut chs, &EvalPool::Global);
        assert_eq!(chs[0].fitness(), Some(1.5));
    }
}

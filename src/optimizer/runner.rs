//! Generation loop.
//!
//! # Algorithm
//!
//! 1. Seed the population (half greedy, half random) and evaluate it.
//! 2. Each generation:
//!    - copy the top `elite_count` chromosomes unchanged,
//!    - breed one offspring per remaining slot (tournament → crossover →
//!      mutation) and evaluate all offspring,
//!    - each offspring replaces the slot's incumbent if it is at least as
//!      fit, otherwise with probability `exp(Δ / T)`,
//!    - cool the temperature.
//! 3. Stop on cancellation, perfect score, stagnation, generation budget,
//!    or time limit.
//!
//! Cancellation and the time limit are checked at generation boundaries
//! only, so a generation always finishes evaluating before the run ends.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use super::annealing::{self, Temperature};
use super::{
    CancellationToken, GenerationStats, OptimizationConfig, OptimizationResult, OptimizerState,
};
use crate::constraints::{ConstraintModel, Severity};
use crate::error::ScheduleError;
use crate::ga::{EvalPool, FitnessEvaluator, Population, ShiftChromosome};

/// Minimum gain that counts as an improvement for stagnation tracking.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Callback invoked after every generation (including generation 0).
pub type GenerationObserver = Box<dyn FnMut(&GenerationStats) + Send>;

/// GA + simulated-annealing roster optimizer.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_roster::constraints::{ConstraintModel, ConstraintSettings};
/// use u_roster::ga::ScheduleProblem;
/// use u_roster::models::{Employee, Shift};
/// use u_roster::optimizer::{OptimizationConfig, Optimizer, OptimizerState};
///
/// let shifts = vec![Shift::from_hm("DAY", (8, 0), (16, 0)).unwrap().with_exact_headcount(1)];
/// let staff = vec![Employee::new("E1").with_eligible_shifts(["DAY"])];
/// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let model = ConstraintModel::new(
///     ScheduleProblem::new(&staff, &shifts, day, day),
///     ConstraintSettings::default(),
/// );
///
/// let mut optimizer = Optimizer::new(model, OptimizationConfig::default().with_seed(1)).unwrap();
/// let result = optimizer.run();
/// assert_eq!(result.state, OptimizerState::Converged);
/// assert!(result.is_feasible());
/// ```
pub struct Optimizer {
    evaluator: FitnessEvaluator,
    config: OptimizationConfig,
    cancel: CancellationToken,
    observer: Option<GenerationObserver>,
}

impl std::fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimizer")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Optimizer {
    /// Creates an optimizer after validating `config`.
    pub fn new(model: ConstraintModel, config: OptimizationConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Self {
            evaluator: FitnessEvaluator::new(model),
            config,
            cancel: CancellationToken::new(),
            observer: None,
        })
    }

    /// Uses an external cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Registers a per-generation callback.
    pub fn with_observer(mut self, observer: impl FnMut(&GenerationStats) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Token that cancels this optimizer.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The fitness evaluator in use.
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Runs the optimization to a terminal state.
    ///
    /// Never fails: infeasible configurations and cancellations are
    /// reported through [`OptimizationResult::state`].
    pub fn run(&mut self) -> OptimizationResult {
        let Self {
            evaluator,
            config,
            cancel,
            observer,
        } = self;
        let started = Instant::now();
        let model = evaluator.model();
        let problem = model.problem();
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let pool = build_pool(config);
        let time_limit = config.time_limit_ms.map(Duration::from_millis);
        let mut diagnostics = Vec::new();

        info!(
            employees = problem.employee_count(),
            days = problem.days,
            shifts = problem.shifts.len(),
            population = config.population_size,
            max_generations = config.max_generations,
            "optimization started"
        );

        let infeasible = problem.infeasible_employees();
        for &e in &infeasible {
            let id = &problem.employees[e].id;
            warn!(employee = %id, "employee has no eligible shifts");
            diagnostics.push(format!("employee {id} has no eligible shifts"));
        }

        let mut state = OptimizerState::Initialized;
        let mut population =
            Population::initialize(problem, model.settings(), config.population_size, &mut rng);
        evaluator.evaluate_all(population.members_mut(), &pool);
        population.sort();

        let mut best = population
            .best()
            .cloned()
            .unwrap_or_else(|| ShiftChromosome::all_rest(problem));
        let mut temperature = Temperature::new(config.initial_temperature, config.cooling_rate);
        let mut history = Vec::with_capacity(config.max_generations.min(4096) + 1);
        let mut generation = 0usize;
        let mut stagnant = 0usize;
        let mut timed_out = false;

        let initial = GenerationStats {
            generation,
            best_fitness: best.fitness_or_worst(),
            mean_fitness: population.mean_fitness(),
            temperature: temperature.current(),
            accepted: 0,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        if let Some(observe) = observer.as_mut() {
            observe(&initial);
        }
        history.push(initial);

        let terminal = if FitnessEvaluator::is_perfect(best.fitness_or_worst()) {
            OptimizerState::Converged
        } else {
            loop {
                if cancel.is_cancelled() {
                    break OptimizerState::Cancelled;
                }
                if generation >= config.max_generations {
                    break OptimizerState::Exhausted;
                }
                if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                    timed_out = true;
                    break OptimizerState::Exhausted;
                }
                if state == OptimizerState::Initialized {
                    state = OptimizerState::Evolving;
                    debug!("population seeded, evolving");
                }
                generation += 1;

                let elite = config.elite_count.min(population.len());
                let mut offspring = Vec::with_capacity(population.len() - elite);
                for _ in elite..population.len() {
                    let (Some(p1), Some(p2)) = (
                        population.tournament(config.tournament_size, &mut rng),
                        population.tournament(config.tournament_size, &mut rng),
                    ) else {
                        break;
                    };
                    let mut child = config.operators.crossover(p1, p2, &mut rng);
                    config
                        .operators
                        .mutate(&mut child, problem, config.mutation_rate, &mut rng);
                    offspring.push(child);
                }
                evaluator.evaluate_all(&mut offspring, &pool);

                let mut next = population.elites(elite);
                let mut accepted = 0usize;
                for (incumbent, child) in population.members().iter().skip(elite).zip(offspring) {
                    if annealing::accept(
                        child.fitness_or_worst(),
                        incumbent.fitness_or_worst(),
                        temperature.current(),
                        &mut rng,
                    ) {
                        next.push(child);
                        accepted += 1;
                    } else {
                        next.push(incumbent.clone());
                    }
                }
                population = Population::from_members(next);
                population.sort();

                let generation_best = population.best().map_or(f64::NEG_INFINITY, |c| c.fitness_or_worst());
                if generation_best > best.fitness_or_worst() + IMPROVEMENT_EPSILON {
                    if let Some(b) = population.best() {
                        best = b.clone();
                    }
                    stagnant = 0;
                } else {
                    stagnant += 1;
                }

                let stats = GenerationStats {
                    generation,
                    best_fitness: generation_best,
                    mean_fitness: population.mean_fitness(),
                    temperature: temperature.current(),
                    accepted,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                debug!(
                    generation,
                    best_fitness = stats.best_fitness,
                    mean_fitness = stats.mean_fitness,
                    temperature = stats.temperature,
                    accepted,
                    "generation complete"
                );
                if let Some(observe) = observer.as_mut() {
                    observe(&stats);
                }
                history.push(stats);
                temperature.cool();

                if FitnessEvaluator::is_perfect(best.fitness_or_worst()) {
                    break OptimizerState::Converged;
                }
                if stagnant >= config.stagnation_limit {
                    break OptimizerState::Converged;
                }
            }
        };

        let state = if terminal != OptimizerState::Cancelled && !infeasible.is_empty() {
            OptimizerState::Failed
        } else {
            terminal
        };

        let breakdown = evaluator.breakdown(&best);
        let violations: Vec<_> = breakdown
            .violations
            .reports(problem)
            .filter(|r| r.severity == Severity::Hard)
            .collect();

        if timed_out {
            diagnostics.push(format!(
                "time limit of {} ms reached after {generation} generations",
                config.time_limit_ms.unwrap_or_default()
            ));
        }
        if state == OptimizerState::Cancelled {
            diagnostics.push(format!("cancelled after {generation} generations"));
        }
        if !violations.is_empty() {
            diagnostics.push(format!("{} hard constraint violations remain", violations.len()));
            if state == OptimizerState::Failed {
                diagnostics.extend(violations.iter().map(|v| v.message.clone()));
            }
        }

        let duration = started.elapsed();
        info!(
            state = ?state,
            generations = generation,
            best_fitness = breakdown.fitness,
            hard_violations = violations.len(),
            elapsed_ms = duration.as_millis() as u64,
            "optimization finished"
        );

        OptimizationResult {
            best_fitness: breakdown.fitness,
            best,
            generations: generation,
            duration,
            success: matches!(state, OptimizerState::Converged | OptimizerState::Exhausted),
            completed_normally: !timed_out && state != OptimizerState::Cancelled,
            state,
            violations,
            soft_penalty: breakdown.soft_penalty,
            diagnostics,
            history,
        }
    }
}

fn build_pool(config: &OptimizationConfig) -> EvalPool {
    if !config.parallel {
        return EvalPool::Sequential;
    }
    let Some(threads) = config.worker_threads else {
        return EvalPool::Global;
    };
    match ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("u-roster-eval-{i}"))
        .build()
    {
        Ok(pool) => EvalPool::Dedicated(pool),
        Err(err) => {
            warn!(error = %err, threads, "worker pool unavailable, using the global pool");
            EvalPool::Global
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSettings;
    use crate::ga::problem::fixtures::*;
    use crate::ga::{ScheduleProblem, BASE_SCORE};
    use crate::models::{Employee, Shift};
    use std::sync::{Arc, Mutex};

    fn weekly_model() -> ConstraintModel {
        ConstraintModel::new(weekly_problem(), ConstraintSettings::default())
    }

    fn config() -> OptimizationConfig {
        OptimizationConfig::default()
            .with_population_size(20)
            .with_max_generations(30)
            .with_seed(42)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Optimizer::new(weekly_model(), config().with_cooling_rate(1.5)).unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn test_weekly_run_is_feasible() {
        let mut opt = Optimizer::new(weekly_model(), config()).unwrap();
        let result = opt.run();

        assert!(result.success);
        assert!(result.completed_normally);
        assert!(result.is_feasible(), "{:?}", result.violations);
        assert!(result.best_fitness > 0.0);
        assert!(result.best.is_complete(opt.evaluator().model().problem()));
        assert_eq!(result.history.len(), result.generations + 1);
    }

    #[test]
    fn test_best_never_regresses() {
        let mut opt = Optimizer::new(weekly_model(), config().with_mutation_rate(0.2)).unwrap();
        let result = opt.run();
        for pair in result.history.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
        }
        let last = result.history.last().map(|s| s.best_fitness).unwrap();
        assert!((result.best_fitness - last).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let cfg = config().with_parallel(false);
        let a = Optimizer::new(weekly_model(), cfg.clone()).unwrap().run();
        let b = Optimizer::new(weekly_model(), cfg).unwrap().run();
        assert_eq!(a.best, b.best);
        assert_eq!(a.generations, b.generations);
    }

    #[test]
    fn test_dedicated_pool_matches_sequential() {
        let a = Optimizer::new(weekly_model(), config().with_parallel(false)).unwrap().run();
        let b = Optimizer::new(weekly_model(), config().with_worker_threads(2)).unwrap().run();
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.generations, b.generations);
    }

    #[test]
    fn test_single_slot_converges_immediately() {
        let shifts = vec![Shift::from_hm("DAY", (8, 0), (16, 0)).unwrap().with_exact_headcount(1)];
        let employees = staff(1, &shifts);
        let model = ConstraintModel::new(
            ScheduleProblem::new(&employees, &shifts, monday(), monday()),
            ConstraintSettings::default(),
        );
        let result = Optimizer::new(model, config()).unwrap().run();

        assert_eq!(result.state, OptimizerState::Converged);
        assert!(result.generations <= 2);
        assert_eq!(result.best_fitness, BASE_SCORE);
    }

    #[test]
    fn test_stagnation_converges() {
        let cfg = config().with_max_generations(10_000).with_stagnation_limit(5);
        let result = Optimizer::new(weekly_model(), cfg).unwrap().run();
        assert_eq!(result.state, OptimizerState::Converged);
        assert!(result.generations < 10_000);
    }

    #[test]
    fn test_generation_budget_exhausts() {
        let cfg = config().with_max_generations(3).with_stagnation_limit(100);
        let result = Optimizer::new(weekly_model(), cfg).unwrap().run();
        assert_eq!(result.state, OptimizerState::Exhausted);
        assert_eq!(result.generations, 3);
        assert!(result.success);
    }

    #[test]
    fn test_time_limit_marks_incomplete() {
        let cfg = config()
            .with_max_generations(usize::MAX)
            .with_stagnation_limit(usize::MAX)
            .with_time_limit_ms(0);
        let result = Optimizer::new(weekly_model(), cfg).unwrap().run();
        assert_eq!(result.state, OptimizerState::Exhausted);
        assert!(result.success);
        assert!(!result.completed_normally);
        assert!(result.diagnostics.iter().any(|d| d.contains("time limit")));
    }

    #[test]
    fn test_cancel_at_generation_boundary() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let cfg = config()
            .with_max_generations(10_000)
            .with_stagnation_limit(10_000);
        let mut opt = Optimizer::new(weekly_model(), cfg)
            .unwrap()
            .with_cancellation(token)
            .with_observer(move |stats| {
                if stats.generation == 3 {
                    remote.cancel();
                }
            });
        let result = opt.run();

        assert_eq!(result.state, OptimizerState::Cancelled);
        assert_eq!(result.generations, 3);
        assert!(!result.success);
        assert!(!result.completed_normally);
    }

    #[test]
    fn test_no_eligible_shift_fails_with_diagnostics() {
        let shifts = day_shifts();
        let mut employees = staff(4, &shifts);
        employees.push(Employee::new("E5"));
        let model = ConstraintModel::new(
            ScheduleProblem::new(&employees, &shifts, monday(), monday() + chrono::Days::new(6)),
            ConstraintSettings::default(),
        );
        let result = Optimizer::new(model, config()).unwrap().run();

        assert_eq!(result.state, OptimizerState::Failed);
        assert!(!result.success);
        assert!(!result.violations.is_empty());
        assert!(result.diagnostics.iter().any(|d| d.contains("E5")));
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cfg = config().with_max_generations(4).with_stagnation_limit(100);
        let result = Optimizer::new(weekly_model(), cfg)
            .unwrap()
            .with_observer(move |s| sink.lock().unwrap().push(s.generation))
            .run();
        assert_eq!(result.generations, 4);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}

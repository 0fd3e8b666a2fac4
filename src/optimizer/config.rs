//! Search parameters.

use serde::{Deserialize, Serialize};

use crate::ga::GeneticOperators;
use crate::validation::{ValidationError, ValidationErrorKind, ValidationResult};

/// GA + simulated-annealing parameters of one run.
///
/// Stored on each plan; every field has a default so partial JSON is
/// accepted.
///
/// # Example
/// ```
/// use u_roster::optimizer::OptimizationConfig;
///
/// let config = OptimizationConfig::default()
///     .with_population_size(30)
///     .with_max_generations(100)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Chromosomes per generation.
    pub population_size: usize,
    /// Upper bound on generations.
    pub max_generations: usize,
    /// Starting annealing temperature.
    pub initial_temperature: f64,
    /// Per-generation temperature multiplier, in (0, 1).
    pub cooling_rate: f64,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Top chromosomes copied unchanged into the next generation.
    pub elite_count: usize,
    /// Generations without improvement before converging.
    pub stagnation_limit: usize,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Evaluate fitness on a worker pool.
    pub parallel: bool,
    /// Dedicated pool size; `None` uses one worker per core.
    pub worker_threads: Option<usize>,
    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Crossover and mutation strategies.
    pub operators: GeneticOperators,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            mutation_rate: 0.02,
            elite_count: 2,
            stagnation_limit: 50,
            tournament_size: 3,
            seed: None,
            parallel: true,
            worker_threads: None,
            time_limit_ms: None,
            operators: GeneticOperators::default(),
        }
    }
}

impl OptimizationConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_stagnation_limit(mut self, generations: usize) -> Self {
        self.stagnation_limit = generations;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Checks every parameter, collecting all problems.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut check = |ok: bool, message: String| {
            if !ok {
                errors.push(ValidationError::new(ValidationErrorKind::InvalidParameter, message));
            }
        };

        check(
            self.population_size >= 2,
            format!("population_size must be at least 2, got {}", self.population_size),
        );
        check(
            self.max_generations >= 1,
            format!("max_generations must be at least 1, got {}", self.max_generations),
        );
        check(
            self.initial_temperature > 0.0 && self.initial_temperature.is_finite(),
            format!("initial_temperature must be positive, got {}", self.initial_temperature),
        );
        check(
            self.cooling_rate > 0.0 && self.cooling_rate < 1.0,
            format!("cooling_rate must be in (0, 1), got {}", self.cooling_rate),
        );
        check(
            (0.0..=1.0).contains(&self.mutation_rate),
            format!("mutation_rate must be in [0, 1], got {}", self.mutation_rate),
        );
        check(
            self.elite_count >= 1 && self.elite_count < self.population_size,
            format!(
                "elite_count must be in [1, population_size), got {}",
                self.elite_count
            ),
        );
        check(
            self.stagnation_limit >= 1,
            format!("stagnation_limit must be at least 1, got {}", self.stagnation_limit),
        );
        check(
            self.tournament_size >= 1 && self.tournament_size <= self.population_size,
            format!(
                "tournament_size must be in [1, population_size], got {}",
                self.tournament_size
            ),
        );
        if let Some(threads) = self.worker_threads {
            check(threads >= 1, format!("worker_threads must be at least 1, got {threads}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(OptimizationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_collects_every_issue() {
        let config = OptimizationConfig::default()
            .with_population_size(1)
            .with_cooling_rate(1.0)
            .with_mutation_rate(-0.1)
            .with_worker_threads(0);
        let errors = config.validate().unwrap_err();
        // population, cooling, mutation, elite (2 >= 1), tournament (3 > 1), workers
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::InvalidParameter));
        assert!(errors[1].message.contains("cooling_rate"));
    }

    #[test]
    fn test_zero_generations_rejected() {
        let errors = OptimizationConfig::default()
            .with_max_generations(0)
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("max_generations"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: OptimizationConfig =
            serde_json::from_str(r#"{"population_size": 20, "seed": 9}"#).unwrap();
        assert_eq!(config.population_size, 20);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_generations, 200);
        assert!((config.cooling_rate - 0.95).abs() < 1e-12);
    }
}

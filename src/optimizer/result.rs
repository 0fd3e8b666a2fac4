//! Run outcome types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constraints::ViolationReport;
use crate::ga::ShiftChromosome;

/// Optimizer lifecycle.
///
/// `Initialized → Evolving → Converged | Exhausted | Cancelled | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizerState {
    /// Population created and seeded.
    Initialized,
    /// Generations running.
    Evolving,
    /// Stagnation limit hit, or a perfect roster found.
    Converged,
    /// Generation or time budget used up.
    Exhausted,
    /// Cancellation observed at a generation boundary.
    Cancelled,
    /// Infeasible configuration; the result is best-effort only.
    Failed,
}

impl OptimizerState {
    /// Whether the run has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Initialized | Self::Evolving)
    }
}

/// Snapshot of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number (0 = initial population).
    pub generation: usize,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Temperature used for this generation's acceptance.
    pub temperature: f64,
    /// Offspring that replaced their incumbent.
    pub accepted: usize,
    /// Time since the run started (ms).
    pub elapsed_ms: u64,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best chromosome seen across all generations.
    pub best: ShiftChromosome,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations actually run (0 when the initial population was enough).
    pub generations: usize,
    /// Wall-clock duration.
    pub duration: Duration,
    /// False when the run was cancelled or the configuration is infeasible.
    pub success: bool,
    /// False when the time limit cut the run short.
    pub completed_normally: bool,
    /// Terminal state.
    pub state: OptimizerState,
    /// Hard violations left in `best`.
    pub violations: Vec<ViolationReport>,
    /// Sum of soft penalties of `best`.
    pub soft_penalty: f64,
    /// Human-readable notes (infeasibility, timeouts, remaining violations).
    pub diagnostics: Vec<String>,
    /// Per-generation statistics, generation 0 first.
    pub history: Vec<GenerationStats>,
}

impl OptimizationResult {
    /// Number of unresolved hard violations.
    pub fn hard_violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Whether `best` satisfies every hard constraint.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    /// Duration in whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}

//! Population management and selection.

use rand::Rng;

use super::{ScheduleProblem, ShiftChromosome};
use crate::constraints::ConstraintSettings;

/// A generation of candidate rosters.
///
/// After [`sort`](Population::sort), index 0 is the fittest.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<ShiftChromosome>,
}

impl Population {
    /// Wraps existing chromosomes.
    pub fn from_members(members: Vec<ShiftChromosome>) -> Self {
        Self { members }
    }

    /// Seeds `size` chromosomes: the first half greedily, the rest at random.
    pub fn initialize<R: Rng>(
        problem: &ScheduleProblem,
        settings: &ConstraintSettings,
        size: usize,
        rng: &mut R,
    ) -> Self {
        let greedy = size.div_ceil(2);
        let members = (0..size)
            .map(|i| {
                if i < greedy {
                    ShiftChromosome::greedy(problem, settings, rng)
                } else {
                    ShiftChromosome::random(problem, rng)
                }
            })
            .collect();
        Self { members }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All members.
    pub fn members(&self) -> &[ShiftChromosome] {
        &self.members
    }

    /// All members, mutably.
    pub fn members_mut(&mut self) -> &mut [ShiftChromosome] {
        &mut self.members
    }

    /// Sorts by fitness, best first. Unevaluated members sort last.
    pub fn sort(&mut self) {
        self.members
            .sort_by(|a, b| b.fitness_or_worst().total_cmp(&a.fitness_or_worst()));
    }

    /// The fittest member, by cached fitness.
    pub fn best(&self) -> Option<&ShiftChromosome> {
        self.members
            .iter()
            .max_by(|a, b| a.fitness_or_worst().total_cmp(&b.fitness_or_worst()))
    }

    /// Mean cached fitness of evaluated members.
    pub fn mean_fitness(&self) -> f64 {
        let (sum, n) = self
            .members
            .iter()
            .filter_map(ShiftChromosome::fitness)
            .fold((0.0, 0usize), |(s, n), f| (s + f, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Tournament selection: picks `k` members at random (with
    /// replacement) and returns the fittest of them.
    pub fn tournament<R: Rng>(&self, k: usize, rng: &mut R) -> Option<&ShiftChromosome> {
        if self.members.is_empty() {
            return None;
        }
        (0..k.max(1))
            .map(|_| &self.members[rng.random_range(0..self.members.len())])
            .max_by(|a, b| a.fitness_or_worst().total_cmp(&b.fitness_or_worst()))
    }

    /// Clones of the top `count` members. Assumes the population is sorted.
    pub fn elites(&self, count: usize) -> Vec<ShiftChromosome> {
        self.members.iter().take(count).cloned().collect()
    }
}

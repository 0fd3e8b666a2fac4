//! Configurable genetic operators for rostering.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`].
//!
//! # Usage
//!
//! ```
//! use u_roster::ga::operators::{CrossoverType, GeneticOperators, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::DayColumn);
//! assert_eq!(ops.mutation_type, MutationType::Reassign);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{
    day_crossover, employee_crossover, reassign_mutation, swap_mutation, ShiftChromosome,
};
use super::ScheduleProblem;

/// Crossover strategy for roster chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Inherit each day's whole assignment column from one parent.
    #[default]
    DayColumn,
    /// Inherit each employee's whole row from one parent.
    EmployeeRow,
}

/// Mutation strategy for roster chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MutationType {
    /// Move a gene to another eligible shift or to rest.
    #[default]
    Reassign,
    /// Swap two employees' assignments on the same day.
    Swap,
    /// Swap, then reassign.
    Both,
}

/// Runtime-selectable genetic operators for the roster GA.
///
/// # Example
///
/// ```
/// use u_roster::ga::operators::{CrossoverType, GeneticOperators, MutationType};
///
/// let ops = GeneticOperators {
///     crossover_type: CrossoverType::EmployeeRow,
///     mutation_type: MutationType::Swap,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
}

impl GeneticOperators {
    /// Produces one child using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &ShiftChromosome,
        p2: &ShiftChromosome,
        rng: &mut R,
    ) -> ShiftChromosome {
        match self.crossover_type {
            CrossoverType::DayColumn => day_crossover(p1, p2, rng),
            CrossoverType::EmployeeRow => employee_crossover(p1, p2, rng),
        }
    }

    /// Mutates in place with per-gene probability `rate`.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut ShiftChromosome,
        problem: &ScheduleProblem,
        rate: f64,
        rng: &mut R,
    ) {
        match self.mutation_type {
            MutationType::Reassign => reassign_mutation(chromosome, problem, rate, rng),
            MutationType::Swap => swap_mutation(chromosome, problem, rate, rng),
            MutationType::Both => {
                swap_mutation(chromosome, problem, rate, rng);
                reassign_mutation(chromosome, problem, rate, rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::problem::fixtures::weekly_problem;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert_eq!(ops.crossover_type, CrossoverType::DayColumn);
        assert_eq!(ops.mutation_type, MutationType::Reassign);
    }

    #[test]
    fn test_crossover_variants_keep_shape() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = ShiftChromosome::random(&problem, &mut rng);
        let p2 = ShiftChromosome::random(&problem, &mut rng);

        for crossover_type in [CrossoverType::DayColumn, CrossoverType::EmployeeRow] {
            let ops = GeneticOperators {
                crossover_type,
                ..Default::default()
            };
            let child = ops.crossover(&p1, &p2, &mut rng);
            assert!(child.is_valid(&problem));
        }
    }

    #[test]
    fn test_mutation_variants_stay_valid() {
        let problem = weekly_problem();
        let mut rng = SmallRng::seed_from_u64(42);

        for mutation_type in [MutationType::Reassign, MutationType::Swap, MutationType::Both] {
            let ops = GeneticOperators {
                mutation_type,
                ..Default::default()
            };
            let mut ch = ShiftChromosome::random(&problem, &mut rng);
            ops.mutate(&mut ch, &problem, 0.3, &mut rng);
            assert!(ch.is_valid(&problem));
        }
    }

    #[test]
    fn test_operators_serde() {
        let ops: GeneticOperators = serde_json::from_str(r#"{"mutation_type":"Swap"}"#).unwrap();
        assert_eq!(ops.crossover_type, CrossoverType::DayColumn);
        assert_eq!(ops.mutation_type, MutationType::Swap);
    }
}

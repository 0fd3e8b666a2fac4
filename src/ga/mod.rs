//! GA-based roster optimization.
//!
//! Scheduling-specific GA encoding, operators, population, and fitness
//! evaluation. The generation loop itself lives in
//! [`optimizer`](crate::optimizer).
//!
//! # Encoding
//!
//! One [`Gene`] per (employee, day): `Rest` or `Shift(i)`. Genes are stored
//! day-major so a day's assignment column is contiguous.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//!
//! # Reference
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Aickelin & Dowsland (2004), "An indirect Genetic Algorithm for a
//!   nurse-scheduling problem"

mod chromosome;
mod fitness;
pub mod operators;
mod population;
pub(crate) mod problem;

pub use chromosome::{
    day_crossover, employee_crossover, reassign_mutation, swap_mutation, ShiftChromosome,
};
pub use fitness::{EvalPool, FitnessBreakdown, FitnessEvaluator, BASE_SCORE};
pub use operators::{CrossoverType, GeneticOperators, MutationType};
pub use population::Population;
pub use problem::{DayPreference, EmployeeSlot, Gene, ScheduleProblem};

//! Workforce shift-scheduling optimization for the U-Engine ecosystem.
//!
//! Assigns employees to shifts over a planning horizon so that hard labor
//! rules hold and soft preferences are met as well as possible. The search
//! is a genetic algorithm with simulated-annealing replacement; plans are
//! managed through a lifecycle with external collaborators for reference
//! data, persistence, and reporting.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Shift`, `Employee`, `SchedulePlan`,
//!   `ScheduleResult`, `PlanStatus`
//! - **`constraints`**: Hard/soft rule evaluation producing weighted violations
//! - **`ga`**: Roster encoding, operators, population, fitness evaluation
//! - **`optimizer`**: Generation loop, annealing acceptance, cancellation
//! - **`plan`**: Plan lifecycle manager and collaborator interfaces
//! - **`validation`**: Input integrity checks
//! - **`kpi`**: Workload statistics over result rows
//! - **`error`**: Error taxonomy
//!
//! # Architecture
//!
//! ```text
//! SchedulePlanManager ──▶ Optimizer ──▶ Population ──▶ FitnessEvaluator ──▶ ConstraintModel
//!        │                                                                        │
//!        └── EmployeeDirectory / ShiftCatalog ──▶ ScheduleProblem (snapshot) ◀────┘
//! ```
//!
//! The library emits `tracing` events and never installs a subscriber.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

pub mod constraints;
pub mod error;
pub mod ga;
pub mod kpi;
pub mod models;
pub mod optimizer;
pub mod plan;
pub mod validation;

pub use error::{CollaboratorError, ScheduleError};

//! Roster optimizer.
//!
//! Genetic search with simulated-annealing replacement, elitism, and
//! cooperative cancellation.
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"

pub mod annealing;
mod cancel;
mod config;
mod result;
mod runner;

pub use cancel::CancellationToken;
pub use config::OptimizationConfig;
pub use result::{GenerationStats, OptimizationResult, OptimizerState};
pub use runner::{GenerationObserver, Optimizer};

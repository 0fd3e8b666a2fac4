//! Schedule plan model.
//!
//! A plan is one planning request: who, which shifts, which days, and how
//! hard to search. Its status is owned by the plan manager.
//!
//! # Lifecycle
//!
//! ```text
//! DRAFT ──execute──▶ RUNNING ──success──▶ COMPLETED ──confirm──▶ CONFIRMED
//!   ▲                   │                     │
//!   └──── failed ───────┘                     └──execute (re-run)──▶ RUNNING
//!
//! any state except CONFIRMED ──cancel──▶ CANCELLED
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintSettings;
use crate::optimizer::{OptimizationConfig, OptimizerState};

/// Plan status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    /// Created, not yet optimized (or last run failed).
    Draft,
    /// An optimization run is in progress.
    Running,
    /// Last run succeeded; results are available.
    Completed,
    /// Results accepted. Immutable except for cancellation metadata.
    Confirmed,
    /// Abandoned.
    Cancelled,
}

impl PlanStatus {
    /// Whether a run may be started from this status.
    pub fn is_runnable(self) -> bool {
        matches!(self, Self::Draft | Self::Running | Self::Completed)
    }
}

/// Audit metadata embedded in plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
    /// When the plan was confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the plan was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Reason given on cancellation.
    pub cancel_reason: Option<String>,
}

impl AuditInfo {
    /// Audit block for a record created at `now`.
    pub fn created(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    /// Stamps a modification.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Outcome of the most recent optimization run of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Terminal optimizer state.
    pub state: OptimizerState,
    /// Whether the run produced a usable schedule.
    pub success: bool,
    /// False when a time limit cut the run short.
    pub completed_normally: bool,
    /// Fitness of the best schedule.
    pub best_fitness: f64,
    /// Generations actually run.
    pub generations: usize,
    /// Wall-clock duration (ms).
    pub duration_ms: u64,
    /// Unresolved hard violations in the best schedule.
    pub hard_violations: usize,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// A scheduling plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    /// Unique plan identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Employees to roster.
    pub employee_ids: Vec<String>,
    /// First day of the horizon (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the horizon (inclusive).
    pub end_date: NaiveDate,
    /// Shifts to fill.
    pub shift_ids: Vec<String>,
    /// Search parameters.
    pub params: OptimizationConfig,
    /// Constraint thresholds and weights.
    pub rules: ConstraintSettings,
    /// Lifecycle status.
    pub status: PlanStatus,
    /// Audit timestamps.
    pub audit: AuditInfo,
    /// Summary of the latest run.
    pub last_run: Option<RunSummary>,
}

impl SchedulePlan {
    /// Number of days in the horizon (0 if end precedes start).
    pub fn horizon_days(&self) -> usize {
        horizon_days(self.start_date, self.end_date)
    }

    /// Iterates over every day of the horizon.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take(self.horizon_days())
    }
}

/// Input for creating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    /// Display name.
    pub name: String,
    /// Employees to roster.
    pub employee_ids: Vec<String>,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Shifts to fill.
    pub shift_ids: Vec<String>,
    /// Search parameters.
    #[serde(default)]
    pub params: OptimizationConfig,
    /// Constraint thresholds and weights.
    #[serde(default)]
    pub rules: ConstraintSettings,
}

impl CreatePlanRequest {
    /// Creates a request with default parameters and rules.
    pub fn new(
        name: impl Into<String>,
        employee_ids: Vec<String>,
        shift_ids: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            employee_ids,
            start_date,
            end_date,
            shift_ids,
            params: OptimizationConfig::default(),
            rules: ConstraintSettings::default(),
        }
    }

    /// Sets the search parameters.
    pub fn with_params(mut self, params: OptimizationConfig) -> Self {
        self.params = params;
        self
    }

    /// Sets the constraint rules.
    pub fn with_rules(mut self, rules: ConstraintSettings) -> Self {
        self.rules = rules;
        self
    }
}

/// Inclusive day count between two dates; 0 when `end < start`.
pub(crate) fn horizon_days(start: NaiveDate, end: NaiveDate) -> usize {
    let days = (end - start).num_days() + 1;
    days.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn test_horizon_is_inclusive() {
        assert_eq!(horizon_days(d(2), d(8)), 7);
        assert_eq!(horizon_days(d(2), d(2)), 1);
        assert_eq!(horizon_days(d(8), d(2)), 0);
    }

    #[test]
    fn test_runnable_statuses() {
        assert!(PlanStatus::Draft.is_runnable());
        assert!(PlanStatus::Completed.is_runnable());
        assert!(!PlanStatus::Confirmed.is_runnable());
        assert!(!PlanStatus::Cancelled.is_runnable());
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&PlanStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
    }

    #[test]
    fn test_request_defaults_from_json() {
        let json = r#"{
            "name": "March week 1",
            "employee_ids": ["E1"],
            "start_date": "2026-03-02",
            "end_date": "2026-03-08",
            "shift_ids": ["D"]
        }"#;
        let req: CreatePlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.params, OptimizationConfig::default());
        assert_eq!(req.rules.max_consecutive_days, 6);
    }
}

//! External collaborator interfaces.
//!
//! The plan manager consumes reference data, persistence, and report
//! rendering through these traits. Implementations must be thread-safe:
//! the manager is shared between callers running plans concurrently.

use crate::error::CollaboratorError;
use crate::models::{Employee, SchedulePlan, ScheduleResult, Shift};

/// Source of employee reference data.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the employees among `employee_ids` that exist, with their
    /// eligible shifts and preferences. Unknown IDs are omitted.
    fn list_eligible_employees(
        &self,
        employee_ids: &[String],
    ) -> Result<Vec<Employee>, CollaboratorError>;
}

/// Source of shift definitions.
pub trait ShiftCatalog: Send + Sync {
    /// Returns the shifts among `shift_ids` that exist. Unknown IDs are
    /// omitted.
    fn list_shifts(&self, shift_ids: &[String]) -> Result<Vec<Shift>, CollaboratorError>;
}

/// Plan and result persistence.
pub trait PlanRepository: Send + Sync {
    /// Inserts or replaces a plan.
    fn save_plan(&self, plan: &SchedulePlan) -> Result<(), CollaboratorError>;

    /// Loads a plan, `None` if unknown.
    fn load_plan(&self, plan_id: &str) -> Result<Option<SchedulePlan>, CollaboratorError>;

    /// Every stored plan, in any order.
    fn list_plans(&self) -> Result<Vec<SchedulePlan>, CollaboratorError>;

    /// Replaces all result rows of a plan in one atomic write.
    fn save_results(
        &self,
        plan_id: &str,
        rows: Vec<ScheduleResult>,
    ) -> Result<(), CollaboratorError>;

    /// All result rows of a plan (empty if never run).
    fn load_results(&self, plan_id: &str) -> Result<Vec<ScheduleResult>, CollaboratorError>;

    /// Removes a plan and its results.
    fn delete_plan(&self, plan_id: &str) -> Result<(), CollaboratorError>;
}

/// Renders result rows into a document.
pub trait ReportExporter: Send + Sync {
    /// MIME type of the produced document.
    fn content_type(&self) -> &str;

    /// Renders the rows of `plan`.
    fn export(
        &self,
        plan: &SchedulePlan,
        rows: &[ScheduleResult],
    ) -> Result<Vec<u8>, CollaboratorError>;
}

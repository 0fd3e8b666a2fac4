//! Schedule plan management.
//!
//! [`SchedulePlanManager`] owns the plan lifecycle and talks to the
//! outside world through collaborator traits:
//!
//! | Trait | Role |
//! |-------|------|
//! | [`EmployeeDirectory`] | Employees with eligible shifts and preferences |
//! | [`ShiftCatalog`] | Shift windows and headcount bounds |
//! | [`PlanRepository`] | Plans and result rows |
//! | [`ReportExporter`] | Document rendering |
//!
//! In-memory implementations and a JSON exporter are included.

mod collaborators;
mod export;
mod manager;
mod memory;
mod query;

pub use collaborators::{EmployeeDirectory, PlanRepository, ReportExporter, ShiftCatalog};
pub use export::JsonReportExporter;
pub use manager::SchedulePlanManager;
pub use memory::{InMemoryPlanRepository, StaticEmployeeDirectory, StaticShiftCatalog};
pub use query::{
    Page, PageRequest, PlanDetail, PlanFilter, PlanSummary, ResultFilter, ResultOrder,
};

//! Rostering domain models.
//!
//! Reference data (shifts, employees) supplied by collaborators, the plan
//! that drives an optimization, and the result rows it produces.
//!
//! # Domain Mappings
//!
//! | u-roster | Hospital | Retail | Facility operations |
//! |----------|----------|--------|---------------------|
//! | Employee | Nurse | Clerk | Guard / technician |
//! | Shift | Ward shift | Store opening block | Post rotation |
//! | SchedulePlan | Monthly rota | Weekly roster | Duty plan |
//! | ScheduleResult | Rota cell | Roster entry | Duty record |

mod employee;
mod plan;
mod result;
mod shift;

pub use employee::{Employee, ShiftPreference};
pub(crate) use plan::horizon_days;
pub use plan::{AuditInfo, CreatePlanRequest, PlanStatus, RunSummary, SchedulePlan};
pub use result::ScheduleResult;
pub use shift::{BreakWindow, Shift, MINUTES_PER_DAY};

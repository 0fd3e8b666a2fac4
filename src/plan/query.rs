//! Paging, filtering, and read models.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::kpi::ScheduleKpi;
use crate::models::{PlanStatus, RunSummary, SchedulePlan, ScheduleResult};
use crate::validation::{ValidationError, ValidationErrorKind, ValidationResult};

/// A page request. `page_num` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_num: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: 20,
        }
    }
}

impl PageRequest {
    pub fn new(page_num: usize, page_size: usize) -> Self {
        Self { page_num, page_size }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        if self.page_num < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                "page_num is 1-based",
            ));
        }
        if self.page_size < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                "page_size must be at least 1",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn offset(&self) -> usize {
        self.page_num.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Items across all pages.
    pub total: usize,
    pub page_num: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Cuts one page out of the full, already ordered item list.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.page_size)
            .collect();
        Self {
            items,
            total,
            page_num: request.page_num,
            page_size: request.page_size,
        }
    }

    /// Number of pages (0 when empty).
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

/// Plan search criteria. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanFilter {
    /// Case-insensitive substring of the plan name.
    pub name_contains: Option<String>,
    /// Exact status.
    pub status: Option<PlanStatus>,
    /// Plans whose horizon includes this day.
    pub covers_date: Option<NaiveDate>,
}

impl PlanFilter {
    pub fn with_name(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    pub fn with_status(mut self, status: PlanStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn covering(mut self, date: NaiveDate) -> Self {
        self.covers_date = Some(date);
        self
    }

    pub fn matches(&self, plan: &SchedulePlan) -> bool {
        if let Some(fragment) = &self.name_contains {
            if !plan.name.to_lowercase().contains(&fragment.to_lowercase()) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != plan.status) {
            return false;
        }
        if let Some(date) = self.covers_date {
            if date < plan.start_date || date > plan.end_date {
                return false;
            }
        }
        true
    }
}

/// List view of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: String,
    pub name: String,
    pub status: PlanStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee_count: usize,
    pub shift_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_run: Option<RunSummary>,
}

impl From<&SchedulePlan> for PlanSummary {
    fn from(plan: &SchedulePlan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            status: plan.status,
            start_date: plan.start_date,
            end_date: plan.end_date,
            employee_count: plan.employee_ids.len(),
            shift_count: plan.shift_ids.len(),
            created_at: plan.audit.created_at,
            updated_at: plan.audit.updated_at,
            last_run: plan.last_run.clone(),
        }
    }
}

/// Full view of a plan with roster statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDetail {
    pub plan: SchedulePlan,
    /// Number of stored result rows.
    pub result_count: usize,
    /// Statistics over the stored rows.
    pub kpi: ScheduleKpi,
    /// Whether a run is active right now.
    pub running: bool,
}

/// Result row criteria. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultFilter {
    pub employee_id: Option<String>,
    pub shift_id: Option<String>,
    /// Only rest-day rows.
    pub rest_only: bool,
    /// First day (inclusive).
    pub from: Option<NaiveDate>,
    /// Last day (inclusive).
    pub to: Option<NaiveDate>,
}

impl ResultFilter {
    pub fn for_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    pub fn for_shift(mut self, shift_id: impl Into<String>) -> Self {
        self.shift_id = Some(shift_id.into());
        self
    }

    pub fn rest_only(mut self) -> Self {
        self.rest_only = true;
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn matches(&self, row: &ScheduleResult) -> bool {
        if self.employee_id.as_ref().is_some_and(|id| *id != row.employee_id) {
            return false;
        }
        if self.shift_id.is_some() && self.shift_id != row.shift_id {
            return false;
        }
        if self.rest_only && !row.is_rest() {
            return false;
        }
        if self.from.is_some_and(|d| row.date < d) || self.to.is_some_and(|d| row.date > d) {
            return false;
        }
        true
    }
}

/// Ordering of result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResultOrder {
    /// By day; within a day, in plan employee order.
    #[default]
    DayThenEmployee,
    /// By employee ID, then day.
    EmployeeThenDay,
}

impl ResultOrder {
    /// Sorts rows regardless of the order they were loaded in.
    ///
    /// `employee_order` is the plan's employee list; employees missing from
    /// it sort after the listed ones, by ID.
    pub fn sort(self, rows: &mut [ScheduleResult], employee_order: &[String]) {
        let position: HashMap<&str, usize> = employee_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let rank = |r: &ScheduleResult| {
            position
                .get(r.employee_id.as_str())
                .copied()
                .unwrap_or(usize::MAX)
        };
        match self {
            Self::DayThenEmployee => rows.sort_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| rank(a).cmp(&rank(b)))
                    .then_with(|| a.employee_id.cmp(&b.employee_id))
            }),
            Self::EmployeeThenDay => {
                rows.sort_by(|a, b| a.employee_id.cmp(&b.employee_id).then(a.date.cmp(&b.date)))
            }
        }
    }
}

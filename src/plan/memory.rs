//! In-memory collaborators.
//!
//! Thread-safe implementations backed by `parking_lot` locks, for
//! embedding without a database and for tests.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{EmployeeDirectory, PlanRepository, ShiftCatalog};
use crate::error::CollaboratorError;
use crate::models::{Employee, SchedulePlan, ScheduleResult, Shift};

/// Plans and results held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<HashMap<String, SchedulePlan>>,
    results: RwLock<HashMap<String, Vec<ScheduleResult>>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans.
    pub fn plan_count(&self) -> usize {
        self.plans.read().len()
    }
}

impl PlanRepository for InMemoryPlanRepository {
    fn save_plan(&self, plan: &SchedulePlan) -> Result<(), CollaboratorError> {
        self.plans.write().insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    fn load_plan(&self, plan_id: &str) -> Result<Option<SchedulePlan>, CollaboratorError> {
        Ok(self.plans.read().get(plan_id).cloned())
    }

    fn list_plans(&self) -> Result<Vec<SchedulePlan>, CollaboratorError> {
        Ok(self.plans.read().values().cloned().collect())
    }

    fn save_results(
        &self,
        plan_id: &str,
        rows: Vec<ScheduleResult>,
    ) -> Result<(), CollaboratorError> {
        self.results.write().insert(plan_id.to_string(), rows);
        Ok(())
    }

    fn load_results(&self, plan_id: &str) -> Result<Vec<ScheduleResult>, CollaboratorError> {
        Ok(self.results.read().get(plan_id).cloned().unwrap_or_default())
    }

    fn delete_plan(&self, plan_id: &str) -> Result<(), CollaboratorError> {
        // Results first so readers never see rows without a plan
        self.results.write().remove(plan_id);
        self.plans.write().remove(plan_id);
        Ok(())
    }
}

/// Fixed employee directory.
#[derive(Debug, Default)]
pub struct StaticEmployeeDirectory {
    employees: RwLock<HashMap<String, Employee>>,
}

impl StaticEmployeeDirectory {
    pub fn new(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: RwLock::new(employees.into_iter().map(|e| (e.id.clone(), e)).collect()),
        }
    }

    /// Adds or replaces an employee.
    pub fn upsert(&self, employee: Employee) {
        self.employees.write().insert(employee.id.clone(), employee);
    }
}

impl EmployeeDirectory for StaticEmployeeDirectory {
    fn list_eligible_employees(
        &self,
        employee_ids: &[String],
    ) -> Result<Vec<Employee>, CollaboratorError> {
        let employees = self.employees.read();
        Ok(employee_ids
            .iter()
            .filter_map(|id| employees.get(id).cloned())
            .collect())
    }
}

/// Fixed shift catalog.
#[derive(Debug, Default)]
pub struct StaticShiftCatalog {
    shifts: RwLock<HashMap<String, Shift>>,
}

impl StaticShiftCatalog {
    pub fn new(shifts: impl IntoIterator<Item = Shift>) -> Self {
        Self {
            shifts: RwLock::new(shifts.into_iter().map(|s| (s.id.clone(), s)).collect()),
        }
    }

    /// Adds or replaces a shift.
    pub fn upsert(&self, shift: Shift) {
        self.shifts.write().insert(shift.id.clone(), shift);
    }
}

impl ShiftCatalog for StaticShiftCatalog {
    fn list_shifts(&self, shift_ids: &[String]) -> Result<Vec<Shift>, CollaboratorError> {
        let shifts = self.shifts.read();
        Ok(shift_ids.iter().filter_map(|id| shifts.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_keeps_request_order_and_skips_unknown() {
        let dir = StaticEmployeeDirectory::new([Employee::new("A"), Employee::new("B")]);
        let found = dir
            .list_eligible_employees(&["B".into(), "X".into(), "A".into()])
            .unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_catalog_upsert() {
        let catalog = StaticShiftCatalog::default();
        assert!(catalog.list_shifts(&["D".into()]).unwrap().is_empty());
        catalog.upsert(Shift::from_hm("D", (8, 0), (16, 0)).unwrap());
        assert_eq!(catalog.list_shifts(&["D".into()]).unwrap().len(), 1);
    }

    #[test]
    fn test_results_replaced_wholesale() {
        let repo = InMemoryPlanRepository::new();
        let day = chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        repo.save_results("P", vec![ScheduleResult::rest("P", "E1", day); 3]).unwrap();
        repo.save_results("P", vec![ScheduleResult::rest("P", "E1", day)]).unwrap();
        assert_eq!(repo.load_results("P").unwrap().len(), 1);
        assert!(repo.load_results("Q").unwrap().is_empty());

        repo.delete_plan("P").unwrap();
        assert!(repo.load_results("P").unwrap().is_empty());
    }
}

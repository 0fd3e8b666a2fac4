//! Plan lifecycle orchestration.
//!
//! # Concurrency
//!
//! - At most one active run per plan. A second `execute_optimization`
//!   for the same plan is rejected with a conflict, never queued.
//! - Runs of different plans proceed in parallel.
//! - Status changes are read-modify-write on the repository and are
//!   serialized by an internal lock, so a cancellation cannot be lost
//!   against a run finishing at the same moment.
//! - Result rows are written with a single `save_results` call per run,
//!   under the same lock, and only while the plan is still RUNNING.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    EmployeeDirectory, Page, PageRequest, PlanDetail, PlanFilter, PlanRepository, PlanSummary,
    ReportExporter, ResultFilter, ResultOrder, ShiftCatalog,
};
use crate::constraints::ConstraintModel;
use crate::error::{CollaboratorError, ScheduleError};
use crate::ga::ScheduleProblem;
use crate::kpi::ScheduleKpi;
use crate::models::{
    AuditInfo, CreatePlanRequest, Employee, PlanStatus, RunSummary, SchedulePlan, ScheduleResult,
    Shift,
};
use crate::optimizer::{CancellationToken, OptimizationResult, Optimizer, OptimizerState};
use crate::validation::{validate_plan_request, validate_references, validate_shifts};

/// Logs a collaborator failure and lifts it into [`ScheduleError::System`].
fn system<T>(result: Result<T, CollaboratorError>) -> Result<T, ScheduleError> {
    result.map_err(|err| {
        warn!(service = %err.service, error = %err.message, "collaborator failed");
        ScheduleError::System(err)
    })
}

/// Removes the plan from the active-run table when the run ends, however
/// it ends.
struct RunGuard<'a> {
    runs: &'a Mutex<HashMap<String, CancellationToken>>,
    plan_id: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.runs.lock().remove(&self.plan_id);
    }
}

/// Reference data snapshot for one run.
struct Snapshot {
    employees: Vec<Employee>,
    shifts: Vec<Shift>,
}

/// Creates, runs, queries, and retires schedule plans.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use u_roster::models::{CreatePlanRequest, Employee, PlanStatus, Shift};
/// use u_roster::optimizer::OptimizationConfig;
/// use u_roster::plan::{
///     InMemoryPlanRepository, JsonReportExporter, SchedulePlanManager, StaticEmployeeDirectory,
///     StaticShiftCatalog,
/// };
///
/// let shift = Shift::from_hm("DAY", (8, 0), (16, 0)).unwrap().with_exact_headcount(1);
/// let manager = SchedulePlanManager::new(
///     Arc::new(StaticEmployeeDirectory::new([Employee::new("E1").with_eligible_shifts(["DAY"])])),
///     Arc::new(StaticShiftCatalog::new([shift])),
///     Arc::new(InMemoryPlanRepository::new()),
///     Arc::new(JsonReportExporter::new()),
/// );
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let request = CreatePlanRequest::new("demo", vec!["E1".into()], vec!["DAY".into()], day, day)
///     .with_params(OptimizationConfig::default().with_seed(1));
/// let plan_id = manager.create_plan(request).unwrap();
///
/// let result = manager.execute_optimization(&plan_id).unwrap();
/// assert!(result.success);
/// assert_eq!(manager.get_plan_detail(&plan_id).unwrap().plan.status, PlanStatus::Completed);
/// ```
pub struct SchedulePlanManager {
    employees: Arc<dyn EmployeeDirectory>,
    shifts: Arc<dyn ShiftCatalog>,
    repository: Arc<dyn PlanRepository>,
    exporter: Arc<dyn ReportExporter>,
    active_runs: Mutex<HashMap<String, CancellationToken>>,
    status_lock: Mutex<()>,
}

impl std::fmt::Debug for SchedulePlanManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulePlanManager")
            .field("active_runs", &self.active_runs.lock().len())
            .finish_non_exhaustive()
    }
}

impl SchedulePlanManager {
    /// Creates a manager over the given collaborators.
    pub fn new(
        employees: Arc<dyn EmployeeDirectory>,
        shifts: Arc<dyn ShiftCatalog>,
        repository: Arc<dyn PlanRepository>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Self {
        Self {
            employees,
            shifts,
            repository,
            exporter,
            active_runs: Mutex::new(HashMap::new()),
            status_lock: Mutex::new(()),
        }
    }

    /// Validates and stores a new DRAFT plan. Returns its ID.
    pub fn create_plan(&self, request: CreatePlanRequest) -> Result<String, ScheduleError> {
        validate_plan_request(&request)?;
        self.snapshot(&request.employee_ids, &request.shift_ids)?;

        let now = Utc::now();
        let plan = SchedulePlan {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            employee_ids: request.employee_ids,
            start_date: request.start_date,
            end_date: request.end_date,
            shift_ids: request.shift_ids,
            params: request.params,
            rules: request.rules,
            status: PlanStatus::Draft,
            audit: AuditInfo::created(now),
            last_run: None,
        };
        system(self.repository.save_plan(&plan))?;

        info!(plan_id = %plan.id, name = %plan.name, "plan created");
        Ok(plan.id)
    }

    /// Runs the optimizer for a plan and stores its rows.
    ///
    /// Each call is a fresh run that replaces earlier rows. Outcomes:
    /// - success: rows saved, plan COMPLETED
    /// - infeasible (`Failed`): best-effort rows saved, plan back to DRAFT
    /// - cancelled (also when the cancellation lands after the last
    ///   generation): nothing saved, plan stays CANCELLED
    ///
    /// # Errors
    /// `NotFound` for an unknown plan; `Conflict` when the plan is
    /// CONFIRMED/CANCELLED or already running; `Validation` when reference
    /// data no longer resolves; `System` on collaborator failure, with the
    /// plan status restored.
    #[instrument(skip_all, fields(plan_id = %plan_id))]
    pub fn execute_optimization(&self, plan_id: &str) -> Result<OptimizationResult, ScheduleError> {
        let plan = self.load(plan_id)?;
        if !plan.status.is_runnable() {
            return Err(ScheduleError::conflict(format!(
                "plan '{plan_id}' is {:?} and cannot be optimized",
                plan.status
            )));
        }

        let token = CancellationToken::new();
        let _guard = self.begin_run(plan_id, token.clone())?;
        let snapshot = self.snapshot(&plan.employee_ids, &plan.shift_ids)?;

        let previous = self.transition(plan_id, |p| {
            if !p.status.is_runnable() {
                return Err(ScheduleError::conflict(format!(
                    "plan '{}' became {:?} before the run started",
                    p.id, p.status
                )));
            }
            let previous = p.status;
            p.status = PlanStatus::Running;
            Ok(previous)
        })?;
        info!(from = ?previous, "plan running");

        let problem = Arc::new(ScheduleProblem::new(
            &snapshot.employees,
            &snapshot.shifts,
            plan.start_date,
            plan.end_date,
        ));
        let model = ConstraintModel::new(Arc::clone(&problem), plan.rules.clone());
        let outcome = Optimizer::new(model, plan.params.clone())
            .map(|optimizer| optimizer.with_cancellation(token).run())
            .and_then(|result| self.persist(&problem, plan_id, result));

        if let Err(err) = &outcome {
            warn!(error = %err, "run failed, restoring plan status");
            let restored = self.transition(plan_id, |p| {
                if p.status == PlanStatus::Running {
                    p.status = previous;
                }
                Ok(())
            });
            if let Err(restore_err) = restored {
                warn!(error = %restore_err, "could not restore plan status");
            }
        }
        outcome
    }

    fn persist(
        &self,
        problem: &ScheduleProblem,
        plan_id: &str,
        result: OptimizationResult,
    ) -> Result<OptimizationResult, ScheduleError> {
        if result.state == OptimizerState::Cancelled {
            info!(generations = result.generations, "run cancelled, results discarded");
            return Ok(result);
        }

        let rows = problem.decode(plan_id, &result.best);
        let summary = RunSummary {
            state: result.state,
            success: result.success,
            completed_normally: result.completed_normally,
            best_fitness: result.best_fitness,
            generations: result.generations,
            duration_ms: result.duration_ms(),
            hard_violations: result.hard_violation_count(),
            finished_at: Utc::now(),
        };
        let success = result.success;
        let status = self.transition(plan_id, move |p| {
            // A cancellation that raced the final generation wins
            if p.status != PlanStatus::Running {
                return Ok(p.status);
            }
            system(self.repository.save_results(plan_id, rows))?;
            p.status = if success {
                PlanStatus::Completed
            } else {
                PlanStatus::Draft
            };
            p.last_run = Some(summary);
            Ok(p.status)
        })?;
        if status == PlanStatus::Cancelled {
            info!("plan cancelled before results were stored, results discarded");
            return Ok(result);
        }
        info!(status = ?status, "plan run recorded");
        Ok(result)
    }

    /// One page of plans matching `filter`, newest first.
    pub fn query_plan_page(
        &self,
        filter: &PlanFilter,
        page: PageRequest,
    ) -> Result<Page<PlanSummary>, ScheduleError> {
        page.validate()?;
        let mut plans: Vec<SchedulePlan> = system(self.repository.list_plans())?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        plans.sort_by(|a, b| {
            b.audit
                .created_at
                .cmp(&a.audit.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        let summaries = plans.iter().map(PlanSummary::from).collect();
        Ok(Page::slice(summaries, page))
    }

    /// A plan with its roster statistics.
    pub fn get_plan_detail(&self, plan_id: &str) -> Result<PlanDetail, ScheduleError> {
        let plan = self.load(plan_id)?;
        let rows = system(self.repository.load_results(plan_id))?;
        Ok(PlanDetail {
            result_count: rows.len(),
            kpi: ScheduleKpi::calculate(&rows),
            running: self.is_running(plan_id),
            plan,
        })
    }

    /// One page of a plan's result rows.
    pub fn query_result_page(
        &self,
        plan_id: &str,
        page: PageRequest,
        filter: &ResultFilter,
        order: ResultOrder,
    ) -> Result<Page<ScheduleResult>, ScheduleError> {
        page.validate()?;
        let plan = self.load(plan_id)?;
        let mut rows: Vec<ScheduleResult> = system(self.repository.load_results(plan_id))?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        order.sort(&mut rows, &plan.employee_ids);
        Ok(Page::slice(rows, page))
    }

    /// All result rows of a plan in the given order.
    pub fn query_result_list(
        &self,
        plan_id: &str,
        order: ResultOrder,
    ) -> Result<Vec<ScheduleResult>, ScheduleError> {
        let plan = self.load(plan_id)?;
        let mut rows = system(self.repository.load_results(plan_id))?;
        order.sort(&mut rows, &plan.employee_ids);
        Ok(rows)
    }

    /// COMPLETED → CONFIRMED. Confirming a confirmed plan is a no-op.
    pub fn confirm_plan(&self, plan_id: &str) -> Result<(), ScheduleError> {
        let changed = self.transition(plan_id, |p| match p.status {
            PlanStatus::Confirmed => Ok(false),
            PlanStatus::Completed => {
                p.status = PlanStatus::Confirmed;
                p.audit.confirmed_at = Some(Utc::now());
                Ok(true)
            }
            other => Err(ScheduleError::conflict(format!(
                "plan '{}' is {other:?}; only completed plans can be confirmed",
                p.id
            ))),
        })?;
        if changed {
            info!(plan_id, "plan confirmed");
        }
        Ok(())
    }

    /// Cancels a plan from any state except CONFIRMED, signalling its
    /// active run. Cancelling a cancelled plan is a no-op.
    pub fn cancel_plan(&self, plan_id: &str, reason: &str) -> Result<(), ScheduleError> {
        let changed = self.transition(plan_id, |p| match p.status {
            PlanStatus::Cancelled => Ok(false),
            PlanStatus::Confirmed => Err(ScheduleError::conflict(format!(
                "plan '{}' is confirmed and cannot be cancelled",
                p.id
            ))),
            _ => {
                p.status = PlanStatus::Cancelled;
                p.audit.cancelled_at = Some(Utc::now());
                p.audit.cancel_reason = Some(reason.to_string());
                Ok(true)
            }
        })?;

        if let Some(token) = self.active_runs.lock().get(plan_id) {
            token.cancel();
        }
        if changed {
            info!(plan_id, reason, "plan cancelled");
        }
        Ok(())
    }

    /// Deletes a plan and its rows.
    pub fn delete_plan(&self, plan_id: &str) -> Result<(), ScheduleError> {
        let _status = self.status_lock.lock();
        let plan = self.load(plan_id)?;
        self.check_deletable(&plan)?;
        system(self.repository.delete_plan(plan_id))?;
        info!(plan_id, "plan deleted");
        Ok(())
    }

    /// Deletes several plans, all or nothing: if any ID is unknown or not
    /// deletable, nothing is deleted. Returns the number of plans removed.
    pub fn batch_delete_plan(&self, plan_ids: &[String]) -> Result<usize, ScheduleError> {
        let _status = self.status_lock.lock();
        let mut seen = HashSet::new();
        let unique: Vec<&String> = plan_ids.iter().filter(|id| seen.insert(id.as_str())).collect();

        for id in &unique {
            let plan = self.load(id)?;
            self.check_deletable(&plan)?;
        }
        for id in &unique {
            system(self.repository.delete_plan(id))?;
        }
        info!(count = unique.len(), "plans deleted");
        Ok(unique.len())
    }

    /// Renders a plan's rows through the report exporter.
    pub fn export_schedule_result(&self, plan_id: &str) -> Result<Vec<u8>, ScheduleError> {
        let plan = self.load(plan_id)?;
        let mut rows = system(self.repository.load_results(plan_id))?;
        ResultOrder::DayThenEmployee.sort(&mut rows, &plan.employee_ids);
        system(self.exporter.export(&plan, &rows))
    }

    /// MIME type of exported documents.
    pub fn export_content_type(&self) -> &str {
        self.exporter.content_type()
    }

    /// Whether a run is active for the plan.
    pub fn is_running(&self, plan_id: &str) -> bool {
        self.active_runs.lock().contains_key(plan_id)
    }

    // ---- internals ----

    fn load(&self, plan_id: &str) -> Result<SchedulePlan, ScheduleError> {
        system(self.repository.load_plan(plan_id))?.ok_or_else(|| ScheduleError::not_found(plan_id))
    }

    fn check_deletable(&self, plan: &SchedulePlan) -> Result<(), ScheduleError> {
        if plan.status == PlanStatus::Confirmed {
            return Err(ScheduleError::conflict(format!(
                "plan '{}' is confirmed and cannot be deleted",
                plan.id
            )));
        }
        if self.is_running(&plan.id) {
            return Err(ScheduleError::conflict(format!(
                "plan '{}' has an active run",
                plan.id
            )));
        }
        Ok(())
    }

    /// Loads, modifies, and saves a plan under the status lock.
    fn transition<T>(
        &self,
        plan_id: &str,
        apply: impl FnOnce(&mut SchedulePlan) -> Result<T, ScheduleError>,
    ) -> Result<T, ScheduleError> {
        let _status = self.status_lock.lock();
        let mut plan = self.load(plan_id)?;
        let out = apply(&mut plan)?;
        plan.audit.touch(Utc::now());
        system(self.repository.save_plan(&plan))?;
        Ok(out)
    }

    fn begin_run(&self, plan_id: &str, token: CancellationToken) -> Result<RunGuard<'_>, ScheduleError> {
        let mut runs = self.active_runs.lock();
        if runs.contains_key(plan_id) {
            warn!(plan_id, "rejected concurrent run");
            return Err(ScheduleError::conflict(format!(
                "plan '{plan_id}' already has an active run"
            )));
        }
        runs.insert(plan_id.to_string(), token);
        Ok(RunGuard {
            runs: &self.active_runs,
            plan_id: plan_id.to_string(),
        })
    }

    /// Fetches reference data in plan order and checks it resolves.
    fn snapshot(&self, employee_ids: &[String], shift_ids: &[String]) -> Result<Snapshot, ScheduleError> {
        let employees = system(self.employees.list_eligible_employees(employee_ids))?;
        let shifts = system(self.shifts.list_shifts(shift_ids))?;

        let mut errors = Vec::new();
        for check in [
            validate_references("employee", employee_ids, employees.iter().map(|e| e.id.as_str())),
            validate_references("shift", shift_ids, shifts.iter().map(|s| s.id.as_str())),
            validate_shifts(&shifts),
        ] {
            if let Err(mut issues) = check {
                errors.append(&mut issues);
            }
        }
        if !errors.is_empty() {
            return Err(ScheduleError::Validation(errors));
        }

        let mut by_id: HashMap<String, Employee> =
            employees.into_iter().map(|e| (e.id.clone(), e)).collect();
        let employees = employee_ids.iter().filter_map(|id| by_id.remove(id)).collect();
        let mut by_id: HashMap<String, Shift> = shifts.into_iter().map(|s| (s.id.clone(), s)).collect();
        let shifts = shift_ids.iter().filter_map(|id| by_id.remove(id)).collect();

        Ok(Snapshot { employees, shifts })
    }
}

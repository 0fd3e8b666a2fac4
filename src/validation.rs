//! Input validation for rostering plans.
//!
//! Checks structural integrity of plan requests, labor rules, and the
//! reference data returned by collaborators before any optimization
//! starts. Detects:
//! - Empty employee or shift sets
//! - Zero-length horizons
//! - Duplicate IDs
//! - References the directory or catalog could not resolve
//! - Malformed shifts and out-of-range parameters
//!
//! Every check collects all issues instead of stopping at the first.

use std::collections::HashSet;
use std::fmt;

use crate::constraints::ConstraintSettings;
use crate::models::{CreatePlanRequest, Shift};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The plan names no employees.
    EmptyEmployees,
    /// The plan names no shifts.
    EmptyShifts,
    /// The horizon ends before it starts.
    EmptyHorizon,
    /// Two entities share the same ID.
    DuplicateId,
    /// An ID the directory or catalog does not know.
    UnknownReference,
    /// A shift definition is inconsistent.
    InvalidShift,
    /// An algorithm parameter or labor rule is out of range.
    InvalidParameter,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a plan creation request.
///
/// Checks:
/// 1. Non-blank name
/// 2. At least one employee and one shift
/// 3. No duplicate employee or shift IDs
/// 4. `end_date >= start_date`
/// 5. Search parameters (see [`OptimizationConfig::validate`](crate::optimizer::OptimizationConfig::validate))
/// 6. Labor rules (see [`validate_rules`])
pub fn validate_plan_request(request: &CreatePlanRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "Plan name must not be blank",
        ));
    }

    if request.employee_ids.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyEmployees,
            "Plan has no employees",
        ));
    }
    if request.shift_ids.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyShifts,
            "Plan has no shifts",
        ));
    }
    check_duplicates("employee", &request.employee_ids, &mut errors);
    check_duplicates("shift", &request.shift_ids, &mut errors);

    if request.end_date < request.start_date {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyHorizon,
            format!(
                "Horizon is empty: end {} precedes start {}",
                request.end_date, request.start_date
            ),
        ));
    }

    if let Err(mut issues) = request.params.validate() {
        errors.append(&mut issues);
    }
    if let Err(mut issues) = validate_rules(&request.rules) {
        errors.append(&mut issues);
    }

    into_result(errors)
}

fn check_duplicates(what: &str, ids: &[String], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
}

/// Validates labor rules and penalty weights.
pub fn validate_rules(rules: &ConstraintSettings) -> ValidationResult {
    let mut errors = Vec::new();
    let mut invalid = |message: String| {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidParameter, message));
    };

    if rules.min_rest_hours.is_nan() || rules.min_rest_hours < 0.0 {
        invalid(format!("min_rest_hours must be non-negative, got {}", rules.min_rest_hours));
    }
    if rules.max_consecutive_days < 1 {
        invalid("max_consecutive_days must be at least 1".into());
    }
    if rules.max_weekly_hours.is_nan() || rules.max_weekly_hours <= 0.0 {
        invalid(format!("max_weekly_hours must be positive, got {}", rules.max_weekly_hours));
    }
    for (name, weight) in rules.weights.named() {
        if !weight.is_finite() || weight < 0.0 {
            invalid(format!("weight '{name}' must be a non-negative number, got {weight}"));
        }
    }

    into_result(errors)
}

/// Validates shift definitions returned by the catalog.
///
/// Checks:
/// 1. `crosses_midnight` agrees with `end <= start`
/// 2. `min_headcount <= max_headcount`
/// 3. The break fits inside the shift span
pub fn validate_shifts(shifts: &[Shift]) -> ValidationResult {
    let mut errors = Vec::new();

    for shift in shifts {
        if shift.crosses_midnight != (shift.end <= shift.start) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShift,
                format!(
                    "Shift '{}' crosses_midnight={} disagrees with {}-{}",
                    shift.id, shift.crosses_midnight, shift.start, shift.end
                ),
            ));
        }
        if shift.min_headcount > shift.max_headcount {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShift,
                format!(
                    "Shift '{}' min headcount {} exceeds max {}",
                    shift.id, shift.min_headcount, shift.max_headcount
                ),
            ));
        }
        if shift.break_minutes() >= shift.span_minutes() && shift.break_window.is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShift,
                format!("Shift '{}' break does not fit inside the shift", shift.id),
            ));
        }
    }

    into_result(errors)
}

/// Checks that every requested ID was resolved by a collaborator.
pub fn validate_references<'a>(
    what: &str,
    requested: &[String],
    resolved: impl IntoIterator<Item = &'a str>,
) -> ValidationResult {
    let found: HashSet<&str> = resolved.into_iter().collect();
    let errors = requested
        .iter()
        .filter(|id| !found.contains(id.as_str()))
        .map(|id| {
            ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Unknown {what} ID: {id}"),
            )
        })
        .collect();
    into_result(errors)
}

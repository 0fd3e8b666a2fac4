//! JSON report rendering.

use serde::Serialize;

use super::{PlanSummary, ReportExporter};
use crate::error::CollaboratorError;
use crate::kpi::ScheduleKpi;
use crate::models::{SchedulePlan, ScheduleResult};

/// Renders a plan's rows as a JSON document with a summary and KPIs.
#[derive(Debug, Clone, Default)]
pub struct JsonReportExporter {
    pretty: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    plan: PlanSummary,
    kpi: ScheduleKpi,
    rows: &'a [ScheduleResult],
}

impl JsonReportExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indents the output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl ReportExporter for JsonReportExporter {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn export(
        &self,
        plan: &SchedulePlan,
        rows: &[ScheduleResult],
    ) -> Result<Vec<u8>, CollaboratorError> {
        let report = Report {
            plan: PlanSummary::from(plan),
            kpi: ScheduleKpi::calculate(rows),
            rows,
        };
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&report)
        } else {
            serde_json::to_vec(&report)
        };
        bytes.map_err(|e| CollaboratorError::new("report exporter", e.to_string()))
    }
}

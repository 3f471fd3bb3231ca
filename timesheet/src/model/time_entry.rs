use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::Date;

use super::{EmployeeId, ProjectId, TaskId, TimeEntryId};

/// Lifecycle of a logged time entry. Transitions happen on the backend only.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TimeEntryStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl TimeEntryStatus {
    pub const ALL: [TimeEntryStatus; 4] = [
        TimeEntryStatus::Draft,
        TimeEntryStatus::Submitted,
        TimeEntryStatus::Approved,
        TimeEntryStatus::Rejected,
    ];

    /// Label shown to users of the (Spanish language) timesheet screens.
    pub fn label(&self) -> &'static str {
        match self {
            TimeEntryStatus::Draft => "Borrador",
            TimeEntryStatus::Submitted => "Enviado",
            TimeEntryStatus::Approved => "Aprobado",
            TimeEntryStatus::Rejected => "Rechazado",
        }
    }

    /// Only drafts can be deleted or selected for submission.
    pub fn is_draft(&self) -> bool {
        matches!(self, TimeEntryStatus::Draft)
    }
}

/// One logged-hours fact as returned by the time entry endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    pub id: TimeEntryId,
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(with = "crate::iso_date")]
    pub work_date: Date,
    pub worked_minutes: i64,
    #[serde(default)]
    pub status: TimeEntryStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
}

impl TimeRecord {
    pub fn hours(&self) -> f64 {
        self.worked_minutes as f64 / 60.0
    }
}

/// Body of a create-time-entry request. New entries always start as drafts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
    pub task_id: Option<TaskId>,
    #[serde(with = "crate::iso_date")]
    pub work_date: Date,
    pub worked_minutes: i64,
    pub description: String,
}

/// Body of an update-time-entry request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryUpdate {
    pub task_id: Option<TaskId>,
    #[serde(with = "crate::iso_date")]
    pub work_date: Date,
    pub worked_minutes: i64,
    pub description: String,
}

impl TimeEntryUpdate {
    pub fn from_hours(
        task_id: Option<TaskId>,
        work_date: Date,
        hours: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            work_date,
            worked_minutes: (hours * 60.0).round() as i64,
            description: description.into(),
        }
    }
}

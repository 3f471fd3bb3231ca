use serde::{Deserialize, Serialize};
use timesheet::{EmployeeId, TimeEntryId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub employee_code: &'a EmployeeId,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest<'a> {
    pub time_entry_ids: &'a [TimeEntryId],
}

#[derive(Debug, Serialize)]
pub struct RejectRequest<'a> {
    pub reason: &'a str,
}

/// One decision of a batch approval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecision {
    pub time_entry_id: TimeEntryId,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApprovalDecision {
    pub fn approve(id: TimeEntryId) -> Self {
        Self {
            time_entry_id: id,
            approved: true,
            reason: None,
        }
    }

    pub fn reject(id: TimeEntryId, reason: impl Into<String>) -> Self {
        Self {
            time_entry_id: id,
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchApprovalRequest<'a> {
    pub approvals: &'a [ApprovalDecision],
}

/// Any create response; only the new id matters.
#[derive(Debug, Deserialize)]
pub struct Created<Id> {
    pub id: Id,
}

/// Error payload of a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}

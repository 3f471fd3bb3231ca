use serde::{Deserialize, Serialize};
use timesheet::{EmployeeId, Resource, UserRole};

/// The logged-in user, as kept for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: EmployeeId,
    /// Sent as `X-Employee-Id` on every request.
    pub employee_code: EmployeeId,
    pub name: String,
    pub role: UserRole,
    /// Role name in the HR catalog, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CurrentUser {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            employee_code: resource.id.clone(),
            name: resource.full_name(),
            role: resource.user_role(),
            original_role: resource.role_name().map(str::to_string),
            token: None,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: CurrentUser,
    pub is_authenticated: bool,
}

impl Session {
    pub fn new(user: CurrentUser) -> Self {
        Self {
            user,
            is_authenticated: true,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.user.token.as_deref()
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.is_authenticated && self.user.role == role
    }
}

/// Starts a session for `resource`. The role comes from the resource's role
/// id; credentials are checked by the backend, not here.
pub fn login_as(resource: &Resource) -> Session {
    Session::new(CurrentUser::from_resource(resource))
}

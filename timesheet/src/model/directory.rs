use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{EmployeeId, ProjectId, RoleId, TaskId};

/// Role id the HR backend assigns to managers. Every other role works as a
/// developer.
pub const MANAGER_ROLE_ID: &str = "6e6ecd47-fa18-490e-b25a-c9101a398b6d";

/// An employee/worker of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: EmployeeId,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "rolId", default)]
    pub role_id: Option<RoleId>,
    #[serde(rename = "rol", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ResourceRole>,
}

/// Role object nested in a resource by the HR backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRole {
    #[serde(rename = "nombre")]
    pub name: String,
}

impl Resource {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn user_role(&self) -> UserRole {
        UserRole::from_role_id(self.role_id.as_ref())
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|role| role.name.as_str())
    }
}

/// Which set of screens a user gets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum UserRole {
    #[default]
    Developer,
    Manager,
}

impl UserRole {
    pub fn from_role_id(role_id: Option<&RoleId>) -> Self {
        match role_id {
            Some(id) if id.as_str() == MANAGER_ROLE_ID => UserRole::Manager,
            _ => UserRole::Developer,
        }
    }
}

/// An entry of the role catalog used by the cost screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "experiencia")]
    pub experience: String,
}

impl Role {
    pub fn new(
        id: impl Into<RoleId>,
        name: impl Into<String>,
        experience: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            experience: experience.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "nombre")]
    pub name: String,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_derived_from_role_id() {
        let mut resource: Resource = serde_json::from_str(
            r#"{"id": "e-1", "nombre": "Horacio", "apellido": "Paz", "rolId": "6e6ecd47-fa18-490e-b25a-c9101a398b6d"}"#,
        )
        .unwrap();
        assert_eq!(resource.user_role(), UserRole::Manager);
        assert_eq!(resource.full_name(), "Horacio Paz");

        resource.role_id = Some(RoleId::new("1f14a491-e26d-4092-86ea-d76f20c165d1"));
        assert_eq!(resource.user_role(), UserRole::Developer);

        resource.role_id = None;
        assert_eq!(resource.user_role(), UserRole::Developer);
        assert_eq!(resource.role_name(), None);
    }

    #[test]
    fn reads_nested_role_name() {
        let resource: Resource = serde_json::from_str(
            r#"{"id": "e-2", "nombre": "Ana", "apellido": "Ruiz", "rolId": "r-4", "rol": {"id": "r-4", "nombre": "Desarrollador"}}"#,
        )
        .unwrap();
        assert_eq!(resource.role_name(), Some("Desarrollador"));
    }
}

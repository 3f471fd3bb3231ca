use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

use super::{CostId, Money, Role, RoleId};

/// The (year, month) a cost rate is effective for ("vigencia").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub month: u8,
}

impl Period {
    pub fn new(year: i32, month: u8) -> Self {
        Self { year, month }
    }

    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// A role-cost fact as stored by the cost service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: CostId,
    #[serde(rename = "rolId")]
    pub role_id: RoleId,
    #[serde(rename = "costo")]
    pub cost: Money,
    #[serde(rename = "fecha", default, with = "crate::iso_date::option")]
    pub effective_date: Option<Date>,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(
        rename = "experiencia",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub experience: Option<String>,
}

impl CostRecord {
    /// Records without an effective date belong to no period and are never
    /// listed, compared or adjusted.
    pub fn period(&self) -> Option<Period> {
        self.effective_date.map(Period::of)
    }

    pub fn is_effective_in(&self, period: Period) -> bool {
        self.period() == Some(period)
    }
}

/// A cost record joined with the role catalog for display and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CostView {
    pub record: CostRecord,
    pub role_name: String,
    pub experience: String,
}

impl CostView {
    pub const UNKNOWN_ROLE: &'static str = "Rol Desconocido";
    pub const UNKNOWN_EXPERIENCE: &'static str = "N/A";

    pub fn join(records: Vec<CostRecord>, roles: &[Role]) -> Vec<CostView> {
        records
            .into_iter()
            .map(|record| {
                let role = roles.iter().find(|r| r.id == record.role_id);
                CostView {
                    role_name: role
                        .map(|r| r.name.clone())
                        .unwrap_or_else(|| Self::UNKNOWN_ROLE.to_string()),
                    experience: role
                        .map(|r| r.experience.clone())
                        .unwrap_or_else(|| Self::UNKNOWN_EXPERIENCE.to_string()),
                    record,
                }
            })
            .collect()
    }

    pub fn in_period(costs: &[CostView], period: Period) -> Vec<&CostView> {
        costs
            .iter()
            .filter(|c| c.record.is_effective_in(period))
            .collect()
    }
}

/// A cost as entered in the cost form, before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct CostDraft {
    pub role_name: String,
    pub experience: String,
    pub cost: Money,
    pub period: Period,
}

impl CostDraft {
    /// The create/update body. The role is referenced by the catalog id matching
    /// name and experience; the cost service also accepts the bare role name.
    pub fn to_input(&self, roles: &[Role]) -> CostInput {
        let role_id = roles
            .iter()
            .find(|r| r.name == self.role_name && r.experience == self.experience)
            .map(|r| r.id.clone())
            .unwrap_or_else(|| RoleId::new(self.role_name.clone()));

        CostInput {
            role_id: Some(role_id),
            role_name: Some(self.role_name.clone()),
            experience: Some(self.experience.clone()),
            cost: self.cost,
            month: self.period.month,
            year: self.period.year,
        }
    }
}

/// Body of the cost service's create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostInput {
    #[serde(rename = "rolId", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(rename = "experiencia", skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(rename = "costo")]
    pub cost: Money,
    #[serde(rename = "mes")]
    pub month: u8,
    #[serde(rename = "anio")]
    pub year: i32,
}

impl CostInput {
    /// Body used when only the amount of an existing cost changes.
    pub fn amount_only(cost: Money, period: Period) -> Self {
        Self {
            role_id: None,
            role_name: None,
            experience: None,
            cost,
            month: period.month,
            year: period.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Vec<Role> {
        vec![
            Role::new("r-1", "Developer", "Senior"),
            Role::new("r-2", "Developer", "Junior"),
        ]
    }

    #[test]
    fn parses_cost_record() {
        let json = r#"{"id": 3, "rolId": "r-1", "costo": "2500.50", "fecha": "2025-04-01"}"#;
        let record: CostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.cost, Money::from_cents(250_050));
        assert_eq!(record.period(), Some(Period::new(2025, 4)));
    }

    #[test]
    fn missing_date_has_no_period() {
        let json = r#"{"id": "c", "rolId": "r-1", "costo": "1"}"#;
        let record: CostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.period(), None);
        assert!(!record.is_effective_in(Period::new(2025, 1)));
    }

    #[test]
    fn join_falls_back_for_unknown_roles() {
        let records: Vec<CostRecord> = serde_json::from_str(
            r#"[
                {"id": 1, "rolId": "r-2", "costo": "10", "fecha": "2025-01-01"},
                {"id": 2, "rolId": "r-9", "costo": "20", "fecha": "2025-01-01"}
            ]"#,
        )
        .unwrap();

        let views = CostView::join(records, &roles());
        assert_eq!(views[0].role_name, "Developer");
        assert_eq!(views[0].experience, "Junior");
        assert_eq!(views[1].role_name, CostView::UNKNOWN_ROLE);
        assert_eq!(views[1].experience, CostView::UNKNOWN_EXPERIENCE);
    }

    #[test]
    fn draft_resolves_role_id() {
        let draft = CostDraft {
            role_name: "Developer".to_string(),
            experience: "Senior".to_string(),
            cost: Money::from_cents(100_000),
            period: Period::new(2025, 6),
        };

        let body = serde_json::to_value(draft.to_input(&roles())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "rolId": "r-1",
                "nombre": "Developer",
                "experiencia": "Senior",
                "costo": "1000.00",
                "mes": 6,
                "anio": 2025
            })
        );
    }
}

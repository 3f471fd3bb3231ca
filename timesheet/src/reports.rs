//! View models for the report screens.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use time::{Date, Weekday};

use crate::matrix::ReportMatrix;
use crate::model::{EmployeeId, Money, ProjectId, TaskId, TimeEntryStatus, TimeRecord};
use crate::week::WORK_WEEK;

/// Month columns of the yearly cost report.
pub const MONTHS: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceName {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
}

impl ResourceName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCost {
    pub resource_id: EmployeeId,
    #[serde(default)]
    pub total_cost: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthCosts {
    pub month: u8,
    #[serde(default)]
    pub costs: Vec<ResourceCost>,
}

/// Yearly cost of the resources assigned to a project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectCostReport {
    /// Resources in the order the report lists them.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub resources: Vec<(EmployeeId, ResourceName)>,
    #[serde(default)]
    pub months: Vec<MonthCosts>,
    pub year: i32,
}

impl ProjectCostReport {
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn months_with_data(&self) -> usize {
        self.months.len()
    }

    /// Nothing to show when there are no resources or no monthly data.
    pub fn has_data(&self) -> bool {
        !self.resources.is_empty() && !self.months.is_empty()
    }

    pub fn resource_name(&self, id: &EmployeeId) -> Option<&ResourceName> {
        self.resources
            .iter()
            .find(|(resource_id, _)| resource_id == id)
            .map(|(_, name)| name)
    }

    /// Resources × months 1..=12. Costs of resources the report does not list
    /// are left out.
    pub fn to_matrix(&self) -> ReportMatrix<EmployeeId, u8, Money> {
        let known: HashSet<&EmployeeId> = self.resources.iter().map(|(id, _)| id).collect();
        let known = &known;

        let facts = self.months.iter().flat_map(move |month| {
            month
                .costs
                .iter()
                .filter(move |cost| {
                    let listed = known.contains(&cost.resource_id);
                    if !listed {
                        tracing::debug!(
                            resource_id = %cost.resource_id,
                            month = month.month,
                            "ignoring cost of unlisted resource"
                        );
                    }
                    listed
                })
                .map(move |cost| {
                    (
                        cost.resource_id.clone(),
                        month.month,
                        cost.total_cost.unwrap_or_default(),
                    )
                })
        });

        ReportMatrix::build(
            self.resources.iter().map(|(id, _)| id.clone()),
            MONTHS.to_vec(),
            facts,
        )
    }
}

/// One logged day inside a week of the weekly hours report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    #[serde(default)]
    pub project_name: Option<String>,
    pub hours: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TimeEntryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekHours {
    pub week_number: u32,
    #[serde(with = "crate::iso_date")]
    pub week_start: Date,
    #[serde(with = "crate::iso_date")]
    pub week_end: Date,
    pub week_total_hours: f64,
    #[serde(default)]
    pub days: Vec<DayHours>,
}

/// Hours of one employee over a date range, grouped by week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyHoursReport {
    #[serde(with = "crate::iso_date")]
    pub start_date: Date,
    #[serde(with = "crate::iso_date")]
    pub end_date: Date,
    pub total_hours: f64,
    #[serde(default)]
    pub weeks: Vec<WeekHours>,
}

impl WeeklyHoursReport {
    pub fn is_empty(&self) -> bool {
        self.weeks.iter().all(|w| w.days.is_empty())
    }

    /// Hours per status over every day of the report, in lifecycle order.
    pub fn hours_by_status(&self) -> Vec<(TimeEntryStatus, f64)> {
        TimeEntryStatus::ALL
            .iter()
            .map(|&status| {
                let hours = self
                    .weeks
                    .iter()
                    .flat_map(|w| &w.days)
                    .filter(|d| d.status == status)
                    .map(|d| d.hours)
                    .sum::<f64>();
                (status, hours)
            })
            .collect()
    }
}

/// The item hours were logged against: the task, or the project when the
/// entry has no task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkItemKey {
    Task(TaskId),
    Project(ProjectId),
}

impl WorkItemKey {
    pub fn of(record: &TimeRecord) -> Self {
        match &record.task_id {
            Some(task_id) => WorkItemKey::Task(task_id.clone()),
            None => WorkItemKey::Project(record.project_id.clone()),
        }
    }
}

impl fmt::Display for WorkItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkItemKey::Task(id) => write!(f, "{}", id),
            WorkItemKey::Project(id) => write!(f, "{}", id),
        }
    }
}

/// Work item × Monday..Friday grid of logged minutes.
///
/// Weekend entries have no column; their minutes end up in
/// [`ReportMatrix::unplaced_total`].
pub fn weekday_matrix(records: &[TimeRecord]) -> ReportMatrix<WorkItemKey, Weekday, i64> {
    ReportMatrix::build(
        Vec::new(),
        WORK_WEEK.to_vec(),
        records.iter().map(|record| {
            (
                WorkItemKey::of(record),
                record.work_date.weekday(),
                record.worked_minutes,
            )
        }),
    )
}

/// Number of entries per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub draft: usize,
    pub submitted: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn from_records(records: &[TimeRecord]) -> Self {
        records
            .iter()
            .fold(StatusCounts::default(), |mut counts, record| {
                match record.status {
                    TimeEntryStatus::Draft => counts.draft += 1,
                    TimeEntryStatus::Submitted => counts.submitted += 1,
                    TimeEntryStatus::Approved => counts.approved += 1,
                    TimeEntryStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.draft + self.submitted + self.approved + self.rejected
    }
}

/// The cost service's monthly report is rendered as received.
pub type MonthlyCostSummary = serde_json::Value;

/// Deserializes a JSON object into its entries, keeping document order.
/// `null` yields no entries.
fn ordered_entries<'de, D, K, V>(deserializer: D) -> Result<Vec<(K, V)>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
    {
        type Value = Vec<(K, V)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map or null")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_option(EntriesVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn cost_report() -> ProjectCostReport {
        serde_json::from_str(
            r#"{
                "resources": {
                    "e-9": {"nombre": "Zoe", "apellido": "Alba"},
                    "e-1": {"nombre": "Ana", "apellido": "Ruiz"}
                },
                "months": [
                    {"month": 1, "costs": [
                        {"resourceId": "e-1", "totalCost": 100.0},
                        {"resourceId": "e-1", "totalCost": "50.25"},
                        {"resourceId": "e-404", "totalCost": 999}
                    ]},
                    {"month": 3, "costs": [
                        {"resourceId": "e-9", "totalCost": 200},
                        {"resourceId": "e-9", "totalCost": null}
                    ]}
                ],
                "year": 2025
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn keeps_resource_order_from_response() {
        let report = cost_report();
        let ids: Vec<&str> = report.resources.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["e-9", "e-1"]);
        assert_eq!(
            report.resource_name(&EmployeeId::new("e-1")).unwrap().full_name(),
            "Ana Ruiz"
        );
        assert_eq!(report.resource_count(), 2);
        assert_eq!(report.months_with_data(), 2);
    }

    #[test]
    fn cost_matrix_sums_per_resource_and_month() {
        let matrix = cost_report().to_matrix();
        let ana = EmployeeId::new("e-1");
        let zoe = EmployeeId::new("e-9");

        assert_eq!(matrix.rows(), &[zoe.clone(), ana.clone()]);
        assert_eq!(matrix.columns(), &MONTHS);
        assert_eq!(matrix.cell(&ana, &1), Money::from_cents(15_025));
        assert_eq!(matrix.cell(&zoe, &3), Money::from_cents(20_000));
        assert_eq!(matrix.row_total(&ana), Money::from_cents(15_025));
        assert_eq!(matrix.column_total(&2), Money::ZERO);
        // the unlisted resource does not count
        assert_eq!(matrix.grand_total(), Money::from_cents(35_025));
        assert_eq!(
            matrix.column_totals().iter().copied().sum::<Money>(),
            matrix.grand_total()
        );
    }

    #[test]
    fn empty_cost_report_has_no_data() {
        let report: ProjectCostReport =
            serde_json::from_str(r#"{"resources": null, "year": 2024}"#).unwrap();
        assert!(!report.has_data());

        let matrix = report.to_matrix();
        assert!(matrix.is_empty());
        assert_eq!(matrix.columns().len(), 12);
        assert_eq!(matrix.grand_total(), Money::ZERO);
    }

    fn weekly_report() -> WeeklyHoursReport {
        serde_json::from_str(
            r#"{
                "startDate": "2024-03-04",
                "endDate": "2024-03-17",
                "totalHours": 14.5,
                "weeks": [
                    {"weekNumber": 10, "weekStart": "2024-03-04", "weekEnd": "2024-03-10",
                     "weekTotalHours": 10.5, "days": [
                        {"date": "2024-03-04", "projectName": "Portal", "hours": 8, "status": "APPROVED"},
                        {"date": "2024-03-05", "projectName": "Portal", "hours": 2.5, "description": "review", "status": "DRAFT"}
                    ]},
                    {"weekNumber": 11, "weekStart": "2024-03-11", "weekEnd": "2024-03-17",
                     "weekTotalHours": 4, "days": [
                        {"date": "2024-03-12", "projectName": "ERP", "hours": 4, "status": "APPROVED"}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn weekly_report_groups_hours_by_status() {
        let report = weekly_report();
        assert_eq!(report.start_date, date!(2024 - 03 - 04));
        assert!(!report.is_empty());
        assert_eq!(
            report.hours_by_status(),
            vec![
                (TimeEntryStatus::Draft, 2.5),
                (TimeEntryStatus::Submitted, 0.0),
                (TimeEntryStatus::Approved, 12.0),
                (TimeEntryStatus::Rejected, 0.0),
            ]
        );
    }

    fn record(id: &str, task: Option<&str>, day: Date, minutes: i64, status: TimeEntryStatus) -> TimeRecord {
        TimeRecord {
            id: id.into(),
            employee_id: "e-1".into(),
            project_id: "p-1".into(),
            task_id: task.map(TaskId::from),
            work_date: day,
            worked_minutes: minutes,
            status,
            description: None,
            project_name: None,
            task_name: None,
        }
    }

    #[test]
    fn weekday_matrix_places_entries_on_their_weekday() {
        let records = vec![
            record("1", Some("t-1"), date!(2024 - 03 - 04), 120, TimeEntryStatus::Draft),
            record("2", Some("t-1"), date!(2024 - 03 - 04), 60, TimeEntryStatus::Draft),
            record("3", Some("t-2"), date!(2024 - 03 - 08), 30, TimeEntryStatus::Submitted),
            record("4", None, date!(2024 - 03 - 06), 45, TimeEntryStatus::Approved),
            // Saturday
            record("5", Some("t-2"), date!(2024 - 03 - 09), 90, TimeEntryStatus::Draft),
        ];

        let matrix = weekday_matrix(&records);
        let t1 = WorkItemKey::Task("t-1".into());
        let t2 = WorkItemKey::Task("t-2".into());
        let project = WorkItemKey::Project("p-1".into());

        assert_eq!(matrix.rows(), &[t1.clone(), t2.clone(), project.clone()]);
        assert_eq!(matrix.row(&t1), Some(&[180, 0, 0, 0, 0][..]));
        assert_eq!(matrix.row(&t2), Some(&[0, 0, 0, 0, 30][..]));
        assert_eq!(matrix.cell(&project, &Weekday::Wednesday), 45);
        assert_eq!(matrix.grand_total(), 255);
        assert_eq!(matrix.unplaced_total(), 90);
    }

    #[test]
    fn counts_entries_per_status() {
        let records = vec![
            record("1", None, date!(2024 - 03 - 04), 60, TimeEntryStatus::Draft),
            record("2", None, date!(2024 - 03 - 04), 60, TimeEntryStatus::Draft),
            record("3", None, date!(2024 - 03 - 05), 60, TimeEntryStatus::Rejected),
        ];

        let counts = StatusCounts::from_records(&records);
        assert_eq!(counts.draft, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.submitted, 0);
        assert_eq!(counts.total(), 3);
    }
}

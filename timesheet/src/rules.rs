//! Checks that block a request before it is sent.

use thiserror::Error;
use time::{Date, Duration};

use crate::model::{
    CostDraft, CostId, CostInput, CostView, EmployeeId, Money, NewTimeEntry, Period, ProjectId,
    Task, TimeEntryId,
};
use crate::week::{format_short, is_week_closed, WeekId};

pub const MAX_HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Error, PartialEq)]
pub enum RuleViolation {
    #[error("El costo no puede ser negativo")]
    NegativeCost,
    #[error("Ya existe un costo registrado para el rol \"{role}\" ({experience}) en {period}")]
    DuplicateCost {
        role: String,
        experience: String,
        period: Period,
    },
    #[error("No hay costos registrados para {0}")]
    NoCostsInPeriod(Period),
    #[error("Porcentaje inválido: {0}")]
    InvalidPercent(f64),
    #[error("Un ajuste de {percent}% dejaría {count} costo(s) en negativo")]
    NegativeAdjustment { percent: f64, count: usize },
    #[error("No hay horas para guardar")]
    NoHours,
    #[error("La semana {0} está cerrada, solo se permite la semana actual")]
    WeekClosed(WeekId),
    #[error("No hay registros seleccionados")]
    EmptySelection,
    #[error("Debe indicar un motivo de rechazo")]
    MissingRejectionReason,
    #[error("La fecha de inicio {start} es posterior a la fecha de fin {end}")]
    InvalidDateRange { start: Date, end: Date },
}

/// Validates a create (`editing == None`) or update of a cost.
///
/// A cost is a duplicate when another record of the same role name and
/// experience is effective in the same period.
pub fn validate_cost(
    draft: &CostDraft,
    existing: &[CostView],
    editing: Option<&CostId>,
) -> Result<(), RuleViolation> {
    if draft.cost.is_negative() {
        return Err(RuleViolation::NegativeCost);
    }

    let duplicate = existing.iter().any(|view| {
        Some(&view.record.id) != editing
            && view.role_name == draft.role_name
            && view.experience == draft.experience
            && view.record.is_effective_in(draft.period)
    });

    if duplicate {
        return Err(RuleViolation::DuplicateCost {
            role: draft.role_name.clone(),
            experience: draft.experience.clone(),
            period: draft.period,
        });
    }

    Ok(())
}

/// One update of a mass percentage adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct CostAdjustment {
    pub id: CostId,
    pub previous: Money,
    pub input: CostInput,
}

impl CostAdjustment {
    pub fn adjusted(&self) -> Money {
        self.input.cost
    }
}

/// Plans the update of every cost effective in `period` by `percent`.
///
/// Nothing is planned when the percent is not a finite number or a single
/// result would be negative.
pub fn plan_cost_adjustment(
    costs: &[CostView],
    period: Period,
    percent: f64,
) -> Result<Vec<CostAdjustment>, RuleViolation> {
    if !percent.is_finite() {
        return Err(RuleViolation::InvalidPercent(percent));
    }

    let affected = CostView::in_period(costs, period);
    if affected.is_empty() {
        return Err(RuleViolation::NoCostsInPeriod(period));
    }

    let plan = affected
        .into_iter()
        .map(|view| {
            let adjusted = view
                .record
                .cost
                .checked_adjusted_by_percent(percent)
                .ok_or(RuleViolation::InvalidPercent(percent))?;
            Ok(CostAdjustment {
                id: view.record.id.clone(),
                previous: view.record.cost,
                input: CostInput::amount_only(adjusted, period),
            })
        })
        .collect::<Result<Vec<_>, RuleViolation>>()?;

    let negative = plan.iter().filter(|a| a.adjusted().is_negative()).count();
    if negative > 0 {
        return Err(RuleViolation::NegativeAdjustment {
            percent,
            count: negative,
        });
    }

    Ok(plan)
}

/// Clamps a grid cell to `0..=24`. Anything unparsable counts as zero.
pub fn clamp_hours(hours: f64) -> f64 {
    if hours.is_nan() {
        return 0.0;
    }
    hours.clamp(0.0, MAX_HOURS_PER_DAY)
}

/// Rejects writes into any week but the current one.
pub fn ensure_week_open(week: WeekId, current: WeekId) -> Result<(), RuleViolation> {
    if is_week_closed(week, current) {
        return Err(RuleViolation::WeekClosed(week));
    }
    Ok(())
}

/// Turns a task × Monday..Friday hours grid into draft entries for `week`.
///
/// Empty cells produce no entry.
pub fn plan_week_entries(
    employee_id: &EmployeeId,
    project_id: &ProjectId,
    week: WeekId,
    current: WeekId,
    grid: &[(Task, [f64; 5])],
) -> Result<Vec<NewTimeEntry>, RuleViolation> {
    ensure_week_open(week, current)?;

    let total: f64 = grid
        .iter()
        .flat_map(|(_, hours)| hours.iter().copied().map(clamp_hours))
        .sum();
    if total <= 0.0 {
        return Err(RuleViolation::NoHours);
    }

    let monday = week.monday();
    let mut entries = Vec::new();
    for (task, hours) in grid {
        for (offset, &raw) in hours.iter().enumerate() {
            let hours = clamp_hours(raw);
            if hours <= 0.0 {
                continue;
            }

            let work_date = monday.saturating_add(Duration::days(offset as i64));
            entries.push(NewTimeEntry {
                employee_id: employee_id.clone(),
                project_id: project_id.clone(),
                task_id: Some(task.id.clone()),
                work_date,
                worked_minutes: (hours * 60.0).round() as i64,
                description: format!("{} - {}", task.name, format_short(work_date)),
            });
        }
    }

    Ok(entries)
}

pub fn validate_selection(ids: &[TimeEntryId]) -> Result<(), RuleViolation> {
    if ids.is_empty() {
        return Err(RuleViolation::EmptySelection);
    }
    Ok(())
}

/// The trimmed rejection reason; blank reasons are refused.
pub fn rejection_reason(reason: &str) -> Result<&str, RuleViolation> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(RuleViolation::MissingRejectionReason);
    }
    Ok(reason)
}

pub fn validate_date_range(start: Date, end: Date) -> Result<(), RuleViolation> {
    if start > end {
        return Err(RuleViolation::InvalidDateRange { start, end });
    }
    Ok(())
}

use futures::future::join_all;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use time::Date;
use tracing::{debug, instrument, warn};

use timesheet::{
    format_iso_date, rejection_reason, validate_date_range, validate_selection, CostAdjustment,
    CostId, CostInput, CostRecord, CostView, EmployeeId, MonthlyCostSummary, NewTimeEntry,
    Project, ProjectCostReport, ProjectId, Resource, Role, RuleViolation, Task, TimeEntryId,
    TimeEntryUpdate, TimeRecord, WeeklyHoursReport,
};

use crate::base_url::BaseUrl;
use crate::config::ClientConfig;
use crate::dto::{
    ApprovalDecision, BatchApprovalRequest, Created, ErrorBody, LoginRequest, LoginResponse,
    RejectRequest, SubmitRequest,
};
use crate::error::{CreateEntriesError, GatewayError, GatewayResult};
use crate::session::{login_as, CurrentUser, Session};
use crate::session_store::SessionStore;

const EMPLOYEE_HEADER: &str = "X-Employee-Id";

/// Result of a batch whose requests run independently of each other.
#[derive(Debug, Default)]
pub struct BatchOutcome<Id> {
    pub succeeded: Vec<Id>,
    pub failed: Vec<(Id, GatewayError)>,
}

impl<Id> BatchOutcome<Id> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Typed access to the timesheet backend and the cost service.
///
/// Every call is a single request with no retry; the logged-in user is read
/// from the session store on each request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: BaseUrl,
    costs_url: BaseUrl,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.api_url)
            .field("costs_url", &self.costs_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> GatewayResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| GatewayError::Network {
                call: "client setup".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            api_url: BaseUrl::parse(&config.api_url)?,
            costs_url: BaseUrl::parse(&config.costs_api_url)?,
            session,
        })
    }

    pub fn session(&self) -> GatewayResult<Option<Session>> {
        Ok(self.session.load()?)
    }

    pub fn current_user(&self) -> GatewayResult<Option<CurrentUser>> {
        Ok(self.session()?.map(|s| s.user))
    }

    fn api(&self, path: &str) -> String {
        self.api_url.append_path(path)
    }

    fn costs(&self, path: &str) -> String {
        self.costs_url.append_path(path)
    }

    fn build(
        &self,
        method: Method,
        url: String,
        token: Option<&str>,
        employee: Option<&EmployeeId>,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(employee) = employee {
            request = request.header(EMPLOYEE_HEADER, employee.as_str());
        }
        request
    }

    /// A request carrying the current session's credentials.
    fn request(&self, method: Method, url: String) -> GatewayResult<RequestBuilder> {
        let session = self.session.load()?;
        let user = session.as_ref().map(|s| &s.user);
        Ok(self.build(
            method,
            url,
            user.and_then(|u| u.token.as_deref()),
            user.map(|u| &u.employee_code),
        ))
    }

    async fn send(&self, request: RequestBuilder, call_name: &str) -> GatewayResult<Response> {
        debug!(call = call_name, "sending request");

        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Network {
                call: call_name.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(call = call_name, "unauthorized, clearing session");
            if let Err(err) = self.session.clear() {
                warn!(call = call_name, error = %err, "failed to clear session");
            }
            return Err(GatewayError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(call = call_name, %status, %message, "request rejected");
            return Err(GatewayError::Rejected { status, message });
        }

        Ok(response)
    }

    async fn read_body(response: Response, call_name: &str) -> GatewayResult<String> {
        response.text().await.map_err(|source| GatewayError::Network {
            call: call_name.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> GatewayResult<T> {
        let response = self.send(request, call_name).await?;
        let body = Self::read_body(response, call_name).await?;
        parse_body(&body, call_name)
    }

    /// Like `get_json`, for endpoints that may answer without a body.
    async fn get_optional_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> GatewayResult<Option<T>> {
        let response = self.send(request, call_name).await?;
        let body = Self::read_body(response, call_name).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        parse_body(&body, call_name).map(Some)
    }

    async fn send_without_body(&self, request: RequestBuilder, call_name: &str) -> GatewayResult<()> {
        let response = self.send(request, call_name).await?;
        Self::read_body(response, call_name).await?;
        Ok(())
    }

    fn with_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: &B,
    ) -> GatewayResult<RequestBuilder> {
        Ok(self.request(method, url)?.json(body))
    }

    // Resources

    pub async fn get_resources(&self) -> GatewayResult<Vec<Resource>> {
        self.get_json(
            self.request(Method::GET, self.api("/api/resources"))?,
            "GET /api/resources",
        )
        .await
    }

    pub async fn get_resource(&self, id: &EmployeeId) -> GatewayResult<Resource> {
        self.get_json(
            self.request(Method::GET, self.api(&format!("/api/resources/{}", id)))?,
            "GET /api/resources/{id}",
        )
        .await
    }

    // Projects and tasks

    pub async fn get_projects(&self) -> GatewayResult<Vec<Project>> {
        self.get_json(
            self.request(Method::GET, self.api("/api/projects"))?,
            "GET /api/projects",
        )
        .await
    }

    pub async fn get_projects_for_employee(
        &self,
        employee: &EmployeeId,
    ) -> GatewayResult<Vec<Project>> {
        self.get_json(
            self.request(
                Method::GET,
                self.api(&format!("/api/projects/resources/{}", employee)),
            )?,
            "GET /api/projects/resources/{id}",
        )
        .await
    }

    pub async fn get_tasks_for_project(&self, project: &ProjectId) -> GatewayResult<Vec<Task>> {
        self.get_json(
            self.request(
                Method::GET,
                self.api(&format!("/api/tasks/project/{}", project)),
            )?,
            "GET /api/tasks/project/{id}",
        )
        .await
    }

    pub async fn get_tasks_for_project_and_resource(
        &self,
        project: &ProjectId,
        resource: &EmployeeId,
    ) -> GatewayResult<Vec<Task>> {
        self.get_json(
            self.request(
                Method::GET,
                self.api(&format!(
                    "/api/tasks/project/{}/resource/{}",
                    project, resource
                )),
            )?,
            "GET /api/tasks/project/{id}/resource/{id}",
        )
        .await
    }

    // Time entries

    pub async fn create_time_entry(&self, entry: &NewTimeEntry) -> GatewayResult<TimeEntryId> {
        let created: Created<TimeEntryId> = self
            .get_json(
                self.with_json(Method::POST, self.api("/api/time-entries"), entry)?,
                "POST /api/time-entries",
            )
            .await?;
        Ok(created.id)
    }

    /// Saves entries one after another and stops at the first failure.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn create_time_entries(
        &self,
        entries: &[NewTimeEntry],
    ) -> Result<Vec<TimeEntryId>, CreateEntriesError> {
        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.create_time_entry(entry).await {
                Ok(id) => created.push(id),
                Err(source) => {
                    warn!(saved = created.len(), "saving time entries stopped early");
                    return Err(CreateEntriesError {
                        created,
                        total: entries.len(),
                        source,
                    });
                }
            }
        }
        Ok(created)
    }

    /// Entries of `employee`, optionally limited to an inclusive date range.
    pub async fn get_time_entries(
        &self,
        employee: &EmployeeId,
        range: Option<(Date, Date)>,
    ) -> GatewayResult<Vec<TimeRecord>> {
        let mut query = vec![("employeeId", employee.to_string())];
        if let Some((start, end)) = range {
            validate_date_range(start, end)?;
            query.push(("startDate", format_iso_date(start)));
            query.push(("endDate", format_iso_date(end)));
        }

        self.get_json(
            self.request(Method::GET, self.api("/api/time-entries"))?
                .query(&query),
            "GET /api/time-entries",
        )
        .await
    }

    pub async fn get_time_entry(&self, id: &TimeEntryId) -> GatewayResult<TimeRecord> {
        self.get_json(
            self.request(Method::GET, self.api(&format!("/api/time-entries/{}", id)))?,
            "GET /api/time-entries/{id}",
        )
        .await
    }

    pub async fn update_time_entry(
        &self,
        id: &TimeEntryId,
        update: &TimeEntryUpdate,
    ) -> GatewayResult<TimeRecord> {
        self.get_json(
            self.with_json(
                Method::PUT,
                self.api(&format!("/api/time-entries/{}", id)),
                update,
            )?,
            "PUT /api/time-entries/{id}",
        )
        .await
    }

    pub async fn delete_time_entry(&self, id: &TimeEntryId) -> GatewayResult<()> {
        self.send_without_body(
            self.request(
                Method::DELETE,
                self.api(&format!("/api/time-entries/{}", id)),
            )?,
            "DELETE /api/time-entries/{id}",
        )
        .await
    }

    /// Moves drafts to submitted, all in one request.
    pub async fn submit_time_entries(&self, ids: &[TimeEntryId]) -> GatewayResult<()> {
        validate_selection(ids)?;
        self.send_without_body(
            self.with_json(
                Method::POST,
                self.api("/api/time-entries/submit"),
                &SubmitRequest { time_entry_ids: ids },
            )?,
            "POST /api/time-entries/submit",
        )
        .await
    }

    pub async fn get_pending_approval(&self) -> GatewayResult<Vec<TimeRecord>> {
        self.get_json(
            self.request(Method::GET, self.api("/api/time-entries/pending-approval"))?,
            "GET /api/time-entries/pending-approval",
        )
        .await
    }

    pub async fn approve_time_entry(&self, id: &TimeEntryId) -> GatewayResult<()> {
        self.send_without_body(
            self.with_json(
                Method::POST,
                self.api(&format!("/api/time-entries/{}/approve", id)),
                &serde_json::json!({}),
            )?,
            "POST /api/time-entries/{id}/approve",
        )
        .await
    }

    pub async fn reject_time_entry(&self, id: &TimeEntryId, reason: &str) -> GatewayResult<()> {
        let reason = rejection_reason(reason)?;
        self.send_without_body(
            self.with_json(
                Method::POST,
                self.api(&format!("/api/time-entries/{}/reject", id)),
                &RejectRequest { reason },
            )?,
            "POST /api/time-entries/{id}/reject",
        )
        .await
    }

    #[instrument(skip(self, decisions), fields(count = decisions.len()))]
    pub async fn batch_approval(&self, decisions: &[ApprovalDecision]) -> GatewayResult<()> {
        if decisions.is_empty() {
            return Err(RuleViolation::EmptySelection.into());
        }
        for decision in decisions.iter().filter(|d| !d.approved) {
            rejection_reason(decision.reason.as_deref().unwrap_or_default())?;
        }

        self.send_without_body(
            self.with_json(
                Method::POST,
                self.api("/api/time-entries/batch-approval"),
                &BatchApprovalRequest {
                    approvals: decisions,
                },
            )?,
            "POST /api/time-entries/batch-approval",
        )
        .await
    }

    // Reports

    pub async fn get_weekly_hours_report(
        &self,
        employee: &EmployeeId,
        start: Date,
        end: Date,
    ) -> GatewayResult<WeeklyHoursReport> {
        validate_date_range(start, end)?;
        self.get_json(
            self.request(Method::GET, self.api("/api/reports/weekly-hours"))?
                .query(&[
                    ("employeeId", employee.to_string()),
                    ("startDate", format_iso_date(start)),
                    ("endDate", format_iso_date(end)),
                ]),
            "GET /api/reports/weekly-hours",
        )
        .await
    }

    pub async fn get_project_cost_report(
        &self,
        project: &ProjectId,
        year: i32,
    ) -> GatewayResult<ProjectCostReport> {
        self.get_json(
            self.request(
                Method::GET,
                self.api(&format!("/api/reports/project-costs/{}/{}", year, project)),
            )?,
            "GET /api/reports/project-costs/{year}/{id}",
        )
        .await
    }

    // Auth

    /// Authenticates against the backend and stores the resulting session.
    pub async fn login(&self, employee_code: &EmployeeId, password: &str) -> GatewayResult<Session> {
        let response: Option<LoginResponse> = self
            .get_optional_json(
                self.build(Method::POST, self.api("/auth/login"), None, None)
                    .json(&LoginRequest {
                        employee_code,
                        password,
                    }),
                "POST /auth/login",
            )
            .await?;
        let token = response.unwrap_or_default().token;

        let resource: Resource = self
            .get_json(
                self.build(
                    Method::GET,
                    self.api(&format!("/api/resources/{}", employee_code)),
                    token.as_deref(),
                    Some(employee_code),
                ),
                "GET /api/resources/{id}",
            )
            .await?;

        let mut session = login_as(&resource);
        session.user.token = token;
        self.session.save(&session)?;
        debug!(employee = %employee_code, role = %session.user.role, "logged in");
        Ok(session)
    }

    pub fn logout(&self) -> GatewayResult<()> {
        Ok(self.session.clear()?)
    }

    // Cost service

    pub async fn get_costs(&self) -> GatewayResult<Vec<CostRecord>> {
        self.get_json(
            self.request(Method::GET, self.costs("/costos-rol"))?,
            "GET /costos-rol",
        )
        .await
    }

    /// The created record, when the service answers with one.
    pub async fn create_cost(&self, input: &CostInput) -> GatewayResult<Option<CostRecord>> {
        self.get_optional_json(
            self.with_json(Method::POST, self.costs("/costos-rol"), input)?,
            "POST /costos-rol",
        )
        .await
    }

    pub async fn update_cost(
        &self,
        id: &CostId,
        input: &CostInput,
    ) -> GatewayResult<Option<CostRecord>> {
        self.get_optional_json(
            self.with_json(Method::PUT, self.costs(&format!("/costos-rol/{}", id)), input)?,
            "PUT /costos-rol/{id}",
        )
        .await
    }

    pub async fn delete_cost(&self, id: &CostId) -> GatewayResult<()> {
        self.send_without_body(
            self.request(Method::DELETE, self.costs(&format!("/costos-rol/{}", id)))?,
            "DELETE /costos-rol/{id}",
        )
        .await
    }

    pub async fn get_monthly_cost_report(&self, year: i32) -> GatewayResult<MonthlyCostSummary> {
        self.get_json(
            self.request(Method::GET, self.costs(&format!("/reportes/mensual/{}", year)))?,
            "GET /reportes/mensual/{year}",
        )
        .await
    }

    pub async fn get_role_names(&self) -> GatewayResult<Vec<String>> {
        self.get_json(
            self.request(Method::GET, self.costs("/roles/nombres"))?,
            "GET /roles/nombres",
        )
        .await
    }

    pub async fn get_role_experiences(&self) -> GatewayResult<Vec<String>> {
        self.get_json(
            self.request(Method::GET, self.costs("/roles/experiencias"))?,
            "GET /roles/experiencias",
        )
        .await
    }

    pub async fn get_roles(&self) -> GatewayResult<Vec<Role>> {
        self.get_json(self.request(Method::GET, self.costs("/roles"))?, "GET /roles")
            .await
    }

    /// Costs and the role catalog, fetched concurrently and joined.
    ///
    /// Without a catalog every cost shows the unknown-role placeholders.
    pub async fn load_costs_with_roles(&self) -> GatewayResult<Vec<CostView>> {
        let (costs, roles) = futures::join!(self.get_costs(), self.get_roles());
        let costs = costs?;

        let roles = match roles {
            Ok(roles) => roles,
            Err(err) if err.is_unauthorized() => return Err(err),
            Err(err) => {
                warn!(error = %err, "role catalog unavailable, showing costs without roles");
                Vec::new()
            }
        };

        Ok(CostView::join(costs, &roles))
    }

    /// Sends every planned update at once. Callers should reload the costs
    /// afterwards, whatever the outcome.
    #[instrument(skip(self, plan), fields(count = plan.len()))]
    pub async fn apply_cost_adjustment(&self, plan: &[CostAdjustment]) -> BatchOutcome<CostId> {
        let results = join_all(
            plan.iter()
                .map(|adjustment| self.update_cost(&adjustment.id, &adjustment.input)),
        )
        .await;

        let mut outcome = BatchOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (adjustment, result) in plan.iter().zip(results) {
            match result {
                Ok(_) => outcome.succeeded.push(adjustment.id.clone()),
                Err(err) => outcome.failed.push((adjustment.id.clone(), err)),
            }
        }

        if !outcome.is_complete() {
            warn!(failed = outcome.failed.len(), "cost adjustment partially applied");
        }
        outcome
    }
}

/// Server message of a rejected request: the JSON `message` or `error` field,
/// else the raw body, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
    {
        return message;
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("Error {}: {}", status.as_u16(), reason),
        None => format!("Error {}", status.as_u16()),
    }
}

fn parse_body<T: DeserializeOwned>(body: &str, call_name: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(|err| GatewayError::Parse {
        call: call_name.to_string(),
        message: err.to_string(),
    })
}

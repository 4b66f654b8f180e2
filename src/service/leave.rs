use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::calendar::working_days_in_month;
use crate::error::CoreError;
use crate::model::attendance::{AttendanceSummary, MonthlyAttendance};
use crate::model::employee::Employee;
use crate::model::leave_request::{
    DayOffType, LeaveCategory, LeaveRequest, LeaveStatus, quantity,
};
use crate::store::{RequestChanges, RequestFilter, Store, start_year_month};
use crate::utils::{employee_cache, employee_filter};

/// Reviewer decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    fn target_status(self) -> LeaveStatus {
        match self {
            Decision::Accept => LeaveStatus::Accepted,
            Decision::Reject => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub requester_id: u64,
    pub supervisor_id: u64,
    pub day_off_type: DayOffType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub title: String,
}

/// Pre-approval edit. Absent fields keep their current values; quantity
/// and category are recomputed from the merged result.
#[derive(Debug, Clone, Default)]
pub struct LeaveRequestPatch {
    pub day_off_type: Option<DayOffType>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

/// The leave/attendance accounting core: quantity rules, the approval
/// state machine, the derived vacation balance, and the monthly
/// attendance rollup.
pub struct LeaveService<S> {
    store: S,
}

impl<S: Store> LeaveService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a pending request. Quantity and category are computed here
    /// and only change again through an explicit edit.
    pub async fn submit_leave_request(
        &self,
        new: NewLeaveRequest,
    ) -> Result<LeaveRequest, CoreError> {
        validate_interval(new.day_off_type, new.start_at, new.end_at)?;
        validate_title(&new.title)?;

        self.resolve_employee(new.requester_id, "requester").await?;
        self.resolve_employee(new.supervisor_id, "supervisor").await?;

        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            requester_id: new.requester_id,
            supervisor_id: new.supervisor_id,
            day_off_type: new.day_off_type,
            start_at: new.start_at,
            end_at: new.end_at,
            quantity: quantity(new.day_off_type, new.start_at, new.end_at),
            category: LeaveCategory::from_title(&new.title),
            title: new.title,
            status: LeaveStatus::Pending,
            created_at: Utc::now(),
        };

        self.store.insert_request(request.clone()).await?;

        tracing::info!(
            request_id = %request.id,
            requester_id = request.requester_id,
            quantity = request.quantity,
            "Leave request submitted"
        );

        Ok(request)
    }

    /// Applies an edit while the request is still pending; the write
    /// itself is guarded on status, so an edit racing a decision loses.
    pub async fn edit_leave_request(
        &self,
        id: &str,
        patch: LeaveRequestPatch,
    ) -> Result<LeaveRequest, CoreError> {
        let current = self
            .store
            .get_request(id)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("leave request {} not found", id)))?;

        if current.status != LeaveStatus::Pending {
            return Err(CoreError::InvalidState {
                id: current.id,
                status: current.status,
            });
        }

        let day_off_type = patch.day_off_type.unwrap_or(current.day_off_type);
        let start_at = patch.start_at.unwrap_or(current.start_at);
        let end_at = patch.end_at.unwrap_or(current.end_at);
        let title = patch.title.unwrap_or(current.title);

        validate_interval(day_off_type, start_at, end_at)?;
        validate_title(&title)?;

        let changes = RequestChanges {
            day_off_type,
            start_at,
            end_at,
            quantity: quantity(day_off_type, start_at, end_at),
            category: LeaveCategory::from_title(&title),
            title,
        };

        if !self.store.update_pending_request(id, &changes).await? {
            // Lost a race with a reviewer decision.
            return Err(self.state_error(id).await);
        }

        self.store
            .get_request(id)
            .await?
            .ok_or(CoreError::Transient(sqlx::Error::RowNotFound))
    }

    /// The approval state machine. Pending -> accepted|rejected, both
    /// terminal. Of two racing decisions exactly one wins; the loser gets
    /// `InvalidState`.
    ///
    /// On acceptance the vacation balance takes effect by derivation, and
    /// ordinary leave is posted to the month's attendance summary. A
    /// summary failure is surfaced as `PartialSideEffect`; the accepted
    /// status stands.
    pub async fn decide(&self, id: &str, decision: Decision) -> Result<LeaveRequest, CoreError> {
        let target = decision.target_status();

        if !self.store.transition_status(id, target).await? {
            return Err(self.state_error(id).await);
        }

        let request = self
            .store
            .get_request(id)
            .await?
            .ok_or(CoreError::Transient(sqlx::Error::RowNotFound))?;

        tracing::info!(
            request_id = %request.id,
            requester_id = request.requester_id,
            status = %request.status,
            "Leave request decided"
        );

        if decision == Decision::Accept {
            match self.vacation_days_remaining(request.requester_id).await {
                Ok(remaining) => tracing::info!(
                    request_id = %request.id,
                    requester_id = request.requester_id,
                    remaining,
                    "Vacation balance after acceptance"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    request_id = %request.id,
                    "Could not derive balance after acceptance"
                ),
            }

            if request.category == LeaveCategory::Ordinary {
                if let Err(cause) = self.post_leave_to_summary(&request).await {
                    tracing::error!(
                        error = %cause,
                        request_id = %request.id,
                        requester_id = request.requester_id,
                        "Accepted, but attendance summary update failed"
                    );
                    return Err(CoreError::PartialSideEffect {
                        id: request.id,
                        cause: Box::new(cause),
                    });
                }
            }
        }

        Ok(request)
    }

    pub async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<LeaveRequest>, CoreError> {
        self.store.list_requests(filter).await
    }

    /// Derived balance: annual allowance minus the sum of accepted
    /// quantities. May go negative; there is no enforced floor.
    pub async fn vacation_days_remaining(&self, employee_id: u64) -> Result<f64, CoreError> {
        let employee = self.require_employee(employee_id).await?;
        let used = self.store.accepted_quantity_total(employee_id).await?;
        Ok(employee.annual_allowance - used)
    }

    /// Monthly attendance figures, recomputed from the accepted-request
    /// set. `attendance_days` is clamped at 0.
    pub async fn monthly_attendance(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<MonthlyAttendance, CoreError> {
        validate_period(year, month)?;
        self.require_employee(employee_id).await?;

        let working_days = working_days_in_month(year, month);
        let leave_days = self
            .store
            .accepted_leave_days(employee_id, year, month)
            .await?;
        let ot_hours = self
            .store
            .get_summary(employee_id, year, month)
            .await?
            .map(|s| s.ot_hours)
            .unwrap_or(0.0);

        Ok(MonthlyAttendance {
            working_days,
            leave_days,
            attendance_days: (working_days as f64 - leave_days).max(0.0),
            ot_hours,
        })
    }

    /// Display name for list rendering: name cache first, directory on a
    /// miss.
    pub async fn resolve_display_name(&self, employee_id: u64) -> Option<String> {
        if let Some(name) = employee_cache::display_name(employee_id).await {
            return Some(name);
        }
        match self.store.get_employee(employee_id).await {
            Ok(Some(employee)) => {
                let name = employee.display_name();
                employee_cache::remember(employee_id, name.clone()).await;
                Some(name)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, employee_id, "Display name lookup failed");
                None
            }
        }
    }

    async fn post_leave_to_summary(
        &self,
        request: &LeaveRequest,
    ) -> Result<AttendanceSummary, CoreError> {
        let (year, month) = start_year_month(request);
        let leave_days = self
            .store
            .accepted_leave_days(request.requester_id, year, month)
            .await?;
        let attendance_days = (working_days_in_month(year, month) as f64 - leave_days).max(0.0);

        self.store
            .upsert_summary(
                request.requester_id,
                year,
                month,
                request.quantity,
                0.0,
                attendance_days,
            )
            .await
    }

    /// Explains a lost compare-and-set: either the id is unknown or the
    /// request has already reached a terminal status.
    async fn state_error(&self, id: &str) -> CoreError {
        match self.store.get_request(id).await {
            Ok(Some(request)) => CoreError::InvalidState {
                id: request.id,
                status: request.status,
            },
            Ok(None) => CoreError::Validation(format!("leave request {} not found", id)),
            Err(e) => e,
        }
    }

    async fn require_employee(&self, employee_id: u64) -> Result<Employee, CoreError> {
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("employee {} not found", employee_id)))
    }

    /// Requester/supervisor resolution: the warmed cuckoo filter fast-fails
    /// ids that definitely do not exist; the directory confirms the rest.
    async fn resolve_employee(&self, employee_id: u64, role: &str) -> Result<Employee, CoreError> {
        if !employee_filter::might_exist(employee_id) {
            return Err(CoreError::Validation(format!(
                "{} {} is not a known employee",
                role, employee_id
            )));
        }

        let employee = self.store.get_employee(employee_id).await?.ok_or_else(|| {
            CoreError::Validation(format!("{} {} is not a known employee", role, employee_id))
        })?;

        employee_filter::insert(employee.id);
        employee_cache::remember(employee.id, employee.display_name()).await;
        Ok(employee)
    }
}

/// The calendar utility trusts its inputs; this is the boundary that
/// keeps arbitrary query parameters away from it.
fn validate_period(year: i32, month: u32) -> Result<(), CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!("month {} out of range", month)));
    }
    if !(1970..=9999).contains(&year) {
        return Err(CoreError::Validation(format!("year {} out of range", year)));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}

fn validate_interval(
    day_off_type: DayOffType,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<(), CoreError> {
    if end_at < start_at {
        return Err(CoreError::Validation(
            "end must not be before start".to_string(),
        ));
    }
    if day_off_type == DayOffType::HalfDay && start_at.date_naive() != end_at.date_naive() {
        return Err(CoreError::Validation(
            "a half-day request must stay within one calendar day".to_string(),
        ));
    }
    Ok(())
}

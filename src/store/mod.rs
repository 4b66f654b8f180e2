use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::CoreError;
use crate::model::attendance::AttendanceSummary;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{DayOffType, LeaveCategory, LeaveRequest, LeaveStatus};

pub mod memory;
pub mod mysql;

/// Filter options for the request listing. All present fields are
/// AND-combined; absent fields impose no constraint. Year/month match on
/// the request's start instant, department via the requester's membership.
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct RequestFilter {
    #[schema(example = 2026)]
    pub year: Option<i32>,
    #[schema(example = 3)]
    pub month: Option<u32>,
    #[schema(example = 10)]
    pub department_id: Option<u64>,
    pub day_off_type: Option<DayOffType>,
    pub status: Option<LeaveStatus>,
}

/// Replacement field set applied by a pre-approval edit. Quantity and
/// category are recomputed by the service before the write so a row is
/// always internally consistent.
#[derive(Debug, Clone)]
pub struct RequestChanges {
    pub day_off_type: DayOffType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub title: String,
    pub category: LeaveCategory,
    pub quantity: f64,
}

/// Persistence boundary for the accounting core: leave requests, the
/// employee/department directory, and attendance summaries.
///
/// Both mutating request operations are compare-and-set on
/// `status = pending`; they return whether the write was applied, which is
/// what serializes racing approvals.
#[allow(async_fn_in_trait)]
pub trait Store {
    async fn insert_request(&self, request: LeaveRequest) -> Result<(), CoreError>;

    async fn get_request(&self, id: &str) -> Result<Option<LeaveRequest>, CoreError>;

    /// Finite snapshot, newest first. Not a live stream.
    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<LeaveRequest>, CoreError>;

    /// Applies the field set iff the request is still pending.
    async fn update_pending_request(
        &self,
        id: &str,
        changes: &RequestChanges,
    ) -> Result<bool, CoreError>;

    /// Sole mutator of `status`. Succeeds iff the current status is still
    /// pending; exactly one of two racing transitions can win.
    async fn transition_status(&self, id: &str, to: LeaveStatus) -> Result<bool, CoreError>;

    /// Sum of `quantity` over all accepted requests of the employee,
    /// regardless of category. Feeds the derived vacation balance.
    async fn accepted_quantity_total(&self, employee_id: u64) -> Result<f64, CoreError>;

    /// Sum of `quantity` over accepted ordinary requests whose start falls
    /// in the given year/month.
    async fn accepted_leave_days(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<f64, CoreError>;

    /// Upserts the (employee, year, month) summary row: adds the deltas to
    /// `leave_days`/`ot_hours` and replaces `attendance_days` with the
    /// freshly derived value.
    async fn upsert_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
        leave_days_delta: f64,
        ot_hours_delta: f64,
        attendance_days: f64,
    ) -> Result<AttendanceSummary, CoreError>;

    async fn get_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<Option<AttendanceSummary>, CoreError>;

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, CoreError>;

    async fn list_employees(&self, department_id: Option<u64>) -> Result<Vec<Employee>, CoreError>;

    async fn get_department(&self, id: u64) -> Result<Option<Department>, CoreError>;
}

pub(crate) fn start_year_month(request: &LeaveRequest) -> (i32, u32) {
    use chrono::Datelike;
    let date = request.start_at.date_naive();
    (date.year(), date.month())
}

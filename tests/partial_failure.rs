//! The accepted status must stand even when the attendance-summary write
//! fails afterwards.

use chrono::{DateTime, TimeZone, Utc};

use hrm_leave::error::CoreError;
use hrm_leave::model::attendance::AttendanceSummary;
use hrm_leave::model::department::Department;
use hrm_leave::model::employee::Employee;
use hrm_leave::model::leave_request::{DayOffType, LeaveRequest, LeaveStatus};
use hrm_leave::service::{Decision, LeaveService, NewLeaveRequest};
use hrm_leave::store::memory::MemStore;
use hrm_leave::store::{RequestChanges, RequestFilter, Store};

/// Delegates everything to the in-memory store except the summary upsert,
/// which always fails like a storage timeout would.
struct SummaryOutage {
    inner: MemStore,
}

impl Store for SummaryOutage {
    async fn insert_request(&self, request: LeaveRequest) -> Result<(), CoreError> {
        self.inner.insert_request(request).await
    }

    async fn get_request(&self, id: &str) -> Result<Option<LeaveRequest>, CoreError> {
        self.inner.get_request(id).await
    }

    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<LeaveRequest>, CoreError> {
        self.inner.list_requests(filter).await
    }

    async fn update_pending_request(
        &self,
        id: &str,
        changes: &RequestChanges,
    ) -> Result<bool, CoreError> {
        self.inner.update_pending_request(id, changes).await
    }

    async fn transition_status(&self, id: &str, to: LeaveStatus) -> Result<bool, CoreError> {
        self.inner.transition_status(id, to).await
    }

    async fn accepted_quantity_total(&self, employee_id: u64) -> Result<f64, CoreError> {
        self.inner.accepted_quantity_total(employee_id).await
    }

    async fn accepted_leave_days(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<f64, CoreError> {
        self.inner.accepted_leave_days(employee_id, year, month).await
    }

    async fn upsert_summary(
        &self,
        _employee_id: u64,
        _year: i32,
        _month: u32,
        _leave_days_delta: f64,
        _ot_hours_delta: f64,
        _attendance_days: f64,
    ) -> Result<AttendanceSummary, CoreError> {
        Err(CoreError::Transient(sqlx::Error::PoolTimedOut))
    }

    async fn get_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<Option<AttendanceSummary>, CoreError> {
        self.inner.get_summary(employee_id, year, month).await
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, CoreError> {
        self.inner.get_employee(id).await
    }

    async fn list_employees(&self, department_id: Option<u64>) -> Result<Vec<Employee>, CoreError> {
        self.inner.list_employees(department_id).await
    }

    async fn get_department(&self, id: u64) -> Result<Option<Department>, CoreError> {
        self.inner.get_department(id).await
    }
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn seeded_service() -> LeaveService<SummaryOutage> {
    let inner = MemStore::new();
    inner.insert_department(Department {
        id: 10,
        name: "Engineering".to_string(),
    });
    inner.insert_employee(Employee {
        id: 1000,
        employee_code: "EMP-1000".to_string(),
        first_name: "John".to_string(),
        last_name: "Tester".to_string(),
        email: "emp-1000@company.com".to_string(),
        department_id: 10,
        role_id: 3,
        annual_allowance: 10.0,
    });
    inner.insert_employee(Employee {
        id: 2000,
        employee_code: "EMP-2000".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Tester".to_string(),
        email: "emp-2000@company.com".to_string(),
        department_id: 10,
        role_id: 2,
        annual_allowance: 20.0,
    });
    LeaveService::new(SummaryOutage { inner })
}

#[actix_web::test]
async fn acceptance_survives_summary_write_failure() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(NewLeaveRequest {
            requester_id: 1000,
            supervisor_id: 2000,
            day_off_type: DayOffType::FullDay,
            start_at: utc(2026, 3, 2, 0, 0),
            end_at: utc(2026, 3, 3, 23, 59),
            title: "Trip".to_string(),
        })
        .await
        .unwrap();

    let outcome = svc.decide(&request.id, Decision::Accept).await;
    match outcome {
        Err(CoreError::PartialSideEffect { id, .. }) => assert_eq!(id, request.id),
        other => panic!("expected PartialSideEffect, got {:?}", other.map(|r| r.status)),
    }

    // The status change was not rolled back…
    let stored = svc.store().get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Accepted);

    // …the derived balance reflects the acceptance…
    assert_eq!(svc.vacation_days_remaining(1000).await.unwrap(), 8.0);

    // …and the monthly figures, being derived from the request set, are
    // consistent even though the summary row is missing.
    let month = svc.monthly_attendance(1000, 2026, 3).await.unwrap();
    assert_eq!(month.leave_days, 2.0);
    assert!(svc.store().get_summary(1000, 2026, 3).await.unwrap().is_none());

    // A second approval attempt still reports the terminal state.
    let again = svc.decide(&request.id, Decision::Accept).await;
    assert!(matches!(again, Err(CoreError::InvalidState { .. })));
}

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Datelike;

use crate::error::CoreError;
use crate::model::attendance::AttendanceSummary;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};
use crate::store::{RequestChanges, RequestFilter, Store};

/// In-memory store backing the test suite. Every operation takes the
/// single write/read lock for its whole body, which gives the same
/// per-record atomicity the MySQL implementation gets from guarded
/// UPDATE statements.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    requests: HashMap<String, LeaveRequest>,
    employees: HashMap<u64, Employee>,
    departments: HashMap<u64, Department>,
    summaries: HashMap<(u64, i32, u32), AttendanceSummary>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_employee(&self, employee: Employee) {
        let mut inner = self.inner.write().expect("mem store poisoned");
        inner.employees.insert(employee.id, employee);
    }

    pub fn insert_department(&self, department: Department) {
        let mut inner = self.inner.write().expect("mem store poisoned");
        inner.departments.insert(department.id, department);
    }
}

impl Store for MemStore {
    async fn insert_request(&self, request: LeaveRequest) -> Result<(), CoreError> {
        let mut inner = self.inner.write().expect("mem store poisoned");
        inner.requests.insert(request.id.clone(), request);
        Ok(())
    }

    async fn get_request(&self, id: &str) -> Result<Option<LeaveRequest>, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        Ok(inner.requests.get(id).cloned())
    }

    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<LeaveRequest>, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");

        let mut rows: Vec<LeaveRequest> = inner
            .requests
            .values()
            .filter(|r| {
                let start = r.start_at.date_naive();
                if let Some(year) = filter.year {
                    if start.year() != year {
                        return false;
                    }
                }
                if let Some(month) = filter.month {
                    if start.month() != month {
                        return false;
                    }
                }
                if let Some(day_off_type) = filter.day_off_type {
                    if r.day_off_type != day_off_type {
                        return false;
                    }
                }
                if let Some(status) = filter.status {
                    if r.status != status {
                        return false;
                    }
                }
                if let Some(department_id) = filter.department_id {
                    match inner.employees.get(&r.requester_id) {
                        Some(e) => {
                            if e.department_id != department_id {
                                return false;
                            }
                        }
                        None => return false,
                    }
                }
                true
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_pending_request(
        &self,
        id: &str,
        changes: &RequestChanges,
    ) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().expect("mem store poisoned");
        match inner.requests.get_mut(id) {
            Some(request) if request.status == LeaveStatus::Pending => {
                request.day_off_type = changes.day_off_type;
                request.start_at = changes.start_at;
                request.end_at = changes.end_at;
                request.title = changes.title.clone();
                request.category = changes.category;
                request.quantity = changes.quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn transition_status(&self, id: &str, to: LeaveStatus) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().expect("mem store poisoned");
        match inner.requests.get_mut(id) {
            Some(request) if request.status == LeaveStatus::Pending => {
                request.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn accepted_quantity_total(&self, employee_id: u64) -> Result<f64, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        Ok(inner
            .requests
            .values()
            .filter(|r| r.requester_id == employee_id && r.status == LeaveStatus::Accepted)
            .map(|r| r.quantity)
            .sum())
    }

    async fn accepted_leave_days(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<f64, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        Ok(inner
            .requests
            .values()
            .filter(|r| {
                let start = r.start_at.date_naive();
                r.requester_id == employee_id
                    && r.status == LeaveStatus::Accepted
                    && r.category == LeaveCategory::Ordinary
                    && start.year() == year
                    && start.month() == month
            })
            .map(|r| r.quantity)
            .sum())
    }

    async fn upsert_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
        leave_days_delta: f64,
        ot_hours_delta: f64,
        attendance_days: f64,
    ) -> Result<AttendanceSummary, CoreError> {
        let mut inner = self.inner.write().expect("mem store poisoned");
        let summary = inner
            .summaries
            .entry((employee_id, year, month))
            .or_insert_with(|| AttendanceSummary {
                employee_id,
                year,
                month,
                attendance_days: 0.0,
                leave_days: 0.0,
                ot_hours: 0.0,
            });
        summary.leave_days += leave_days_delta;
        summary.ot_hours += ot_hours_delta;
        summary.attendance_days = attendance_days;
        Ok(summary.clone())
    }

    async fn get_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<Option<AttendanceSummary>, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        Ok(inner.summaries.get(&(employee_id, year, month)).cloned())
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        Ok(inner.employees.get(&id).cloned())
    }

    async fn list_employees(&self, department_id: Option<u64>) -> Result<Vec<Employee>, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        let mut rows: Vec<Employee> = inner
            .employees
            .values()
            .filter(|e| department_id.map_or(true, |d| e.department_id == d))
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows)
    }

    async fn get_department(&self, id: u64) -> Result<Option<Department>, CoreError> {
        let inner = self.inner.read().expect("mem store poisoned");
        Ok(inner.departments.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pending_request(id: &str, requester_id: u64) -> LeaveRequest {
        use crate::model::leave_request::DayOffType;
        LeaveRequest {
            id: id.to_string(),
            requester_id,
            supervisor_id: 2000,
            day_off_type: DayOffType::FullDay,
            start_at: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 3, 23, 59, 0).unwrap(),
            quantity: 2.0,
            title: "Trip".to_string(),
            category: LeaveCategory::Ordinary,
            status: LeaveStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap(),
        }
    }

    #[actix_web::test]
    async fn transition_is_compare_and_set() {
        let store = MemStore::new();
        store.insert_request(pending_request("r1", 1000)).await.unwrap();

        assert!(store.transition_status("r1", LeaveStatus::Accepted).await.unwrap());
        // Terminal: the second transition must lose, whatever it is.
        assert!(!store.transition_status("r1", LeaveStatus::Rejected).await.unwrap());
        assert!(!store.transition_status("r1", LeaveStatus::Accepted).await.unwrap());

        let stored = store.get_request("r1").await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::Accepted);
    }

    #[actix_web::test]
    async fn update_refuses_non_pending_rows() {
        let store = MemStore::new();
        store.insert_request(pending_request("r1", 1000)).await.unwrap();
        store.transition_status("r1", LeaveStatus::Rejected).await.unwrap();

        let changes = RequestChanges {
            day_off_type: crate::model::leave_request::DayOffType::HalfDay,
            start_at: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            title: "Trip".to_string(),
            category: LeaveCategory::Ordinary,
            quantity: 0.5,
        };
        assert!(!store.update_pending_request("r1", &changes).await.unwrap());
        let stored = store.get_request("r1").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 2.0);
    }

    #[actix_web::test]
    async fn accepted_sums_skip_pending_and_non_ordinary() {
        let store = MemStore::new();
        store.insert_request(pending_request("r1", 1000)).await.unwrap();

        let mut ot = pending_request("r2", 1000);
        ot.title = "OT".to_string();
        ot.category = LeaveCategory::Overtime;
        store.insert_request(ot).await.unwrap();

        store.transition_status("r1", LeaveStatus::Accepted).await.unwrap();
        store.transition_status("r2", LeaveStatus::Accepted).await.unwrap();

        assert_eq!(store.accepted_quantity_total(1000).await.unwrap(), 4.0);
        assert_eq!(store.accepted_leave_days(1000, 2026, 3).await.unwrap(), 2.0);
        assert_eq!(store.accepted_leave_days(1000, 2026, 4).await.unwrap(), 0.0);
    }
}

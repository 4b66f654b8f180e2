use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;

use crate::error::CoreError;
use crate::model::attendance::AttendanceSummary;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{DayOffType, LeaveCategory, LeaveRequest, LeaveStatus};
use crate::store::{RequestChanges, RequestFilter, Store};

/// Production store over MySQL. Status transitions are guarded UPDATEs
/// (`... AND status = 'pending'`), so two racing approvals resolve to
/// exactly one affected row.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Raw row; the enum columns arrive as strings and are parsed (never
/// defaulted) on the way out.
#[derive(FromRow)]
struct LeaveRequestRow {
    id: String,
    requester_id: u64,
    supervisor_id: u64,
    day_off_type: String,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    quantity: f64,
    title: String,
    category: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn decode_column<T: FromStr>(column: &str, raw: &str) -> Result<T, CoreError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|e| {
        CoreError::Transient(sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = CoreError;

    fn try_from(row: LeaveRequestRow) -> Result<Self, Self::Error> {
        let day_off_type: DayOffType = decode_column("day_off_type", &row.day_off_type)?;
        let category: LeaveCategory = decode_column("category", &row.category)?;
        let status: LeaveStatus = decode_column("status", &row.status)?;
        Ok(LeaveRequest {
            id: row.id,
            requester_id: row.requester_id,
            supervisor_id: row.supervisor_id,
            day_off_type,
            start_at: row.start_at,
            end_at: row.end_at,
            quantity: row.quantity,
            title: row.title,
            category,
            status,
            created_at: row.created_at,
        })
    }
}

// Helper enum for typed SQLx binding of dynamically assembled filters.
enum FilterValue {
    I32(i32),
    U32(u32),
    U64(u64),
    Str(String),
}

impl Store for MySqlStore {
    async fn insert_request(&self, request: LeaveRequest) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, requester_id, supervisor_id, day_off_type, start_at, end_at,
                 quantity, title, category, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(request.requester_id)
        .bind(request.supervisor_id)
        .bind(request.day_off_type.to_string())
        .bind(request.start_at)
        .bind(request.end_at)
        .bind(request.quantity)
        .bind(&request.title)
        .bind(request.category.to_string())
        .bind(request.status.to_string())
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_request(&self, id: &str) -> Result<Option<LeaveRequest>, CoreError> {
        let row = sqlx::query_as::<_, LeaveRequestRow>(
            r#"
            SELECT id, requester_id, supervisor_id, day_off_type, start_at, end_at,
                   quantity, title, category, status, created_at
            FROM leave_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<LeaveRequest>, CoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(year) = filter.year {
            where_sql.push_str(" AND YEAR(start_at) = ?");
            args.push(FilterValue::I32(year));
        }
        if let Some(month) = filter.month {
            where_sql.push_str(" AND MONTH(start_at) = ?");
            args.push(FilterValue::U32(month));
        }
        if let Some(department_id) = filter.department_id {
            where_sql.push_str(
                " AND requester_id IN (SELECT id FROM employees WHERE department_id = ?)",
            );
            args.push(FilterValue::U64(department_id));
        }
        if let Some(day_off_type) = filter.day_off_type {
            where_sql.push_str(" AND day_off_type = ?");
            args.push(FilterValue::Str(day_off_type.to_string()));
        }
        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.to_string()));
        }

        let data_sql = format!(
            r#"
            SELECT id, requester_id, supervisor_id, day_off_type, start_at, end_at,
                   quantity, title, category, status, created_at
            FROM leave_requests
            {}
            ORDER BY created_at DESC
            "#,
            where_sql
        );

        let mut data_q = sqlx::query_as::<_, LeaveRequestRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::I32(v) => data_q.bind(v),
                FilterValue::U32(v) => data_q.bind(v),
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        let rows = data_q.fetch_all(&self.pool).await?;
        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn update_pending_request(
        &self,
        id: &str,
        changes: &RequestChanges,
    ) -> Result<bool, CoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET day_off_type = ?, start_at = ?, end_at = ?, title = ?,
                category = ?, quantity = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(changes.day_off_type.to_string())
        .bind(changes.start_at)
        .bind(changes.end_at)
        .bind(&changes.title)
        .bind(changes.category.to_string())
        .bind(changes.quantity)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn transition_status(&self, id: &str, to: LeaveStatus) -> Result<bool, CoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(to.to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn accepted_quantity_total(&self, employee_id: u64) -> Result<f64, CoreError> {
        let total = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM leave_requests
            WHERE requester_id = ?
            AND status = 'accepted'
            "#,
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn accepted_leave_days(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<f64, CoreError> {
        let total = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM leave_requests
            WHERE requester_id = ?
            AND status = 'accepted'
            AND category = 'ordinary'
            AND YEAR(start_at) = ?
            AND MONTH(start_at) = ?
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .bind(month)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
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
        sqlx::query(
            r#"
            INSERT INTO attendance_summaries
                (employee_id, year, month, attendance_days, leave_days, ot_hours)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                attendance_days = VALUES(attendance_days),
                leave_days = leave_days + VALUES(leave_days),
                ot_hours = ot_hours + VALUES(ot_hours)
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .bind(month)
        .bind(attendance_days)
        .bind(leave_days_delta)
        .bind(ot_hours_delta)
        .execute(&self.pool)
        .await?;

        let summary = self.get_summary(employee_id, year, month).await?;
        summary.ok_or_else(|| CoreError::Transient(sqlx::Error::RowNotFound))
    }

    async fn get_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<Option<AttendanceSummary>, CoreError> {
        let summary = sqlx::query_as::<_, AttendanceSummary>(
            r#"
            SELECT employee_id, year, month, attendance_days, leave_days, ot_hours
            FROM attendance_summaries
            WHERE employee_id = ?
            AND year = ?
            AND month = ?
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, CoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, employee_code, first_name, last_name, email,
                   department_id, role_id, annual_allowance
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn list_employees(&self, department_id: Option<u64>) -> Result<Vec<Employee>, CoreError> {
        let mut where_sql = String::new();
        if department_id.is_some() {
            where_sql.push_str(" WHERE department_id = ?");
        }

        let data_sql = format!(
            r#"
            SELECT id, employee_code, first_name, last_name, email,
                   department_id, role_id, annual_allowance
            FROM employees
            {}
            ORDER BY id
            "#,
            where_sql
        );

        let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
        if let Some(department_id) = department_id {
            data_q = data_q.bind(department_id);
        }

        let employees = data_q.fetch_all(&self.pool).await?;
        Ok(employees)
    }

    async fn get_department(&self, id: u64) -> Result<Option<Department>, CoreError> {
        let department = sqlx::query_as::<_, Department>(
            r#"SELECT id, name FROM departments WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }
}

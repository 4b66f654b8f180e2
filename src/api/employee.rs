use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{Svc, error_response};
use crate::model::employee::Employee;
use crate::store::Store;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 10)]
    pub department_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    #[schema(example = 1000)]
    pub id: u64,
    #[schema(example = "EMP-1000")]
    pub employee_code: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = 10)]
    pub department_id: u64,
    #[schema(example = "Engineering", nullable = true)]
    pub department_name: Option<String>,
    #[schema(example = 3)]
    pub role_id: u8,
    #[schema(example = 20.0)]
    pub annual_allowance: f64,
    /// Derived: allowance minus accepted leave. May be negative.
    #[schema(example = 18.0)]
    pub vacation_days_remaining: f64,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeResponse>,
    #[schema(example = 1)]
    pub total: i64,
}

async fn to_response(svc: &Svc, employee: Employee) -> EmployeeResponse {
    let remaining = match svc.vacation_days_remaining(employee.id).await {
        Ok(remaining) => remaining,
        Err(e) => {
            tracing::warn!(error = %e, employee_id = employee.id, "Balance derivation failed");
            employee.annual_allowance
        }
    };
    let department_name = match svc.store().get_department(employee.department_id).await {
        Ok(department) => department.map(|d| d.name),
        Err(e) => {
            tracing::warn!(error = %e, department_id = employee.department_id, "Department lookup failed");
            None
        }
    };

    EmployeeResponse {
        id: employee.id,
        employee_code: employee.employee_code,
        first_name: employee.first_name,
        last_name: employee.last_name,
        email: employee.email,
        department_id: employee.department_id,
        department_name,
        role_id: employee.role_id,
        annual_allowance: employee.annual_allowance,
        vacation_days_remaining: remaining,
    }
}

/// Get employee by ID, with the derived vacation balance
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    svc: web::Data<Svc>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = svc.store().get_employee(employee_id).await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(employee) => Ok(HttpResponse::Ok().json(to_response(&svc, employee).await)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        }))),
    }
}

/// List employees, optionally by department
#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employee list", body = EmployeeListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    svc: web::Data<Svc>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let employees = match svc.store().list_employees(query.department_id).await {
        Ok(employees) => employees,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch employees");
            return Ok(error_response(&e));
        }
    };

    let total = employees.len() as i64;
    let mut data = Vec::new();
    for employee in employees {
        data.push(to_response(&svc, employee).await);
    }

    Ok(HttpResponse::Ok().json(EmployeeListResponse { data, total }))
}

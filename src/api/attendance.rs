use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::{Svc, error_response};
use crate::store::Store;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

/// Monthly attendance summary endpoint
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Monthly attendance figures", body = crate::model::attendance::MonthlyAttendance),
        (status = 400, description = "Invalid period", body = Object, example = json!({
            "message": "month 13 out of range"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    svc: web::Data<Svc>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee = svc.store().get_employee(query.employee_id).await.map_err(|e| {
        tracing::error!(error = %e, employee_id = query.employee_id, "Failed to fetch employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if employee.is_none() {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    }

    let result = svc
        .monthly_attendance(query.employee_id, query.year, query.month)
        .await;

    match result {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(e) => {
            tracing::error!(
                error = %e,
                employee_id = query.employee_id,
                "Failed to compute monthly attendance"
            );
            Ok(error_response(&e))
        }
    }
}

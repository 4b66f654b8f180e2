use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{Svc, error_response};
use crate::error::CoreError;
use crate::model::leave_request::{DayOffType, LeaveCategory, LeaveRequest, LeaveStatus};
use crate::service::{Decision, LeaveRequestPatch, NewLeaveRequest};
use crate::store::{RequestFilter, Store};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1000)]
    pub requester_id: u64,
    #[schema(example = 2000)]
    pub supervisor_id: u64,
    #[schema(example = "full_day")]
    pub day_off_type: DayOffType, // enum ensures Swagger dropdown
    #[schema(example = "2026-03-02T00:00:00Z", format = "date-time", value_type = String)]
    pub start_at: DateTime<Utc>,
    #[schema(example = "2026-03-03T23:59:00Z", format = "date-time", value_type = String)]
    pub end_at: DateTime<Utc>,
    #[schema(example = "Trip")]
    pub title: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    pub day_off_type: Option<DayOffType>,
    #[schema(example = "2026-03-02T00:00:00Z", format = "date-time", value_type = String)]
    pub start_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-03-03T23:59:00Z", format = "date-time", value_type = String)]
    pub end_at: Option<DateTime<Utc>>,
    #[schema(example = "Trip")]
    pub title: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveListQuery {
    #[schema(example = 2026)]
    /// Filter on the year of the start instant
    pub year: Option<i32>,
    #[schema(example = 3)]
    /// Filter on the month of the start instant
    pub month: Option<u32>,
    #[schema(example = 10)]
    /// Filter via the requester's department membership
    pub department_id: Option<u64>,
    /// Filter by day-off type
    pub day_off_type: Option<DayOffType>,
    /// Filter by status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

#[derive(Serialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = "7f1f2f3c-9f4e-4a5b-8c6d-0e1f2a3b4c5d")]
    /// leave request id
    pub id: String,
    #[schema(example = 1000)]
    pub requester_id: u64,
    #[schema(example = "John Doe", nullable = true)]
    pub requester_name: Option<String>,
    #[schema(example = 2000)]
    pub supervisor_id: u64,
    #[schema(example = "Jane Roe", nullable = true)]
    pub supervisor_name: Option<String>,
    pub day_off_type: DayOffType,
    #[schema(example = "2026-03-02T00:00:00Z", format = "date-time", value_type = String)]
    pub start_at: DateTime<Utc>,
    #[schema(example = "2026-03-03T23:59:00Z", format = "date-time", value_type = String)]
    pub end_at: DateTime<Utc>,
    #[schema(example = 2.0)]
    pub quantity: f64,
    #[schema(example = "Trip")]
    pub title: String,
    pub category: LeaveCategory,
    pub status: LeaveStatus,
    #[schema(example = "2026-02-20T09:15:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

async fn to_response(svc: &Svc, request: LeaveRequest) -> LeaveResponse {
    let requester_name = svc.resolve_display_name(request.requester_id).await;
    let supervisor_name = svc.resolve_display_name(request.supervisor_id).await;
    LeaveResponse {
        id: request.id,
        requester_id: request.requester_id,
        requester_name,
        supervisor_id: request.supervisor_id,
        supervisor_name,
        day_off_type: request.day_off_type,
        start_at: request.start_at,
        end_at: request.end_at,
        quantity: request.quantity,
        title: request.title,
        category: request.category,
        status: request.status,
        created_at: request.created_at,
    }
}

/* =========================
Submit leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "title must not be empty"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    svc: web::Data<Svc>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    let result = svc
        .submit_leave_request(NewLeaveRequest {
            requester_id: payload.requester_id,
            supervisor_id: payload.supervisor_id,
            day_off_type: payload.day_off_type,
            start_at: payload.start_at,
            end_at: payload.end_at,
            title: payload.title,
        })
        .await;

    match result {
        Ok(request) => Ok(HttpResponse::Ok().json(to_response(&svc, request).await)),
        Err(e) => {
            if let CoreError::Transient(_) = e {
                tracing::error!(error = %e, "Failed to create leave request");
            }
            Ok(error_response(&e))
        }
    }
}

/* =========================
Edit leave request (pre-approval only)
========================= */
/// Swagger doc for update_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to edit")
    ),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveResponse),
        (status = 400, description = "Not pending anymore, or validation failed", body = Object, example = json!({
            "message": "leave request 7f1f… is accepted, not pending"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    svc: web::Data<Svc>,
    path: web::Path<String>,
    payload: web::Json<UpdateLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let payload = payload.into_inner();

    let result = svc
        .edit_leave_request(
            &leave_id,
            LeaveRequestPatch {
                day_off_type: payload.day_off_type,
                start_at: payload.start_at,
                end_at: payload.end_at,
                title: payload.title,
            },
        )
        .await;

    match result {
        Ok(request) => Ok(HttpResponse::Ok().json(to_response(&svc, request).await)),
        Err(e) => {
            if let CoreError::Transient(_) = e {
                tracing::error!(error = %e, leave_id, "Failed to update leave request");
            }
            Ok(error_response(&e))
        }
    }
}

async fn decide(svc: &Svc, leave_id: &str, decision: Decision) -> HttpResponse {
    let message = match decision {
        Decision::Accept => "Leave accepted",
        Decision::Reject => "Leave rejected",
    };

    match svc.decide(leave_id, decision).await {
        Ok(request) => HttpResponse::Ok().json(serde_json::json!({
            "message": message,
            "status": request.status,
        })),
        // The acceptance stood; only the summary write failed. Report
        // success with a warning instead of pretending nothing happened.
        Err(CoreError::PartialSideEffect { id, cause }) => {
            HttpResponse::Ok().json(serde_json::json!({
                "message": "Leave accepted",
                "status": LeaveStatus::Accepted,
                "warning": format!("attendance summary update failed for request {}: {}", id, cause),
            }))
        }
        Err(e) => {
            if let CoreError::Transient(_) = e {
                tracing::error!(error = %e, leave_id, "Decision failed");
            }
            error_response(&e)
        }
    }
}

/* =========================
Accept leave (supervisor)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to accept")
    ),
    responses(
        (status = 200, description = "Leave accepted", body = Object, example = json!({
            "message": "Leave accepted",
            "status": "accepted"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    svc: web::Data<Svc>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    Ok(decide(&svc, &leave_id, Decision::Accept).await)
}

/* =========================
Reject leave (supervisor)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected",
            "status": "rejected"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    svc: web::Data<Svc>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    Ok(decide(&svc, &leave_id, Decision::Reject).await)
}

/// for getting a leave request details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    svc: web::Data<Svc>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = svc.store().get_request(&leave_id).await.map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(request) => Ok(HttpResponse::Ok().json(to_response(&svc, request).await)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave requests endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    svc: web::Data<Svc>,
    query: web::Query<LeaveListQuery>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let filter = RequestFilter {
        year: query.year,
        month: query.month,
        department_id: query.department_id,
        day_off_type: query.day_off_type,
        status: query.status,
    };

    // The core produces a finite snapshot; the page window is cut here.
    let all = svc.list_requests(&filter).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave list");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let total = all.len() as i64;
    let mut data = Vec::new();
    for request in all.into_iter().skip(offset as usize).take(per_page as usize) {
        data.push(to_response(&svc, request).await);
    }

    let response = LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

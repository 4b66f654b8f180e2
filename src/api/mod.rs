use actix_web::HttpResponse;

use crate::error::CoreError;
use crate::service::LeaveService;
use crate::store::mysql::MySqlStore;

pub mod attendance;
pub mod employee;
pub mod leave_request;

/// The service instance the HTTP layer runs against.
pub type Svc = LeaveService<MySqlStore>;

/// Shared error-to-response mapping. `PartialSideEffect` is handled by the
/// decide handlers, which know the acceptance stood; anywhere else it is a
/// server error.
pub(crate) fn error_response(e: &CoreError) -> HttpResponse {
    match e {
        CoreError::Validation(message) => HttpResponse::BadRequest().json(serde_json::json!({
            "message": message
        })),
        CoreError::InvalidState { .. } => HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        })),
        CoreError::Transient(_) | CoreError::PartialSideEffect { .. } => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

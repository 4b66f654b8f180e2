use crate::api::attendance::SummaryQuery;
use crate::api::employee::{EmployeeListResponse, EmployeeQuery, EmployeeResponse};
use crate::api::leave_request::{
    CreateLeave, LeaveListQuery, LeaveListResponse, LeaveResponse, UpdateLeave,
};
use crate::model::attendance::{AttendanceSummary, MonthlyAttendance};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{DayOffType, LeaveCategory, LeaveRequest, LeaveStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Leave & Attendance API",
        version = "1.0.0",
        description = r#"
## Leave & Attendance Accounting Core

This API powers the leave/attendance accounting core of an HR portal.

### 🔹 Key Features
- **Leave Requests**
  - Submit, edit (while pending), list, and view leave requests
- **Approval Workflow**
  - Accept/reject pending requests; both decisions are terminal
- **Vacation Balance**
  - Remaining days derived from the accepted-request set
- **Attendance Reporting**
  - Per-employee monthly working/leave/attendance day figures

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for the leave listing

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::attendance::monthly_summary,

        crate::api::employee::get_employee,
        crate::api::employee::list_employees
    ),
    components(
        schemas(
            CreateLeave,
            UpdateLeave,
            LeaveListQuery,
            LeaveResponse,
            LeaveListResponse,
            LeaveRequest,
            LeaveStatus,
            LeaveCategory,
            DayOffType,
            SummaryQuery,
            AttendanceSummary,
            MonthlyAttendance,
            Employee,
            Department,
            EmployeeQuery,
            EmployeeResponse,
            EmployeeListResponse
        )
    ),
    tags(
        (name = "Leave", description = "Leave request and approval APIs"),
        (name = "Attendance", description = "Monthly attendance reporting APIs"),
        (name = "Employee", description = "Employee directory APIs"),
    )
)]
pub struct ApiDoc;

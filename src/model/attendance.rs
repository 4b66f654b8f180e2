use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-employee, per-month rollup. One logical row per (employee, year,
/// month); acceptance of ordinary leave upserts into it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
    /// Working days minus accepted ordinary leave, clamped at 0.
    #[schema(example = 20.0)]
    pub attendance_days: f64,
    #[schema(example = 2.0)]
    pub leave_days: f64,
    #[schema(example = 0.0)]
    pub ot_hours: f64,
}

/// Monthly attendance figures served to reporting, recomputed on demand
/// from the accepted-request set and the weekday calendar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyAttendance {
    #[schema(example = 22)]
    pub working_days: u32,
    #[schema(example = 2.0)]
    pub leave_days: f64,
    #[schema(example = 20.0)]
    pub attendance_days: f64,
    #[schema(example = 0.0)]
    pub ot_hours: f64,
}

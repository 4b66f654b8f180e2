use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Leave granularity. A half day always counts as 0.5 regardless of the
/// supplied end instant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayOffType {
    FullDay,
    HalfDay,
}

/// Canonical request status. The only legal transitions are
/// pending -> accepted and pending -> rejected; both are terminal.
/// Unrecognized strings are rejected at the persistence boundary,
/// never silently defaulted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Semantic category of a request, derived from its title once at
/// create/edit time and persisted, so that SQL aggregation and the
/// approval flow agree on what counts as ordinary leave.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveCategory {
    Ordinary,
    Overtime,
    FieldWork,
}

impl LeaveCategory {
    /// OT and field-work requests do not consume attendance leave days.
    pub fn from_title(title: &str) -> Self {
        let t = title.trim().to_lowercase();
        if t == "ot" || t.contains("overtime") || t.starts_with("ot ") || t.ends_with(" ot") {
            LeaveCategory::Overtime
        } else if t.contains("field work") || t.contains("fieldwork") {
            LeaveCategory::FieldWork
        } else {
            LeaveCategory::Ordinary
        }
    }
}

/// Number of leave days a (type, start, end) tuple represents.
///
/// Pure: invoked at creation and recomputed for display, so identical
/// inputs must yield identical output. Inverted ranges are not
/// re-validated here; callers validate before calling.
pub fn quantity(day_off_type: DayOffType, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    match day_off_type {
        DayOffType::HalfDay => 0.5,
        DayOffType::FullDay => {
            // Inclusive whole-day count on the date components only.
            ((end.date_naive() - start.date_naive()).num_days() + 1) as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    /// Opaque request id (UUID v4).
    #[schema(example = "7f1f2f3c-9f4e-4a5b-8c6d-0e1f2a3b4c5d")]
    pub id: String,
    #[schema(example = 1000)]
    pub requester_id: u64,
    #[schema(example = 2000)]
    pub supervisor_id: u64,
    pub day_off_type: DayOffType,
    #[schema(example = "2026-03-02T00:00:00Z", format = "date-time", value_type = String)]
    pub start_at: DateTime<Utc>,
    #[schema(example = "2026-03-03T23:59:00Z", format = "date-time", value_type = String)]
    pub end_at: DateTime<Utc>,
    /// Decimal leave days, computed at creation/edit and never recomputed
    /// afterwards except via an explicit edit.
    #[schema(example = 2.0)]
    pub quantity: f64,
    #[schema(example = "Trip")]
    pub title: String,
    pub category: LeaveCategory,
    pub status: LeaveStatus,
    #[schema(example = "2026-02-20T09:15:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn full_day_counts_inclusive_days() {
        let q = quantity(
            DayOffType::FullDay,
            utc(2026, 1, 20, 0, 0),
            utc(2026, 1, 22, 23, 59),
        );
        assert_eq!(q, 3.0);
    }

    #[test]
    fn full_day_ignores_time_of_day() {
        let late_start = quantity(
            DayOffType::FullDay,
            utc(2026, 1, 20, 23, 0),
            utc(2026, 1, 22, 1, 0),
        );
        assert_eq!(late_start, 3.0);

        let single = quantity(
            DayOffType::FullDay,
            utc(2026, 1, 20, 9, 0),
            utc(2026, 1, 20, 18, 0),
        );
        assert_eq!(single, 1.0);
    }

    #[test]
    fn half_day_is_half_regardless_of_end() {
        let q = quantity(
            DayOffType::HalfDay,
            utc(2026, 1, 20, 8, 0),
            utc(2026, 1, 25, 17, 0),
        );
        assert_eq!(q, 0.5);
    }

    #[test]
    fn quantity_is_referentially_transparent() {
        let start = utc(2026, 4, 6, 10, 0);
        let end = utc(2026, 4, 8, 16, 0);
        assert_eq!(
            quantity(DayOffType::FullDay, start, end),
            quantity(DayOffType::FullDay, start, end),
        );
    }

    #[test]
    fn status_round_trips_through_canonical_strings() {
        assert_eq!(LeaveStatus::Pending.to_string(), "pending");
        assert_eq!(LeaveStatus::from_str("accepted").unwrap(), LeaveStatus::Accepted);
        assert!(LeaveStatus::from_str("Accept").is_err());
        assert!(LeaveStatus::from_str("approved").is_err());
    }

    #[test]
    fn category_is_derived_from_title() {
        assert_eq!(LeaveCategory::from_title("Trip"), LeaveCategory::Ordinary);
        assert_eq!(LeaveCategory::from_title("OT"), LeaveCategory::Overtime);
        assert_eq!(
            LeaveCategory::from_title("Weekend overtime"),
            LeaveCategory::Overtime
        );
        assert_eq!(
            LeaveCategory::from_title("Field work at client site"),
            LeaveCategory::FieldWork
        );
    }
}

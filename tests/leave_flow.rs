use chrono::{DateTime, TimeZone, Utc};

use hrm_leave::error::CoreError;
use hrm_leave::model::department::Department;
use hrm_leave::model::employee::Employee;
use hrm_leave::model::leave_request::{DayOffType, LeaveStatus};
use hrm_leave::service::{Decision, LeaveRequestPatch, LeaveService, NewLeaveRequest};
use hrm_leave::store::memory::MemStore;
use hrm_leave::store::{RequestFilter, Store};

const REQUESTER: u64 = 1000;
const SUPERVISOR: u64 = 2000;
const DEPARTMENT: u64 = 10;

fn employee(id: u64, code: &str, first: &str, department_id: u64, allowance: f64) -> Employee {
    Employee {
        id,
        employee_code: code.to_string(),
        first_name: first.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{}@company.com", code.to_lowercase()),
        department_id,
        role_id: 3,
        annual_allowance: allowance,
    }
}

fn seeded_service() -> LeaveService<MemStore> {
    let store = MemStore::new();
    store.insert_department(Department {
        id: DEPARTMENT,
        name: "Engineering".to_string(),
    });
    store.insert_department(Department {
        id: 11,
        name: "Sales".to_string(),
    });
    store.insert_employee(employee(REQUESTER, "EMP-1000", "John", DEPARTMENT, 10.0));
    store.insert_employee(employee(SUPERVISOR, "EMP-2000", "Jane", DEPARTMENT, 20.0));
    store.insert_employee(employee(3000, "EMP-3000", "Sam", 11, 15.0));
    LeaveService::new(store)
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn full_day(start: DateTime<Utc>, end: DateTime<Utc>, title: &str) -> NewLeaveRequest {
    NewLeaveRequest {
        requester_id: REQUESTER,
        supervisor_id: SUPERVISOR,
        day_off_type: DayOffType::FullDay,
        start_at: start,
        end_at: end,
        title: title.to_string(),
    }
}

#[actix_web::test]
async fn submit_computes_quantity_and_starts_pending() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 1, 20, 0, 0),
            utc(2026, 1, 22, 23, 59),
            "Trip",
        ))
        .await
        .unwrap();

    assert_eq!(request.status, LeaveStatus::Pending);
    assert_eq!(request.quantity, 3.0);
    assert!(!request.id.is_empty());
}

#[actix_web::test]
async fn submit_rejects_malformed_input() {
    let svc = seeded_service();

    let empty_title = svc
        .submit_leave_request(full_day(
            utc(2026, 1, 20, 0, 0),
            utc(2026, 1, 20, 23, 0),
            "   ",
        ))
        .await;
    assert!(matches!(empty_title, Err(CoreError::Validation(_))));

    let inverted = svc
        .submit_leave_request(full_day(
            utc(2026, 1, 22, 0, 0),
            utc(2026, 1, 20, 0, 0),
            "Trip",
        ))
        .await;
    assert!(matches!(inverted, Err(CoreError::Validation(_))));

    let multi_day_half = svc
        .submit_leave_request(NewLeaveRequest {
            day_off_type: DayOffType::HalfDay,
            ..full_day(utc(2026, 1, 20, 8, 0), utc(2026, 1, 21, 12, 0), "Errand")
        })
        .await;
    assert!(matches!(multi_day_half, Err(CoreError::Validation(_))));

    let unknown_requester = svc
        .submit_leave_request(NewLeaveRequest {
            requester_id: 99_999,
            ..full_day(utc(2026, 1, 20, 0, 0), utc(2026, 1, 20, 23, 0), "Trip")
        })
        .await;
    assert!(matches!(unknown_requester, Err(CoreError::Validation(_))));

    // Nothing was persisted along the way.
    let all = svc.list_requests(&RequestFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[actix_web::test]
async fn edit_recomputes_quantity_while_pending_only() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 1, 20, 0, 0),
            utc(2026, 1, 22, 23, 0),
            "Trip",
        ))
        .await
        .unwrap();
    assert_eq!(request.quantity, 3.0);

    let edited = svc
        .edit_leave_request(
            &request.id,
            LeaveRequestPatch {
                end_at: Some(utc(2026, 1, 24, 18, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.quantity, 5.0);
    assert_eq!(edited.status, LeaveStatus::Pending);

    svc.decide(&request.id, Decision::Accept).await.unwrap();

    let after_decision = svc
        .edit_leave_request(
            &request.id,
            LeaveRequestPatch {
                title: Some("Changed my mind".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        after_decision,
        Err(CoreError::InvalidState {
            status: LeaveStatus::Accepted,
            ..
        })
    ));
}

#[actix_web::test]
async fn decisions_are_terminal() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 3, 2, 0, 0),
            utc(2026, 3, 3, 23, 0),
            "Trip",
        ))
        .await
        .unwrap();

    let accepted = svc.decide(&request.id, Decision::Accept).await.unwrap();
    assert_eq!(accepted.status, LeaveStatus::Accepted);

    let again = svc.decide(&request.id, Decision::Accept).await;
    assert!(matches!(
        again,
        Err(CoreError::InvalidState {
            status: LeaveStatus::Accepted,
            ..
        })
    ));

    let reversed = svc.decide(&request.id, Decision::Reject).await;
    assert!(matches!(reversed, Err(CoreError::InvalidState { .. })));

    let stored = svc.store().get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Accepted);
}

#[actix_web::test]
async fn racing_decisions_have_exactly_one_winner() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 3, 2, 0, 0),
            utc(2026, 3, 3, 23, 0),
            "Trip",
        ))
        .await
        .unwrap();

    let (a, b) = futures::join!(
        svc.decide(&request.id, Decision::Accept),
        svc.decide(&request.id, Decision::Reject),
    );

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(CoreError::InvalidState { .. })));

    // The stored status matches the winner; nothing was double-applied.
    let stored = svc.store().get_request(&request.id).await.unwrap().unwrap();
    assert_ne!(stored.status, LeaveStatus::Pending);
    let used = svc
        .store()
        .accepted_quantity_total(REQUESTER)
        .await
        .unwrap();
    assert!(used == 0.0 || used == 2.0);
}

#[actix_web::test]
async fn acceptance_posts_leave_days_to_the_month() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 1, 20, 0, 0),
            utc(2026, 1, 22, 23, 59),
            "Trip",
        ))
        .await
        .unwrap();
    svc.decide(&request.id, Decision::Accept).await.unwrap();

    let month = svc.monthly_attendance(REQUESTER, 2026, 1).await.unwrap();
    assert_eq!(month.working_days, 22);
    assert_eq!(month.leave_days, 3.0);
    assert_eq!(month.attendance_days, 19.0);

    // The summary row was upserted, not appended.
    let summary = svc
        .store()
        .get_summary(REQUESTER, 2026, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.leave_days, 3.0);
    assert_eq!(summary.attendance_days, 19.0);
}

#[actix_web::test]
async fn overtime_titles_skip_the_attendance_summary() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 1, 20, 0, 0),
            utc(2026, 1, 20, 23, 0),
            "OT",
        ))
        .await
        .unwrap();
    svc.decide(&request.id, Decision::Accept).await.unwrap();

    // No leave days recorded for the month…
    let month = svc.monthly_attendance(REQUESTER, 2026, 1).await.unwrap();
    assert_eq!(month.leave_days, 0.0);
    assert_eq!(month.attendance_days, 22.0);
    assert!(svc.store().get_summary(REQUESTER, 2026, 1).await.unwrap().is_none());

    // …but the vacation balance still reflects the accepted quantity.
    let remaining = svc.vacation_days_remaining(REQUESTER).await.unwrap();
    assert_eq!(remaining, 9.0);
}

#[actix_web::test]
async fn rejection_has_no_side_effects() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 3, 2, 0, 0),
            utc(2026, 3, 3, 23, 0),
            "Trip",
        ))
        .await
        .unwrap();
    svc.decide(&request.id, Decision::Reject).await.unwrap();

    assert_eq!(svc.vacation_days_remaining(REQUESTER).await.unwrap(), 10.0);
    let month = svc.monthly_attendance(REQUESTER, 2026, 3).await.unwrap();
    assert_eq!(month.leave_days, 0.0);
    assert!(svc.store().get_summary(REQUESTER, 2026, 3).await.unwrap().is_none());
}

#[actix_web::test]
async fn half_day_acceptance_counts_half() {
    let svc = seeded_service();

    let request = svc
        .submit_leave_request(NewLeaveRequest {
            day_off_type: DayOffType::HalfDay,
            ..full_day(utc(2026, 1, 20, 8, 0), utc(2026, 1, 20, 12, 0), "Dentist")
        })
        .await
        .unwrap();
    assert_eq!(request.quantity, 0.5);

    svc.decide(&request.id, Decision::Accept).await.unwrap();

    let month = svc.monthly_attendance(REQUESTER, 2026, 1).await.unwrap();
    assert_eq!(month.leave_days, 0.5);
    assert_eq!(month.attendance_days, 21.5);
    assert_eq!(svc.vacation_days_remaining(REQUESTER).await.unwrap(), 9.5);
}

#[actix_web::test]
async fn end_to_end_balance_scenario() {
    let svc = seeded_service();

    // Employee with 10 remaining days takes a 2-day trip in March 2026.
    assert_eq!(svc.vacation_days_remaining(REQUESTER).await.unwrap(), 10.0);

    let request = svc
        .submit_leave_request(full_day(
            utc(2026, 3, 2, 0, 0),
            utc(2026, 3, 3, 23, 59),
            "Trip",
        ))
        .await
        .unwrap();
    assert_eq!(request.quantity, 2.0);

    svc.decide(&request.id, Decision::Accept).await.unwrap();

    assert_eq!(svc.vacation_days_remaining(REQUESTER).await.unwrap(), 8.0);
    let month = svc.monthly_attendance(REQUESTER, 2026, 3).await.unwrap();
    assert!(month.leave_days >= 2.0);
    assert_eq!(month.attendance_days, month.working_days as f64 - month.leave_days);
}

#[actix_web::test]
async fn list_filters_are_and_combined() {
    let svc = seeded_service();

    let trip = svc
        .submit_leave_request(full_day(
            utc(2026, 3, 2, 0, 0),
            utc(2026, 3, 3, 23, 0),
            "Trip",
        ))
        .await
        .unwrap();
    svc.submit_leave_request(full_day(
        utc(2026, 4, 6, 0, 0),
        utc(2026, 4, 7, 23, 0),
        "Another trip",
    ))
    .await
    .unwrap();
    svc.submit_leave_request(NewLeaveRequest {
        requester_id: 3000,
        supervisor_id: SUPERVISOR,
        day_off_type: DayOffType::HalfDay,
        start_at: utc(2026, 3, 9, 8, 0),
        end_at: utc(2026, 3, 9, 12, 0),
        title: "Errand".to_string(),
    })
    .await
    .unwrap();

    svc.decide(&trip.id, Decision::Accept).await.unwrap();

    let march = svc
        .list_requests(&RequestFilter {
            year: Some(2026),
            month: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(march.len(), 2);

    let march_engineering_accepted = svc
        .list_requests(&RequestFilter {
            year: Some(2026),
            month: Some(3),
            department_id: Some(DEPARTMENT),
            status: Some(LeaveStatus::Accepted),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(march_engineering_accepted.len(), 1);
    assert_eq!(march_engineering_accepted[0].id, trip.id);

    let half_days = svc
        .list_requests(&RequestFilter {
            day_off_type: Some(DayOffType::HalfDay),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(half_days.len(), 1);
    assert_eq!(half_days[0].requester_id, 3000);

    let unfiltered = svc.list_requests(&RequestFilter::default()).await.unwrap();
    assert_eq!(unfiltered.len(), 3);
}

use chrono::{Datelike, NaiveDate, Weekday};

/// Returns true for Monday–Friday, false for Saturday/Sunday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of Monday–Friday days in the given month. No holiday calendar.
pub fn working_days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("year/month pairs are produced internally");

    let mut count = 0;
    let mut current = first;
    while current.month() == month {
        if is_working_day(current) {
            count += 1;
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    count
}

//! NYSE holiday and early-close rules.
//!
//! Fixed-date holidays falling on a Saturday are observed the Friday before
//! and on a Sunday the Monday after, except New Year's Day which is not
//! observed when it falls on a Saturday.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = first_of_next.pred_opt()?;
    let back = (last.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
    last.checked_sub_days(Days::new(u64::from(back)))
}

/// Shift a weekend date to its weekday observance.
fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.pred_opt(),
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

fn new_years_day(year: i32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    match date.weekday() {
        // Would land on Dec 31 of the prior year; NYSE does not observe it.
        Weekday::Sat => None,
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

/// Full-day NYSE closures for a calendar year.
pub fn nyse_holidays(year: i32) -> Vec<NaiveDate> {
    let juneteenth = if year >= 2022 {
        NaiveDate::from_ymd_opt(year, 6, 19).and_then(observed)
    } else {
        None
    };

    [
        new_years_day(year),
        nth_weekday(year, 1, Weekday::Mon, 3),
        nth_weekday(year, 2, Weekday::Mon, 3),
        easter_sunday(year).and_then(|easter| easter.checked_sub_days(Days::new(2))),
        last_weekday(year, 5, Weekday::Mon),
        juneteenth,
        NaiveDate::from_ymd_opt(year, 7, 4).and_then(observed),
        nth_weekday(year, 9, Weekday::Mon, 1),
        nth_weekday(year, 11, Weekday::Thu, 4),
        NaiveDate::from_ymd_opt(year, 12, 25).and_then(observed),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn is_holiday(date: NaiveDate) -> bool {
    nyse_holidays(date.year()).contains(&date)
}

/// Whether the session on `date` closes at 13:00 instead of 16:00.
pub fn is_early_close(date: NaiveDate) -> bool {
    let mon_to_thu = matches!(
        date.weekday(),
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu
    );

    match (date.month(), date.day()) {
        (7, 3) | (12, 24) => mon_to_thu,
        (11, _) => nth_weekday(date.year(), 11, Weekday::Thu, 4)
            .and_then(|thanksgiving| thanksgiving.succ_opt())
            .is_some_and(|friday| friday == date),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_easter() {
        assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(d(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(d(2026, 4, 5)));
    }

    #[test]
    fn test_2024_holidays() {
        let holidays = nyse_holidays(2024);
        assert_eq!(
            holidays,
            vec![
                d(2024, 1, 1),
                d(2024, 1, 15),
                d(2024, 2, 19),
                d(2024, 3, 29),
                d(2024, 5, 27),
                d(2024, 6, 19),
                d(2024, 7, 4),
                d(2024, 9, 2),
                d(2024, 11, 28),
                d(2024, 12, 25),
            ]
        );
    }

    #[test]
    fn test_weekend_observance() {
        // Saturday New Year is not observed
        assert!(!is_holiday(d(2021, 12, 31)));
        assert!(!nyse_holidays(2022).contains(&d(2022, 1, 1)));
        // Sunday New Year moves to Monday
        assert!(is_holiday(d(2023, 1, 2)));
        // Sunday Juneteenth and Christmas move to Monday
        assert!(is_holiday(d(2022, 6, 20)));
        assert!(is_holiday(d(2022, 12, 26)));
        // Saturday Independence Day moves to Friday
        assert!(is_holiday(d(2026, 7, 3)));
    }

    #[test]
    fn test_juneteenth_starts_2022() {
        assert!(!is_holiday(d(2021, 6, 18)));
        assert!(!is_holiday(d(2021, 6, 19)));
        assert!(is_holiday(d(2023, 6, 19)));
    }

    #[test]
    fn test_early_closes() {
        assert!(is_early_close(d(2024, 7, 3)));
        assert!(is_early_close(d(2024, 11, 29)));
        assert!(is_early_close(d(2024, 12, 24)));
        // July 3 on a Friday is a holiday, not an early close
        assert!(!is_early_close(d(2026, 7, 3)));
        assert!(!is_early_close(d(2024, 11, 28)));
        assert!(!is_early_close(d(2024, 3, 15)));
    }
}

//! Completed-birthday age and date parsing shared by every rule set

use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::{IllustrationError, Result};

/// Age in completed years on `today`.
///
/// Birth year is subtracted from the current year, less one if this year's
/// birthday has not yet been reached. A 29 February birthday is reached on
/// 1 March in non-leap years.
pub fn completed_age(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.date_naive())
        .map_err(|_| IllustrationError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birthday_today_counts() {
        assert_eq!(completed_age(date(1990, 6, 15), date(2024, 6, 15)), 34);
    }

    #[test]
    fn test_birthday_tomorrow_does_not() {
        assert_eq!(completed_age(date(1990, 6, 16), date(2024, 6, 15)), 33);
    }

    #[test]
    fn test_later_month_does_not() {
        assert_eq!(completed_age(date(1990, 7, 1), date(2024, 6, 30)), 33);
        assert_eq!(completed_age(date(1990, 5, 31), date(2024, 6, 1)), 34);
    }

    #[test]
    fn test_leap_day_birthday() {
        assert_eq!(completed_age(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(completed_age(date(2000, 2, 29), date(2023, 3, 1)), 23);
        assert_eq!(completed_age(date(2000, 2, 29), date(2024, 2, 29)), 24);
    }

    #[test]
    fn test_recomputation_is_stable() {
        let dob = date(1985, 12, 31);
        let today = date(2024, 12, 30);
        assert_eq!(completed_age(dob, today), completed_age(dob, today));
        assert_eq!(completed_age(dob, today), 38);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("1990-01-01").unwrap(), date(1990, 1, 1));
        assert_eq!(parse_date(" 1990-01-01 ").unwrap(), date(1990, 1, 1));
        assert_eq!(parse_date("1990-01-01T00:00:00Z").unwrap(), date(1990, 1, 1));
        assert_eq!(parse_date("1990-01-01T10:30:00+05:30").unwrap(), date(1990, 1, 1));
        assert!(parse_date("1990-13-01").is_err());
        assert!(parse_date("not a date").is_err());
    }
}

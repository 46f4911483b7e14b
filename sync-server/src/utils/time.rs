//! Time helpers — business timezone conversion
//!
//! All date-to-timestamp conversion happens at the API handler layer;
//! repositories only ever see `i64` Unix millis or `yyyy-MM-dd` keys.

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a wall-clock time string (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// Date + time of day -> Unix millis (business timezone)
///
/// DST gap fallback: if the local time does not exist, fall back to UTC.
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00:00) -> Unix millis (business timezone)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// End of day -> next day's 00:00:00 Unix millis (business timezone)
///
/// Callers use exclusive `< end` semantics.
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_time_to_millis(next_day, NaiveTime::MIN, tz)
}

/// Today's calendar date in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// First calendar day of the given date's month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month following the given date's month
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-03-01").is_ok());
        assert!(parse_date("03/01/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_time("9:30pm").is_err());
    }

    #[test]
    fn test_day_bounds_are_exclusive() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let start = day_start_millis(date, UTC);
        let end = day_end_millis(date, UTC);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
    }

    #[test]
    fn test_first_of_month_rollover() {
        let dec = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        assert_eq!(
            first_of_next_month(dec),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(
            first_of_month(dec),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }
}

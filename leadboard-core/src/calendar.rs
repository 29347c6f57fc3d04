//! Local calendar helpers.
//!
//! Leads are stored with UTC timestamps but grouped and filtered by the
//! local calendar day.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// Local calendar date of a timestamp.
pub fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Today's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// First instant of a local day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN)
}

/// Last millisecond of a local day.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next) - Duration::milliseconds(1),
        None => local_instant(date, NaiveTime::MIN) + Duration::hours(24),
    }
}

fn local_instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump: the day starts one hour later
        None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|l| l.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

/// Parse a date typed by the user.
///
/// Accepts `dd/mm/yyyy` and ISO `yyyy-mm-dd`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(parse_date("03/11/2025").unwrap(), expected);
        assert_eq!(parse_date(" 2025-11-03 ").unwrap(), expected);
        assert!(matches!(parse_date("31/02/2025"), Err(Error::InvalidDate(_))));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_day_bounds_round_trip_to_same_local_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        assert_eq!(local_date(start_of_day(date)), date);
        assert_eq!(local_date(end_of_day(date)), date);
        assert!(start_of_day(date) < end_of_day(date));
    }
}

//! Age arithmetic anchored to the event date.
//!
//! Two methods exist and are intentionally kept distinct: eligibility bands
//! use the calendar-aware [`age_on`], the consent check uses the coarser
//! [`approximate_age_on`]. Near a birthday they can disagree by one year.

use chrono::{Datelike, NaiveDate};

/// Default event date when neither configuration nor rules provide one.
pub const DEFAULT_EVENT_DATE: (i32, u32, u32) = (2025, 7, 19);

/// Birthdates are stored as `YYYY-MM-DD`.
pub const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

/// Age at which consent stops being enforced as blocking.
pub const ADULT_AGE: i64 = 18;

pub fn default_event_date() -> NaiveDate {
    let (y, m, d) = DEFAULT_EVENT_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), BIRTHDATE_FORMAT).ok()
}

/// Completed years on `event`: year difference, minus one if the birthday
/// has not yet been reached in the event year.
pub fn age_on(birth: NaiveDate, event: NaiveDate) -> i64 {
    let mut age = i64::from(event.year() - birth.year());
    if (event.month(), event.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Whole days since birth divided by 365, floored.
pub fn approximate_age_on(birth: NaiveDate, event: NaiveDate) -> i64 {
    (event - birth).num_days().div_euclid(365)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn birthday_already_passed() {
        assert_eq!(age_on(date(2000, 1, 1), date(2025, 7, 19)), 25);
    }

    #[test]
    fn birthday_on_event_day_counts() {
        assert_eq!(age_on(date(1990, 7, 19), date(2025, 7, 19)), 35);
    }

    #[test]
    fn birthday_day_after_event() {
        assert_eq!(age_on(date(1990, 7, 20), date(2025, 7, 19)), 34);
    }

    #[test]
    fn leap_day_birthday() {
        assert_eq!(age_on(date(2008, 2, 29), date(2025, 7, 19)), 17);
        assert_eq!(age_on(date(2008, 2, 29), date(2026, 2, 28)), 17);
    }

    #[test]
    fn approximate_age_runs_ahead_just_before_birthday() {
        let event = date(2025, 7, 19);
        assert_eq!(age_on(date(2007, 7, 19), event), 18);
        assert_eq!(approximate_age_on(date(2007, 7, 19), event), 18);

        // Leap days push the day count past 18 * 365 before the 18th birthday.
        let birth = date(2007, 7, 23);
        assert_eq!(age_on(birth, event), 17);
        assert_eq!(approximate_age_on(birth, event), 18);
    }

    #[test]
    fn approximate_age_floors_negative_spans() {
        assert_eq!(approximate_age_on(date(2025, 7, 20), date(2025, 7, 19)), -1);
    }

    #[test]
    fn parses_iso_birthdates_only() {
        assert_eq!(parse_birthdate("2000-01-01"), Some(date(2000, 1, 1)));
        assert_eq!(parse_birthdate("01/01/2000"), None);
        assert_eq!(parse_birthdate("2000-02-30"), None);
    }
}

//! Solar Hijri (Jalali) calendar dates.
//!
//! Conversion is the arithmetic day-count algorithm; it is exact for every
//! Gregorian date from 1900 through 2200.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Cumulative day counts before each Gregorian month (non-leap year).
const GREGORIAN_DAYS_BEFORE_MONTH: [i32; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Years accepted by [`JalaliDate::new`]. The day-count arithmetic stays
/// inside `i32` well beyond this range.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 3000;

/// Jalali date parse/validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum JalaliError {
    #[error("Malformed Jalali date: {0}")]
    Malformed(String),

    #[error("Jalali date out of range: {year}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

/// A calendar date in the Solar Hijri calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    year: i32,
    month: u32,
    day: u32,
}

impl JalaliDate {
    /// Build a validated Jalali date.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, JalaliError> {
        let out_of_range = JalaliError::OutOfRange { year, month, day };
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) || day == 0 {
            return Err(out_of_range);
        }
        let max_day = match month {
            1..=6 => 31,
            7..=11 => 30,
            _ if is_leap_year(year) => 30,
            _ => 29,
        };
        if day > max_day {
            return Err(out_of_range);
        }
        Ok(Self { year, month, day })
    }

    /// Convert a Gregorian date.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let (year, month, day) = gregorian_to_jalali(date.year(), date.month(), date.day());
        Self { year, month, day }
    }

    /// Convert back to a Gregorian date.
    pub fn to_gregorian(&self) -> Option<NaiveDate> {
        let (year, month, day) = jalali_to_gregorian(self.year, self.month, self.day);
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for JalaliDate {
    type Err = JalaliError;

    /// Parse `YYYY-MM-DD` or `YYYY/MM/DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || JalaliError::Malformed(s.to_string());
        let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
        if parts.len() != 3 {
            return Err(malformed());
        }
        let year = parts[0].parse::<i32>().map_err(|_| malformed())?;
        let month = parts[1].parse::<u32>().map_err(|_| malformed())?;
        let day = parts[2].parse::<u32>().map_err(|_| malformed())?;
        JalaliDate::new(year, month, day)
    }
}

/// True when Esfand of `year` has 30 days.
pub fn is_leap_year(year: i32) -> bool {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return false;
    }
    let (gy, gm, gd) = jalali_to_gregorian(year, 12, 30);
    gregorian_to_jalali(gy, gm, gd) == (year, 12, 30)
}

fn is_gregorian_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> (i32, u32, u32) {
    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd as i32
        + GREGORIAN_DAYS_BEFORE_MONTH[(gm - 1) as usize];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    if days < 186 {
        (jy, (1 + days / 31) as u32, (1 + days % 31) as u32)
    } else {
        (jy, (7 + (days - 186) / 30) as u32, (1 + (days - 186) % 30) as u32)
    }
}

fn jalali_to_gregorian(jy: i32, jm: u32, jd: u32) -> (i32, u32, u32) {
    let jy = jy + 1595;
    let jm = jm as i32;
    let month_offset = if jm < 7 {
        (jm - 1) * 31
    } else {
        (jm - 7) * 30 + 186
    };
    let mut days =
        -355_668 + 365 * jy + (jy / 33) * 8 + ((jy % 33) + 3) / 4 + jd as i32 + month_offset;

    let mut gy = 400 * (days / 146_097);
    days %= 146_097;
    if days > 36_524 {
        days -= 1;
        gy += 100 * (days / 36_524);
        days %= 36_524;
        if days >= 365 {
            days += 1;
        }
    }
    gy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        gy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let month_lengths = [
        31,
        if is_gregorian_leap(gy) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut gd = days + 1;
    let mut gm = 1;
    for length in month_lengths {
        if gd <= length {
            break;
        }
        gd -= length;
        gm += 1;
    }
    (gy, gm, gd as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nowruz_dates() {
        assert_eq!(JalaliDate::from_gregorian(ymd(2024, 3, 20)).to_string(), "1403-01-01");
        assert_eq!(JalaliDate::from_gregorian(ymd(2023, 3, 21)).to_string(), "1402-01-01");
        assert_eq!(JalaliDate::from_gregorian(ymd(2025, 3, 21)).to_string(), "1404-01-01");
    }

    #[test]
    fn test_known_conversions() {
        assert_eq!(JalaliDate::from_gregorian(ymd(2026, 10, 18)).to_string(), "1405-07-26");
        assert_eq!(JalaliDate::from_gregorian(ymd(2000, 1, 1)).to_string(), "1378-10-11");
        assert_eq!(JalaliDate::from_gregorian(ymd(2024, 3, 19)).to_string(), "1402-12-29");
        assert_eq!(JalaliDate::from_gregorian(ymd(2025, 3, 20)).to_string(), "1403-12-30");
    }

    #[test]
    fn test_round_trip_across_range() {
        let mut date = ymd(1950, 1, 1);
        let end = ymd(2100, 1, 1);
        while date < end {
            let jalali = JalaliDate::from_gregorian(date);
            assert_eq!(jalali.to_gregorian(), Some(date), "round trip failed for {}", date);
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(1403));
        assert!(!is_leap_year(1402));
        assert!(JalaliDate::new(1403, 12, 30).is_ok());
        assert!(JalaliDate::new(1402, 12, 30).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(JalaliDate::new(1405, 0, 1).is_err());
        assert!(JalaliDate::new(1405, 13, 1).is_err());
        assert!(JalaliDate::new(1405, 7, 31).is_err());
        assert!(JalaliDate::new(1405, 6, 31).is_ok());
    }

    #[test]
    fn test_year_bounds() {
        assert!(JalaliDate::new(MIN_YEAR, 1, 1).is_ok());
        assert!(JalaliDate::new(MAX_YEAR, 12, 29).unwrap().to_gregorian().is_some());
        assert!(JalaliDate::new(0, 1, 1).is_err());
        assert!(JalaliDate::new(MAX_YEAR + 1, 1, 1).is_err());
        assert!(JalaliDate::new(i32::MAX, 12, 30).is_err());
        assert!(!is_leap_year(i32::MIN));
        assert!(matches!(
            "9999999-12-01".parse::<JalaliDate>(),
            Err(JalaliError::OutOfRange { year: 9_999_999, .. })
        ));
    }

    #[test]
    fn test_parse() {
        let date: JalaliDate = "1405/07/26".parse().unwrap();
        assert_eq!(date, JalaliDate::new(1405, 7, 26).unwrap());
        assert_eq!(date.to_gregorian(), Some(ymd(2026, 10, 18)));
        assert!(matches!("1405-07".parse::<JalaliDate>(), Err(JalaliError::Malformed(_))));
        assert!(matches!(
            "1405-02-40".parse::<JalaliDate>(),
            Err(JalaliError::OutOfRange { .. })
        ));
    }
}

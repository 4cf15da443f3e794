//! Clinic-local time and Jalali date formatting.

mod jalali;

pub use jalali::*;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Tehran standard time, UTC+03:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 210;

/// Naive ISO layout used for newly written rows.
const STORE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layouts accepted for naive stored timestamps, most common first.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
];

/// The clinic's wall clock.
#[derive(Debug, Clone, Copy)]
pub struct ClinicClock {
    offset: FixedOffset,
}

impl Default for ClinicClock {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES).unwrap_or(Self { offset: Utc.fix() })
    }
}

impl ClinicClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock at a UTC offset given in minutes; `None` if out of range.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current clinic-local time.
    pub fn now(&self) -> NaiveDateTime {
        self.local(Utc::now())
    }

    /// Clinic-local time of an instant.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    /// Timestamp text written into new rows.
    pub fn stamp(&self, local: NaiveDateTime) -> String {
        local.format(STORE_FORMAT).to_string()
    }

    /// Interpret a stored timestamp as clinic-local time.
    ///
    /// Offset-carrying values are converted; naive values are taken as
    /// already local. Returns `None` for anything unrecognised.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let cleaned = raw.trim().replace(['\u{202f}', '\u{a0}'], " ");
        if cleaned.is_empty() {
            return None;
        }

        if let Ok(with_offset) = DateTime::parse_from_rfc3339(&cleaned) {
            return Some(with_offset.with_timezone(&self.offset).naive_local());
        }
        if let Ok(with_offset) = DateTime::parse_from_str(&cleaned, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Some(with_offset.with_timezone(&self.offset).naive_local());
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&cleaned, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    /// Clinic-local calendar day of a stored timestamp.
    pub fn day_of(&self, raw: &str) -> Option<NaiveDate> {
        self.parse(raw).map(|local| local.date())
    }

    /// `jYYYY-jMM-jDD`, or empty when the timestamp is unreadable.
    pub fn jalali_date(&self, raw: &str) -> String {
        self.parse(raw)
            .map(|local| JalaliDate::from_gregorian(local.date()).to_string())
            .unwrap_or_default()
    }

    /// `jYYYY-jMM-jDD HH:mm:ss`, or empty when the timestamp is unreadable.
    pub fn jalali_datetime(&self, raw: &str) -> String {
        self.parse(raw)
            .map(|local| {
                format!(
                    "{} {}",
                    JalaliDate::from_gregorian(local.date()),
                    local.format("%H:%M:%S")
                )
            })
            .unwrap_or_default()
    }
}

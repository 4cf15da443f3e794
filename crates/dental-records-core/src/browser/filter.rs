//! Free-text and date filtering of visit records.

use chrono::NaiveDate;

use crate::calendar::{ClinicClock, JalaliDate};
use crate::models::{VisitField, VisitRecord};

/// The browser's filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Substring searched in every searchable field and the Jalali date.
    pub search: String,
    /// Clinic-local calendar day the record must fall on.
    pub date: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn new(search: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            search: search.into(),
            date,
        }
    }

    /// Select the day by its Jalali date.
    pub fn with_jalali_date(mut self, date: JalaliDate) -> Self {
        self.date = date.to_gregorian();
        self
    }

    pub fn matches(&self, record: &VisitRecord, clock: &ClinicClock) -> bool {
        matches_term(record, &self.search, clock) && self.matches_date(record, clock)
    }

    /// True when no day is selected or the record falls on it.
    pub fn matches_date(&self, record: &VisitRecord, clock: &ClinicClock) -> bool {
        match self.date {
            None => true,
            Some(day) => clock.day_of(&record.created_at) == Some(day),
        }
    }
}

/// Case-sensitive substring match across the searchable fields and the
/// `jYYYY-jMM-jDD` rendering of the creation time.
pub fn matches_term(record: &VisitRecord, term: &str, clock: &ClinicClock) -> bool {
    if term.is_empty() {
        return true;
    }
    VisitField::SEARCHABLE
        .iter()
        .any(|field| record.fields.get(*field).contains(term))
        || clock.jalali_date(&record.created_at).contains(term)
}

//! Intake form for new visit records.

mod suggestions;

pub use suggestions::*;

use chrono::NaiveDateTime;

use crate::calendar::ClinicClock;
use crate::labels;
use crate::models::{NewVisit, VisitField, VisitFields, VisitRecord};
use crate::store::{RecordStore, StoreResult};

/// Transient notification shown after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

/// Uncommitted field values for one new visit.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    fields: VisitFields,
    notice: Option<Notice>,
    clock: ClinicClock,
}

impl IntakeForm {
    pub fn new(clock: ClinicClock) -> Self {
        Self {
            fields: VisitFields::default(),
            notice: None,
            clock,
        }
    }

    pub fn fields(&self) -> &VisitFields {
        &self.fields
    }

    pub fn get(&self, field: VisitField) -> &str {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: VisitField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        self.fields = VisitFields::default();
    }

    /// Save the form as a new row stamped with the current clinic time.
    pub fn submit(&mut self, store: &dyn RecordStore) -> StoreResult<VisitRecord> {
        let now = self.clock.now();
        self.submit_at(store, now)
    }

    /// Save the form as a new row stamped with `local`.
    ///
    /// On success the form is cleared and a notice raised; on failure
    /// nothing changes.
    pub fn submit_at(
        &mut self,
        store: &dyn RecordStore,
        local: NaiveDateTime,
    ) -> StoreResult<VisitRecord> {
        let visit = NewVisit {
            fields: self.fields.clone(),
            created_at: self.clock.stamp(local),
        };

        match store.insert(&visit) {
            Ok(record) => {
                tracing::info!(
                    id = %record.id,
                    file_number = %record.fields.file_number,
                    "Visit saved"
                );
                self.reset();
                self.notice = Some(Notice {
                    message: labels::SAVED_NOTICE.to_string(),
                });
                Ok(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save visit");
                Err(e)
            }
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Close the notification.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

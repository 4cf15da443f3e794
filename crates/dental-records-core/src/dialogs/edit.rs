use crate::models::{RecordId, VisitField, VisitFields, VisitRecord};

/// An edit in progress: the record as fetched plus a separate draft.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog {
    original: VisitRecord,
    draft: VisitFields,
}

impl EditDialog {
    /// Open with the draft pre-filled from `record`.
    pub fn new(record: VisitRecord) -> Self {
        let draft = record.fields.clone();
        Self {
            original: record,
            draft,
        }
    }

    pub fn id(&self) -> RecordId {
        self.original.id
    }

    pub fn original(&self) -> &VisitRecord {
        &self.original
    }

    pub fn draft(&self) -> &VisitFields {
        &self.draft
    }

    pub fn set(&mut self, field: VisitField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Fields the draft has changed.
    pub fn changed_fields(&self) -> Vec<VisitField> {
        self.draft.diff(&self.original.fields)
    }

    /// The record as it will look once saved.
    pub fn merged(&self) -> VisitRecord {
        self.original.merged(&self.draft)
    }
}

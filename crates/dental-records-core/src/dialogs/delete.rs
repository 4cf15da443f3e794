use crate::models::{RecordId, VisitRecord};

/// A record selected for deletion, awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    record: VisitRecord,
}

impl DeleteConfirmation {
    pub fn new(record: VisitRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &VisitRecord {
        &self.record
    }

    pub fn id(&self) -> RecordId {
        self.record.id
    }
}

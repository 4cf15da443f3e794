//! Record browser: the loaded table, its filters, and the dialog flows.
//!
//! The browser keeps a local copy of every record. The copy changes only
//! after the store has accepted a write:
//!
//! ```text
//! load ──► records ──► filter(search, date) ──► group by file number ──► rows
//!                                                      │
//!                                               open_history(file)
//!                                                      │
//!                          ┌───────────────────────────┼──────────────────┐
//!                          ▼                           ▼                  ▼
//!                   request_delete(id)           begin_edit(id)       print_view
//!                          │                           │
//!                 confirm ─┴─ cancel          save ────┴──── cancel
//! ```

mod filter;
mod group;

pub use filter::*;
pub use group::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::{ClinicClock, JalaliDate};
use crate::dialogs::{DeleteConfirmation, EditDialog, HistoryDialog, PendingAction};
use crate::models::{RecordId, VisitRecord};
use crate::print::{PrintHeader, PrintView};
use crate::store::{RecordStore, StoreError};

/// Browser errors.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("A {0} dialog is already open")]
    DialogBusy(&'static str),

    #[error("No {0} dialog is open")]
    NoPendingAction(&'static str),

    #[error("No record with id {0} in the loaded set")]
    UnknownRecord(RecordId),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// The searchable, grouped table of visit records.
#[derive(Debug, Clone, Default)]
pub struct RecordBrowser {
    records: Vec<VisitRecord>,
    filter: RecordFilter,
    clock: ClinicClock,
    history: Option<HistoryDialog>,
    pending: Option<PendingAction>,
}

impl RecordBrowser {
    pub fn new(clock: ClinicClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    /// Browser over an already-fetched record set.
    pub fn with_records(records: Vec<VisitRecord>, clock: ClinicClock) -> Self {
        Self {
            records,
            clock,
            ..Self::default()
        }
    }

    /// Replace the local copy with the store's full record set.
    ///
    /// On failure the previous copy is kept.
    pub fn load(&mut self, store: &dyn RecordStore) -> BrowserResult<usize> {
        match store.select_all() {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Loaded visit records");
                self.records = records;
                Ok(self.records.len())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load visit records");
                Err(e.into())
            }
        }
    }

    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    pub fn clock(&self) -> &ClinicClock {
        &self.clock
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search = term.into();
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.filter.date = date;
    }

    pub fn set_jalali_date(&mut self, date: Option<JalaliDate>) {
        self.filter.date = date.and_then(|d| d.to_gregorian());
    }

    /// Records passing the search term and the selected day.
    pub fn filtered(&self) -> Vec<&VisitRecord> {
        self.records
            .iter()
            .filter(|record| self.filter.matches(record, &self.clock))
            .collect()
    }

    /// Filtered records grouped by file number.
    pub fn groups(&self) -> Vec<RecordGroup<'_>> {
        group_by_file_number(self.filtered())
    }

    /// One displayed row per group: its first record. Groups without a
    /// file number are not displayed.
    pub fn rows(&self) -> Vec<&VisitRecord> {
        self.groups()
            .into_iter()
            .filter(|group| !group.file_number.is_empty())
            .map(|group| group.first())
            .collect()
    }

    // =========================================================================
    // History Dialog
    // =========================================================================

    pub fn open_history(&mut self, file_number: impl Into<String>) -> &HistoryDialog {
        self.history.insert(HistoryDialog::new(file_number))
    }

    pub fn history(&self) -> Option<&HistoryDialog> {
        self.history.as_ref()
    }

    /// Entries of the open history dialog, empty when none is open.
    pub fn history_entries(&self) -> Vec<&VisitRecord> {
        match &self.history {
            Some(dialog) => self.group_entries(dialog.file_number()),
            None => Vec::new(),
        }
    }

    /// Filtered records sharing `file_number`.
    pub fn group_entries(&self, file_number: &str) -> Vec<&VisitRecord> {
        self.filtered()
            .into_iter()
            .filter(|record| record.file_number() == file_number)
            .collect()
    }

    pub fn close_history(&mut self) {
        self.history = None;
    }

    /// Print projection of the open history dialog.
    pub fn print_view(&self, header: PrintHeader) -> Option<PrintView> {
        let dialog = self.history.as_ref()?;
        let entries = self.history_entries().into_iter().cloned().collect();
        Some(PrintView::new(dialog.file_number(), entries, header, self.clock))
    }

    // =========================================================================
    // Pending Actions
    // =========================================================================

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    fn ensure_idle(&self) -> BrowserResult<()> {
        match &self.pending {
            Some(action) => Err(BrowserError::DialogBusy(action.kind())),
            None => Ok(()),
        }
    }

    fn find(&self, id: RecordId) -> BrowserResult<&VisitRecord> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .ok_or(BrowserError::UnknownRecord(id))
    }

    // =========================================================================
    // Delete Flow
    // =========================================================================

    /// Select a record for deletion; nothing is sent yet.
    pub fn request_delete(&mut self, id: RecordId) -> BrowserResult<&DeleteConfirmation> {
        self.ensure_idle()?;
        let record = self.find(id)?.clone();
        let PendingAction::Delete(confirmation) = self
            .pending
            .insert(PendingAction::Delete(DeleteConfirmation::new(record)))
        else {
            unreachable!("pending action was just set to a deletion")
        };
        Ok(confirmation)
    }

    /// Drop the pending deletion without contacting the store.
    pub fn cancel_delete(&mut self) {
        if matches!(self.pending, Some(PendingAction::Delete(_))) {
            self.pending = None;
        }
    }

    /// Delete the selected record from the store, then from the local copy.
    pub fn confirm_delete(&mut self, store: &dyn RecordStore) -> BrowserResult<VisitRecord> {
        let id = match &self.pending {
            Some(PendingAction::Delete(confirmation)) => confirmation.id(),
            _ => return Err(BrowserError::NoPendingAction("delete")),
        };

        if let Err(e) = store.delete(id) {
            tracing::error!(%id, error = %e, "Failed to delete visit");
            return Err(e.into());
        }

        self.pending = None;
        let position = self.records.iter().position(|record| record.id == id);
        let removed = match position {
            Some(index) => self.records.remove(index),
            None => return Err(BrowserError::UnknownRecord(id)),
        };
        tracing::info!(%id, file_number = %removed.fields.file_number, "Visit deleted");
        Ok(removed)
    }

    // =========================================================================
    // Edit Flow
    // =========================================================================

    /// Open the edit dialog with a draft copied from the record.
    pub fn begin_edit(&mut self, id: RecordId) -> BrowserResult<&mut EditDialog> {
        self.ensure_idle()?;
        let record = self.find(id)?.clone();
        let PendingAction::Edit(dialog) = self
            .pending
            .insert(PendingAction::Edit(EditDialog::new(record)))
        else {
            unreachable!("pending action was just set to an edit")
        };
        Ok(dialog)
    }

    pub fn edit_dialog(&self) -> Option<&EditDialog> {
        match &self.pending {
            Some(PendingAction::Edit(dialog)) => Some(dialog),
            _ => None,
        }
    }

    pub fn edit_dialog_mut(&mut self) -> Option<&mut EditDialog> {
        match &mut self.pending {
            Some(PendingAction::Edit(dialog)) => Some(dialog),
            _ => None,
        }
    }

    /// Discard the draft without contacting the store.
    pub fn cancel_edit(&mut self) {
        if matches!(self.pending, Some(PendingAction::Edit(_))) {
            self.pending = None;
        }
    }

    /// Send the full draft to the store, then merge it into the local copy.
    pub fn save_edit(&mut self, store: &dyn RecordStore) -> BrowserResult<VisitRecord> {
        let dialog = self.edit_dialog().ok_or(BrowserError::NoPendingAction("edit"))?;
        let id = dialog.id();
        let changed = dialog.changed_fields();

        if let Err(e) = store.update(id, dialog.draft()) {
            tracing::error!(%id, error = %e, "Failed to update visit");
            return Err(e.into());
        }

        let merged = dialog.merged();
        self.pending = None;
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(slot) => *slot = merged.clone(),
            None => return Err(BrowserError::UnknownRecord(id)),
        }
        tracing::info!(
            %id,
            changed = ?changed.iter().map(|f| f.column()).collect::<Vec<_>>(),
            "Visit updated"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{NewVisit, VisitField, VisitFields};
    use crate::store::testing::FlakyStore;

    fn seed(store: &dyn RecordStore, file_number: &str, name: &str, created_at: &str) -> VisitRecord {
        store
            .insert(&NewVisit {
                fields: VisitFields {
                    file_number: file_number.into(),
                    name: name.into(),
                    doctor: "Dr. Karimi".into(),
                    ..VisitFields::default()
                },
                created_at: created_at.into(),
            })
            .unwrap()
    }

    fn loaded(store: &dyn RecordStore) -> RecordBrowser {
        let mut browser = RecordBrowser::new(ClinicClock::default());
        browser.load(store).unwrap();
        browser
    }

    #[test]
    fn test_two_groups_and_history_of_two() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        seed(&db, "A1", "Sara", "2026-10-19T10:00:00");
        seed(&db, "B2", "Ali", "2026-10-19T11:00:00");

        let mut browser = loaded(&db);
        assert_eq!(browser.rows().len(), 2);

        browser.open_history("A1");
        assert_eq!(browser.history_entries().len(), 2);
        assert_eq!(browser.history().unwrap().title(), "تاریخچه شماره پرونده A1");

        browser.close_history();
        assert!(browser.history().is_none());
        assert!(browser.history_entries().is_empty());
    }

    #[test]
    fn test_rows_skip_empty_file_numbers() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, "", "Walk-in", "2026-10-18T10:00:00");
        seed(&db, "A1", "Sara", "2026-10-18T10:00:00");

        let browser = loaded(&db);
        assert_eq!(browser.groups().len(), 2);
        assert_eq!(browser.rows().len(), 1);
        assert_eq!(browser.rows()[0].file_number(), "A1");
    }

    #[test]
    fn test_search_and_date_narrow_rows() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        seed(&db, "B2", "Ali", "2026-10-19T10:00:00");

        let mut browser = loaded(&db);
        browser.set_search("Ali");
        assert_eq!(browser.rows().len(), 1);

        browser.set_search("");
        browser.set_date(NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(browser.rows()[0].file_number(), "A1");

        browser.set_jalali_date(Some(JalaliDate::new(1405, 7, 27).unwrap()));
        assert_eq!(browser.rows()[0].file_number(), "B2");

        browser.set_jalali_date(None);
        assert_eq!(browser.rows().len(), 2);
    }

    #[test]
    fn test_failed_load_keeps_previous_copy() {
        let store = FlakyStore::new();
        seed(&store, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&store);

        store.fail_reads.set(true);
        assert!(browser.load(&store).is_err());
        assert_eq!(browser.records().len(), 1);
    }

    #[test]
    fn test_delete_removes_only_that_record() {
        let db = Database::open_in_memory().unwrap();
        let first = seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        let second = seed(&db, "A1", "Sara", "2026-10-19T10:00:00");
        let other = seed(&db, "B2", "Ali", "2026-10-19T11:00:00");

        let mut browser = loaded(&db);
        browser.request_delete(second.id).unwrap();
        let removed = browser.confirm_delete(&db).unwrap();

        assert_eq!(removed.id, second.id);
        assert!(browser.pending().is_none());
        let local: Vec<RecordId> = browser.records().iter().map(|r| r.id).collect();
        assert_eq!(local, vec![first.id, other.id]);
        let stored: Vec<RecordId> = db.list_visits().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(stored, vec![first.id, other.id]);
    }

    #[test]
    fn test_cancel_delete_makes_no_call() {
        let store = FlakyStore::new();
        let record = seed(&store, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&store);
        let calls = store.calls.get();

        browser.request_delete(record.id).unwrap();
        browser.cancel_delete();

        assert!(browser.pending().is_none());
        assert_eq!(store.calls.get(), calls);
        assert_eq!(browser.records().len(), 1);
        assert!(matches!(
            browser.confirm_delete(&store),
            Err(BrowserError::NoPendingAction("delete"))
        ));
    }

    #[test]
    fn test_failed_delete_keeps_dialog_and_record() {
        let store = FlakyStore::new();
        let record = seed(&store, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&store);

        store.fail_writes.set(true);
        browser.request_delete(record.id).unwrap();
        assert!(matches!(
            browser.confirm_delete(&store),
            Err(BrowserError::Store(_))
        ));
        assert!(matches!(browser.pending(), Some(PendingAction::Delete(_))));
        assert_eq!(browser.records().len(), 1);
    }

    #[test]
    fn test_edit_updates_only_edited_fields() {
        let db = Database::open_in_memory().unwrap();
        let record = seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&db);

        browser
            .begin_edit(record.id)
            .unwrap()
            .set(VisitField::Services, "Root canal");
        let saved = browser.save_edit(&db).unwrap();

        assert_eq!(saved.id, record.id);
        assert_eq!(saved.created_at, record.created_at);
        assert_eq!(saved.fields.services, "Root canal");
        assert_eq!(saved.fields.diff(&record.fields), vec![VisitField::Services]);
        assert_eq!(browser.records()[0], saved);
        assert_eq!(db.get_visit(record.id).unwrap().unwrap(), saved);
        assert!(browser.edit_dialog().is_none());
    }

    #[test]
    fn test_cancel_edit_discards_draft() {
        let store = FlakyStore::new();
        let record = seed(&store, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&store);
        let calls = store.calls.get();

        browser.begin_edit(record.id).unwrap().set(VisitField::Name, "Someone else");
        browser.cancel_edit();

        assert_eq!(store.calls.get(), calls);
        assert_eq!(browser.records()[0].fields.name, "Sara");
    }

    #[test]
    fn test_failed_edit_keeps_draft_and_local_copy() {
        let store = FlakyStore::new();
        let record = seed(&store, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&store);

        browser.begin_edit(record.id).unwrap().set(VisitField::Name, "Sara A.");
        store.fail_writes.set(true);
        assert!(browser.save_edit(&store).is_err());

        assert_eq!(browser.edit_dialog().unwrap().draft().name, "Sara A.");
        assert_eq!(browser.records()[0].fields.name, "Sara");
    }

    #[test]
    fn test_only_one_pending_action() {
        let db = Database::open_in_memory().unwrap();
        let record = seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&db);

        browser.begin_edit(record.id).unwrap();
        assert!(matches!(
            browser.request_delete(record.id),
            Err(BrowserError::DialogBusy("edit"))
        ));

        // cancelling the other kind is a no-op
        browser.cancel_delete();
        assert!(browser.edit_dialog().is_some());

        browser.cancel_edit();
        assert_eq!(browser.request_delete(record.id).unwrap().id(), record.id);
        assert!(matches!(
            browser.begin_edit(record.id),
            Err(BrowserError::DialogBusy("delete"))
        ));
    }

    #[test]
    fn test_unknown_record() {
        let db = Database::open_in_memory().unwrap();
        let mut browser = loaded(&db);
        assert!(matches!(
            browser.begin_edit(RecordId(12)),
            Err(BrowserError::UnknownRecord(RecordId(12)))
        ));
        assert!(browser.pending().is_none());
    }

    #[test]
    fn test_history_reflects_edits() {
        let db = Database::open_in_memory().unwrap();
        let record = seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        seed(&db, "A1", "Sara", "2026-10-19T10:00:00");
        let mut browser = loaded(&db);

        browser.open_history("A1");
        browser
            .begin_edit(record.id)
            .unwrap()
            .set(VisitField::FileNumber, "C3");
        browser.save_edit(&db).unwrap();

        assert_eq!(browser.history_entries().len(), 1);
        assert_eq!(browser.rows().len(), 2);
    }

    #[test]
    fn test_print_view_of_open_history() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, "A1", "Sara", "2026-10-18T10:00:00");
        let mut browser = loaded(&db);

        assert!(browser.print_view(PrintHeader::default()).is_none());
        browser.open_history("A1");
        let view = browser.print_view(PrintHeader::default()).unwrap();
        assert_eq!(view.entries().len(), 1);
        assert!(view.qr_payload().starts_with("File Number: A1\n"));
    }
}

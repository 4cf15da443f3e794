//! Dental Records Core Library
//!
//! Patient-visit records for a dental clinic, kept in one hosted table.
//!
//! # Architecture
//!
//! ```text
//!   Intake Form ──insert──►┌──────────────────────┐
//!                          │  Record Store        │
//!                          │  (hosted `users`     │
//!                          │   table or SQLite)   │
//!                          └──────────┬───────────┘
//!                                     │ select
//!                                     ▼
//!                              Record Browser
//!                        filter ─► group by file number
//!                                     │
//!                 ┌───────────────────┼───────────────────┐
//!                 ▼                   ▼                   ▼
//!          History Dialog      Edit / Delete         Print View
//!                              (update/delete)    (HTML + QR code)
//! ```
//!
//! Every store operation is a single blocking call. State changes locally
//! only after the store accepts a write.
//!
//! # Modules
//!
//! - [`models`]: Visit records and their fields
//! - [`store`]: The [`RecordStore`] seam and its REST implementation
//! - [`db`]: SQLite table with the same layout
//! - [`forms`]: Intake form and autocomplete suggestions
//! - [`browser`]: Filtering, grouping and the dialog flows
//! - [`dialogs`]: History, edit and delete dialog state
//! - [`print`]: Printable history with QR code
//! - [`calendar`]: Jalali dates and the clinic clock
//! - [`config`]: JSON configuration

pub mod browser;
pub mod calendar;
pub mod config;
pub mod db;
pub mod dialogs;
pub mod forms;
pub mod labels;
pub mod models;
pub mod print;
pub mod store;

// Re-export commonly used types
pub use browser::{BrowserError, RecordBrowser, RecordFilter, RecordGroup};
pub use calendar::{ClinicClock, JalaliDate};
pub use config::AppConfig;
pub use db::Database;
pub use forms::{IntakeForm, SuggestionKind, SuggestionList, Suggestions};
pub use models::{NewVisit, RecordId, VisitField, VisitFields, VisitRecord};
pub use print::{PrintHeader, PrintView};
pub use store::{RecordStore, RestStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DentalRecordsError {
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Print error: {0}")]
    PrintError(String),
}

impl From<StoreError> for DentalRecordsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => DentalRecordsError::NotFound(format!("record {}", id)),
            other => DentalRecordsError::StoreError(other.to_string()),
        }
    }
}

impl From<db::DbError> for DentalRecordsError {
    fn from(e: db::DbError) -> Self {
        DentalRecordsError::StoreError(e.to_string())
    }
}

impl From<BrowserError> for DentalRecordsError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::Store(e) => e.into(),
            BrowserError::UnknownRecord(id) => {
                DentalRecordsError::NotFound(format!("record {}", id))
            }
            other => DentalRecordsError::InvalidInput(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for DentalRecordsError {
    fn from(e: config::ConfigError) -> Self {
        DentalRecordsError::ConfigError(e.to_string())
    }
}

impl From<print::PrintError> for DentalRecordsError {
    fn from(e: print::PrintError) -> Self {
        DentalRecordsError::PrintError(e.to_string())
    }
}

impl From<calendar::JalaliError> for DentalRecordsError {
    fn from(e: calendar::JalaliError) -> Self {
        DentalRecordsError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DentalRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DentalRecordsError::StoreError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a local SQLite store at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<DentalRecordsCore>, DentalRecordsError> {
    let db = Database::open(&path)?;
    Ok(DentalRecordsCore::new(Box::new(db), &AppConfig::default())?)
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<DentalRecordsCore>, DentalRecordsError> {
    let db = Database::open_in_memory()?;
    Ok(DentalRecordsCore::new(Box::new(db), &AppConfig::default())?)
}

/// Connect to the hosted table.
#[uniffi::export]
pub fn open_remote(url: String, api_key: String) -> Result<Arc<DentalRecordsCore>, DentalRecordsError> {
    let config = AppConfig::default();
    let store = RestStore::new(&url, &api_key, &config.store.table, config.store.timeout_secs)?;
    Ok(DentalRecordsCore::new(Box::new(store), &config)?)
}

/// Open whatever store the configuration names.
#[uniffi::export]
pub fn open_from_config(path: Option<String>) -> Result<Arc<DentalRecordsCore>, DentalRecordsError> {
    let config = AppConfig::load(path.as_deref().map(std::path::Path::new))?;
    let store = config.build_store()?;
    Ok(DentalRecordsCore::new(store, &config)?)
}

// =========================================================================
// Main API Object
// =========================================================================

struct CoreState {
    store: Box<dyn RecordStore + Send>,
    form: IntakeForm,
    browser: RecordBrowser,
    header: PrintHeader,
}

/// Thread-safe store and screen state for FFI.
#[derive(uniffi::Object)]
pub struct DentalRecordsCore {
    state: Mutex<CoreState>,
}

impl DentalRecordsCore {
    fn new(
        store: Box<dyn RecordStore + Send>,
        config: &AppConfig,
    ) -> Result<Arc<Self>, config::ConfigError> {
        let clock = config.clock()?;
        Ok(Arc::new(Self {
            state: Mutex::new(CoreState {
                store,
                form: IntakeForm::new(clock),
                browser: RecordBrowser::new(clock),
                header: config.print_header(),
            }),
        }))
    }
}

#[uniffi::export]
impl DentalRecordsCore {
    // =========================================================================
    // Intake
    // =========================================================================

    /// Save a new visit stamped with the current clinic time.
    pub fn submit_visit(&self, fields: FfiVisitFields) -> Result<FfiVisitRecord, DentalRecordsError> {
        let mut state = self.state.lock()?;
        let CoreState { store, form, browser, .. } = &mut *state;

        let fields: VisitFields = fields.into();
        for field in VisitField::ALL {
            form.set(field, fields.get(field));
        }
        let record = form.submit(store.as_ref())?;
        form.dismiss_notice();
        Ok(FfiVisitRecord::new(record, browser.clock()))
    }

    /// Autocomplete values for one of the three lookup lists.
    pub fn suggestions(&self, kind: String, input: String) -> Result<Vec<String>, DentalRecordsError> {
        let kind: SuggestionKind = kind.parse().map_err(DentalRecordsError::InvalidInput)?;
        let state = self.state.lock()?;
        let list = forms::SuggestionList::fetch(state.store.as_ref(), kind)?;
        Ok(list.matching(&input).into_iter().map(String::from).collect())
    }

    // =========================================================================
    // Browser
    // =========================================================================

    /// Reload every record from the store; returns the record count.
    pub fn refresh(&self) -> Result<u32, DentalRecordsError> {
        let mut state = self.state.lock()?;
        let CoreState { store, browser, .. } = &mut *state;
        let count = browser.load(store.as_ref())?;
        Ok(count as u32)
    }

    /// One row per file number, after filtering by `search` and an optional
    /// Jalali `date` (`YYYY-MM-DD`).
    pub fn list_rows(
        &self,
        search: String,
        date: Option<String>,
    ) -> Result<Vec<FfiVisitRecord>, DentalRecordsError> {
        let date = date
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.parse::<JalaliDate>())
            .transpose()?;

        let mut state = self.state.lock()?;
        let browser = &mut state.browser;
        browser.set_search(search);
        browser.set_jalali_date(date);

        let clock = browser.clock();
        Ok(browser
            .rows()
            .into_iter()
            .map(|record| FfiVisitRecord::new(record.clone(), clock))
            .collect())
    }

    /// Filtered records sharing one file number.
    pub fn history(&self, file_number: String) -> Result<Vec<FfiVisitRecord>, DentalRecordsError> {
        let mut state = self.state.lock()?;
        let browser = &mut state.browser;
        browser.open_history(file_number);

        let clock = browser.clock();
        Ok(browser
            .history_entries()
            .into_iter()
            .map(|record| FfiVisitRecord::new(record.clone(), clock))
            .collect())
    }

    /// Overwrite every user field of one record.
    pub fn update_visit(
        &self,
        id: i64,
        fields: FfiVisitFields,
    ) -> Result<FfiVisitRecord, DentalRecordsError> {
        let mut state = self.state.lock()?;
        let CoreState { store, browser, .. } = &mut *state;

        let fields: VisitFields = fields.into();
        let dialog = browser.begin_edit(RecordId(id))?;
        for field in VisitField::ALL {
            dialog.set(field, fields.get(field));
        }
        let saved = browser.save_edit(store.as_ref());
        // a one-shot call leaves no dialog behind
        browser.cancel_edit();
        Ok(FfiVisitRecord::new(saved?, browser.clock()))
    }

    pub fn delete_visit(&self, id: i64) -> Result<(), DentalRecordsError> {
        let mut state = self.state.lock()?;
        let CoreState { store, browser, .. } = &mut *state;

        browser.request_delete(RecordId(id))?;
        let deleted = browser.confirm_delete(store.as_ref());
        browser.cancel_delete();
        deleted?;
        Ok(())
    }

    // =========================================================================
    // Print
    // =========================================================================

    /// Printable HTML history of one file number.
    pub fn print_html(&self, file_number: String) -> Result<String, DentalRecordsError> {
        let mut state = self.state.lock()?;
        let CoreState { browser, header, .. } = &mut *state;
        browser.open_history(file_number);
        let view = browser
            .print_view(header.clone())
            .ok_or_else(|| DentalRecordsError::InvalidInput("no history open".into()))?;
        Ok(view.render_html()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe visit fields.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiVisitFields {
    pub file_number: String,
    pub name: String,
    pub father_name: String,
    pub doctor: String,
    pub corrective_doctor: String,
    pub services: String,
    pub which_tooth: String,
    pub return_doctor: String,
    pub return_reason: String,
}

impl From<VisitFields> for FfiVisitFields {
    fn from(fields: VisitFields) -> Self {
        Self {
            file_number: fields.file_number,
            name: fields.name,
            father_name: fields.father_name,
            doctor: fields.doctor,
            corrective_doctor: fields.corrective_doctor,
            services: fields.services,
            which_tooth: fields.which_tooth,
            return_doctor: fields.return_doctor,
            return_reason: fields.return_reason,
        }
    }
}

impl From<FfiVisitFields> for VisitFields {
    fn from(fields: FfiVisitFields) -> Self {
        VisitFields {
            file_number: fields.file_number,
            name: fields.name,
            father_name: fields.father_name,
            doctor: fields.doctor,
            corrective_doctor: fields.corrective_doctor,
            services: fields.services,
            which_tooth: fields.which_tooth,
            return_doctor: fields.return_doctor,
            return_reason: fields.return_reason,
        }
    }
}

/// FFI-safe visit record with its display date.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitRecord {
    pub id: i64,
    pub fields: FfiVisitFields,
    pub created_at: String,
    /// `jYYYY-jMM-jDD HH:mm:ss`, empty when the timestamp is unreadable.
    pub jalali_created_at: String,
}

impl FfiVisitRecord {
    fn new(record: VisitRecord, clock: &ClinicClock) -> Self {
        Self {
            id: record.id.0,
            jalali_created_at: clock.jalali_datetime(&record.created_at),
            fields: record.fields.into(),
            created_at: record.created_at,
        }
    }
}

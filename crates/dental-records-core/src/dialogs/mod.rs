//! Dialog state for the record browser.
//!
//! The history dialog is a view over one group. Edit and delete are
//! *pending actions*: at most one is open at a time, and each holds a copy
//! of the record it acts on until it is confirmed or cancelled.

mod delete;
mod edit;
mod history;

pub use delete::*;
pub use edit::*;
pub use history::*;

/// The single open edit or delete dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Delete(DeleteConfirmation),
    Edit(EditDialog),
}

impl PendingAction {
    /// Short name used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PendingAction::Delete(_) => "delete",
            PendingAction::Edit(_) => "edit",
        }
    }
}

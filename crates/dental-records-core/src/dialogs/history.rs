use crate::labels;

/// The open history dialog for one file number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDialog {
    file_number: String,
}

impl HistoryDialog {
    pub fn new(file_number: impl Into<String>) -> Self {
        Self {
            file_number: file_number.into(),
        }
    }

    pub fn file_number(&self) -> &str {
        &self.file_number
    }

    pub fn title(&self) -> String {
        labels::history_title(&self.file_number)
    }
}

//! Print view of one file number's history.
//!
//! A print view is a read-only projection: the group's records, a clinic
//! header, and a QR code naming the first record. It renders a standalone
//! HTML document that is written to its own file and handed to whatever
//! opens or prints HTML on the host.

mod html;

pub use html::escape_html;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::calendar::ClinicClock;
use crate::labels;
use crate::models::VisitRecord;

/// Print errors.
#[derive(Error, Debug)]
pub enum PrintError {
    #[error("QR generation failed: {0}")]
    Qr(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(#[from] std::fmt::Error),
}

pub type PrintResult<T> = Result<T, PrintError>;

/// Clinic branding shown at the foot of every print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintHeader {
    pub clinic_name: String,
    /// Image path or URL, used as-is in the document.
    pub logo: Option<String>,
}

impl Default for PrintHeader {
    fn default() -> Self {
        Self {
            clinic_name: labels::DEFAULT_CLINIC_NAME.to_string(),
            logo: None,
        }
    }
}

/// Printable history of one file number.
#[derive(Debug, Clone)]
pub struct PrintView {
    file_number: String,
    entries: Vec<VisitRecord>,
    header: PrintHeader,
    clock: ClinicClock,
}

impl PrintView {
    pub fn new(
        file_number: impl Into<String>,
        entries: Vec<VisitRecord>,
        header: PrintHeader,
        clock: ClinicClock,
    ) -> Self {
        Self {
            file_number: file_number.into(),
            entries,
            header,
            clock,
        }
    }

    pub fn file_number(&self) -> &str {
        &self.file_number
    }

    pub fn entries(&self) -> &[VisitRecord] {
        &self.entries
    }

    pub fn header(&self) -> &PrintHeader {
        &self.header
    }

    pub fn clock(&self) -> &ClinicClock {
        &self.clock
    }

    pub fn title(&self) -> String {
        labels::history_title(&self.file_number)
    }

    /// Text encoded in the QR code; empty for an empty group.
    pub fn qr_payload(&self) -> String {
        match self.entries.first() {
            Some(first) => format!(
                "File Number: {}\nName: {}\nDate and Time: {}",
                first.fields.file_number,
                first.fields.name,
                self.clock.jalali_datetime(&first.created_at)
            ),
            None => String::new(),
        }
    }

    /// The QR code as an SVG string, `None` for an empty group.
    pub fn qr_svg(&self) -> PrintResult<Option<String>> {
        use qrcode::render::svg;
        use qrcode::QrCode;

        let payload = self.qr_payload();
        if payload.is_empty() {
            return Ok(None);
        }

        let code = QrCode::new(payload.as_bytes()).map_err(|e| PrintError::Qr(e.to_string()))?;

        let svg_string = code
            .render::<svg::Color>()
            .min_dimensions(100, 100)
            .max_dimensions(200, 200)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .quiet_zone(true)
            .build();

        Ok(Some(svg_string))
    }

    /// Standalone right-to-left HTML document.
    pub fn render_html(&self) -> PrintResult<String> {
        let svg = self.qr_svg()?;
        let mut out = String::new();
        html::write_html(&mut out, self, svg.as_deref())?;
        Ok(out)
    }

    /// File name the document is written under.
    pub fn document_file_name(&self) -> String {
        format!("history-{}.html", sanitize_file_component(&self.file_number))
    }

    /// Render and write the document into `dir`, returning its path.
    pub fn write_document(&self, dir: &Path) -> PrintResult<PathBuf> {
        let html = self.render_html()?;
        fs::create_dir_all(dir)?;
        let path = dir.join(self.document_file_name());
        fs::write(&path, html)?;
        tracing::info!(
            file_number = %self.file_number,
            entries = self.entries.len(),
            path = %path.display(),
            "Print document written"
        );
        Ok(path)
    }
}

/// Reduce a file number to characters safe in a file name.
fn sanitize_file_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();

    if sanitized.is_empty() {
        "unnumbered".into()
    } else {
        sanitized
    }
}

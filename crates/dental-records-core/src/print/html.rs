//! Right-to-left HTML rendering of a print view.

use std::fmt::{self, Write};

use crate::labels;
use crate::models::VisitField;

use super::PrintView;

const PRINT_CSS: &str = "\
html {
  display: flex;
  justify-content: center;
  align-items: center;
  height: 100%;
}
img.Icon {
  max-width: 50px;
}
body {
  max-width: 900px;
}
.Paper_header {
  display: flex;
  justify-content: space-between;
  align-items: center;
}
.qrcode svg {
  width: 100px;
  height: 100px;
  margin: 10px 0;
  padding: 5px;
}
table {
  border-collapse: collapse;
  width: 100%;
}
th, td {
  border: 1px solid #000;
  padding: 8px;
  text-align: right;
}
h2.detail_child {
  font-size: 17px;
  text-align: right;
  direction: rtl;
}
";

/// Escape text for element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Write the full document to `out`. `qr_svg` is inserted verbatim.
pub(super) fn write_html(
    out: &mut impl Write,
    view: &PrintView,
    qr_svg: Option<&str>,
) -> fmt::Result {
    let title = escape_html(&view.title());
    let clock = view.clock();

    write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"fa\" dir=\"rtl\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n{PRINT_CSS}</style>\n</head>\n<body>\n"
    )?;

    out.write_str("<div class=\"Paper_header\">\n<div class=\"qrcode\">")?;
    if let Some(svg) = qr_svg {
        out.write_str(svg)?;
    }
    out.write_str("</div>\n")?;

    if let Some(first) = view.entries().first() {
        out.write_str("<div class=\"detail\">\n")?;
        let details = [
            (labels::DETAIL_FILE_NUMBER, first.fields.file_number.clone()),
            (labels::DETAIL_NAME, first.fields.name.clone()),
            (labels::DETAIL_FATHER_NAME, first.fields.father_name.clone()),
            (labels::DATE_TIME, clock.jalali_datetime(&first.created_at)),
        ];
        for (label, value) in details {
            writeln!(
                out,
                "<h2 class=\"detail_child\">{} : {}</h2>",
                label,
                escape_html(&value)
            )?;
        }
        out.write_str("</div>\n")?;
    }
    out.write_str("</div>\n")?;

    out.write_str("<table>\n<thead>\n<tr>")?;
    for field in VisitField::ALL {
        write!(out, "<th>{}</th>", labels::field_label(field))?;
    }
    write!(out, "<th>{}</th>", labels::DATE_TIME)?;
    out.write_str("</tr>\n</thead>\n<tbody>\n")?;

    if view.entries().is_empty() {
        writeln!(
            out,
            "<tr><td colspan=\"{}\">{}</td></tr>",
            VisitField::ALL.len() + 1,
            labels::NO_DATA
        )?;
    }
    for record in view.entries() {
        out.write_str("<tr>")?;
        for field in VisitField::ALL {
            write!(out, "<td>{}</td>", escape_html(record.fields.get(field)))?;
        }
        write!(
            out,
            "<td>{}</td>",
            escape_html(&clock.jalali_datetime(&record.created_at))
        )?;
        out.write_str("</tr>\n")?;
    }
    out.write_str("</tbody>\n</table>\n")?;

    out.write_str("<div class=\"Paper_header\">\n")?;
    if let Some(logo) = &view.header().logo {
        writeln!(out, "<img src=\"{}\" alt=\"\" class=\"Icon\" />", escape_html(logo))?;
    }
    writeln!(out, "<h1>{}</h1>", escape_html(&view.header().clinic_name))?;
    out.write_str("</div>\n</body>\n</html>\n")
}

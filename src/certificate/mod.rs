// Certificate rendering pipeline: dates, bold runs, wrapping, layout
pub mod date;
pub mod render;
pub mod runs;
pub mod wrap;
pub mod writeup;

use crate::workbook::CellValue;

/// One spreadsheet row: name, date, write-up, certificate ID, course title.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub raw_date: CellValue,
    pub writeup_template: String,
    pub cert_id: String,
    pub course_title: String,
}

impl Record {
    /// `None` when the name or course title is blank; such rows are skipped.
    pub fn from_row(row: &[CellValue]) -> Option<Self> {
        let cell = |i: usize| row.get(i).cloned().unwrap_or(CellValue::Empty);
        let record = Self {
            name: cell(0).text(),
            raw_date: cell(1),
            writeup_template: cell(2).text(),
            cert_id: cell(3).text(),
            course_title: cell(4).text(),
        };
        if record.name.is_empty() || record.course_title.is_empty() {
            return None;
        }
        Some(record)
    }
}

/// `<name>_<course>` reduced to alphanumerics, spaces, `_` and `-`, with
/// spaces turned into underscores.
pub fn output_filename(name: &str, course_title: &str) -> String {
    let safe: String = format!("{}_{}", name, course_title)
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    format!("{}_certificate.pdf", safe.replace(' ', "_"))
}

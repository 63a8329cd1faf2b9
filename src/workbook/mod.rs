// Spreadsheet input: the active worksheet of an .xlsx workbook, read with calamine
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// Number of positional columns a certificate row carries.
pub const RECORD_COLUMNS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Trimmed display text; empty and "falsy" cells read as "".
    pub fn text(&self) -> String {
        match self {
            CellValue::Empty | CellValue::Bool(false) => String::new(),
            CellValue::Number(n) if *n == 0.0 => String::new(),
            other => other.to_string().trim().to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
            Data::DateTimeIso(s) => parse_iso(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| s.parse::<NaiveDate>().ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn active_tab_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<workbookView\b[^>]*\bactiveTab="(\d+)""#).expect("valid activeTab pattern"))
}

/// Index of the tab the workbook was saved on. calamine does not expose
/// `activeTab`, so it is read from `xl/workbook.xml` directly; anything that
/// is not a readable .xlsx package means the first sheet.
pub fn active_sheet_index(path: &Path) -> usize {
    let read_workbook_xml = || -> Option<String> {
        let file = std::fs::File::open(path).ok()?;
        let mut archive = zip::ZipArchive::new(file).ok()?;
        let mut entry = archive.by_name("xl/workbook.xml").ok()?;
        let mut xml = String::new();
        entry.read_to_string(&mut xml).ok()?;
        Some(xml)
    };

    read_workbook_xml()
        .and_then(|xml| {
            active_tab_attr()
                .captures(&xml)
                .and_then(|c| c[1].parse().ok())
        })
        .unwrap_or(0)
}

/// Data rows of the active worksheet, header row excluded, each padded to
/// [`RECORD_COLUMNS`] cells.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let active = active_sheet_index(path);
    let range = workbook
        .worksheet_range_at(active)
        .or_else(|| workbook.worksheet_range_at(0))
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(data_rows(&range))
}

fn data_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (Some(_), Some((last_row, _))) = (range.start(), range.end()) else {
        return Vec::new();
    };

    // Row 0 is the header; positions are absolute sheet coordinates.
    (1..=last_row)
        .map(|row| {
            (0..RECORD_COLUMNS)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(CellValue::from)
                        .unwrap_or(CellValue::Empty)
                })
                .collect()
        })
        .collect()
}

// "4th of July" style dates from spreadsheet cells
use chrono::{Datelike, Duration, NaiveDate};

use crate::workbook::CellValue;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DateError {
    #[error("serial date {0} is not a finite number")]
    NotFinite(f64),
    #[error("serial date {0} is out of range")]
    OutOfRange(f64),
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (10..=20).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn day_of_month<D: Datelike>(date: &D) -> String {
    let day = date.day();
    let month = NaiveDate::from_ymd_opt(2000, date.month(), 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default();
    format!("{}{} of {}", day, ordinal_suffix(day), month)
}

/// Legacy spreadsheet serial: day 0 is two days before 1900-01-01.
pub fn serial_to_date(serial: f64) -> Result<NaiveDate, DateError> {
    if !serial.is_finite() {
        return Err(DateError::NotFinite(serial));
    }
    let days = serial.trunc();
    if days.abs() > i32::MAX as f64 {
        return Err(DateError::OutOfRange(serial));
    }
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|base| Duration::try_days(days as i64 - 2).and_then(|d| base.checked_add_signed(d)))
        .filter(|date| date.year() >= 1)
        .ok_or(DateError::OutOfRange(serial))
}

pub fn format_date(raw: &CellValue) -> Result<String, DateError> {
    match raw {
        CellValue::DateTime(dt) => Ok(day_of_month(dt)),
        CellValue::Number(serial) => serial_to_date(*serial).map(|d| day_of_month(&d)),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            Ok(NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
                .map(|d| day_of_month(&d))
                .unwrap_or_else(|_| trimmed.to_string()))
        }
        // Spreadsheet booleans are numbers: TRUE is serial 1.
        CellValue::Bool(b) => serial_to_date(f64::from(u8::from(*b))).map(|d| day_of_month(&d)),
        CellValue::Empty => Ok(String::new()),
    }
}

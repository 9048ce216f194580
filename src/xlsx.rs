// Worksheet access and row decoding
//
// The registry exports are xlsx workbooks with a fixed header row and
// bilingual column names. This layer maps header text to columns, normalizes
// blank cells to the empty string, and converts the export's cell encodings
// (float-rendered BINs, date text, Excel day serials) into typed values.

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use umya_spreadsheet::{reader, Spreadsheet, Worksheet};

/// A single row that failed schema validation, with its 1-based sheet row.
#[derive(Debug, Clone)]
pub struct RowError {
    pub row: u32,
    pub column: String,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}, column {:?}: {}",
            self.row, self.column, self.message
        )
    }
}

impl std::error::Error for RowError {}

/// Read a workbook from disk.
pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    reader::xlsx::read(path).with_context(|| format!("failed to read workbook {:?}", path))
}

/// A worksheet with a known header row, addressed by column name.
pub struct SheetTable<'a> {
    sheet: &'a Worksheet,
    columns: HashMap<String, u32>,
    header_row: u32,
    last_row: u32,
}

impl<'a> SheetTable<'a> {
    /// Map the header row (1-based). Header text is trimmed so trailing
    /// spaces in the export headers don't matter; embedded newlines in the
    /// bilingual headers are preserved.
    pub fn new(sheet: &'a Worksheet, header_row: u32) -> Result<Self> {
        let (highest_col, highest_row) = sheet.get_highest_column_and_row();

        let mut columns = HashMap::new();
        for col in 1..=highest_col {
            let header = sheet.get_value((col, header_row));
            let header = header.trim();
            if !header.is_empty() {
                columns.insert(header.to_string(), col);
            }
        }

        if columns.is_empty() {
            return Err(anyhow!("no column headers on row {}", header_row));
        }

        Ok(SheetTable {
            sheet,
            columns,
            header_row,
            last_row: highest_row,
        })
    }

    /// 1-based sheet rows below the header.
    pub fn data_rows(&self) -> std::ops::RangeInclusive<u32> {
        (self.header_row + 1)..=self.last_row
    }

    /// Cell text for a named column; empty cells read as "".
    pub fn text(&self, row: u32, column: &str) -> Result<String> {
        let col = self
            .columns
            .get(column)
            .ok_or_else(|| anyhow!("column {:?} not found in header row", column))?;
        Ok(self.sheet.get_value((*col, row)))
    }
}

/// Blank cell: empty/whitespace text, or the `NaN` a float not-a-number
/// renders as.
pub fn is_blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Optional list date: blank maps to absent, `"YYYY-MM-DD HH:MM:SS"` to the
/// calendar date, anything else is a validation error.
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>> {
    if is_blank(value) {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S")
        .map(|dt| Some(dt.date()))
        .map_err(|_| anyhow!("unrecognized date {:?}, expected YYYY-MM-DD HH:MM:SS", value))
}

/// Required date cell. The workbook stores dates either as text or as an
/// Excel day serial, depending on how the export was produced.
pub fn parse_date_cell(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(serial) = trimmed.parse::<f64>() {
        if let Some(date) = excel_serial_to_date(serial) {
            return Ok(date);
        }
    }

    Err(anyhow!("unrecognized date {:?}", value))
}

/// Excel day serial in the 1900 date system: days counted from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// BIN cell of the business export. Blank yields `None` (the row is
/// skipped); numeric cells rendered as floats collapse to their integer
/// digits, so `"50840001234.0"` becomes `"50840001234"`.
pub fn normalize_bin(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if is_blank(trimmed) {
        return None;
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        if number >= 0.0 && number.fract() == 0.0 {
            return Some(format!("{}", number as i64));
        }
    }
    Some(trimmed.to_string())
}

//! Loading billing tables from CSV files and spreadsheets.
//!
//! The first row names the fields. Every following row that is not entirely
//! blank becomes a [`Record`] carrying its 1-based position below the header,
//! so skipped blank rows still count.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, ExcelDateTime, ExcelDateTimeType, Reader};
use log::debug;

use crate::error::InputError;
use crate::record::{Record, Value};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
/// Days between the 1900 and 1904 spreadsheet date epochs.
const DAYS_1900_TO_1904: f64 = 1462.0;

/// Reads the table at `path`, choosing the parser from the file extension.
///
/// `sheet` selects a worksheet by name and is ignored for CSV input. Without
/// it the first worksheet is used.
pub fn read_table(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Vec<Record>, InputError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let records = if extension == "csv" {
        let file = File::open(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_csv(file)?
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet(path, sheet)?
    } else {
        return Err(InputError::UnsupportedFormat(extension));
    };

    debug!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Reads CSV data with a header row.
///
/// Every cell is kept as text. Blank cells become [`Value::Absent`] and rows may
/// be shorter than the header.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let record = Record::from_pairs(
            index + 1,
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), Value::from_text(cell))),
        );
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(value) => Value::Number(*value as f64),
        Data::Float(value) => Value::Number(*value),
        Data::DateTime(value) if uses_1904_epoch(value) => {
            Value::Number(value.as_f64() + DAYS_1900_TO_1904)
        }
        Data::DateTime(value) => Value::Number(value.as_f64()),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            Value::from_text(text.as_str())
        }
        Data::Bool(value) => Value::from_text(value.to_string()),
        Data::Error(_) | Data::Empty => Value::Absent,
    }
}

/// Serial dates are stored as 1900-based day counts, so dates from workbooks
/// saved with the 1904 date system are shifted. calamine keeps the epoch flag
/// private; equality compares it.
fn uses_1904_epoch(value: &ExcelDateTime) -> bool {
    *value == ExcelDateTime::new(value.as_f64(), ExcelDateTimeType::DateTime, true)
}

fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<Vec<Record>, InputError> {
    let spreadsheet_error = |source| InputError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;

    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| InputError::MissingSheet("<first>".to_string()))?,
    };
    if !workbook.sheet_names().contains(&name) {
        return Err(InputError::MissingSheet(name));
    }
    let range = workbook.worksheet_range(&name).map_err(spreadsheet_error)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row
            .iter()
            .map(|cell| cell_value(cell).display())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let record = Record::from_pairs(
            index + 1,
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), cell_value(cell))),
        );
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
 Customer_Account_Number , Amount_Due ,Order_date,Bill_to_State
ACC-1,\"1,250.00\",45292,
,,,
ACC-2,12.5,2024-01-31,NY
";

    #[test]
    fn reads_headers_and_values() {
        let records = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.row(), 1);
        assert_eq!(first.text("Customer_Account_Number"), "ACC-1");
        assert_eq!(first.get("Amount_Due"), &Value::from("1,250.00"));
        assert_eq!(first.get("Bill_to_State"), &Value::Absent);

        assert_eq!(records[1].row(), 3);
        assert_eq!(records[1].text("Bill_to_State"), "NY");
    }

    #[test]
    fn short_rows_leave_trailing_fields_absent() {
        let records = read_csv("Order,PO_Num,Term\nORD-1\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("Order"), "ORD-1");
        assert_eq!(records[0].get("Term"), &Value::Absent);
    }

    #[test]
    fn spreadsheet_cells_map_to_values() {
        assert_eq!(cell_value(&Data::Int(30)), Value::Number(30.0));
        assert_eq!(cell_value(&Data::String("  ".into())), Value::Absent);
        assert_eq!(cell_value(&Data::Empty), Value::Absent);
        assert_eq!(cell_value(&Data::Bool(true)), Value::from("true"));
    }

    #[test]
    fn dates_from_1904_workbooks_are_shifted() {
        let date_1904 = ExcelDateTime::new(43830.0, ExcelDateTimeType::DateTime, true);
        let date_1900 = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_value(&Data::DateTime(date_1904)), Value::Number(45292.0));
        assert_eq!(cell_value(&Data::DateTime(date_1900)), Value::Number(45292.0));
        assert_eq!(
            crate::dates::normalize(&cell_value(&Data::DateTime(date_1904))),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        );

        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, true);
        assert_eq!(cell_value(&Data::DateTime(duration)), Value::Number(1.5));
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        assert!(matches!(
            read_table("billing.txt", None),
            Err(InputError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn missing_csv_reports_the_path() {
        let err = read_table("/nonexistent/billing.csv", None).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}

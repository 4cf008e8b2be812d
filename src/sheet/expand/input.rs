//! Reading the sample rows from the resolved worksheet.

use calamine::{Data, Range};

use super::columns::ResolvedColumns;
use crate::err::SheetError;

/// Row holding the column headers.
pub const HEADER_ROW: u32 = 1;
/// First row holding sample data.
pub const FIRST_DATA_ROW: u32 = 2;
/// Trailing rows below the samples that are not data.
pub const FOOTER_ROWS: u32 = 2;

/// Render a cell as text; integral numbers render without fractional part.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}

/// Barcode token of barcode index `barcode`, zero-padded to two digits.
pub fn barcode_token(barcode: u32) -> String {
    format!("barcode{:02}", barcode)
}

/// One sample row of the worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    /// 0-based sheet row.
    pub row: u32,
    pub customer_name: String,
    pub sample_name: String,
    pub barcode: u32,
    pub size: Option<String>,
    pub reference_names: Option<String>,
    pub sample_type: String,
}

impl SampleRow {
    pub fn barcode_token(&self) -> String {
        barcode_token(self.barcode)
    }
}

/// Parse the barcode index of sheet row `row` (0-based).
pub fn parse_barcode(cell: Option<&Data>, row: u32) -> Result<u32, SheetError> {
    let invalid = |value: String| SheetError::InvalidBarcode {
        row: row + 1,
        value,
    };
    match cell {
        Some(Data::Int(i)) => u32::try_from(*i).map_err(|_| invalid(i.to_string())),
        Some(Data::Float(f)) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => {
            Ok(*f as u32)
        }
        Some(Data::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(cell_text(other))),
        None => Err(invalid(String::new())),
    }
}

/// Texts of the header row, indexed by column.
pub fn header_row(range: &Range<Data>) -> Vec<String> {
    let last_col = match range.end() {
        Some((_, col)) => col,
        None => return Vec::new(),
    };
    (0..=last_col)
        .map(|col| range.get_value((HEADER_ROW, col)).map(cell_text).unwrap_or_default())
        .collect()
}

/// Read the sample rows between the header row and the footer rows.
pub fn read_rows(
    range: &Range<Data>,
    columns: &ResolvedColumns,
) -> Result<Vec<SampleRow>, SheetError> {
    let last_row = match range.end() {
        Some((row, _)) => row,
        None => return Ok(Vec::new()),
    };
    let text = |row: u32, col: u32| {
        range
            .get_value((row, col))
            .map(cell_text)
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    let optional = |value: String| if value.is_empty() { None } else { Some(value) };

    let mut result = Vec::new();
    for row in FIRST_DATA_ROW..(last_row + 1).saturating_sub(FOOTER_ROWS) {
        if columns.all().iter().all(|col| text(row, *col).is_empty()) {
            tracing::debug!("skipping empty sheet row {}", row + 1);
            continue;
        }
        result.push(SampleRow {
            row,
            customer_name: text(row, columns.customer_name),
            sample_name: text(row, columns.sample_name),
            barcode: parse_barcode(range.get_value((row, columns.barcode)), row)?,
            size: optional(text(row, columns.size)),
            reference_names: optional(text(row, columns.reference_name)),
            sample_type: text(row, columns.sample_type),
        });
    }
    Ok(result)
}

// DATALINES record encoding

use crate::model::{CellValue, StorageType};
use crate::sanitize::sanitize;
use crate::source::RowSink;

pub const DELIMITER: char = ',';

/// Render one field. Character values are quote-wrapped; numeric text goes
/// through the same sanitizer but stays bare.
pub fn encode_field(value: &CellValue, storage_type: StorageType) -> String {
    let text = sanitize(value.as_text());
    match storage_type {
        StorageType::Character => format!("\"{}\"", text),
        StorageType::Numeric => text,
    }
}

/// Render one row as a single record, without the line terminator.
///
/// Fields beyond the declared types are treated as numeric, matching the
/// type derivation rule for unrecognized columns.
pub fn encode_line(values: &[CellValue], types: &[StorageType]) -> String {
    let mut line = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        let storage_type = types.get(i).copied().unwrap_or(StorageType::Numeric);
        line.push_str(&encode_field(value, storage_type));
    }
    line
}

/// Appends each row it receives to the program buffer, one line per row,
/// and counts what it saw.
pub struct RowEncoder<'a> {
    types: &'a [StorageType],
    out: &'a mut String,
    row_count: Option<usize>,
    column_count: Option<usize>,
}

impl<'a> RowEncoder<'a> {
    pub fn new(types: &'a [StorageType], out: &'a mut String) -> Self {
        Self { types, out, row_count: None, column_count: None }
    }

    /// `None` until the cursor has been opened.
    pub fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    pub fn column_count(&self) -> Option<usize> {
        self.column_count
    }
}

impl RowSink for RowEncoder<'_> {
    fn begin(&mut self, field_count: usize) {
        if field_count != self.types.len() {
            log::warn!(
                "cursor returned {} field(s) but {} column(s) were declared",
                field_count,
                self.types.len()
            );
        }
        self.column_count = Some(field_count);
        self.row_count = Some(0);
    }

    fn row(&mut self, values: &[CellValue]) {
        self.out.push_str(&encode_line(values, self.types));
        self.out.push('\n');
        *self.row_count.get_or_insert(0) += 1;
    }
}

//! Program assembly: the two entry points external callers use.
//!
//! Both calls connect to the source, describe the table, and build the
//! header. `generate_full` then streams every row into the DATALINES4 block;
//! `generate_header_only` stops after the header and never opens the row
//! cursor.
//!
//! Failures before any text exists are returned as [`ConvertError`]. A row
//! query or cursor failure is written into the program as a comment and the
//! block is still closed, so the returned program is always terminated.

use crate::encoder::RowEncoder;
use crate::error::ConvertError;
use crate::header::{build_header, Header};
use crate::model::{ColumnDescriptor, TableRef};
use crate::options::resolve_options;
use crate::sanitize::sanitize;
use crate::schema::describe_columns;
use crate::source::{DataSource, SourceConnection};
use crate::TERMINATOR;

/// Statement closing the DATA step after the data block.
pub const CLOSING: &str = "RUN;";

/// Stands in for the data rows in a preview.
pub const VALUES_OMITTED: &str = "/* Data values omitted for preview. Run the task to include all data values. */";

/// Converts one source table. Holds only the counters of the last call;
/// use one converter per table and per thread.
#[derive(Debug, Clone)]
pub struct DatasetConverter {
    table: TableRef,
    row_count: Option<usize>,
    column_count: Option<usize>,
}

impl DatasetConverter {
    pub fn new(table: TableRef) -> Self {
        Self { table, row_count: None, column_count: None }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Rows encoded by the last full generation; `None` if the row cursor
    /// was never opened.
    pub fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    /// Fields reported by the row cursor of the last full generation.
    pub fn column_count(&self) -> Option<usize> {
        self.column_count
    }

    /// The complete DATA step program with every row inline.
    ///
    /// The whole program is built in memory.
    pub fn generate_full<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        output_name: &str,
    ) -> Result<String, ConvertError> {
        self.row_count = None;
        self.column_count = None;

        let conn = source.connect()?;
        let (columns, header) = self.describe(&conn, output_name)?;
        let mut program = header.text;

        // The same explicit column list drives the row query, so field i
        // always lines up with types[i]
        let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();

        let result = {
            let mut encoder = RowEncoder::new(&header.types, &mut program);
            let result = conn.scan_rows(&self.table, &names, &mut encoder);
            self.row_count = encoder.row_count();
            self.column_count = encoder.column_count();
            result
        };

        if let Err(err) = result {
            log::warn!("{}: row read failed after {} row(s): {}", self.table, self.row_count.unwrap_or(0), err);
            // The message may carry source text; keep it inside one comment line
            program.push_str(&format!("/*Error trying to read input data: {} */ \n", sanitize(&err.to_string())));
        }

        program.push_str(TERMINATOR);
        program.push('\n');
        program.push_str(CLOSING);
        program.push('\n');

        log::debug!(
            "{}: encoded {} row(s) x {} column(s)",
            self.table,
            self.row_count.unwrap_or(0),
            self.column_count.unwrap_or(0)
        );

        Ok(program)
    }

    /// The header alone, for a quick look at the structure. Row data is
    /// never queried.
    pub fn generate_header_only<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        output_name: &str,
    ) -> Result<String, ConvertError> {
        self.row_count = None;
        self.column_count = None;

        let conn = source.connect()?;
        let (_, header) = self.describe(&conn, output_name)?;

        // Blank line, placeholder, terminator; no line break after `;;;;`
        let mut program = header.text;
        program.push('\n');
        program.push_str(VALUES_OMITTED);
        program.push('\n');
        program.push_str(TERMINATOR);
        Ok(program)
    }

    fn describe<C: SourceConnection>(
        &self,
        conn: &C,
        output_name: &str,
    ) -> Result<(Vec<ColumnDescriptor>, Header), ConvertError> {
        let columns = describe_columns(conn, &self.table)?;
        if columns.is_empty() {
            return Err(ConvertError::EmptySchema(self.table.to_string()));
        }
        let options = resolve_options(conn, &self.table)?;
        let header = build_header(&self.table, output_name, &columns, &options);
        Ok((columns, header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySource, MemoryTable};
    use crate::model::CellValue;

    fn class_source() -> (MemorySource, TableRef) {
        let table = TableRef::new("SASHELP", "CLASS");
        let data = MemoryTable::new(vec![
            ColumnDescriptor::numeric("id", 8),
            ColumnDescriptor::character("name", 20),
        ])
        .with_rows(vec![
            vec![CellValue::integer(1), CellValue::text("O'Brien")],
            vec![CellValue::integer(2), CellValue::text("Smith \"Jr\"")],
        ]);
        let mut source = MemorySource::new();
        source.insert(table.clone(), data);
        (source, table)
    }

    #[test]
    fn test_counts_unset_before_generation() {
        let converter = DatasetConverter::new(TableRef::new("a", "b"));
        assert_eq!(converter.table(), &TableRef::new("a", "b"));
        assert_eq!(converter.row_count(), None);
        assert_eq!(converter.column_count(), None);
    }

    #[test]
    fn test_full_program() {
        let (source, table) = class_source();
        let mut converter = DatasetConverter::new(table);
        let program = converter.generate_full(&source, "WORK.CLASS").unwrap();

        assert!(program.ends_with("DATALINES4;\n1,\"O'Brien\"\n2,\"Smith \"\"Jr\"\"\"\n;;;;\nRUN;\n"));
        assert_eq!(converter.row_count(), Some(2));
        assert_eq!(converter.column_count(), Some(2));
    }

    #[test]
    fn test_preview_has_no_rows() {
        let (source, table) = class_source();
        let mut converter = DatasetConverter::new(table);
        let preview = converter.generate_header_only(&source, "WORK.CLASS").unwrap();

        assert!(preview.ends_with(&format!("DATALINES4;\n\n{}\n;;;;", VALUES_OMITTED)));
        assert!(!preview.contains("O'Brien"));
        assert!(!preview.contains(CLOSING));
        assert_eq!(converter.row_count(), None);
    }

    #[test]
    fn test_empty_schema_is_error() {
        let source = MemorySource::new();
        let mut converter = DatasetConverter::new(TableRef::new("lib", "nothing"));
        let err = converter.generate_full(&source, "WORK.X").unwrap_err();
        assert_eq!(err, ConvertError::EmptySchema("lib.nothing".to_string()));

        let err = converter.generate_header_only(&source, "WORK.X").unwrap_err();
        assert!(matches!(err, ConvertError::EmptySchema(_)));
    }

    #[test]
    fn test_zero_rows_still_terminated() {
        let table = TableRef::new("lib", "empty");
        let mut source = MemorySource::new();
        source.insert(table.clone(), MemoryTable::new(vec![ColumnDescriptor::numeric("x", 8)]));

        let mut converter = DatasetConverter::new(table);
        let program = converter.generate_full(&source, "WORK.E").unwrap();
        assert!(program.ends_with("DATALINES4;\n;;;;\nRUN;\n"));
        assert_eq!(converter.row_count(), Some(0));
        assert_eq!(converter.column_count(), Some(1));
    }
}

//! Data source boundary.
//!
//! A [`DataSource`] hands out one [`SourceConnection`] per generation call.
//! The connection is released when it is dropped, on every exit path.

use crate::error::DataSourceError;
use crate::model::{CellValue, TableRef};

/// One row of the column-metadata query, as the source reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Source type string; only its first letter matters (`char` / `num`).
    pub type_name: String,
    pub length: u32,
    pub format: Option<String>,
    pub informat: Option<String>,
    pub label: Option<String>,
    /// Source ordinal position (1-based variable number).
    pub varnum: u32,
}

pub trait DataSource {
    type Connection<'a>: SourceConnection
    where
        Self: 'a;

    fn connect(&self) -> Result<Self::Connection<'_>, DataSourceError>;
}

pub trait SourceConnection {
    /// Column metadata for `table`, ordered ascending by `varnum`.
    /// An unknown table yields an empty list.
    fn column_metadata(&self, table: &TableRef) -> Result<Vec<ColumnMetadata>, DataSourceError>;

    /// The table's display label, if the source records one.
    fn table_label(&self, table: &TableRef) -> Result<Option<String>, DataSourceError>;

    /// Open a forward-only cursor selecting exactly `columns`, in that order,
    /// and feed every row to `sink`. `sink.begin` is called once the cursor
    /// is open, before the first row.
    fn scan_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        sink: &mut dyn RowSink,
    ) -> Result<(), DataSourceError>;
}

/// Receives rows from a cursor.
pub trait RowSink {
    fn begin(&mut self, field_count: usize);
    fn row(&mut self, values: &[CellValue]);
}

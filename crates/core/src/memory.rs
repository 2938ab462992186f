//! In-memory data source, for datasets the caller already holds.

use std::collections::HashMap;

use crate::error::DataSourceError;
use crate::model::{CellValue, ColumnDescriptor, TableRef};
use crate::source::{ColumnMetadata, DataSource, RowSink, SourceConnection};

#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<ColumnMetadata>,
    pub label: Option<String>,
    /// Row values in column order.
    pub rows: Vec<Vec<CellValue>>,
}

impl MemoryTable {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, col)| ColumnMetadata {
                type_name: col.storage_type.to_string(),
                name: col.name,
                length: col.length,
                format: col.format,
                informat: col.informat,
                label: col.label,
                varnum: i as u32 + 1,
            })
            .collect();
        Self { columns, label: None, rows: Vec::new() }
    }

    pub fn from_metadata(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns, label: None, rows: Vec::new() }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn with_rows(mut self, rows: Vec<Vec<CellValue>>) -> Self {
        self.rows.extend(rows);
        self
    }
}

/// Tables keyed by library/member, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<(String, String), MemoryTable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: TableRef, data: MemoryTable) {
        self.tables.insert(key(&table), data);
    }

    pub fn get(&self, table: &TableRef) -> Option<&MemoryTable> {
        self.tables.get(&key(table))
    }
}

fn key(table: &TableRef) -> (String, String) {
    (table.library.to_uppercase(), table.member.to_uppercase())
}

impl DataSource for MemorySource {
    type Connection<'a> = MemoryConnection<'a>;

    fn connect(&self) -> Result<Self::Connection<'_>, DataSourceError> {
        Ok(MemoryConnection { source: self })
    }
}

pub struct MemoryConnection<'s> {
    source: &'s MemorySource,
}

impl SourceConnection for MemoryConnection<'_> {
    fn column_metadata(&self, table: &TableRef) -> Result<Vec<ColumnMetadata>, DataSourceError> {
        let mut columns = self
            .source
            .get(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default();
        columns.sort_by_key(|c| c.varnum);
        Ok(columns)
    }

    fn table_label(&self, table: &TableRef) -> Result<Option<String>, DataSourceError> {
        Ok(self.source.get(table).and_then(|t| t.label.clone()))
    }

    fn scan_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        sink: &mut dyn RowSink,
    ) -> Result<(), DataSourceError> {
        let data = self
            .source
            .get(table)
            .ok_or_else(|| DataSourceError::query("row", format!("no such table: {table}")))?;

        // Resolve the requested column list to positions once
        let positions = columns
            .iter()
            .map(|name| {
                data.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| DataSourceError::query("row", format!("no such column: {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        sink.begin(positions.len());
        let mut values = Vec::with_capacity(positions.len());
        for row in &data.rows {
            values.clear();
            values.extend(
                positions
                    .iter()
                    .map(|&p| row.get(p).cloned().unwrap_or(CellValue::Missing)),
            );
            sink.row(&values);
        }
        Ok(())
    }
}

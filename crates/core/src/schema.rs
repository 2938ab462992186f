// Column schema discovery

use crate::error::DataSourceError;
use crate::model::{non_blank, ColumnDescriptor, StorageType, TableRef};
use crate::source::{ColumnMetadata, SourceConnection};

/// Query the column schema of `table`, in ascending source ordinal order.
///
/// An empty result is returned as-is; the caller decides whether a table
/// without columns is an error.
pub fn describe_columns<C: SourceConnection + ?Sized>(
    conn: &C,
    table: &TableRef,
) -> Result<Vec<ColumnDescriptor>, DataSourceError> {
    let mut rows = conn.column_metadata(table)?;
    // Stable: sources already ordered by varnum keep their order on ties
    rows.sort_by_key(|r| r.varnum);

    log::debug!("{}: {} column(s) described", table, rows.len());

    Ok(rows.into_iter().map(to_descriptor).collect())
}

fn to_descriptor(meta: ColumnMetadata) -> ColumnDescriptor {
    ColumnDescriptor {
        storage_type: StorageType::from_type_name(&meta.type_name),
        length: meta.length,
        format: non_blank(meta.format.as_deref()),
        informat: non_blank(meta.informat.as_deref()),
        label: non_blank(meta.label.as_deref()),
        name: meta.name,
    }
}

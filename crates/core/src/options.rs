// Table-level dataset options (currently just the label)

use crate::error::DataSourceError;
use crate::model::{non_blank, DatasetOptions, TableRef};
use crate::source::SourceConnection;

/// The table label, or `None` when the source has none or it is blank.
pub fn resolve_label<C: SourceConnection + ?Sized>(
    conn: &C,
    table: &TableRef,
) -> Result<Option<String>, DataSourceError> {
    let label = conn.table_label(table)?;
    Ok(non_blank(label.as_deref()))
}

pub fn resolve_options<C: SourceConnection + ?Sized>(
    conn: &C,
    table: &TableRef,
) -> Result<DatasetOptions, DataSourceError> {
    Ok(DatasetOptions { label: resolve_label(conn, table)? })
}

/// `(label="...")` for a present label, `""` otherwise.
pub fn render_options(label: Option<&str>) -> String {
    DatasetOptions::with_label(label).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySource, MemoryTable};
    use crate::model::ColumnDescriptor;
    use crate::source::DataSource;

    fn source_with_label(label: Option<&str>) -> (MemorySource, TableRef) {
        let table = TableRef::new("lib", "t");
        let mut mt = MemoryTable::new(vec![ColumnDescriptor::numeric("x", 8)]);
        if let Some(label) = label {
            mt = mt.with_label(label);
        }
        let mut source = MemorySource::new();
        source.insert(table.clone(), mt);
        (source, table)
    }

    #[test]
    fn test_label_present() {
        let (source, table) = source_with_label(Some("He said \"hi\""));
        let conn = source.connect().unwrap();
        let opts = resolve_options(&conn, &table).unwrap();
        assert_eq!(opts.render(), "(label=\"He said \"\"hi\"\"\")");
    }

    #[test]
    fn test_blank_label_absent() {
        let (source, table) = source_with_label(Some("   "));
        let conn = source.connect().unwrap();
        assert_eq!(resolve_label(&conn, &table).unwrap(), None);
        assert_eq!(resolve_options(&conn, &table).unwrap().render(), "");
    }

    #[test]
    fn test_render_options() {
        assert_eq!(render_options(Some("Class \"A\"")), "(label=\"Class \"\"A\"\"\")");
        assert_eq!(render_options(Some("")), "");
        assert_eq!(render_options(None), "");
    }

    #[test]
    fn test_no_label_row() {
        let (source, table) = source_with_label(None);
        let conn = source.connect().unwrap();
        assert_eq!(resolve_label(&conn, &table).unwrap(), None);
    }
}

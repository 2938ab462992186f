// SQLite tables as a conversion source
//
// A library is an SQLite schema: `main` for the opened file, or the alias of
// an attached database. Column attributes SQLite cannot express (formats,
// informats, labels, the table label) come from two optional dictionary
// tables in `main`; without them the schema is read from PRAGMA table_info.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use datalines_core::{
    CellValue, ColumnMetadata, DataSource, DataSourceError, RowSink, SourceConnection, TableRef,
};

pub const COLUMNS_DICTIONARY: &str = "datalines_columns";
pub const TABLES_DICTIONARY: &str = "datalines_tables";

const DICTIONARY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS datalines_columns (
    libname TEXT NOT NULL,
    memname TEXT NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,        -- 'char' or 'num'
    length INTEGER NOT NULL,
    format TEXT,
    informat TEXT,
    label TEXT,
    varnum INTEGER NOT NULL,   -- 1-based ordinal
    PRIMARY KEY (libname, memname, varnum)
);

CREATE TABLE IF NOT EXISTS datalines_tables (
    libname TEXT NOT NULL,
    memname TEXT NOT NULL,
    memlabel TEXT,
    PRIMARY KEY (libname, memname)
);
"#;

/// Storage length given to numeric columns.
const NUMERIC_LENGTH: u32 = 8;

/// Storage length for character columns without a declared `(n)`.
const DEFAULT_CHAR_LENGTH: u32 = 255;

/// Create the dictionary tables in `conn` if they are missing.
pub fn create_dictionary(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(DICTIONARY_SCHEMA).map_err(|e| e.to_string())
}

/// An SQLite database file, opened read-only on each connect.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    attached: Vec<(String, PathBuf)>,
}

impl SqliteSource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), attached: Vec::new() }
    }

    /// Make another database file available as library `library`.
    pub fn attach(mut self, library: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.attached.push((library.into(), path.into()));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for SqliteSource {
    type Connection<'a> = SqliteConnection;

    fn connect(&self) -> Result<Self::Connection<'_>, DataSourceError> {
        let open_err = |e: rusqlite::Error| DataSourceError::Open(format!("{}: {}", self.path.display(), e));

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(open_err)?;

        // Read-only open is lazy; touch the schema so a bad file fails here
        conn.query_row("SELECT count(*) FROM main.sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(open_err)?;

        for (library, path) in &self.attached {
            conn.execute(
                &format!("ATTACH DATABASE ?1 AS {}", quote_ident(library)),
                params![path.to_string_lossy().into_owned()],
            )
            .map_err(|e| DataSourceError::Open(format!("{}: {}", path.display(), e)))?;
        }

        log::debug!("opened {}", self.path.display());
        Ok(SqliteConnection { conn })
    }
}

/// Closed when dropped.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    fn has_dictionary(&self, name: &str) -> Result<bool, DataSourceError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT count(*) FROM main.sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| DataSourceError::query("dictionary", e.to_string()))?;
        Ok(count > 0)
    }

    fn dictionary_columns(&self, table: &TableRef) -> Result<Vec<ColumnMetadata>, DataSourceError> {
        let err = |e: rusqlite::Error| DataSourceError::query("column metadata", e.to_string());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT name, type, length, format, informat, label, varnum FROM main.datalines_columns \
                 WHERE libname = ?1 COLLATE NOCASE AND memname = ?2 COLLATE NOCASE \
                 ORDER BY varnum ASC",
            )
            .map_err(err)?;

        let rows = stmt
            .query_map(params![table.library, table.member], |row| {
                let meta = ColumnMetadata {
                    name: row.get(0)?,
                    type_name: row.get(1)?,
                    format: row.get(3)?,
                    informat: row.get(4)?,
                    label: row.get(5)?,
                    ..Default::default()
                };
                Ok((meta, row.get::<_, i64>(2)?, row.get::<_, i64>(6)?))
            })
            .map_err(err)?;

        let mut columns = Vec::new();
        for row in rows {
            let (mut meta, length, varnum) = row.map_err(err)?;
            meta.length = dictionary_number(&meta.name, "length", length)?;
            if meta.length == 0 {
                return Err(DataSourceError::query("column metadata", format!("{}: length must be positive", meta.name)));
            }
            meta.varnum = dictionary_number(&meta.name, "varnum", varnum)?;
            columns.push(meta);
        }
        Ok(columns)
    }

    fn pragma_columns(&self, table: &TableRef) -> Result<Vec<ColumnMetadata>, DataSourceError> {
        let err = |e: rusqlite::Error| DataSourceError::query("column metadata", e.to_string());

        let mut stmt = self
            .conn
            .prepare("SELECT cid, name, type FROM pragma_table_info(?1, ?2) ORDER BY cid ASC")
            .map_err(err)?;

        let rows = stmt
            .query_map(params![table.member, table.library], |row| {
                let cid: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let declared: String = row.get::<_, Option<String>>(2)?.unwrap_or_default();
                Ok((cid, name, declared))
            })
            .map_err(err)?;

        let mut columns = Vec::new();
        for row in rows {
            let (cid, name, declared) = row.map_err(err)?;
            let (type_name, length) = classify_declared_type(&declared);
            columns.push(ColumnMetadata {
                name,
                type_name: type_name.to_string(),
                length,
                varnum: cid as u32 + 1,
                ..Default::default()
            });
        }
        Ok(columns)
    }
}

impl SourceConnection for SqliteConnection {
    fn column_metadata(&self, table: &TableRef) -> Result<Vec<ColumnMetadata>, DataSourceError> {
        if self.has_dictionary(COLUMNS_DICTIONARY)? {
            let columns = self.dictionary_columns(table)?;
            if !columns.is_empty() {
                return Ok(columns);
            }
        }
        self.pragma_columns(table)
    }

    fn table_label(&self, table: &TableRef) -> Result<Option<String>, DataSourceError> {
        if !self.has_dictionary(TABLES_DICTIONARY)? {
            return Ok(None);
        }
        self.conn
            .query_row(
                "SELECT memlabel FROM main.datalines_tables \
                 WHERE libname = ?1 COLLATE NOCASE AND memname = ?2 COLLATE NOCASE",
                params![table.library, table.member],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map(Option::flatten)
            .map_err(|e| DataSourceError::query("table label", e.to_string()))
    }

    fn scan_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        sink: &mut dyn RowSink,
    ) -> Result<(), DataSourceError> {
        let query_err = |e: rusqlite::Error| DataSourceError::query("row", e.to_string());
        let cursor_err = |e: rusqlite::Error| DataSourceError::Cursor(e.to_string());

        if columns.is_empty() {
            return Err(DataSourceError::query("row", "no columns selected"));
        }

        let select_list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "SELECT {} FROM {}.{}",
            select_list.join(", "),
            quote_ident(&table.library),
            quote_ident(&table.member)
        );
        log::debug!("{}", sql);

        let mut stmt = self.conn.prepare(&sql).map_err(query_err)?;
        let field_count = stmt.column_count();
        let mut rows = stmt.query([]).map_err(query_err)?;

        sink.begin(field_count);
        let mut values = Vec::with_capacity(field_count);
        while let Some(row) = rows.next().map_err(cursor_err)? {
            values.clear();
            for i in 0..field_count {
                values.push(cell_value(row.get_ref(i).map_err(cursor_err)?));
            }
            sink.row(&values);
        }
        Ok(())
    }
}

/// Dictionary integers must fit the metadata's `u32` fields.
fn dictionary_number(column: &str, field: &str, value: i64) -> Result<u32, DataSourceError> {
    u32::try_from(value).map_err(|_| {
        DataSourceError::query("column metadata", format!("{}: {} {} is out of range", column, field, value))
    })
}

fn cell_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Missing,
        ValueRef::Integer(i) => CellValue::integer(i),
        ValueRef::Real(f) => CellValue::real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Map a declared column type to a storage type name and length, following
/// SQLite's type affinity rules.
fn classify_declared_type(declared: &str) -> (&'static str, u32) {
    let upper = declared.to_ascii_uppercase();

    let numeric = if upper.contains("INT") {
        true
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        false
    } else if upper.contains("BLOB") || upper.trim().is_empty() {
        false
    } else {
        // REAL, FLOA, DOUB, and everything else is NUMERIC affinity
        true
    };

    if numeric {
        ("num", NUMERIC_LENGTH)
    } else {
        ("char", declared_length(&upper).unwrap_or(DEFAULT_CHAR_LENGTH))
    }
}

/// `VARCHAR(20)` -> 20
fn declared_length(declared: &str) -> Option<u32> {
    let open = declared.find('(')?;
    let close = declared[open..].find(')')? + open;
    let first = declared[open + 1..close].split(',').next()?;
    first.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

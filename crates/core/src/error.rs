use std::fmt;

/// Failure talking to the data source: opening it, running a metadata
/// query, or reading the row cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// The source could not be opened (missing file, permissions, bad path).
    Open(String),
    /// A metadata or row query could not be prepared or executed.
    Query { what: String, message: String },
    /// The row cursor failed part way through.
    Cursor(String),
}

impl DataSourceError {
    pub fn query(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query { what: what.into(), message: message.into() }
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "cannot open data source: {msg}"),
            Self::Query { what, message } => write!(f, "{what} query failed: {message}"),
            Self::Cursor(msg) => write!(f, "row cursor failed: {msg}"),
        }
    }
}

impl std::error::Error for DataSourceError {}

/// Hard failure of a generation call. Only raised before any program text
/// exists; row-level failures are written into the program instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Connecting or a metadata query failed.
    Source(DataSourceError),
    /// The table has no columns (or does not exist).
    EmptySchema(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::EmptySchema(table) => write!(f, "table {table} has no columns"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::EmptySchema(_) => None,
        }
    }
}

impl From<DataSourceError> for ConvertError {
    fn from(err: DataSourceError) -> Self {
        Self::Source(err)
    }
}

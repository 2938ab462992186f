use std::fmt;

use crate::sanitize;

// ---------------------------------------------------------------------------
// Table reference
// ---------------------------------------------------------------------------

/// A source table: library (collection) plus member (table) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub library: String,
    pub member: String,
}

impl TableRef {
    pub fn new(library: impl Into<String>, member: impl Into<String>) -> Self {
        Self { library: library.into(), member: member.into() }
    }

    /// Parse `LIB.MEMBER`, or a bare `MEMBER` placed in `default_library`.
    /// Returns `None` when either part is empty.
    pub fn parse(name: &str, default_library: &str) -> Option<Self> {
        let name = name.trim();
        let (library, member) = match name.split_once('.') {
            Some((lib, mem)) => (lib.trim(), mem.trim()),
            None => (default_library.trim(), name),
        };
        if library.is_empty() || member.is_empty() {
            return None;
        }
        Some(Self::new(library, member))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.library, self.member)
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    Character,
    Numeric,
}

impl StorageType {
    /// Derive from a source type string: a leading `C` (any case) is
    /// Character, everything else (including empty) is Numeric.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name.trim_start().chars().next() {
            Some(c) if c.to_ascii_uppercase() == 'C' => Self::Character,
            _ => Self::Numeric,
        }
    }

    pub fn is_character(self) -> bool {
        matches!(self, Self::Character)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => write!(f, "char"),
            Self::Numeric => write!(f, "num"),
        }
    }
}

/// Schema of one column, in source ordinal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub storage_type: StorageType,
    pub length: u32,
    pub format: Option<String>,
    pub informat: Option<String>,
    pub label: Option<String>,
}

impl ColumnDescriptor {
    pub fn character(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, StorageType::Character, length)
    }

    pub fn numeric(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, StorageType::Numeric, length)
    }

    fn new(name: impl Into<String>, storage_type: StorageType, length: u32) -> Self {
        Self {
            name: name.into(),
            storage_type,
            length,
            format: None,
            informat: None,
            label: None,
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = non_blank(Some(format));
        self
    }

    pub fn with_informat(mut self, informat: &str) -> Self {
        self.informat = non_blank(Some(informat));
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = non_blank(Some(label));
        self
    }
}

/// Blank or whitespace-only attributes are treated as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Table-level options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetOptions {
    pub label: Option<String>,
}

impl DatasetOptions {
    pub fn with_label(label: Option<&str>) -> Self {
        Self { label: non_blank(label) }
    }

    /// The parenthesized option clause appended to the DATA statement,
    /// or an empty string when there is nothing to declare.
    pub fn render(&self) -> String {
        match &self.label {
            Some(label) => format!("(label=\"{}\")", sanitize::sanitize(label)),
            None => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A cell as read from the row cursor. The encoder only needs its text; the
/// column's declared storage type decides the quoting.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Text(String),
    Numeric(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn integer(value: i64) -> Self {
        Self::Numeric(value.to_string())
    }

    /// Whole-valued reals render without a fractional part.
    pub fn real(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            Self::Numeric(format!("{}", value as i64))
        } else {
            Self::Numeric(format!("{}", value))
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Missing => "",
            Self::Text(s) | Self::Numeric(s) => s,
        }
    }
}

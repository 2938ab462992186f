//! `datalines-core`: dataset to DATA step conversion engine.
//!
//! Pure engine crate: reads schema and rows through the [`source`] traits,
//! returns the generated program text. No file or database dependencies.

pub mod converter;
pub mod encoder;
pub mod error;
pub mod header;
pub mod memory;
pub mod model;
pub mod naming;
pub mod options;
pub mod sanitize;
pub mod schema;
pub mod source;

pub use converter::DatasetConverter;
pub use error::{ConvertError, DataSourceError};
pub use model::{CellValue, ColumnDescriptor, DatasetOptions, StorageType, TableRef};
pub use source::{ColumnMetadata, DataSource, RowSink, SourceConnection};

/// Closes the DATALINES4 block. Must never appear inside an encoded value.
pub const TERMINATOR: &str = ";;;;";

/// Longest rendered field accepted by the DATA step reader.
pub const MAX_FIELD_LEN: usize = 32767;

//! CLI Exit Code Registry
//!
//! Single source of truth for `datalines` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad table name, bad --attach value)     |
//! | 3    | I/O error writing the program                        |
//! | 50   | Data source failed (open, metadata query)            |
//! | 51   | Table has no columns (missing or empty schema)       |
//!
//! A row read failure during `generate` is not an exit code: the program is
//! still produced, with the error recorded inside the data block.

use datalines_core::ConvertError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments.
pub const EXIT_USAGE: u8 = 2;

/// Could not write the generated program.
pub const EXIT_IO: u8 = 3;

/// Data source could not be opened or described.
pub const EXIT_SOURCE: u8 = 50;

/// Table resolved to zero columns.
pub const EXIT_EMPTY_SCHEMA: u8 = 51;

pub fn convert_exit_code(err: &ConvertError) -> u8 {
    match err {
        ConvertError::Source(_) => EXIT_SOURCE,
        ConvertError::EmptySchema(_) => EXIT_EMPTY_SCHEMA,
    }
}

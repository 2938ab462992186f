// Data sources and program file output

pub mod program_file;
pub mod sqlite;

pub use program_file::{encode_program, resolve_output_path, write_program, OutputEncoding};
pub use sqlite::SqliteSource;

// Writing generated programs to disk

use std::path::{Path, PathBuf};

use datalines_core::naming::program_file_name;
use datalines_core::TableRef;

/// Byte encoding of a saved program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Keep every character as UTF-8.
    #[default]
    Utf8,
    /// 7-bit ASCII; anything else becomes `?`.
    Ascii,
}

impl OutputEncoding {
    pub fn from_preserve(preserve_encoding: bool) -> Self {
        if preserve_encoding {
            Self::Utf8
        } else {
            Self::Ascii
        }
    }
}

pub fn encode_program(program: &str, encoding: OutputEncoding) -> Vec<u8> {
    match encoding {
        OutputEncoding::Utf8 => program.as_bytes().to_vec(),
        OutputEncoding::Ascii => program
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
            .collect(),
    }
}

/// When `target` is an existing directory the program is saved inside it as
/// `<member>.sas`; otherwise `target` is the file itself.
pub fn resolve_output_path(target: &Path, table: &TableRef) -> PathBuf {
    if target.is_dir() {
        target.join(program_file_name(table))
    } else {
        target.to_path_buf()
    }
}

pub fn write_program(program: &str, path: &Path, encoding: OutputEncoding) -> Result<(), String> {
    std::fs::write(path, encode_program(program, encoding))
        .map_err(|e| format!("{}: {}", path.display(), e))
}

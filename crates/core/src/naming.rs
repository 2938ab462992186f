// Output data set naming

use crate::model::TableRef;

/// Longest member name the DATA statement accepts.
pub const MAX_NAME_LEN: usize = 32;

pub const DEFAULT_OUTPUT_LIBRARY: &str = "WORK";

/// Coerce `raw` into a valid SAS name: letters, digits and underscores only,
/// not starting with a digit, at most `max_len` characters.
pub fn valid_sas_name(raw: &str, max_len: usize) -> String {
    let mut name: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name.truncate(max_len);
    name
}

/// `LIBRARY.LIB_MEMBER`, seeded from the source table's two-part name.
pub fn default_output_name(source: &TableRef, library: &str) -> String {
    let member = valid_sas_name(&format!("{}.{}", source.library, source.member), MAX_NAME_LEN);
    format!("{}.{}", library, member)
}

/// File name for a saved program: `<member>.sas`.
pub fn program_file_name(source: &TableRef) -> String {
    format!("{}.sas", valid_sas_name(&source.member, usize::MAX))
}

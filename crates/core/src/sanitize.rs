// Escaping for values written inside the DATALINES4 block

use crate::{MAX_FIELD_LEN, TERMINATOR};

/// Escape a value so it cannot end a record or the block.
///
/// - `"` is doubled, ready for quote-wrapping
/// - CR and LF become a single space each
/// - `;;;;` collapses to `;` until none is left
/// - anything longer than [`MAX_FIELD_LEN`] is sliced from index `MAX_FIELD_LEN`
pub fn sanitize(raw: &str) -> String {
    let mut s = raw.replace('"', "\"\"").replace(['\n', '\r'], " ");

    // A single pass over ";;;;;;;" leaves ";;;;" behind
    while s.contains(TERMINATOR) {
        s = s.replace(TERMINATOR, ";");
    }

    truncate_long(s)
}

/// Absent values encode as the empty string.
pub fn sanitize_opt(raw: Option<&str>) -> String {
    raw.map(sanitize).unwrap_or_default()
}

/// Values longer than [`MAX_FIELD_LEN`] lose their first `MAX_FIELD_LEN`
/// characters; what follows that index is kept.
fn truncate_long(s: String) -> String {
    if s.chars().count() <= MAX_FIELD_LEN {
        return s;
    }
    s.chars().skip(MAX_FIELD_LEN).collect()
}

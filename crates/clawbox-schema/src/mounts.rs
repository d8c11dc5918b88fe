//! Parser for the extra-mounts string.
//!
//! `CLAWBOX_EXTRA_MOUNTS` carries zero or more volume-mount clauses separated
//! by commas. Each clause is opaque to clawbox beyond trimming and an
//! emptiness check; order among surviving clauses is significant and kept.

/// Split a raw comma-separated mount string into an ordered list of clauses.
///
/// Surrounding whitespace is trimmed from each piece and empty pieces are
/// dropped. Empty input yields an empty list, never an error.
pub fn parse_extra_mounts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_owned)
        .collect()
}

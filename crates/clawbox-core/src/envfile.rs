//! Idempotent reconciliation of the persisted `.env` file.
//!
//! The file is an ordered sequence of lines. A line is a key-value pair iff it
//! contains `=` and the segment before the first `=` contains no `#`; every
//! other line — comments, blanks, free text — is opaque and passes through
//! verbatim. Reconciliation replaces the value of the first occurrence of each
//! recognized, currently-defined key, appends missing ones in fixed key order,
//! and rewrites the whole file atomically. Running it again with unchanged
//! values produces byte-identical output.

use crate::CoreError;
use clawbox_schema::EnvKey;
use std::collections::HashSet;
use std::io::Write as _;
use std::path::Path;
use tracing::debug;

/// One line of the persisted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    /// Any line that does not parse as a key-value pair; preserved verbatim.
    Opaque(String),
    /// A parsed `key=value` line. `value` is the raw text after the first `=`.
    Pair { key: String, value: String },
}

impl EnvLine {
    fn render(&self) -> String {
        match self {
            Self::Opaque(text) => text.clone(),
            Self::Pair { key, value } => format!("{key}={value}"),
        }
    }
}

/// Classify one line. The key segment is everything before the first `=` and
/// must not contain `#`; no further grammar is imposed on it.
pub fn parse_line(line: &str) -> EnvLine {
    match line.split_once('=') {
        Some((key, value)) if !key.contains('#') => EnvLine::Pair {
            key: key.to_owned(),
            value: value.to_owned(),
        },
        _ => EnvLine::Opaque(line.to_owned()),
    }
}

/// Value persisted for a recognized key, taken from its first occurrence.
///
/// Returns `None` when the file does not exist, the key never appears, or its
/// stored value is empty. Used to carry a previously provisioned secret into
/// the next run instead of regenerating it.
pub fn lookup(path: &Path, key: EnvKey) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .map(parse_line)
        .find_map(|line| match line {
            EnvLine::Pair { key: k, value } if k == key.name() => Some(value),
            _ => None,
        })
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Merge the current values into the file at `path`.
///
/// `entries` carries the recognized keys in fixed enumeration order; a `None`
/// value means the key is undefined this run and is skipped entirely. A
/// missing file starts as an empty line sequence. Only the first occurrence
/// of a recognized key is updated; later duplicates pass through untouched.
pub fn reconcile(path: &Path, entries: &[(EnvKey, Option<String>)]) -> Result<(), CoreError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(CoreError::IoAt {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut lines: Vec<EnvLine> = existing.lines().map(parse_line).collect();
    let mut handled: HashSet<EnvKey> = HashSet::new();

    for line in &mut lines {
        let EnvLine::Pair { key, value } = line else {
            continue;
        };
        let Some(recognized) = EnvKey::from_name(key) else {
            continue;
        };
        if handled.contains(&recognized) {
            continue;
        }
        let current = entries
            .iter()
            .find(|(k, _)| *k == recognized)
            .and_then(|(_, v)| v.as_deref());
        if let Some(current) = current {
            current.clone_into(value);
            let _ = handled.insert(recognized);
        }
    }

    // Missing keys are appended in the fixed enumeration order, regardless of
    // how the entries slice happens to be ordered.
    for key in EnvKey::ALL {
        if handled.contains(&key) {
            continue;
        }
        let current = entries
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.clone());
        if let Some(value) = current {
            lines.push(EnvLine::Pair {
                key: key.name().to_owned(),
                value,
            });
        }
    }

    debug!(path = %path.display(), lines = lines.len(), "rewriting env file");
    write_atomic(path, &lines)
}

fn write_atomic(path: &Path, lines: &[EnvLine]) -> Result<(), CoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_at = |source: std::io::Error| CoreError::IoAt {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_at)?;
    for line in lines {
        writeln!(tmp, "{}", line.render()).map_err(io_at)?;
    }
    tmp.persist(path).map_err(|e| io_at(e.error))?;
    Ok(())
}

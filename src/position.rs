//! Conversion between in-text positions (rune columns inside normalized
//! comment text) and file positions (byte columns in the original source).

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;

use crate::extract::CommentRecord;

/// A position inside normalized comment text. Both indexes are 1-based;
/// `column` counts runes, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPos {
    pub line: usize,
    pub column: usize,
}

/// A position in the original file. `column` is a 1-based byte offset
/// within the line, which is what Go tooling expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePos {
    pub filename: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for FilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// An in-text position mapped back onto the original file, with the rune
/// index into the raw source line where a fix would be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapped {
    pub pos: FilePos,
    /// Rune index into the raw source line for `insert_period`.
    pub rune_index: usize,
}

/// Map an in-text position to a file position.
///
/// The rune column is shifted past the comment marker for the physical
/// line it lands on, then re-expressed as a byte column using the raw
/// source line (comment text may contain multi-byte characters). Both
/// out-of-bounds cases are internal errors: they mean a position was
/// computed wrong, not that the input was bad.
pub fn map_to_file(filename: &str, record: &CommentRecord, pos: TextPos) -> Result<Mapped> {
    let line = record.start.line + pos.line - 1;
    let Some(raw) = record.lines.get(pos.line - 1) else {
        bail!(
            "invalid line number inside comment: {}:{}",
            filename,
            line
        );
    };

    let prefix_bytes = record.prefix_bytes(pos.line).min(raw.len());
    let prefix_runes = raw[..prefix_bytes].chars().count();
    let rune_index = prefix_runes + pos.column - 1;

    let byte_index = match byte_index_of_rune(raw, rune_index) {
        Some(b) => b,
        None => bail!(
            "invalid column number inside comment: {}:{}:{}",
            filename,
            line,
            rune_index + 1
        ),
    };

    Ok(Mapped {
        pos: FilePos {
            filename: filename.to_string(),
            line,
            column: byte_index + 1,
            offset: record.start.offset,
        },
        rune_index,
    })
}

/// Insert a period into `line` at the given rune index. An out-of-bounds
/// index returns the line unmodified rather than corrupting it.
pub fn insert_period(line: &str, rune_index: usize) -> String {
    match byte_index_of_rune(line, rune_index) {
        Some(byte) => {
            let mut fixed = String::with_capacity(line.len() + 1);
            fixed.push_str(&line[..byte]);
            fixed.push('.');
            fixed.push_str(&line[byte..]);
            fixed
        }
        None => line.to_string(),
    }
}

/// Inverse of the rune-to-byte mapping: convert a 1-based byte column
/// back to a 1-based rune column within the line.
pub fn byte_to_rune_column(line: &str, byte_column: usize) -> usize {
    let byte = (byte_column - 1).min(line.len());
    line[..byte].chars().count() + 1
}

/// Byte offset of the rune at `rune_index`; `line.len()` when the index
/// points one past the end, `None` when it is further out of bounds.
fn byte_index_of_rune(line: &str, rune_index: usize) -> Option<usize> {
    if rune_index == 0 {
        return Some(0);
    }
    let mut count = 0;
    for (byte, _) in line.char_indices() {
        if count == rune_index {
            return Some(byte);
        }
        count += 1;
    }
    // One past the last rune means "append".
    if count == rune_index {
        return Some(line.len());
    }
    None
}

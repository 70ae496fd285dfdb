//! Comment extraction: selects the subset of a file's comment groups that
//! a check run considers, based on the configured scope.

use anyhow::{bail, Result};
use std::collections::BTreeSet;

use crate::parser::{GoFile, Pos};
use crate::settings::Scope;

/// Comments inside parenthesized declaration groups sit one indentation
/// level in, which gofmt renders as column 2.
const BLOCK_INTERIOR_COLUMN: usize = 2;

/// Structural kind of a comment group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `//` comments, one part per physical line.
    Line,
    /// `/* */` comment, possibly spanning several physical lines.
    Block,
}

/// One comment of a group with the file position of its marker.
#[derive(Debug, Clone)]
pub struct RecordPart {
    /// Comment text including markers.
    pub text: String,
    /// 1-based line of the marker.
    pub line: usize,
    /// 1-based byte column of the marker.
    pub column: usize,
}

/// A comment selected for checking: verbatim source lines plus the
/// structural metadata the checkers and the position mapper need.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    /// Physical source lines spanned by the comment, verbatim.
    pub lines: Vec<String>,
    pub parts: Vec<RecordPart>,
    pub kind: CommentKind,
    /// True for comments attached to a declaration (doc comments and
    /// block-interior comments). Their first sentence may legitimately
    /// start with a lowercase identifier.
    pub decl: bool,
    pub start: Pos,
}

impl CommentRecord {
    /// Byte width of the raw-line prefix in front of the comment text for
    /// the given 1-based logical text line: indentation plus the `//` or
    /// `/*` marker, or zero for continuation lines of a block comment.
    pub fn prefix_bytes(&self, text_line: usize) -> usize {
        let mut consumed = 0;
        for part in &self.parts {
            let span = part.text.split('\n').count();
            if text_line <= consumed + span {
                let local = text_line - consumed;
                return if part.text.starts_with("/*") && local > 1 {
                    0
                } else {
                    part.column - 1 + 2
                };
            }
            consumed += span;
        }
        0
    }
}

/// Extract comments from a file according to the scope.
///
/// Files rewritten with line directives are rejected: their reported
/// positions no longer match the physical layout, so any computed fix
/// could land on the wrong line.
pub fn extract_comments(file: &GoFile, scope: Scope) -> Result<Vec<CommentRecord>> {
    if file.has_line_directives {
        bail!(
            "{}: file contains line directives, positions are unreliable",
            file.filename
        );
    }

    let doc_set: BTreeSet<usize> = file.decls.iter().filter_map(|d| d.doc).collect();
    let cgo_docs: BTreeSet<usize> = file
        .decls
        .iter()
        .filter(|d| d.is_cgo_import)
        .filter_map(|d| d.doc)
        .collect();
    let interior = block_interior_groups(file);

    let mut selected: BTreeSet<usize> = BTreeSet::new();
    match scope {
        Scope::All => {
            selected.extend(0..file.comments.len());
        }
        Scope::Top => {
            selected.extend(interior.iter().copied());
            selected.extend(doc_set.iter().copied());
            for (idx, group) in file.comments.iter().enumerate() {
                if file.position(group.start()).column == 1 {
                    selected.insert(idx);
                }
            }
        }
        Scope::Decl => {
            selected.extend(interior.iter().copied());
            selected.extend(doc_set.iter().copied());
        }
    }
    // The cgo preamble is C code, not prose.
    for idx in &cgo_docs {
        selected.remove(idx);
    }

    let mut records = Vec::with_capacity(selected.len());
    for idx in selected {
        let group = &file.comments[idx];
        let start = file.position(group.start());
        let end_line = file.position(group.end().saturating_sub(1)).line;
        if end_line > file.line_count() {
            bail!(
                "invalid line number inside comment: {}:{}",
                file.filename,
                start.line
            );
        }
        let lines = (start.line..=end_line)
            .map(|n| file.line(n).to_string())
            .collect();
        let parts = group
            .parts
            .iter()
            .map(|p| {
                let pos = file.position(p.start);
                RecordPart {
                    text: p.text.clone(),
                    line: pos.line,
                    column: pos.column,
                }
            })
            .collect();
        records.push(CommentRecord {
            lines,
            parts,
            kind: if group.parts[0].is_block() {
                CommentKind::Block
            } else {
                CommentKind::Line
            },
            decl: doc_set.contains(&idx) || interior.contains(&idx),
            start,
        });
    }
    Ok(records)
}

/// Comment groups nested one indentation level inside a parenthesized
/// declaration group: `const (...)`, `var (...)`.
fn block_interior_groups(file: &GoFile) -> BTreeSet<usize> {
    let mut interior = BTreeSet::new();
    for decl in &file.decls {
        let Some((lparen, rparen)) = decl.paren_span else {
            continue;
        };
        for (idx, group) in file.comments.iter().enumerate() {
            let start = group.start();
            if start <= lparen || start >= rparen {
                continue;
            }
            if file.position(start).column != BLOCK_INTERIOR_COLUMN {
                continue;
            }
            interior.insert(idx);
        }
    }
    interior
}

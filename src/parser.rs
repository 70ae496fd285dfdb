//! Lightweight lexical scanner for Go source files.
//!
//! The linter only needs comment groups, top level declarations and exact
//! positions, so a full Go parser would be overkill. The scanner tracks
//! string/rune/raw-string literals (comment markers inside them must not be
//! misread), brace and parenthesis depth, and line boundaries.

use anyhow::{bail, Result};

/// A position in a source file. Line and column indexes start from 1,
/// column is a byte offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A single `//` or `/* */` comment, verbatim, with its byte span.
#[derive(Debug, Clone)]
pub struct CommentPart {
    /// Comment text including markers, e.g. `// hello` or `/* hello */`.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl CommentPart {
    pub fn is_block(&self) -> bool {
        self.text.starts_with("/*")
    }
}

/// A sequence of comments with no other tokens and no blank lines between.
#[derive(Debug, Clone)]
pub struct CommentGroup {
    pub parts: Vec<CommentPart>,
}

impl CommentGroup {
    pub fn start(&self) -> usize {
        self.parts[0].start
    }

    pub fn end(&self) -> usize {
        self.parts[self.parts.len() - 1].end
    }
}

/// Kind of a top level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `func` declaration.
    Func,
    /// General declaration: `import`, `type`, `const`, `var`.
    Gen,
}

/// A top level declaration detected at column 1.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    /// Byte offset of the declaration keyword.
    pub start: usize,
    /// Index of the attached doc comment group, if any.
    pub doc: Option<usize>,
    /// Byte offsets of `(` and `)` for parenthesized declaration groups
    /// like `const (...)`.
    pub paren_span: Option<(usize, usize)>,
    /// True for the cgo pseudo-import `import "C"`.
    pub is_cgo_import: bool,
}

/// A parsed Go source file: declarations, comment groups and a position
/// resolver. Immutable after parsing.
#[derive(Debug)]
pub struct GoFile {
    pub filename: String,
    src: String,
    line_starts: Vec<usize>,
    pub decls: Vec<Decl>,
    pub comments: Vec<CommentGroup>,
    /// Set when the file contains `//line` or `/*line` directives, which
    /// remap reported positions and make them unusable for fixes.
    pub has_line_directives: bool,
}

impl GoFile {
    /// Scan `src` into declarations and comment groups.
    pub fn parse(filename: impl Into<String>, src: impl Into<String>) -> Result<GoFile> {
        let filename = filename.into();
        let src = src.into();
        let line_starts = line_starts(&src);

        let (raw_comments, mut decls, has_line_directives) = {
            let mut scanner = Scanner {
                filename: &filename,
                src: src.as_bytes(),
                line_starts: &line_starts,
                raw_comments: Vec::new(),
                decls: Vec::new(),
                has_line_directives: false,
            };
            scanner.scan()?;
            (
                scanner.raw_comments,
                scanner.decls,
                scanner.has_line_directives,
            )
        };

        let comments = group_comments(&src, &line_starts, raw_comments);
        attach_docs(&line_starts, &mut decls, &comments);

        Ok(GoFile {
            filename,
            src,
            line_starts,
            decls,
            comments,
            has_line_directives,
        })
    }

    /// Resolve a byte offset to a file position.
    pub fn position(&self, offset: usize) -> Pos {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Pos {
            line: line_idx + 1,
            column: offset - self.line_starts[line_idx] + 1,
            offset,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The 1-based `n`-th source line, without the trailing newline
    /// (a trailing `\r` from CRLF files is kept).
    pub fn line(&self, n: usize) -> &str {
        let start = self.line_starts[n - 1];
        let end = match self.line_starts.get(n) {
            Some(&next) => next - 1,
            None => self.src.len(),
        };
        &self.src[start..end]
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

fn line_starts(src: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

struct RawComment {
    start: usize,
    end: usize,
}

struct Scanner<'a> {
    filename: &'a str,
    src: &'a [u8],
    line_starts: &'a [usize],
    raw_comments: Vec<RawComment>,
    decls: Vec<Decl>,
    has_line_directives: bool,
}

impl Scanner<'_> {
    fn scan(&mut self) -> Result<()> {
        let src = self.src;
        let mut i = 0;
        let mut line_idx = 0;
        let mut brace_depth = 0usize;
        let mut paren_depth = 0usize;
        // Gen declaration that may be followed by a `(` group on the same line.
        let mut pending_paren: Option<usize> = None;
        // Open parenthesized declaration group: (decl index, depth at lparen).
        let mut open_group: Option<(usize, usize)> = None;
        // Import declaration whose path literals are still being scanned.
        let mut current_import: Option<usize> = None;

        while i < src.len() {
            while line_idx + 1 < self.line_starts.len() && self.line_starts[line_idx + 1] <= i {
                line_idx += 1;
            }
            let at_line_start = i == self.line_starts[line_idx];
            let b = src[i];

            // Top level declaration keywords start at column 1.
            if at_line_start
                && brace_depth == 0
                && paren_depth == 0
                && b.is_ascii_lowercase()
            {
                let word_end = ident_end(src, i);
                let word = &src[i..word_end];
                let kind = match word {
                    b"func" => Some(DeclKind::Func),
                    b"import" | b"type" | b"const" | b"var" => Some(DeclKind::Gen),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.decls.push(Decl {
                        kind,
                        start: i,
                        doc: None,
                        paren_span: None,
                        is_cgo_import: false,
                    });
                    let idx = self.decls.len() - 1;
                    if kind == DeclKind::Gen {
                        pending_paren = Some(idx);
                        if word == b"import" {
                            current_import = Some(idx);
                        }
                    }
                    i = word_end;
                    continue;
                }
            }

            match b {
                b'/' if i + 1 < src.len() && src[i + 1] == b'/' => {
                    let end = line_end(src, i);
                    self.note_comment(i, end, at_line_start);
                    i = end;
                }
                b'/' if i + 1 < src.len() && src[i + 1] == b'*' => {
                    let end = match find(src, i + 2, b"*/") {
                        Some(close) => close + 2,
                        None => {
                            let pos = self.pos_of(i, line_idx);
                            bail!("{}:{}: comment not terminated", self.filename, pos);
                        }
                    };
                    self.note_comment(i, end, at_line_start);
                    i = end;
                }
                b'"' => {
                    let end = scan_string(src, i);
                    if let Some(d) = current_import {
                        if &src[i..end] == b"\"C\"" {
                            self.decls[d].is_cgo_import = true;
                        }
                    }
                    pending_paren = None;
                    i = end;
                }
                b'`' => {
                    i = scan_raw_string(src, i);
                    pending_paren = None;
                }
                b'\'' => {
                    i = scan_rune(src, i);
                    pending_paren = None;
                }
                b'(' => {
                    if let Some(d) = pending_paren.take() {
                        open_group = Some((d, paren_depth));
                        self.decls[d].paren_span = Some((i, i));
                    }
                    paren_depth += 1;
                    i += 1;
                }
                b')' => {
                    paren_depth = paren_depth.saturating_sub(1);
                    if let Some((d, depth)) = open_group {
                        if paren_depth == depth {
                            let (lparen, _) = self.decls[d].paren_span.unwrap_or((i, i));
                            self.decls[d].paren_span = Some((lparen, i));
                            open_group = None;
                            if current_import == Some(d) {
                                current_import = None;
                            }
                        }
                    }
                    i += 1;
                }
                b'{' => {
                    brace_depth += 1;
                    pending_paren = None;
                    i += 1;
                }
                b'}' => {
                    brace_depth = brace_depth.saturating_sub(1);
                    i += 1;
                }
                b'\n' => {
                    pending_paren = None;
                    if open_group.is_none() {
                        current_import = None;
                    }
                    i += 1;
                }
                b' ' | b'\t' | b'\r' => {
                    i += 1;
                }
                _ => {
                    pending_paren = None;
                    i += 1;
                }
            }
        }
        Ok(())
    }

    fn note_comment(&mut self, start: usize, end: usize, at_line_start: bool) {
        let text = &self.src[start..end];
        if at_line_start && (text.starts_with(b"//line ") || text.starts_with(b"/*line ")) {
            self.has_line_directives = true;
        }
        self.raw_comments.push(RawComment { start, end });
    }

    fn pos_of(&self, offset: usize, line_idx: usize) -> String {
        format!("{}:{}", line_idx + 1, offset - self.line_starts[line_idx] + 1)
    }
}

fn ident_end(src: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < src.len() && (src[i].is_ascii_alphanumeric() || src[i] == b'_') {
        i += 1;
    }
    i
}

fn line_end(src: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < src.len() && src[i] != b'\n' {
        i += 1;
    }
    i
}

fn find(src: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if src.len() < needle.len() {
        return None;
    }
    (from..=src.len() - needle.len()).find(|&i| &src[i..i + needle.len()] == needle)
}

/// Scan an interpreted string literal, returning the offset past the
/// closing quote. Unterminated literals stop at the end of the line.
fn scan_string(src: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < src.len() && src[i] != b'\n' {
        match src[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    i
}

fn scan_raw_string(src: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < src.len() {
        if src[i] == b'`' {
            return i + 1;
        }
        i += 1;
    }
    i
}

fn scan_rune(src: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < src.len() && src[i] != b'\n' {
        match src[i] {
            b'\\' => i += 2,
            b'\'' => return i + 1,
            _ => i += 1,
        }
    }
    i
}

/// Group adjacent comments the way go/ast does: consecutive lines, nothing
/// but whitespace before each comment, nothing after the previous one.
fn group_comments(src: &str, line_starts: &[usize], raw: Vec<RawComment>) -> Vec<CommentGroup> {
    let mut groups: Vec<CommentGroup> = Vec::new();
    let mut prev_end_line = 0;
    let mut prev_joinable = false;

    for c in raw {
        let start_line = line_of(line_starts, c.start);
        let end_line = line_of(line_starts, c.end.saturating_sub(1).max(c.start));
        let only_ws_before = src[line_starts[start_line - 1]..c.start]
            .bytes()
            .all(|b| b == b' ' || b == b'\t');
        let part = CommentPart {
            text: src[c.start..c.end].to_string(),
            start: c.start,
            end: c.end,
        };

        let joins = prev_joinable && only_ws_before && start_line == prev_end_line + 1;
        if joins {
            groups
                .last_mut()
                .expect("joinable comment requires a previous group")
                .parts
                .push(part);
        } else {
            groups.push(CommentGroup { parts: vec![part] });
        }

        // The next comment can join only if nothing follows this one
        // on its last line.
        let rest_end = match line_starts.get(end_line) {
            Some(&next) => next - 1,
            None => src.len(),
        };
        prev_joinable = src[c.end..rest_end].bytes().all(|b| b == b' ' || b == b'\t' || b == b'\r');
        prev_end_line = end_line;
    }
    groups
}

fn line_of(line_starts: &[usize], offset: usize) -> usize {
    match line_starts.binary_search(&offset) {
        Ok(i) => i + 1,
        Err(i) => i,
    }
}

/// Attach doc comments: a group at column 1 ending on the line directly
/// above a declaration documents it.
fn attach_docs(line_starts: &[usize], decls: &mut [Decl], comments: &[CommentGroup]) {
    for decl in decls.iter_mut() {
        let decl_line = line_of(line_starts, decl.start);
        if decl_line < 2 {
            continue;
        }
        for (idx, group) in comments.iter().enumerate() {
            let start = group.start();
            let at_column_1 = line_starts[line_of(line_starts, start) - 1] == start;
            let end_line = line_of(line_starts, group.end().saturating_sub(1));
            if at_column_1 && end_line == decl_line - 1 {
                decl.doc = Some(idx);
                break;
            }
        }
    }
}

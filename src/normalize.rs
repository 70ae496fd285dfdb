//! Comment text normalization.
//!
//! Converts a comment record into a flat logical text block. Lines that are
//! not prose (code examples, machine tags, URLs, cgo markers, example
//! output blocks) are replaced with empty placeholder lines, so they can
//! never produce an issue while line-indexed positions stay valid: the
//! normalized text always has exactly as many logical lines as the comment
//! has physical lines.

use anyhow::{Context, Result};
use regex_automata::meta::Regex;

use crate::extract::{CommentKind, CommentRecord};

/// Immutable pattern tables, compiled once at linter construction.
#[derive(Debug)]
pub struct PatternSet {
    /// Machine tags like `// nolint:` or `// +k8s:`.
    tags: Regex,
    /// Hashtags like `// #nosec`.
    hashtags: Regex,
    /// URL at the end of a line.
    end_url: Regex,
    /// godoc example output marker: `// Output:` or `// Unordered output:`.
    output_marker: Regex,
    /// Caller-supplied exclusion patterns, each tested independently.
    exclude: Vec<Regex>,
}

impl PatternSet {
    /// Compile the built-in tables plus caller-supplied exclusion patterns.
    /// Invalid exclusion syntax is a configuration error and is surfaced
    /// here, before any scanning begins.
    pub fn new(exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid exclusion pattern '{p}'")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            tags: Regex::new(r"^\+?[a-z0-9]+:").context("compile tags pattern")?,
            hashtags: Regex::new(r"^#[a-z]+($|\s)").context("compile hashtags pattern")?,
            end_url: Regex::new(r"[a-z]+://[^\s]+$").context("compile url pattern")?,
            output_marker: Regex::new(r"(?i)^(unordered )?output:")
                .context("compile output marker pattern")?,
            exclude,
        })
    }

    /// A line that should not be checked as a regular sentence.
    fn is_special_line(&self, line: &str) -> bool {
        // cgo export markers keep their exact form.
        if line.starts_with("//export ") {
            return true;
        }

        let mut content = line;
        content = content.strip_prefix("//").unwrap_or(content);
        content = content.strip_prefix("/*").unwrap_or(content);

        // Space indentation marks embedded code examples.
        if content.starts_with("  ")
            || content.starts_with(" \t")
            || content.starts_with('\t')
        {
            return true;
        }

        let trimmed = content.trim();
        if self.tags.is_match(trimmed)
            || self.hashtags.is_match(trimmed)
            || self.end_url.is_match(trimmed)
            || trimmed.starts_with("+build")
        {
            return true;
        }
        self.exclude.iter().any(|re| re.is_match(trimmed))
    }
}

/// Flatten a comment record into its logical text, one logical line per
/// physical line, with markers stripped and special content blanked out.
pub fn normalize(record: &CommentRecord, patterns: &PatternSet) -> String {
    let placeholder_block = || vec![String::new(); record.lines.len()].join("\n");

    // A lone block comment full of C code (the body of a cgo preamble put
    // somewhere other than above `import "C"`) is skipped wholesale.
    if record.parts.len() == 1
        && record.kind == CommentKind::Block
        && is_special_block(&record.parts[0].text)
    {
        return placeholder_block();
    }

    // Example output annotations are excluded as a unit.
    if record.kind == CommentKind::Line && is_output_block(record, patterns) {
        return placeholder_block();
    }

    let mut lines: Vec<String> = Vec::with_capacity(record.lines.len());
    for part in &record.parts {
        if part.text.starts_with("/*") {
            let mut text = part.text.strip_prefix("/*").unwrap_or(&part.text);
            text = text.strip_suffix("*/").unwrap_or(text);
            for line in text.split('\n') {
                if patterns.is_special_line(line) {
                    lines.push(String::new());
                } else {
                    lines.push(line.to_string());
                }
            }
        } else if patterns.is_special_line(&part.text) {
            lines.push(String::new());
        } else {
            let stripped = part.text.strip_prefix("//").unwrap_or(&part.text);
            lines.push(stripped.to_string());
        }
    }
    lines.join("\n")
}

/// A block of comment lines that is C code rather than prose.
fn is_special_block(text: &str) -> bool {
    text.starts_with("/*") && (text.contains("#include") || text.contains("#define"))
}

/// godoc convention: a `// Output:` comment inside an example function
/// holds the program's expected output, not prose.
fn is_output_block(record: &CommentRecord, patterns: &PatternSet) -> bool {
    for part in &record.parts {
        let content = part.text.strip_prefix("//").unwrap_or(&part.text).trim();
        if content.is_empty() {
            continue;
        }
        return patterns.output_marker.is_match(content);
    }
    false
}

//! The linter itself: extraction, normalization and checks wired together,
//! plus in-place fixing.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::checks::{
    check_capital, check_period, AbbreviationList, NO_CAPITAL_MESSAGE, NO_PERIOD_MESSAGE,
};
use crate::extract::extract_comments;
use crate::normalize::{normalize, PatternSet};
use crate::parser::GoFile;
use crate::position::{insert_period, map_to_file, FilePos};
use crate::settings::Settings;

/// One detected violation: a position, a message, and a replacement line
/// when the violation is auto-fixable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub pos: FilePos,
    pub message: String,
    /// Full corrected source line, present only for period issues.
    pub replacement: Option<String>,
}

/// Comment punctuation linter with compiled settings.
#[derive(Debug)]
pub struct Linter {
    settings: Settings,
    patterns: PatternSet,
    abbreviations: AbbreviationList,
}

impl Linter {
    /// Build a linter, compiling all patterns. Invalid exclusion regexes
    /// fail here, before any file is scanned.
    pub fn new(settings: Settings) -> Result<Self> {
        let patterns = PatternSet::new(&settings.exclude)?;
        Ok(Self {
            settings,
            patterns,
            abbreviations: AbbreviationList::new(),
        })
    }

    /// Run all enabled checks on a parsed file. Issues are sorted by
    /// (filename, line, column).
    pub fn run(&self, file: &GoFile) -> Result<Vec<Issue>> {
        let records = extract_comments(file, self.settings.scope)?;
        debug!(
            file = %file.filename,
            comments = records.len(),
            scope = %self.settings.scope,
            "extracted comments"
        );

        let mut issues = Vec::new();
        for record in &records {
            let text = normalize(record, &self.patterns);

            if self.settings.period {
                if let Some(pos) = check_period(&text) {
                    let mapped = map_to_file(&file.filename, record, pos)?;
                    let raw = &record.lines[pos.line - 1];
                    issues.push(Issue {
                        pos: mapped.pos,
                        message: NO_PERIOD_MESSAGE.to_string(),
                        replacement: Some(insert_period(raw, mapped.rune_index)),
                    });
                }
            }

            if self.settings.capital {
                for pos in check_capital(&text, record.decl, &self.abbreviations) {
                    let mapped = map_to_file(&file.filename, record, pos)?;
                    issues.push(Issue {
                        pos: mapped.pos,
                        message: NO_CAPITAL_MESSAGE.to_string(),
                        replacement: None,
                    });
                }
            }
        }

        issues.sort_by(|a, b| {
            (&a.pos.filename, a.pos.line, a.pos.column).cmp(&(
                &b.pos.filename,
                b.pos.line,
                b.pos.column,
            ))
        });
        Ok(issues)
    }

    /// Fix all issues and return the corrected file content. Returns
    /// `None` for a zero-length file. Only lines with a replacement are
    /// touched; everything else round-trips byte for byte, including the
    /// presence or absence of a trailing newline.
    ///
    /// At most one replacement is applied per physical line. Capital
    /// issues carry no replacement, so when both kinds land on one line
    /// the period fix wins.
    pub fn fix(&self, path: &Path, file: &GoFile) -> Result<Option<Vec<u8>>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read file {}", path.display()))?;
        if content.is_empty() {
            return Ok(None);
        }

        let issues = self.run(file)?;
        let replacements: HashMap<usize, &str> = issues
            .iter()
            .filter_map(|iss| {
                iss.replacement
                    .as_deref()
                    .map(|rep| (iss.pos.line, rep))
            })
            .collect();

        let fixed: Vec<&str> = content
            .split('\n')
            .enumerate()
            .map(|(i, line)| replacements.get(&(i + 1)).copied().unwrap_or(line))
            .collect();
        Ok(Some(fixed.join("\n").into_bytes()))
    }

    /// Rewrite the original file with its fixed version, preserving the
    /// original permission mode.
    pub fn replace(&self, path: &Path, file: &GoFile) -> Result<()> {
        let meta = fs::metadata(path)
            .with_context(|| format!("check file {}", path.display()))?;

        let Some(fixed) = self.fix(path, file)? else {
            return Ok(());
        };

        fs::write(path, fixed).with_context(|| format!("write file {}", path.display()))?;
        fs::set_permissions(path, meta.permissions())
            .with_context(|| format!("restore mode of {}", path.display()))?;
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Scope;

    fn linter(settings: Settings) -> Linter {
        Linter::new(settings).unwrap()
    }

    fn run_on(src: &str, settings: Settings) -> Vec<Issue> {
        let file = GoFile::parse("main.go", src).unwrap();
        linter(settings).run(&file).unwrap()
    }

    #[test]
    fn test_period_issue_on_line_comment() {
        let settings = Settings {
            scope: Scope::Top,
            ..Settings::default()
        };
        let issues = run_on("// Hello, world\npackage main\n", settings);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pos.line, 1);
        assert_eq!(issues[0].pos.column, 16);
        assert_eq!(issues[0].message, NO_PERIOD_MESSAGE);
        assert_eq!(issues[0].replacement.as_deref(), Some("// Hello, world."));
    }

    #[test]
    fn test_period_issue_on_block_comment() {
        let settings = Settings {
            scope: Scope::Top,
            ..Settings::default()
        };
        let issues = run_on("/*\nHello, world\n*/\npackage main\n", settings);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pos.line, 2);
        assert_eq!(issues[0].pos.column, 13);
        assert_eq!(issues[0].replacement.as_deref(), Some("Hello, world."));
    }

    #[test]
    fn test_capital_issue_has_no_replacement() {
        let settings = Settings {
            scope: Scope::Top,
            capital: true,
            ..Settings::default()
        };
        let issues = run_on("// hello, world.\npackage main\n", settings);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, NO_CAPITAL_MESSAGE);
        assert_eq!(issues[0].pos.line, 1);
        assert_eq!(issues[0].pos.column, 4);
        assert!(issues[0].replacement.is_none());
    }

    #[test]
    fn test_decl_scope_ignores_free_comments() {
        let src = "\
// Free comment without period
package main

// Documented returns nothing
func Documented() {}
";
        let settings = Settings::default();
        let issues = run_on(src, settings);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pos.line, 4);
    }

    #[test]
    fn test_declaration_comment_skips_first_sentence_capital() {
        let src = "\
// helper does a thing. more detail here.
func helper() {}
";
        let settings = Settings {
            capital: true,
            period: false,
            ..Settings::default()
        };
        let issues = run_on(src, settings);
        // Only the second sentence is flagged.
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pos.column, 25);
    }

    #[test]
    fn test_cgo_block_produces_no_issues() {
        let src = "/* #include <stdio.h> */\npackage main\n";
        let settings = Settings {
            scope: Scope::All,
            capital: true,
            ..Settings::default()
        };
        assert!(run_on(src, settings).is_empty());
    }

    #[test]
    fn test_issues_sorted_by_position() {
        let src = "\
package main

// second comment without period
var b int

// first comment without period
var a int
";
        let settings = Settings {
            scope: Scope::Top,
            ..Settings::default()
        };
        let issues = run_on(src, settings);
        let lines: Vec<usize> = issues.iter().map(|i| i.pos.line).collect();
        assert_eq!(lines, vec![3, 6]);
    }

    #[test]
    fn test_exclusion_pattern_suppresses_issue() {
        let src = "// FIXME handle this later\npackage main\n";
        let base = Settings {
            scope: Scope::Top,
            ..Settings::default()
        };
        assert_eq!(run_on(src, base.clone()).len(), 1);

        let settings = Settings {
            exclude: vec!["^FIXME ".to_string()],
            ..base
        };
        assert!(run_on(src, settings).is_empty());
    }

    #[test]
    fn test_invalid_exclusion_pattern_fails_construction() {
        let settings = Settings {
            exclude: vec!["(broken".to_string()],
            ..Settings::default()
        };
        assert!(Linter::new(settings).is_err());
    }
}

// End-to-end checks of the public linting API on in-memory Go sources.

use dotgo::{GoFile, Linter, Scope, Settings};

fn run(src: &str, settings: Settings) -> Vec<dotgo::Issue> {
    let file = GoFile::parse("main.go", src).unwrap();
    Linter::new(settings).unwrap().run(&file).unwrap()
}

fn top_settings() -> Settings {
    Settings {
        scope: Scope::Top,
        ..Settings::default()
    }
}

#[test]
fn period_issue_for_line_comment() {
    let issues = run("// Hello, world\npackage main\n", top_settings());
    assert_eq!(issues.len(), 1);
    let iss = &issues[0];
    assert_eq!((iss.pos.line, iss.pos.column), (1, 16));
    assert_eq!(iss.pos.filename, "main.go");
    assert_eq!(iss.replacement.as_deref(), Some("// Hello, world."));
}

#[test]
fn period_issue_for_block_comment() {
    let issues = run("/*\nHello, world\n*/\npackage main\n", top_settings());
    assert_eq!(issues.len(), 1);
    assert_eq!((issues[0].pos.line, issues[0].pos.column), (2, 13));
    assert_eq!(issues[0].replacement.as_deref(), Some("Hello, world."));
}

#[test]
fn capital_issue_for_free_comment() {
    let settings = Settings {
        capital: true,
        ..top_settings()
    };
    let issues = run("// hello, world.\npackage main\n", settings);
    assert_eq!(issues.len(), 1);
    assert_eq!((issues[0].pos.line, issues[0].pos.column), (1, 4));
    assert!(issues[0].replacement.is_none());
}

#[test]
fn native_code_block_is_silent() {
    let settings = Settings {
        scope: Scope::All,
        capital: true,
        ..Settings::default()
    };
    let src = "/*\n#include <stdio.h>\nint add(int a, int b);\n*/\npackage main\n";
    assert!(run(src, settings).is_empty());
}

#[test]
fn decl_scope_flags_only_declaration_comments() {
    let src = "\
// Freestanding comment without period
package main

// Exported does something
func Exported() {}

// another freestanding comment without period
";
    let issues = run(src, Settings::default());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].pos.line, 4);
}

#[test]
fn valid_terminators_produce_no_issues() {
    let comments = [
        "// Ends with a period.",
        "// Ends with a question mark?",
        "// Ends with an exclamation mark!",
        "// Ends inside parenthesis (like this.)",
        "// Ends with a colon introducing code:",
    ];
    for comment in comments {
        let src = format!("{comment}\npackage main\n");
        assert!(
            run(&src, top_settings()).is_empty(),
            "comment: {comment}"
        );
    }
}

#[test]
fn trailing_excluded_lines_are_ignored_for_period() {
    // The URL line is a placeholder; the last prose line decides.
    let src = "\
// Description ends properly.
// https://example.com/more-info
package main
";
    assert!(run(src, top_settings()).is_empty());
}

#[test]
fn multibyte_comment_gets_byte_accurate_column() {
    let src = "// Комментарий без точки\npackage main\n";
    let issues = run(src, top_settings());
    assert_eq!(issues.len(), 1);
    // Column is one past the last byte of the line.
    assert_eq!(issues[0].pos.column, "// Комментарий без точки".len() + 1);
    assert_eq!(
        issues[0].replacement.as_deref(),
        Some("// Комментарий без точки.")
    );
}

#[test]
fn issues_sorted_by_line_and_column() {
    let settings = Settings {
        scope: Scope::All,
        capital: true,
        ..Settings::default()
    };
    let src = "\
package main

// first issue is the capital, second the missing period

var x int
";
    let issues = run(src, settings);
    assert_eq!(issues.len(), 2);
    assert!(issues[0].pos.column < issues[1].pos.column);
    assert_eq!(issues[0].pos.line, issues[1].pos.line);
}

#[test]
fn empty_file_produces_no_issues() {
    assert!(run("", top_settings()).is_empty());
}

#[test]
fn line_directives_are_rejected() {
    let src = "//line generated.go:1\npackage main\n";
    let file = GoFile::parse("gen.go", src).unwrap();
    let linter = Linter::new(top_settings()).unwrap();
    assert!(linter.run(&file).is_err());
}

#[test]
fn issues_serialize_to_json() {
    let issues = run("// Hello, world\npackage main\n", top_settings());
    let json = serde_json::to_string(&issues).unwrap();
    assert!(json.contains("\"line\":1"));
    assert!(json.contains("Comment should end in a period"));
}

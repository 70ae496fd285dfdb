// Fix and replace behavior against real files: round-trip fidelity,
// idempotence, and permission preservation.

use std::fs;
use std::path::PathBuf;

use dotgo::{GoFile, Linter, Scope, Settings};
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn linter() -> Linter {
    Linter::new(Settings {
        scope: Scope::Top,
        ..Settings::default()
    })
    .unwrap()
}

fn fix_content(path: &PathBuf) -> Option<Vec<u8>> {
    let src = fs::read_to_string(path).unwrap();
    let file = GoFile::parse(path.display().to_string(), src).unwrap();
    linter().fix(path, &file).unwrap()
}

#[test]
fn fix_touches_only_issue_lines() {
    let dir = TempDir::new().unwrap();
    let original = "\
// Comment without period
package main

// Fine comment.
func main() {}
";
    let path = write_source(&dir, "main.go", original);
    let fixed = String::from_utf8(fix_content(&path).unwrap()).unwrap();

    let expected = "\
// Comment without period.
package main

// Fine comment.
func main() {}
";
    assert_eq!(fixed, expected);

    // Every untouched line is byte identical.
    for (orig, new) in original.split('\n').zip(fixed.split('\n')).skip(1) {
        assert_eq!(orig, new);
    }
}

#[test]
fn fix_preserves_missing_trailing_newline() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "main.go", "// No period\npackage main");
    let fixed = String::from_utf8(fix_content(&path).unwrap()).unwrap();
    assert_eq!(fixed, "// No period.\npackage main");
}

#[test]
fn fix_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "main.go", "// Needs a period\npackage main\n");

    let first = fix_content(&path).unwrap();
    fs::write(&path, &first).unwrap();

    let src = fs::read_to_string(&path).unwrap();
    let file = GoFile::parse(path.display().to_string(), src).unwrap();
    assert!(linter().run(&file).unwrap().is_empty());

    let second = fix_content(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fix_returns_none_for_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "empty.go", "");
    assert!(fix_content(&path).is_none());
}

#[test]
fn replace_rewrites_file_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "main.go", "// Needs a period\npackage main\n");

    let src = fs::read_to_string(&path).unwrap();
    let file = GoFile::parse(path.display().to_string(), src).unwrap();
    linter().replace(&path, &file).unwrap();

    let rewritten = fs::read_to_string(&path).unwrap();
    assert_eq!(rewritten, "// Needs a period.\npackage main\n");
}

#[cfg(unix)]
#[test]
fn replace_preserves_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "main.go", "// Needs a period\npackage main\n");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o754);
    fs::set_permissions(&path, perms).unwrap();

    let src = fs::read_to_string(&path).unwrap();
    let file = GoFile::parse(path.display().to_string(), src).unwrap();
    linter().replace(&path, &file).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o754);
}

#[test]
fn fix_applies_replacement_inside_block_comment() {
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "main.go",
        "/*\nFirst line stays\nLast line needs a period\n*/\npackage main\n",
    );
    let fixed = String::from_utf8(fix_content(&path).unwrap()).unwrap();
    assert_eq!(
        fixed,
        "/*\nFirst line stays\nLast line needs a period.\n*/\npackage main\n"
    );
}

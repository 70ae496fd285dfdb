use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use walkdir::WalkDir;

use dotgo::{GoFile, Issue, Linter, Scope, Settings};

const DEFAULT_CONFIG_FILE: &str = ".dotgo.toml";

#[derive(Parser, Debug)]
#[command(name = "dotgo")]
#[command(about = "Checks if comments in Go source files end in a period")]
#[command(version)]
struct Args {
    /// Files or directories to check (directories are walked recursively)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which comments to check: decl, top or all
    #[arg(long)]
    scope: Option<Scope>,

    /// Also check that sentences start with a capital letter
    #[arg(long)]
    capital: bool,

    /// Fix issues and print the fixed version to stdout
    #[arg(short, long)]
    fix: bool,

    /// Fix issues and write the result to the original files
    #[arg(short, long)]
    write: bool,

    /// Print issues as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(found_issues) => {
            if found_issues {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(scope) = args.scope {
        settings.scope = scope;
    }
    if args.capital {
        settings.capital = true;
    }
    debug!(?settings, "resolved settings");

    let linter = Linter::new(settings)?;

    let mut files = Vec::new();
    for path in &args.paths {
        if !path.exists() {
            bail!("path '{}' does not exist", path.display());
        }
        collect_go_files(path, &mut files)?;
    }
    info!("checking {} files", files.len());

    let mut all_issues: Vec<Issue> = Vec::new();
    for path in &files {
        let src = fs::read_to_string(path)
            .with_context(|| format!("read file {}", path.display()))?;
        let file = GoFile::parse(path.display().to_string(), src)
            .with_context(|| format!("parse file {}", path.display()))?;

        if args.fix {
            let fixed = linter
                .fix(path, &file)
                .with_context(|| format!("fix file {}", path.display()))?;
            if let Some(content) = fixed {
                print!("{}", String::from_utf8_lossy(&content));
            }
        } else if args.write {
            linter
                .replace(path, &file)
                .with_context(|| format!("rewrite file {}", path.display()))?;
        } else {
            let issues = linter
                .run(&file)
                .with_context(|| format!("run linter on file {}", path.display()))?;
            all_issues.extend(issues);
        }
    }

    if args.fix || args.write {
        return Ok(false);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&all_issues)?);
    } else {
        for iss in &all_issues {
            println!("{}: {}", iss.message, iss.pos);
        }
    }
    Ok(!all_issues.is_empty())
}

/// Load settings from an explicit config file, the default config file if
/// present, or fall back to defaults.
fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(Settings::default());
            }
            default
        }
    };
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let settings = toml::from_str(&raw)
        .with_context(|| format!("parse config file {}", path.display()))?;
    Ok(settings)
}

/// Collect `.go` files from a path, walking directories recursively and
/// skipping vendored and testdata trees.
fn collect_go_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
        files.push(path.to_path_buf());
        return Ok(());
    }
    for entry in WalkDir::new(path).into_iter().filter_entry(|e| {
        let name = e.file_name().to_string_lossy();
        !(e.file_type().is_dir() && (name == "vendor" || name == "testdata"))
    }) {
        let entry = entry.with_context(|| format!("walk directory {}", path.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "go")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(())
}

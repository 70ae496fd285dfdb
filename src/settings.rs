use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Which comments a check run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Comments attached to top level declarations, plus comments inside
    /// parenthesized declaration groups.
    Decl,
    /// Everything in `Decl`, plus every comment starting at column 1.
    Top,
    /// Every comment in the file.
    All,
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decl" => Ok(Scope::Decl),
            "top" => Ok(Scope::Top),
            "all" => Ok(Scope::All),
            other => Err(format!(
                "unknown scope '{other}', expected one of: decl, top, all"
            )),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Decl => write!(f, "decl"),
            Scope::Top => write!(f, "top"),
            Scope::All => write!(f, "all"),
        }
    }
}

/// Linter settings, loadable from a TOML config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Which comments to check. Defaults to `decl`.
    pub scope: Scope,
    /// Check that the last sentence of each comment ends in a period.
    pub period: bool,
    /// Check that each sentence starts with a capital letter.
    pub capital: bool,
    /// Extra regular expressions for comment lines to exclude from checks.
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scope: Scope::Decl,
            period: true,
            capital: false,
            exclude: Vec::new(),
        }
    }
}

//! Rules file parsing (`path.txt`).
//!
//! One rule per line:
//!
//! ```text
//! # full-line comment
//! C:\tools\                      <- every *.exe in the directory
//! C:\tools\ # *.exe foo.exe:bar  <- bare globs and glob:alias tokens
//! ```

use glob::Pattern;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pattern used when a rule names no patterns.
pub const DEFAULT_PATTERN: &str = "*.exe";

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("line {line}: invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        line: usize,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("line {line}: malformed alias '{token}' (expected glob:alias)")]
    MalformedAlias { line: usize, token: String },
}

/// A single file-selection pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSpec {
    /// Output takes the matched file's own name.
    Bare(Pattern),
    /// Output is renamed to `alias` regardless of the matched name.
    Aliased { glob: Pattern, alias: String },
}

impl PatternSpec {
    pub fn glob(&self) -> &Pattern {
        match self {
            PatternSpec::Bare(glob) => glob,
            PatternSpec::Aliased { glob, .. } => glob,
        }
    }

    /// Name of the artifact produced for `file_name` by this pattern.
    pub fn output_name<'a>(&'a self, file_name: &'a str) -> &'a str {
        match self {
            PatternSpec::Bare(_) => file_name,
            PatternSpec::Aliased { alias, .. } => alias,
        }
    }

    pub fn is_aliased(&self) -> bool {
        matches!(self, PatternSpec::Aliased { .. })
    }
}

/// One configured directory and the patterns applied to its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRule {
    pub directory: PathBuf,
    pub patterns: Vec<PatternSpec>,
    /// 1-based line in the rules file.
    pub line: usize,
}

/// Result of parsing a rules file.
#[derive(Debug, Default)]
pub struct ParsedRules {
    pub rules: Vec<ScanRule>,
    /// Directories named by the file that do not exist on this machine.
    pub missing: Vec<PathBuf>,
}

/// Parse the rules file text. Relative directories resolve against `base`.
pub fn parse_rules(text: &str, base: &Path) -> Result<ParsedRules, RuleError> {
    let mut parsed = ParsedRules::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (dir_part, pattern_part) = match line.split_once('#') {
            Some((dir, patterns)) => (dir.trim(), Some(patterns)),
            None => (line, None),
        };

        let directory = resolve_directory(base, dir_part);
        if !directory.is_dir() {
            parsed.missing.push(directory);
            continue;
        }

        let patterns = parse_patterns(line_no, pattern_part)?;

        parsed.rules.push(ScanRule {
            directory,
            patterns,
            line: line_no,
        });
    }

    Ok(parsed)
}

fn resolve_directory(base: &Path, segment: &str) -> PathBuf {
    let joined = base.join(segment);
    std::path::absolute(&joined).unwrap_or(joined)
}

fn parse_patterns(line: usize, segment: Option<&str>) -> Result<Vec<PatternSpec>, RuleError> {
    let tokens: Vec<&str> = segment
        .map(|s| s.split_whitespace().collect())
        .unwrap_or_default();

    if tokens.is_empty() {
        return Ok(vec![PatternSpec::Bare(compile(line, DEFAULT_PATTERN)?)]);
    }

    let mut aliased = Vec::new();
    let mut bare = Vec::new();
    for token in tokens {
        match token.split_once(':') {
            Some((glob, alias)) => {
                if glob.is_empty() || alias.is_empty() || alias.contains(':') {
                    return Err(RuleError::MalformedAlias {
                        line,
                        token: token.to_string(),
                    });
                }
                aliased.push(PatternSpec::Aliased {
                    glob: compile(line, glob)?,
                    alias: alias.to_string(),
                });
            }
            None => bare.push(PatternSpec::Bare(compile(line, token)?)),
        }
    }

    // Aliases rename one specific file, so they are tried before catch-all globs.
    aliased.extend(bare);
    Ok(aliased)
}

/// Compile a shell-style file-name pattern.
///
/// Tokens `glob` rejects but a shell accepts are rewritten first (see
/// [`shell_to_glob`]). Anything still rejected matches literally.
fn compile(line: usize, pattern: &str) -> Result<Pattern, RuleError> {
    Pattern::new(&shell_to_glob(pattern))
        .or_else(|_| Pattern::new(&Pattern::escape(pattern)))
        .map_err(|source| RuleError::InvalidPattern {
            line,
            pattern: pattern.to_string(),
            source,
        })
}

/// Rewrite a file-name pattern into `glob` syntax.
///
/// File names hold no separators, so a run of `*` is a single `*`. A `[`
/// without a closing `]` is a literal bracket.
fn shell_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

// Index of the `]` closing the class opened at `open`. A `]` right after
// `[` or `[!` belongs to the class.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

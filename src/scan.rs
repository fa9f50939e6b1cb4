//! Directory scanning and pattern matching.

use crate::rules::ScanRule;
use anyhow::{Context, Result};
use glob::MatchOptions;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A directory entry selected by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub source: PathBuf,
    pub output_name: String,
    /// Extension of the source file without the dot; empty if none.
    pub extension: String,
}

impl MatchResult {
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn directory(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Glob options following the host filesystem's case rules.
pub fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// Match the direct entries of `rule.directory` against its patterns.
///
/// A rule whose directory vanished since parsing yields nothing.
pub fn scan_rule(rule: &ScanRule) -> Result<Vec<MatchResult>> {
    if !rule.directory.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&rule.directory)
        .with_context(|| format!("Failed to list {}", rule.directory.display()))?;

    let files = regular_files(&rule.directory, entries.map(|e| e.map(|e| e.path())))?;

    let options = match_options();
    let mut matches = Vec::new();

    for path in files {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };

        let Some(spec) = rule
            .patterns
            .iter()
            .find(|spec| spec.glob().matches_with(&file_name, options))
        else {
            continue;
        };

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        matches.push(MatchResult {
            output_name: spec.output_name(&file_name).to_string(),
            source: path,
            extension,
        });
    }

    Ok(matches)
}

/// Keep the regular files among `entries`, sorted. An unreadable entry fails
/// the whole listing.
fn regular_files<I>(dir: &Path, entries: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Scan every rule in order.
pub fn scan_all(rules: &[ScanRule]) -> Result<Vec<MatchResult>> {
    let mut all = Vec::new();
    for rule in rules {
        all.extend(scan_rule(rule)?);
    }
    Ok(all)
}

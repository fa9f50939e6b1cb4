//! Existence-based output deduplication.
//!
//! A match whose output file already exists is "already built" and is
//! dropped. There is no staleness check.

use crate::scan::MatchResult;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Two or more sources in one run that resolve to the same output name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub output_name: String,
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Deduplicated {
    /// Matches with no existing output, in input order.
    pub fresh: Vec<MatchResult>,
    /// Matches dropped because their output exists.
    pub existing: Vec<MatchResult>,
    /// Output names claimed by more than one fresh match.
    pub collisions: Vec<Collision>,
}

pub fn output_path(output_dir: &Path, m: &MatchResult) -> PathBuf {
    output_dir.join(&m.output_name)
}

/// Split `matches` into fresh and already-built sets.
///
/// Fresh matches sharing an output name are reported in `collisions` but
/// all of them are kept; which one ends up on disk is not defined.
pub fn dedup(matches: Vec<MatchResult>, output_dir: &Path) -> Deduplicated {
    let mut result = Deduplicated::default();
    let mut claimed: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for m in matches {
        if output_path(output_dir, &m).exists() {
            result.existing.push(m);
            continue;
        }
        claimed
            .entry(m.output_name.clone())
            .or_default()
            .push(m.source.clone());
        result.fresh.push(m);
    }

    result.collisions = claimed
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(output_name, sources)| Collision {
            output_name,
            sources,
        })
        .collect();

    result
}

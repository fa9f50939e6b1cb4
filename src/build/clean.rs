//! Output and staging cleanup.
//!
//! `shimgen --clean` empties the output directory and the working directory
//! before the scan runs, so stale launchers cannot satisfy the
//! already-built check.

use anyhow::{Context, Result};
use colored::*;

use std::fs;
use std::path::Path;

/// Delete every entry directly inside `output_dir` and `work_dir`.
///
/// Returns the number of entries removed. Missing directories count as clean.
pub fn clean(output_dir: &Path, work_dir: &Path) -> Result<usize> {
    let mut removed = empty_dir(output_dir)?;
    if work_dir != output_dir {
        removed += empty_dir(work_dir)?;
    }

    if removed > 0 {
        println!("{} Clean complete ({} removed).", "✓".green(), removed);
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(removed)
}

fn empty_dir(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        removed += 1;
    }
    Ok(removed)
}

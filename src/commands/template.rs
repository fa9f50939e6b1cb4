//! `shimgen template`: write the built-in launcher template.

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

use crate::template::DEFAULT_TEMPLATE;

/// Write [`DEFAULT_TEMPLATE`] to `path`, refusing to overwrite unless `force`.
///
/// Returns `false` when an existing file was left alone.
pub fn write_default(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            "!".yellow(),
            path.display()
        );
        return Ok(false);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Wrote launcher template {}", "✓".green(), path.display());
    Ok(true)
}

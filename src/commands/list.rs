//! `shimgen list`: show what every rule selects without writing anything.

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::build::{self, Layout};
use crate::config::Config;
use crate::dedup::Deduplicated;
use crate::ui::Table;

/// One table row: source, output, kind, status.
pub fn rows(config: &Config, base: &Path, dedup: &Deduplicated) -> Vec<Vec<String>> {
    let layout = Layout::new(config, base);
    let fresh = dedup.fresh.iter().map(|m| (m, "new"));
    let existing = dedup.existing.iter().map(|m| (m, "exists"));

    let mut rows: Vec<Vec<String>> = fresh
        .chain(existing)
        .map(|(m, status)| {
            vec![
                m.source.display().to_string(),
                layout.output.join(&m.output_name).display().to_string(),
                build::kind_of(config, &m.extension).label().to_string(),
                status.to_string(),
            ]
        })
        .collect();
    rows.sort();
    rows
}

pub fn run(config: &Config, base: &Path) -> Result<()> {
    let plan = build::plan(config, base)?;

    for dir in &plan.parsed.missing {
        println!("{} {} does not exist", "!".yellow(), dir.display());
    }

    let mut table = Table::new(&["Source", "Output", "Kind", "Status"]);
    for row in rows(config, base, &plan.dedup) {
        table.add_row(row);
    }

    if table.is_empty() {
        println!("{} No files matched.", "ℹ".blue());
    } else {
        table.print();
    }
    Ok(())
}

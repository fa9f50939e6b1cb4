use anyhow::Result;
use colored::*;
use notify::{Config, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Re-run `on_change` whenever one of `files` changes.
///
/// Parent directories are watched rather than the files themselves, since
/// editors usually save by replacing the file.
pub fn watch<F>(files: &[PathBuf], mut on_change: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    println!("{} Watching for changes...", "👀".cyan());
    for f in files {
        println!("   {}", f.display());
    }

    let (tx, rx) = channel::<notify::Result<notify::Event>>();
    let config_notify = Config::default().with_poll_interval(Duration::from_secs(1));
    let mut watcher = notify::RecommendedWatcher::new(tx, config_notify)?;

    let mut watched: Vec<&Path> = Vec::new();
    for f in files {
        let dir = match f.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !watched.contains(&dir) && dir.exists() {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            watched.push(dir);
        }
    }

    // First run
    report(on_change());

    while let Ok(event) = rx.recv() {
        let relevant = event
            .map(|e| touches(&e.paths, files))
            .unwrap_or(false);
        // Debounce simple
        std::thread::sleep(Duration::from_millis(100));
        let mut more = false;
        while let Ok(next) = rx.try_recv() {
            more |= next.map(|e| touches(&e.paths, files)).unwrap_or(false);
        }
        if relevant || more {
            println!("{} Rules changed. Regenerating...", "🔄".yellow());
            report(on_change());
        }
    }
    Ok(())
}

fn touches(paths: &[PathBuf], files: &[PathBuf]) -> bool {
    paths
        .iter()
        .any(|p| files.iter().any(|f| p.file_name() == f.file_name()))
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        println!("{} Error: {:#}", "x".red(), e);
    }
}

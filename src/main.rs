//! # shimgen CLI Entry Point
//!
//! Without a subcommand, runs the generation pipeline:
//! toolchain check, optional `--clean`, scan, and build.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::{Path, PathBuf};

use shimgen::build::{self, Layout, RunOptions};
use shimgen::commands;
use shimgen::config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "shimgen")]
#[command(about = "Generate PATH launchers for programs in configured directories", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Empty the output and working directories before generating
    #[arg(long, conflicts_with = "dry_run")]
    clean: bool,
    /// Show what would be generated without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Config file [default: shimgen.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Number of parallel compile jobs [default: logical CPUs]
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Report every skipped directory and file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List matched files and whether their launcher exists
    List,
    /// Write the built-in launcher template to the configured path
    Template {
        /// Overwrite an existing template
        #[arg(long)]
        force: bool,
    },
    /// Regenerate whenever the rules file changes
    Watch,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let base = std::env::current_dir().context("Failed to determine current directory")?;
    let config = load_config(&cli, &base)?;

    match &cli.command {
        None => {
            let opts = RunOptions {
                clean: cli.clean,
                dry_run: cli.dry_run,
                verbose: cli.verbose,
            };
            build::run(&config, &base, opts)?;
            Ok(())
        }

        Some(Commands::List) => commands::list::run(&config, &base),

        Some(Commands::Template { force }) => {
            let layout = Layout::new(&config, &base);
            commands::template::write_default(&layout.template, *force)?;
            Ok(())
        }

        Some(Commands::Watch) => {
            let layout = Layout::new(&config, &base);
            let opts = RunOptions {
                verbose: cli.verbose,
                ..RunOptions::default()
            };
            let mut first = cli.clean;
            build::watch(&[layout.rules.clone(), layout.template.clone()], || {
                let run_opts = RunOptions {
                    clean: std::mem::take(&mut first),
                    ..opts
                };
                build::run(&config, &base, run_opts).map(|_| ())
            })
        }

        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli, base: &Path) -> Result<Config> {
    let (path, required) = match &cli.config {
        Some(p) => (base.join(p), true),
        None => (base.join(DEFAULT_CONFIG_FILE), false),
    };
    Ok(Config::load(&path, required)?.with_jobs(cli.jobs))
}

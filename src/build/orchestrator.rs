//! Parallel compiler invocation.
//!
//! Every [`CompileCommand`] is independent: disjoint staging file, disjoint
//! output. Commands run on a rayon pool and each one runs to completion
//! regardless of how its siblings fare.

use super::feedback::FeedbackAnalyzer;
use crate::materialize::CompileCommand;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Executes one compile command and returns everything it printed.
pub trait Runner: Sync {
    fn run(&self, cmd: &CompileCommand) -> io::Result<String>;
}

/// Spawns the real compiler.
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Runner for ProcessRunner {
    fn run(&self, cmd: &CompileCommand) -> io::Result<String> {
        let output = Command::new(&self.program).args(cmd.args()).output()?;
        Ok(combine_output(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}

/// Join both streams so stderr always starts on its own line.
fn combine_output(stdout: &str, stderr: &str) -> String {
    let mut text = stdout.to_string();
    if !text.is_empty() && !stderr.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(stderr);
    text
}

/// Result of one job.
///
/// `cl.exe` echoes the source file name on success, so a single line of
/// output is the normal case and anything longer carries warnings or errors.
/// The exit status is not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Diagnostics(String),
    SpawnFailed(String),
}

impl JobOutcome {
    pub fn from_output(output: &str) -> Self {
        if output.lines().count() > 1 {
            JobOutcome::Diagnostics(output.to_string())
        } else {
            JobOutcome::Success
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub command: CompileCommand,
    pub outcome: JobOutcome,
}

/// Run `commands` on `workers` threads (`None` or `Some(0)`: one per logical CPU).
///
/// Reports come back in the order of `commands`.
pub fn run_jobs<R: Runner>(
    commands: Vec<CompileCommand>,
    runner: &R,
    workers: Option<usize>,
) -> Result<Vec<JobReport>> {
    if commands.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.unwrap_or(0))
        .build()
        .context("Failed to start compile workers")?;

    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(commands.len() as u64);
    pb.set_style(style);
    pb.set_message("Compiling...");

    let reports = pool.install(|| {
        commands
            .into_par_iter()
            .map(|command| {
                let outcome = match runner.run(&command) {
                    Ok(output) => JobOutcome::from_output(&output),
                    Err(e) => JobOutcome::SpawnFailed(e.to_string()),
                };
                surface(&pb, &command, &outcome);
                pb.inc(1);
                JobReport { command, outcome }
            })
            .collect::<Vec<_>>()
    });

    pb.finish_and_clear();
    Ok(reports)
}

// One block per job; suspend serializes writers across workers.
fn surface(pb: &ProgressBar, command: &CompileCommand, outcome: &JobOutcome) {
    let block = match outcome {
        JobOutcome::Success => return,
        JobOutcome::Diagnostics(output) => format!(
            "{} building {} from {}\n{}",
            "!".yellow(),
            command.output.display(),
            command.staged_source.display(),
            with_hint(output.trim_end())
        ),
        JobOutcome::SpawnFailed(err) => format!(
            "{} could not run compiler for {}: {}",
            "x".red(),
            command.output.display(),
            err
        ),
    };
    pb.suspend(|| println!("{}", block));
}

fn with_hint(output: &str) -> String {
    match FeedbackAnalyzer::analyze(output) {
        Some(hint) => format!("{}\n{} {}", output, "hint:".cyan(), hint),
        None => output.to_string(),
    }
}

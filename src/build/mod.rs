mod clean;
mod core;
mod feedback;
mod orchestrator;
mod watcher;

pub use clean::clean;
pub use feedback::FeedbackAnalyzer;
pub use self::core::{
    Layout, Plan, RunOptions, RunSummary, check_template, generate, kind_of, plan, run,
};
pub use orchestrator::{JobOutcome, JobReport, ProcessRunner, Runner, run_jobs};
pub use watcher::watch;

use super::clean::clean;
use super::orchestrator::{JobOutcome, ProcessRunner, Runner, run_jobs};
use crate::config::Config;
use crate::dedup::{Deduplicated, dedup};
use crate::materialize::{ArtifactKind, Materialized, Materializer, classify};
use crate::rules::{ParsedRules, parse_rules};
use crate::scan::scan_all;
use crate::template::LauncherTemplate;
use crate::toolchain;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub clean: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Configured paths resolved against the working directory.
#[derive(Debug, Clone)]
pub struct Layout {
    pub rules: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub work: PathBuf,
}

impl Layout {
    pub fn new(config: &Config, base: &Path) -> Self {
        Self {
            rules: base.join(&config.paths.rules),
            template: base.join(&config.paths.template),
            output: base.join(&config.paths.output),
            work: base.join(&config.paths.work),
        }
    }
}

/// Everything known before anything is written.
#[derive(Debug)]
pub struct Plan {
    pub parsed: ParsedRules,
    pub dedup: Deduplicated,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub built: usize,
    pub failed: usize,
    pub shimmed: usize,
    pub existing: usize,
    pub ignored: usize,
    pub missing_dirs: usize,
    pub collisions: usize,
}

/// Parse the rules file, scan every rule and drop already-built outputs.
pub fn plan(config: &Config, base: &Path) -> Result<Plan> {
    let layout = Layout::new(config, base);
    let text = fs::read_to_string(&layout.rules)
        .with_context(|| format!("Failed to read rules file {}", layout.rules.display()))?;
    let parsed = parse_rules(&text, base)?;
    let matches = scan_all(&parsed.rules)?;
    let dedup = dedup(matches, &layout.output);
    Ok(Plan { parsed, dedup })
}

/// Full run: toolchain gate, optional clean, then generation.
pub fn run(config: &Config, base: &Path, opts: RunOptions) -> Result<RunSummary> {
    if opts.dry_run {
        let plan = plan(config, base)?;
        print_plan(config, &plan);
        return Ok(summarize_plan(config, &plan));
    }

    let tc = toolchain::detect_toolchain(&config.build.compiler)?;
    if opts.verbose {
        println!(
            "   {} Using compiler: {}",
            "🔧".cyan(),
            tc.compiler_path.display()
        );
    }

    check_template(config, base, opts.clean)?;

    if opts.clean {
        let layout = Layout::new(config, base);
        clean(&layout.output, &layout.work)?;
    }

    generate(config, base, &ProcessRunner::new(tc.compiler_path), opts.verbose)
}

/// Fail before anything is deleted when a binary target would need a
/// template that cannot be loaded. With `clean`, outputs that exist now
/// will be rebuilt, so they count too.
pub fn check_template(config: &Config, base: &Path, clean: bool) -> Result<()> {
    let plan = plan(config, base)?;
    let needed = plan
        .dedup
        .fresh
        .iter()
        .chain(plan.dedup.existing.iter().filter(|_| clean))
        .any(|m| kind_of(config, &m.extension) == ArtifactKind::Binary);
    if needed {
        LauncherTemplate::load(&Layout::new(config, base).template)?;
    }
    Ok(())
}

/// Materialize every fresh match and compile the binary ones with `runner`.
pub fn generate<R: Runner>(
    config: &Config,
    base: &Path,
    runner: &R,
    verbose: bool,
) -> Result<RunSummary> {
    let start_time = Instant::now();
    let layout = Layout::new(config, base);
    let plan = plan(config, base)?;
    let mut summary = summarize_plan(config, &plan);

    report_skips(&plan, verbose);

    let needs_template = plan
        .dedup
        .fresh
        .iter()
        .any(|m| kind_of(config, &m.extension) == ArtifactKind::Binary);
    let template = if needs_template {
        Some(LauncherTemplate::load(&layout.template)?)
    } else {
        None
    };

    fs::create_dir_all(&layout.output)
        .with_context(|| format!("Failed to create {}", layout.output.display()))?;
    fs::create_dir_all(&layout.work)
        .with_context(|| format!("Failed to create {}", layout.work.display()))?;

    let mut commands = Vec::new();
    let materializer = Materializer::new(
        template.as_ref(),
        &layout.output,
        &layout.work,
        &config.build.binary_extension,
        &config.build.script_extension,
    );

    for m in &plan.dedup.fresh {
        match materializer.materialize(m)? {
            Materialized::Queued(cmd) => commands.push(cmd),
            Materialized::Shimmed(path) => {
                summary.shimmed += 1;
                if verbose {
                    println!("   {} shim {}", "+".green(), path.display());
                }
            }
            Materialized::Ignored => {
                if verbose {
                    println!(
                        "   {} {} (unsupported extension)",
                        "-".dimmed(),
                        m.source.display()
                    );
                }
            }
        }
    }

    if !commands.is_empty() {
        println!(
            "{} Compiling {} launcher(s) with {}...",
            "⚙".cyan(),
            commands.len(),
            config.build.compiler
        );
    }

    let reports = run_jobs(commands, runner, config.build.jobs)?;
    for r in &reports {
        match r.outcome {
            JobOutcome::Success => summary.built += 1,
            _ => summary.failed += 1,
        }
    }

    print_summary(&summary, start_time);
    Ok(summary)
}

pub fn kind_of(config: &Config, extension: &str) -> ArtifactKind {
    classify(
        extension,
        &config.build.binary_extension,
        &config.build.script_extension,
    )
}

fn summarize_plan(config: &Config, plan: &Plan) -> RunSummary {
    let ignored = plan
        .dedup
        .fresh
        .iter()
        .filter(|m| kind_of(config, &m.extension) == ArtifactKind::Ignored)
        .count();
    RunSummary {
        existing: plan.dedup.existing.len(),
        missing_dirs: plan.parsed.missing.len(),
        collisions: plan.dedup.collisions.len(),
        ignored,
        ..RunSummary::default()
    }
}

fn report_skips(plan: &Plan, verbose: bool) {
    for c in &plan.dedup.collisions {
        println!(
            "{} Output '{}' is claimed by {} sources; result is unspecified:",
            "!".yellow(),
            c.output_name,
            c.sources.len()
        );
        for s in &c.sources {
            println!("     {}", s.display());
        }
    }

    if !verbose {
        return;
    }
    for dir in &plan.parsed.missing {
        println!("   {} {} does not exist", "-".dimmed(), dir.display());
    }
    for m in &plan.dedup.existing {
        println!("   {} {} (exists)", "-".dimmed(), m.output_name);
    }
}

fn print_plan(config: &Config, plan: &Plan) {
    report_skips(plan, true);
    if plan.dedup.fresh.is_empty() {
        println!("{} Up to date", "⚡".green());
        return;
    }
    for m in &plan.dedup.fresh {
        let action = match kind_of(config, &m.extension) {
            ArtifactKind::Binary => "compile".cyan(),
            ArtifactKind::Script => "shim".green(),
            ArtifactKind::Ignored => continue,
        };
        println!(
            "   {:>7} {} -> {}",
            action,
            m.source.display(),
            m.output_name.bold()
        );
    }
}

fn print_summary(summary: &RunSummary, start_time: Instant) {
    let produced = summary.built + summary.shimmed;
    if produced == 0 && summary.failed == 0 {
        println!("{} Up to date", "⚡".green());
        return;
    }
    println!(
        "{} {} built, {} shimmed, {} already present in {:.2?}",
        "✓".green(),
        summary.built,
        summary.shimmed,
        summary.existing,
        start_time.elapsed()
    );
    if summary.failed > 0 {
        println!(
            "{} {} launcher(s) reported diagnostics (see above)",
            "!".yellow(),
            summary.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::CompileCommand;
    use std::io;

    struct TouchCompiler;

    impl Runner for TouchCompiler {
        fn run(&self, cmd: &CompileCommand) -> io::Result<String> {
            fs::write(&cmd.output, b"MZ")?;
            Ok(String::new())
        }
    }

    fn project(rules: &str) -> (tempfile::TempDir, Config) {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("path.txt"), rules).unwrap();
        (root, Config::default())
    }

    #[test]
    fn test_layout_resolves_against_base() {
        let layout = Layout::new(&Config::default(), Path::new("/work"));
        assert_eq!(layout.rules, Path::new("/work").join("path.txt"));
        assert_eq!(layout.output, Path::new("/work").join("links"));
        assert_eq!(layout.work, Path::new("/work").join("obj"));
    }

    #[test]
    fn test_missing_rules_file_errors() {
        let root = tempfile::tempdir().unwrap();
        let err = plan(&Config::default(), root.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("rules file"));
    }

    #[test]
    fn test_shim_only_run_needs_no_template() {
        let (root, config) = project("tools # *.bat\n");
        fs::create_dir(root.path().join("tools")).unwrap();
        fs::write(root.path().join("tools").join("env.bat"), b"").unwrap();

        let summary = generate(&config, root.path(), &TouchCompiler, false).unwrap();
        assert_eq!(summary.shimmed, 1);
        assert!(root.path().join("links").join("env.bat").exists());
    }

    #[test]
    fn test_binary_run_without_template_errors() {
        let (root, config) = project("tools\n");
        fs::create_dir(root.path().join("tools")).unwrap();
        fs::write(root.path().join("tools").join("a.exe"), b"").unwrap();

        let err = generate(&config, root.path(), &TouchCompiler, false).unwrap_err();
        assert!(err.to_string().contains("template"));
    }

    #[test]
    fn test_template_checked_for_rebuilds_after_clean() {
        let (root, config) = project("tools\n");
        fs::create_dir(root.path().join("tools")).unwrap();
        fs::write(root.path().join("tools").join("a.exe"), b"").unwrap();
        fs::create_dir(root.path().join("links")).unwrap();
        fs::write(root.path().join("links").join("a.exe"), b"MZ").unwrap();

        assert!(check_template(&config, root.path(), false).is_ok());
        let err = check_template(&config, root.path(), true).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(root.path().join("links").join("a.exe").exists());
    }

    #[test]
    fn test_template_check_rejects_markerless_template() {
        let (root, config) = project("tools\n");
        fs::create_dir(root.path().join("tools")).unwrap();
        fs::write(root.path().join("tools").join("a.exe"), b"").unwrap();
        fs::create_dir(root.path().join("exe")).unwrap();
        fs::write(root.path().join("exe").join("exe.cpp"), "int main() {}").unwrap();

        let err = check_template(&config, root.path(), false).unwrap_err();
        assert!(err.to_string().contains("marker"));
    }

    #[test]
    fn test_template_check_skipped_for_shims() {
        let (root, config) = project("tools # *.bat\n");
        fs::create_dir(root.path().join("tools")).unwrap();
        fs::write(root.path().join("tools").join("env.bat"), b"").unwrap();
        assert!(check_template(&config, root.path(), true).is_ok());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (root, config) = project("tools # *.exe *.bat\n");
        fs::create_dir(root.path().join("tools")).unwrap();
        fs::write(root.path().join("tools").join("a.exe"), b"").unwrap();
        fs::write(root.path().join("tools").join("b.bat"), b"").unwrap();

        let opts = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        let summary = run(&config, root.path(), opts).unwrap();
        assert_eq!(summary.built, 0);
        assert!(!root.path().join("links").exists());
        assert!(!root.path().join("obj").exists());
    }
}

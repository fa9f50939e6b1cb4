//! End-to-end pipeline tests.
//!
//! These drive `build::generate` against temporary directory trees with an
//! in-process compiler stand-in that creates the `/Fe` output, so they run
//! without a real toolchain.

use shimgen::build::{self, Runner};
use shimgen::config::Config;
use shimgen::materialize::CompileCommand;
use shimgen::template::DEFAULT_TEMPLATE;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct RecordingCompiler {
    calls: Mutex<Vec<CompileCommand>>,
}

impl RecordingCompiler {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<CompileCommand> {
        self.calls.lock().unwrap().clone()
    }
}

impl Runner for RecordingCompiler {
    fn run(&self, cmd: &CompileCommand) -> io::Result<String> {
        self.calls.lock().unwrap().push(cmd.clone());
        fs::write(&cmd.output, b"MZ")?;
        Ok(format!(
            "{}\n",
            cmd.staged_source.file_name().unwrap().to_string_lossy()
        ))
    }
}

struct Project {
    root: tempfile::TempDir,
}

impl Project {
    fn new(rules: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("path.txt"), rules).unwrap();
        fs::create_dir_all(root.path().join("exe")).unwrap();
        fs::write(root.path().join("exe").join("exe.cpp"), DEFAULT_TEMPLATE).unwrap();
        Self { root }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn tool_dir(&self, name: &str, files: &[&str]) -> PathBuf {
        let dir = self.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        for f in files {
            fs::write(dir.join(f), b"").unwrap();
        }
        dir
    }

    fn links(&self) -> Vec<String> {
        let dir = self.path().join("links");
        if !dir.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        self.links()
            .into_iter()
            .map(|n| {
                let bytes = fs::read(self.path().join("links").join(&n)).unwrap();
                (n, bytes)
            })
            .collect()
    }
}

#[test]
fn test_alias_scenario_both_orderings() {
    for patterns in ["*.exe foo.exe:bar", "foo.exe:bar *.exe"] {
        let project = Project::new(&format!("tools # {patterns}\n"));
        project.tool_dir("tools", &["foo.exe", "baz.exe"]);

        let compiler = RecordingCompiler::new();
        let summary = build::generate(&Config::default(), project.path(), &compiler, false).unwrap();

        assert_eq!(summary.built, 2, "patterns: {patterns}");
        assert_eq!(project.links(), vec!["bar", "baz.exe"], "patterns: {patterns}");

        let staged = fs::read_to_string(project.path().join("obj").join("bar.cpp")).unwrap();
        assert!(staged.contains("L\"foo.exe\""));
    }
}

#[test]
fn test_second_run_is_a_no_op() {
    let project = Project::new("tools # *.exe *.bat\n");
    project.tool_dir("tools", &["a.exe", "b.exe", "env.bat"]);

    let first = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &first, false).unwrap();
    assert_eq!(summary.built, 2);
    assert_eq!(summary.shimmed, 1);
    let before = project.snapshot();

    let second = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &second, false).unwrap();
    assert!(second.calls().is_empty());
    assert_eq!(summary.built, 0);
    assert_eq!(summary.shimmed, 0);
    assert_eq!(summary.existing, 3);
    assert_eq!(project.snapshot(), before);
}

#[test]
fn test_script_targets_never_compiled() {
    let project = Project::new("scripts # *.bat\n");
    let dir = project.tool_dir("scripts", &["vcvars64.bat", "setenv.bat"]);

    let compiler = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &compiler, false).unwrap();

    assert!(compiler.calls().is_empty());
    assert_eq!(summary.shimmed, 2);
    let body = fs::read_to_string(project.path().join("links").join("vcvars64.bat")).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "@echo off");
    assert_eq!(lines[1], format!("\"{}\" %*", dir.join("vcvars64.bat").display()));
}

#[test]
fn test_unknown_extensions_produce_nothing() {
    let project = Project::new("docs # *\n");
    project.tool_dir("docs", &["readme.txt", "logo.png", "LICENSE"]);

    let compiler = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &compiler, false).unwrap();

    assert!(compiler.calls().is_empty());
    assert_eq!(summary.ignored, 3);
    assert!(project.links().is_empty());
    assert_eq!(fs::read_dir(project.path().join("obj")).unwrap().count(), 0);
}

#[test]
fn test_missing_directories_and_comments_skipped() {
    let project = Project::new("# header\n\nnot-installed # *.exe\ntools\n");
    project.tool_dir("tools", &["x.exe"]);

    let compiler = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &compiler, false).unwrap();

    assert_eq!(summary.missing_dirs, 1);
    assert_eq!(summary.built, 1);
    assert_eq!(project.links(), vec!["x.exe"]);
}

#[test]
fn test_clean_then_empty_scan_leaves_empty_dirs() {
    let project = Project::new("# nothing configured\n");
    let links = project.tool_dir("links", &["stale.exe", "old.bat"]);
    let obj = project.tool_dir("obj", &["stale.exe.cpp", "stale.obj"]);

    build::clean(&links, &obj).unwrap();
    let summary =
        build::generate(&Config::default(), project.path(), &RecordingCompiler::new(), false)
            .unwrap();

    assert_eq!(summary, build::RunSummary::default());
    assert!(project.links().is_empty());
    assert_eq!(fs::read_dir(&obj).unwrap().count(), 0);
}

#[test]
fn test_clean_allows_rebuild_of_existing_outputs() {
    let project = Project::new("tools\n");
    project.tool_dir("tools", &["a.exe"]);
    let links = project.tool_dir("links", &["a.exe"]);

    let compiler = RecordingCompiler::new();
    build::generate(&Config::default(), project.path(), &compiler, false).unwrap();
    assert!(compiler.calls().is_empty());

    build::clean(&links, &project.path().join("obj")).unwrap();
    build::generate(&Config::default(), project.path(), &compiler, false).unwrap();
    assert_eq!(compiler.calls().len(), 1);
}

#[test]
fn test_cross_rule_collision_is_flagged() {
    // Two rules both produce "tool.exe"; which one wins is left unspecified.
    let project = Project::new("a\nb\n");
    project.tool_dir("a", &["tool.exe"]);
    project.tool_dir("b", &["tool.exe"]);

    let compiler = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &compiler, false).unwrap();

    assert_eq!(summary.collisions, 1);
    assert_eq!(compiler.calls().len(), 2);
    assert_eq!(project.links(), vec!["tool.exe"]);
}

#[test]
fn test_custom_layout_from_config() {
    let project = Project::new("");
    fs::write(project.path().join("rules.txt"), "tools # *.exe *.cmd\n").unwrap();
    project.tool_dir("tools", &["a.exe", "b.cmd", "c.bat"]);

    let config = Config::from_toml(
        r#"
[paths]
rules = "rules.txt"
output = "bin"
work = "stage"

[build]
jobs = 1
script_extension = "cmd"
"#,
    )
    .unwrap();

    let compiler = RecordingCompiler::new();
    let summary = build::generate(&config, project.path(), &compiler, false).unwrap();

    assert_eq!(summary.built, 1);
    assert_eq!(summary.shimmed, 1);
    assert!(project.path().join("bin").join("a.exe").exists());
    assert!(project.path().join("bin").join("b.cmd").exists());
    assert!(project.path().join("stage").join("a.exe.cpp").exists());
    assert_eq!(compiler.calls()[0].object_dir, project.path().join("stage"));
}

#[test]
fn test_odd_globs_do_not_stop_other_rules() {
    let project = Project::new("not-installed # [abc.exe foo.exe:\ntools # tool**.exe [v*.exe\n");
    project.tool_dir("tools", &["toolx.exe", "[v2.exe", "other.exe"]);

    let compiler = RecordingCompiler::new();
    let summary = build::generate(&Config::default(), project.path(), &compiler, false).unwrap();

    assert_eq!(summary.missing_dirs, 1);
    assert_eq!(summary.built, 2);
    assert_eq!(project.links(), vec!["[v2.exe", "toolx.exe"]);
}

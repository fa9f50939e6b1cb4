//! Stub materialization.
//!
//! Binary targets get a staged launcher source plus a [`CompileCommand`];
//! script targets get a two-line shim written straight to the output
//! directory. Anything else is dropped.

use crate::dedup::output_path;
use crate::scan::MatchResult;
use crate::template::LauncherTemplate;
use anyhow::{Context, Result};
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Flags passed to every compile: no banner, C++ exceptions, optimize,
/// treat input as C++.
pub const FIXED_FLAGS: [&str; 4] = ["/nologo", "/EHsc", "/O2", "/TP"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Binary,
    Script,
    Ignored,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Binary => "binary",
            ArtifactKind::Script => "script",
            ArtifactKind::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubJob {
    Compile {
        template_instance: String,
        staged_source: PathBuf,
        output: PathBuf,
    },
    Shim {
        script_path: PathBuf,
        body: String,
    },
}

/// One compiler invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    pub staged_source: PathBuf,
    pub object_dir: PathBuf,
    pub output: PathBuf,
}

impl CompileCommand {
    /// Arguments after the compiler executable, in invocation order.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            self.staged_source.to_string_lossy().to_string(),
            format!("/Fo{}{}", self.object_dir.display(), MAIN_SEPARATOR),
            format!("/Fe{}", self.output.display()),
        ];
        args.extend(FIXED_FLAGS.iter().map(|f| f.to_string()));
        args
    }
}

/// What happened to a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    Queued(CompileCommand),
    Shimmed(PathBuf),
    Ignored,
}

pub struct Materializer<'a> {
    /// Only required when a binary target is materialized.
    template: Option<&'a LauncherTemplate>,
    output_dir: &'a Path,
    work_dir: &'a Path,
    binary_extension: &'a str,
    script_extension: &'a str,
}

impl<'a> Materializer<'a> {
    pub fn new(
        template: Option<&'a LauncherTemplate>,
        output_dir: &'a Path,
        work_dir: &'a Path,
        binary_extension: &'a str,
        script_extension: &'a str,
    ) -> Self {
        Self {
            template,
            output_dir,
            work_dir,
            binary_extension,
            script_extension,
        }
    }

    pub fn classify(&self, extension: &str) -> ArtifactKind {
        classify(extension, self.binary_extension, self.script_extension)
    }

    /// Decide what to write for `m` without touching the filesystem.
    pub fn plan(&self, m: &MatchResult) -> Result<Option<StubJob>> {
        let job = match self.classify(&m.extension) {
            ArtifactKind::Binary => {
                let template = self.template.ok_or_else(|| {
                    anyhow::anyhow!("No launcher template loaded for {}", m.source.display())
                })?;
                StubJob::Compile {
                    template_instance: template
                        .instantiate(&m.file_name(), &m.directory().to_string_lossy()),
                    staged_source: self.work_dir.join(format!("{}.cpp", m.output_name)),
                    output: output_path(self.output_dir, m),
                }
            }
            ArtifactKind::Script => StubJob::Shim {
                script_path: output_path(self.output_dir, m),
                body: shim_body(&m.source),
            },
            ArtifactKind::Ignored => return Ok(None),
        };
        Ok(Some(job))
    }

    /// Write the artifact for `m`; binary targets come back as a queued command.
    pub fn materialize(&self, m: &MatchResult) -> Result<Materialized> {
        match self.plan(m)? {
            Some(StubJob::Compile {
                template_instance,
                staged_source,
                output,
            }) => {
                fs::write(&staged_source, template_instance).with_context(|| {
                    format!("Failed to write staging file {}", staged_source.display())
                })?;
                Ok(Materialized::Queued(CompileCommand {
                    staged_source,
                    object_dir: self.work_dir.to_path_buf(),
                    output,
                }))
            }
            Some(StubJob::Shim { script_path, body }) => {
                fs::write(&script_path, body)
                    .with_context(|| format!("Failed to write shim {}", script_path.display()))?;
                Ok(Materialized::Shimmed(script_path))
            }
            None => Ok(Materialized::Ignored),
        }
    }
}

pub fn classify(extension: &str, binary: &str, script: &str) -> ArtifactKind {
    if extension.eq_ignore_ascii_case(binary) {
        ArtifactKind::Binary
    } else if extension.eq_ignore_ascii_case(script) {
        ArtifactKind::Script
    } else {
        ArtifactKind::Ignored
    }
}

/// Echo off, then call the target forwarding every argument.
pub fn shim_body(source: &Path) -> String {
    format!("@echo off\n\"{}\" %*\n", source.display())
}

//! Configuration (`shimgen.toml`).
//!
//! Every key is optional; a missing file yields the defaults below, which
//! match the classic layout: `path.txt` rules, `exe/exe.cpp` template,
//! `links/` output and `obj/` staging directories, compiled with `cl.exe`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "shimgen.toml";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_rules")]
    pub rules: PathBuf,
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_work")]
    pub work: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuildConfig {
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// Worker count; `None` means one per logical CPU.
    pub jobs: Option<usize>,
    #[serde(default = "default_binary_extension")]
    pub binary_extension: String,
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            template: default_template(),
            output: default_output(),
            work: default_work(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            jobs: None,
            binary_extension: default_binary_extension(),
            script_extension: default_script_extension(),
        }
    }
}

fn default_rules() -> PathBuf {
    PathBuf::from("path.txt")
}

fn default_template() -> PathBuf {
    Path::new("exe").join("exe.cpp")
}

fn default_output() -> PathBuf {
    PathBuf::from("links")
}

fn default_work() -> PathBuf {
    PathBuf::from("obj")
}

fn default_compiler() -> String {
    "cl.exe".to_string()
}

fn default_binary_extension() -> String {
    "exe".to_string()
}

fn default_script_extension() -> String {
    "bat".to_string()
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)
            .context("Failed to parse shimgen.toml - check for syntax errors")?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// An explicitly requested file (`required`) that is missing is an error.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(anyhow::anyhow!(
                    "Config file {} not found",
                    path.display()
                ));
            }
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text)
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if jobs.is_some() {
            self.build.jobs = jobs;
        }
        self
    }
}

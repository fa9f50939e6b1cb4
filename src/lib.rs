//! # shimgen - PATH launcher generator
//!
//! shimgen keeps a single directory on `PATH` populated with tiny launchers
//! for programs scattered across many install directories.
//!
//! A rules file lists directories and file-name patterns:
//!
//! ```text
//! # every *.exe in the directory
//! C:\Program Files\Git\bin\
//! # selected files, one of them renamed
//! C:\Python312\ # python.exe:python3.exe pip*.exe
//! C:\tools\ # *.bat
//! ```
//!
//! For each match an `.exe` gets a compiled launcher (a C++ template with
//! the target's name and directory substituted, built with `cl.exe`), and a
//! `.bat` gets a two-line shim. Outputs that already exist are left alone,
//! so re-running is cheap.
//!
//! ## Module Organization
//!
//! - [`rules`] - Rules file parsing
//! - [`scan`] - Directory listing and glob matching
//! - [`dedup`] - Already-built output filtering
//! - [`materialize`] - Staging sources, shims and compile commands
//! - [`build`] - Parallel compilation, cleanup and the full pipeline
//! - [`toolchain`] - Compiler presence check

/// Parallel compilation, cleanup, watch mode and the end-to-end pipeline.
pub mod build;

/// CLI command handlers.
pub mod commands;

/// Configuration file parsing (`shimgen.toml`).
pub mod config;

/// Existence-based output deduplication.
pub mod dedup;

/// Stub and shim materialization.
pub mod materialize;

/// Rules file parsing.
pub mod rules;

/// Directory scanning and pattern matching.
pub mod scan;

/// Launcher template handling.
pub mod template;

/// Compiler lookup on `PATH`.
pub mod toolchain;

/// Terminal UI utilities (tables).
pub mod ui;

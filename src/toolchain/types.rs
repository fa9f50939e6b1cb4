use std::path::PathBuf;
use thiserror::Error;

/// A compiler resolved on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Name as configured (e.g. `cl.exe`).
    pub name: String,
    /// Absolute path `PATH` lookup resolved to.
    pub compiler_path: PathBuf,
}

/// Error type for toolchain operations
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// Compiler not on `PATH`; the run cannot start.
    #[error("{name} was not found on PATH. {hint}")]
    NotFound { name: String, hint: String },
}

//! Toolchain presence check.
//!
//! The compiler is not discovered or configured beyond a `PATH` lookup: on
//! Windows the developer is expected to run from a shell where `vcvars*.bat`
//! has already set up `cl.exe`.

pub mod types;

pub use types::{Toolchain, ToolchainError};

use std::ffi::OsStr;
use std::path::Path;

/// Resolve `compiler` on the process `PATH`.
pub fn detect_toolchain(compiler: &str) -> Result<Toolchain, ToolchainError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf());
    detect_in(compiler, std::env::var_os("PATH"), &cwd)
}

/// Resolve `compiler` against an explicit search path.
pub fn detect_in<P: AsRef<OsStr>>(
    compiler: &str,
    search_path: Option<P>,
    cwd: &Path,
) -> Result<Toolchain, ToolchainError> {
    match which::which_in(compiler, search_path, cwd) {
        Ok(compiler_path) => Ok(Toolchain {
            name: compiler.to_string(),
            compiler_path,
        }),
        Err(_) => Err(ToolchainError::NotFound {
            name: compiler.to_string(),
            hint: hint_for(compiler),
        }),
    }
}

fn hint_for(compiler: &str) -> String {
    let stem = compiler.trim_end_matches(".exe").to_ascii_lowercase();
    if stem == "cl" || stem == "clang-cl" {
        "Please, run vcvars(32|64|all).bat file from VS installation".to_string()
    } else {
        "Install it or add its directory to PATH".to_string()
    }
}

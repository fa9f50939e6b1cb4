//! Launcher template handling.
//!
//! The template is opaque C++ source carrying two markers: [`NAME_MARKER`]
//! for the target's file name and [`DIR_MARKER`] for its directory. Both are
//! replaced with C string literal bodies, so they are expected to sit inside
//! `L"..."` literals.

use std::fs;
use std::path::Path;
use thiserror::Error;

pub const NAME_MARKER: &str = "__fn__";
pub const DIR_MARKER: &str = "__dn__";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {path} not found (run `shimgen template` to create one)")]
    NotFound { path: String },
    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("template is missing the {0} marker")]
    MissingMarker(&'static str),
}

#[derive(Debug, Clone)]
pub struct LauncherTemplate {
    text: String,
}

impl LauncherTemplate {
    pub fn new(text: impl Into<String>) -> Result<Self, TemplateError> {
        let text = text.into();
        for marker in [NAME_MARKER, DIR_MARKER] {
            if !text.contains(marker) {
                return Err(TemplateError::MissingMarker(marker));
            }
        }
        Ok(Self { text })
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        if !path.exists() {
            return Err(TemplateError::NotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(text)
    }

    /// Substitute every occurrence of both markers.
    pub fn instantiate(&self, file_name: &str, directory: &str) -> String {
        self.text
            .replace(NAME_MARKER, &escape_literal(file_name))
            .replace(DIR_MARKER, &escape_literal(directory))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Escape text for embedding in a C/C++ string literal.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Built-in launcher written by `shimgen template`.
///
/// Re-invokes `<dir>\<name>` with the original command line and forwards its
/// exit code.
pub const DEFAULT_TEMPLATE: &str = r#"#include <string>
#include <Windows.h>

#pragma comment(lib, "kernel32.lib")
#pragma comment(lib, "user32.lib")

static const wchar_t *TARGET_DIR = L"__dn__";
static const wchar_t *TARGET_NAME = L"__fn__";

static int fail(const std::wstring &msg)
{
    MessageBoxW(NULL, msg.c_str(), L"Launcher: __fn__", MB_OK);
    return 1;
}

int wmain(int argc, wchar_t *argv[])
{
    std::wstring prog = TARGET_DIR;
    if (!prog.empty() && prog.back() != L'\\')
        prog += L'\\';
    prog += TARGET_NAME;

    if (GetFileAttributesW(prog.c_str()) == INVALID_FILE_ATTRIBUTES)
        return fail(L"File '" + prog + L"' not found!");

    std::wstring cmd = GetCommandLineW();
    size_t quoted = cmd[0] == L'"' ? 1 : 0;
    size_t pos = cmd.find(argv[0]);
    if (pos != std::wstring::npos)
        cmd.replace(pos - quoted, wcslen(argv[0]) + 2 * quoted, L"\"" + prog + L"\"");

    STARTUPINFOW si = { 0 };
    si.cb = sizeof(si);
    PROCESS_INFORMATION pi = { 0 };
    if (!CreateProcessW(prog.c_str(), &cmd[0], 0, 0, FALSE, 0, 0, 0, &si, &pi))
    {
        WCHAR buf[8192] = { 0 };
        FormatMessageW(FORMAT_MESSAGE_FROM_SYSTEM, NULL, GetLastError(), 0, buf, 8192, NULL);
        return fail(std::wstring(L"CreateProcess() failed: ") + buf);
    }
    WaitForSingleObject(pi.hProcess, INFINITE);

    DWORD code = 1;
    if (!GetExitCodeProcess(pi.hProcess, &code))
        return fail(L"Cannot get exit code!");
    CloseHandle(pi.hThread);
    CloseHandle(pi.hProcess);
    return (int)code;
}
"#;

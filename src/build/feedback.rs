use colored::*;

pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    /// Suggest a fix for well-known `cl.exe` / `link.exe` failures.
    pub fn analyze(output: &str) -> Option<String> {
        // Headers or libraries missing: INCLUDE / LIB not set up
        if output.contains("Cannot open include file")
            || output.contains("cannot open include file")
            || (output.contains("LNK1104") && output.contains(".lib"))
        {
            return Some(format!(
                "The compiler environment looks incomplete.\nRun from a {} or call {} first.",
                "Developer Command Prompt".bold().yellow(),
                "vcvars64.bat".bold().green()
            ));
        }

        // Output still running or locked by another process
        if output.contains("LNK1168") {
            return Some(format!(
                "The launcher is {}.\nClose it, or rerun with {} after it exits.",
                "in use".bold().red(),
                "--clean".bold().green()
            ));
        }

        // The substituted directory broke the string literal
        if output.contains("C2001") || output.contains("newline in constant") {
            return Some(format!(
                "The target path could not be embedded in the {}.\nCheck the directory for unusual characters.",
                "launcher template".bold().yellow()
            ));
        }

        None
    }
}

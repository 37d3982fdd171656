//! Outcome of a single compile.

use crate::combined::CombinedOutput;
use crate::error::ToolchainResult;
use crate::process::ProcessOutput;

/// What a compile produced.
///
/// Always inspect [`is_failed`](Self::is_failed) before trusting `output`.
/// `errors` is human-readable and may hold warnings even on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerResult {
    /// Diagnostics written by solc, or the launch failure description.
    pub errors: String,
    /// Combined JSON written by solc on success.
    pub output: String,
    /// True on non-zero exit, signal, cancellation or launch failure.
    pub failed: bool,
}

impl CompilerResult {
    pub fn new(errors: impl Into<String>, output: impl Into<String>, failed: bool) -> Self {
        Self {
            errors: errors.into(),
            output: output.into(),
            failed,
        }
    }

    /// A failed result with no output.
    pub fn launch_failure(diagnostic: impl Into<String>) -> Self {
        Self::new(diagnostic, String::new(), true)
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Parses `output` as combined JSON.
    pub fn combined(&self) -> ToolchainResult<CombinedOutput> {
        CombinedOutput::parse(&self.output)
    }
}

impl From<ProcessOutput> for CompilerResult {
    fn from(output: ProcessOutput) -> Self {
        let failed = !output.success();
        Self {
            errors: output.stderr,
            output: output.stdout,
            failed,
        }
    }
}

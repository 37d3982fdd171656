//! Toolchain version detection.
//!
//! solc reports its version as free-form text, e.g.
//!
//! ```text
//! solc, the solidity compiler commandline interface
//! Version: 0.5.17+commit.d19bba13.Linux.g++
//! ```
//!
//! The first line containing a `major.minor.patch` triple wins; no attempt is
//! made to reconcile several version-like strings in the banner.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::command::CompilerInvocation;
use crate::error::{ToolchainError, ToolchainResult};
use crate::location::ToolchainLocation;
use crate::process::{try_run_process, RunStatus};

const VERSION_PATTERN: &str = r"(\d+)\.(\d+)\.(\d+)";

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_REGEX.get_or_init(|| Regex::new(VERSION_PATTERN).expect("invalid regex pattern"))
}

/// A `major.minor.patch` toolchain release, ordered component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extracts the version from `--version` output.
///
/// Lines are scanned in order and the leftmost triple of the first matching
/// line is returned. A line whose numbers overflow `u32` is skipped.
pub fn parse_version_output(output: &str) -> Option<VersionTriple> {
    output.lines().find_map(parse_version_line)
}

fn parse_version_line(line: &str) -> Option<VersionTriple> {
    let caps = version_regex().captures(line)?;
    Some(VersionTriple::new(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

/// Runs `<binary> --version` and parses the result.
///
/// # Errors
/// * [`ToolchainError::NotFound`] if the binary does not exist
/// * [`ToolchainError::SpawnFailed`] if it exists but cannot be launched
/// * [`ToolchainError::ProbeFailed`] on non-zero exit
/// * [`ToolchainError::VersionUnparseable`] if no line holds a version
pub fn try_probe_version(location: &ToolchainLocation) -> ToolchainResult<VersionTriple> {
    let binary = location.program().to_string_lossy().into_owned();
    let invocation = CompilerInvocation::new(location.program(), ["--version"]);

    let output = match try_run_process(&invocation, &location.environment(), &[], None) {
        Ok(output) => output,
        Err(ToolchainError::SpawnFailed(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolchainError::not_found(binary));
        }
        Err(e) => return Err(e),
    };

    if !output.success() {
        let exit_code = match output.status {
            RunStatus::Exited(code) => code,
            _ => -1,
        };
        return Err(ToolchainError::ProbeFailed { binary, exit_code });
    }

    let merged = format!("{}\n{}", output.stdout, output.stderr);
    parse_version_output(&merged).ok_or(ToolchainError::VersionUnparseable { binary })
}

/// Probes the toolchain, reporting absence as `None`.
///
/// A missing toolchain is an expected condition (the caller may fall back to
/// a bundled binary), so nothing here is surfaced as an error.
pub fn probe_version(location: &ToolchainLocation) -> Option<VersionTriple> {
    match try_probe_version(location) {
        Ok(version) => {
            info!(
                path = %location.resolved_path().display(),
                %version,
                "Solidity compiler found"
            );
            Some(version)
        }
        Err(ToolchainError::NotFound { binary }) => {
            info!(%binary, "Solidity compiler not installed");
            None
        }
        Err(ToolchainError::SpawnFailed(e)) => {
            info!(
                binary = %location.program().to_string_lossy(),
                error = %e,
                "Solidity compiler could not be launched"
            );
            None
        }
        Err(e) => {
            debug!(error = %e, "Solidity compiler version probe failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_solc_banner() {
        let out = "solc, the solidity compiler commandline interface\nVersion: 0.5.17+commit.d19bba13.Linux.g++";
        assert_eq!(parse_version_output(out), Some(VersionTriple::new(0, 5, 17)));
    }

    #[test]
    fn test_parse_bare_version() {
        assert_eq!(
            parse_version_output("0.8.19\n"),
            Some(VersionTriple::new(0, 8, 19))
        );
    }

    #[test]
    fn test_first_matching_line_wins() {
        let out = "tool 1.2.3\nVersion: 0.4.24\n";
        assert_eq!(parse_version_output(out), Some(VersionTriple::new(1, 2, 3)));
    }

    #[test]
    fn test_leftmost_match_in_line() {
        assert_eq!(
            parse_version_output("Version: 10.5.17 (compat 0.4.1)"),
            Some(VersionTriple::new(10, 5, 17))
        );
    }

    #[test]
    fn test_no_version() {
        assert_eq!(parse_version_output(""), None);
        assert_eq!(parse_version_output("Version: 0.5\nunknown"), None);
    }

    #[test]
    fn test_overflowing_line_is_skipped() {
        let out = "build 99999999999.1.1\nVersion: 0.6.12\n";
        assert_eq!(parse_version_output(out), Some(VersionTriple::new(0, 6, 12)));
    }

    #[test]
    fn test_ordering() {
        let v = VersionTriple::new;
        assert!(v(0, 4, 12) > v(0, 4, 11));
        assert!(v(0, 5, 0) > v(0, 4, 26));
        assert!(v(1, 0, 0) > v(0, 99, 99));
        assert_eq!(v(0, 4, 11).cmp(&v(0, 4, 11)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_display() {
        assert_eq!(VersionTriple::new(0, 8, 19).to_string(), "0.8.19");
    }

    #[test]
    fn test_probe_missing_binary() {
        let location = ToolchainLocation::system("solc-adapter-test-no-such-binary");
        assert!(matches!(
            try_probe_version(&location),
            Err(ToolchainError::NotFound { .. })
        ));
        assert_eq!(probe_version(&location), None);
    }
}

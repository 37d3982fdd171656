//! Process-wide solc facade.
//!
//! The toolchain is resolved once: the system binary is probed first and, if
//! it is missing or reports no version, the bundled binary is used instead
//! with its directory exported as the library search path. The detected
//! [`VersionTriple`] is cached and never re-probed.

use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, info};

use crate::command::{build_invocation, CompileOptions, ALLOW_PATHS_UNSUPPORTED_UP_TO};
use crate::config::CompilerConfig;
use crate::error::{describe_error_chain, ToolchainError, ToolchainResult};
use crate::location::ToolchainLocation;
use crate::output::OutputKind;
use crate::process::run_process;
use crate::result::CompilerResult;
use crate::version::{probe_version, VersionTriple};

static INSTANCE: OnceLock<Result<SolidityCompiler, ToolchainError>> = OnceLock::new();

/// A resolved solc toolchain.
///
/// Immutable after construction and safe to share between threads;
/// concurrent compiles run as independent child processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidityCompiler {
    location: ToolchainLocation,
    version: VersionTriple,
    timeout: Option<Duration>,
}

impl SolidityCompiler {
    /// Returns the process-wide compiler, detecting it on first use.
    ///
    /// Configuration comes from [`CompilerConfig::from_env`]. Detection runs
    /// exactly once even under concurrent first access, and its outcome,
    /// success or failure, is returned to every later caller.
    pub fn instance() -> Result<&'static SolidityCompiler, &'static ToolchainError> {
        INSTANCE
            .get_or_init(|| CompilerConfig::from_env().and_then(|config| Self::detect(&config)))
            .as_ref()
    }

    /// Resolves the toolchain described by `config`.
    ///
    /// # Errors
    /// [`ToolchainError::NotFound`] if neither the system binary nor the
    /// bundled fallback reports a version.
    pub fn detect(config: &CompilerConfig) -> ToolchainResult<Self> {
        let system = ToolchainLocation::system(config.system_binary.clone());
        if let Some(version) = probe_version(&system) {
            return Ok(Self::new(system, version).with_timeout(config.timeout));
        }

        let bundled_path = config.resolve_bundled_path()?;
        let location = match ToolchainLocation::bundled(&bundled_path) {
            Ok(location) => location,
            Err(ToolchainError::BundledNotFound { path }) => {
                info!(path = %path.display(), "No bundled Solidity compiler available");
                return Err(ToolchainError::not_found(
                    config.system_binary.to_string_lossy(),
                ));
            }
            Err(e) => return Err(e),
        };

        info!(
            path = %location.resolved_path().display(),
            "Solidity compiler from bundled distribution is used"
        );
        let version = probe_version(&location)
            .ok_or_else(|| ToolchainError::not_found(config.system_binary.to_string_lossy()))?;

        Ok(Self::new(location, version).with_timeout(config.timeout))
    }

    /// Wraps an already-resolved toolchain without probing it.
    pub fn new(location: ToolchainLocation, version: VersionTriple) -> Self {
        Self {
            location,
            version,
            timeout: None,
        }
    }

    /// Sets the per-compile timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The detected toolchain version.
    pub fn version(&self) -> VersionTriple {
        self.version
    }

    /// Where the toolchain binary lives.
    pub fn location(&self) -> &ToolchainLocation {
        &self.location
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns true if this toolchain accepts `--allow-paths`.
    pub fn supports_allow_paths(&self) -> bool {
        self.version > ALLOW_PATHS_UNSUPPORTED_UP_TO
    }

    /// Compiles `source` (fed on stdin) with default import resolution.
    pub fn compile_src(&self, source: &[u8], outputs: &[OutputKind]) -> CompilerResult {
        self.compile(source, &CompileOptions::new(outputs.iter().copied()))
    }

    /// Compiles `source` (fed on stdin).
    ///
    /// Never fails outright: a missing binary, a non-zero exit or a timeout
    /// all come back as a [`CompilerResult`] with `failed` set.
    pub fn compile(&self, source: &[u8], options: &CompileOptions) -> CompilerResult {
        let invocation = match build_invocation(self.location.program(), self.version, options) {
            Ok(invocation) => invocation,
            Err(e) => {
                return CompilerResult::launch_failure(format!(
                    "failed to prepare solc invocation: {}",
                    describe_error_chain(&e)
                ));
            }
        };

        debug!(
            command = %invocation.command_line(),
            working_dir = ?invocation.working_dir(),
            "invoking solc"
        );
        let output = run_process(
            &invocation,
            &self.location.environment(),
            source,
            self.timeout,
        );
        debug!(status = ?output.status, "solc finished");

        CompilerResult::from(output)
    }
}

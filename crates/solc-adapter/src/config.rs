//! Toolchain discovery configuration.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ToolchainError, ToolchainResult};

/// Name of the system-installed compiler.
pub const DEFAULT_SYSTEM_BINARY: &str = "solc";

/// Overrides the system binary name.
pub const ENV_BINARY: &str = "SOLC_ADAPTER_BINARY";

/// Points at the bundled fallback binary.
pub const ENV_BUNDLED_PATH: &str = "SOLC_ADAPTER_BUNDLED_PATH";

/// Per-invocation timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "SOLC_ADAPTER_TIMEOUT_SECS";

/// Directory next to the running executable that holds the bundled compiler.
pub const BUNDLED_DIR: &str = "native";

/// Configuration used to resolve the toolchain once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Binary name looked up through `PATH` first.
    pub system_binary: OsString,
    /// Bundled fallback. Defaults to `<exe dir>/native/solc`.
    pub bundled_path: Option<PathBuf>,
    /// Kill compiles that run longer than this.
    pub timeout: Option<Duration>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            system_binary: OsString::from(DEFAULT_SYSTEM_BINARY),
            bundled_path: None,
            timeout: None,
        }
    }
}

impl CompilerConfig {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the `SOLC_ADAPTER_*` environment variables.
    pub fn from_env() -> ToolchainResult<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds a config from an arbitrary variable lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> ToolchainResult<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut config = Self::default();

        if let Some(binary) = get(ENV_BINARY) {
            config.system_binary = binary;
        }
        if let Some(path) = get(ENV_BUNDLED_PATH) {
            config.bundled_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs = secs
                .to_str()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .ok_or_else(|| {
                    ToolchainError::invalid_config(format!(
                        "{} must be a whole number of seconds, got {:?}",
                        ENV_TIMEOUT_SECS, secs
                    ))
                })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Sets the system binary name.
    pub fn system_binary(mut self, name: impl Into<OsString>) -> Self {
        self.system_binary = name.into();
        self
    }

    /// Sets the bundled fallback path.
    pub fn bundled_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundled_path = Some(path.into());
        self
    }

    /// Sets the compile timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the compile timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Returns where the bundled fallback is expected.
    pub fn resolve_bundled_path(&self) -> ToolchainResult<PathBuf> {
        if let Some(ref path) = self.bundled_path {
            return Ok(path.clone());
        }

        let exe = std::env::current_exe()?;
        let exe_dir = exe.parent().ok_or_else(|| {
            ToolchainError::invalid_config(format!(
                "cannot locate bundled solc: {} has no parent directory",
                exe.display()
            ))
        })?;
        Ok(exe_dir.join(BUNDLED_DIR).join(bundled_binary_name()))
    }
}

fn bundled_binary_name() -> &'static str {
    if cfg!(windows) {
        "solc.exe"
    } else {
        "solc"
    }
}

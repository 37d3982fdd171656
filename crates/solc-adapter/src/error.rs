//! Error types for the solc adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for toolchain operations.
pub type ToolchainResult<T> = Result<T, ToolchainError>;

/// Errors that can occur while locating, probing, or driving solc.
///
/// Compile-time failures (bad source, non-zero exit, launch failure) never
/// surface as a `ToolchainError`; they are folded into a
/// [`CompilerResult`](crate::CompilerResult) instead.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// No usable toolchain could be found.
    #[error("Solidity compiler not found: '{binary}' is not installed and no bundled compiler reported a version. Install solc or set SOLC_ADAPTER_BUNDLED_PATH")]
    NotFound { binary: String },

    /// Failed to spawn the toolchain process.
    #[error("Failed to spawn solc process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// `--version` exited with non-zero status.
    #[error("'{binary} --version' exited with status {exit_code}")]
    ProbeFailed { binary: String, exit_code: i32 },

    /// `--version` output had no `major.minor.patch` line.
    #[error("Could not find a version number in the output of '{binary} --version'")]
    VersionUnparseable { binary: String },

    /// The bundled fallback binary does not exist.
    #[error("Bundled solc binary not found at: {path}")]
    BundledNotFound { path: PathBuf },

    /// IO error during path resolution.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the combined JSON written by solc.
    #[error("Failed to parse solc combined output: {0}")]
    ParseOutput(#[source] serde_json::Error),

    /// Unknown output kind name.
    #[error("Invalid output kind '{name}'. Expected one of: bin, abi, interface, metadata")]
    InvalidOutputKind { name: String },

    /// Malformed configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ToolchainError {
    /// Creates a new not-found error.
    pub fn not_found(binary: impl Into<String>) -> Self {
        Self::NotFound {
            binary: binary.into(),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns a stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ToolchainError::NotFound { .. } => "SOLC_001",
            ToolchainError::SpawnFailed(_) => "SOLC_002",
            ToolchainError::ProbeFailed { .. } => "SOLC_003",
            ToolchainError::VersionUnparseable { .. } => "SOLC_004",
            ToolchainError::BundledNotFound { .. } => "SOLC_005",
            ToolchainError::Io(_) => "SOLC_006",
            ToolchainError::ParseOutput(_) => "SOLC_007",
            ToolchainError::InvalidOutputKind { .. } => "SOLC_008",
            ToolchainError::InvalidConfig { .. } => "SOLC_009",
        }
    }

    /// Returns the error category used when grouping diagnostics.
    pub fn category(&self) -> &'static str {
        "solc"
    }
}

/// Renders an error followed by every error in its `source()` chain.
pub fn describe_error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str("\n  caused by: ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

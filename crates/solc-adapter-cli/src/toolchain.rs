//! Toolchain selection from environment and command-line overrides.

use std::time::Duration;

use anyhow::{Context, Result};
use solc_adapter::{CompilerConfig, SolidityCompiler};

/// Toolchain flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainArgs {
    /// System binary name or path to try first.
    pub solc: Option<String>,
    /// Bundled fallback binary.
    pub bundled: Option<String>,
    /// Per-compile timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ToolchainArgs {
    /// Merges the flags over `SOLC_ADAPTER_*` environment configuration.
    pub fn config(&self) -> Result<CompilerConfig> {
        let config = CompilerConfig::from_env().context("Invalid SOLC_ADAPTER_* configuration")?;
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: CompilerConfig) -> CompilerConfig {
        if let Some(ref solc) = self.solc {
            config = config.system_binary(solc);
        }
        if let Some(ref bundled) = self.bundled {
            config = config.bundled_path(bundled);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Detects the toolchain for this run.
    pub fn detect(&self) -> Result<SolidityCompiler> {
        let config = self.config()?;
        SolidityCompiler::detect(&config).context("No usable Solidity compiler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config() {
        let args = ToolchainArgs {
            solc: Some("solc-0.8.19".to_string()),
            bundled: Some("vendor/solc".to_string()),
            timeout_secs: Some(60),
        };

        let config = args.apply(CompilerConfig::default());
        assert_eq!(config.system_binary, OsString::from("solc-0.8.19"));
        assert_eq!(config.bundled_path, Some(PathBuf::from("vendor/solc")));
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let base = CompilerConfig::new().system_binary("solc-from-env").timeout_secs(5);
        assert_eq!(ToolchainArgs::default().apply(base.clone()), base);
    }
}
